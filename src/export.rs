//! CSV export of schedule rows.
//!
//! Header: `period,payment,interest,principal,balance_end,balloon_due`. Amounts are written
//! with the precision they carry, so rounding is whatever the schedule already applied.

use std::io::Write;

use csv::WriterBuilder;
use serde::Serialize;

use crate::error::Result;
use crate::schedule::ScheduleRow;

#[derive(Serialize)]
struct CsvRow {
    period: u32,
    payment: String,
    interest: String,
    principal: String,
    balance_end: String,
    balloon_due: String,
}

impl From<&ScheduleRow> for CsvRow {
    fn from(row: &ScheduleRow) -> Self {
        Self {
            period: row.period,
            payment: row.payment.to_string(),
            interest: row.interest.to_string(),
            principal: row.principal.to_string(),
            balance_end: row.balance_end.to_string(),
            balloon_due: row.balloon_due.to_string(),
        }
    }
}

/// Writes `rows` as CSV, header first.
pub fn write_csv<W: Write>(writer: W, rows: &[ScheduleRow]) -> Result<()> {
    let mut wrt = WriterBuilder::new().has_headers(false).from_writer(writer);
    wrt.write_record(["period", "payment", "interest", "principal", "balance_end", "balloon_due"])?;
    for row in rows {
        wrt.serialize(CsvRow::from(row))?;
    }
    wrt.flush()?;
    Ok(())
}

pub fn to_csv_string(rows: &[ScheduleRow]) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(&mut buf, rows)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
