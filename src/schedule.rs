//! Period-by-period amortization schedule with balloon detection.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AmortizationError, Result};
use crate::payment::{compute_payment, periods_for};

/// Residual balances smaller than this are treated as fully retired.
const BALANCE_DUST: Decimal = dec!(0.000000001);

/// Input parameters of a single schedule computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// The amount borrowed.
    pub principal: Decimal,
    /// The nominal annual rate as a decimal fraction (e.g. 0.054 for 5.4%).
    pub annual_rate: Decimal,
    /// The term over which the fixed payment would fully retire the loan.
    pub amortization_years: Decimal,
    /// The term after which the remaining balance is called.
    pub maturity_years: Decimal,
    /// The number of payments made in a year.
    pub payments_per_year: u32,
}

impl LoanTerms {
    /// Builds terms from the units a user usually types in: a percentage rate and
    /// terms counted in months.
    pub fn from_months(
        principal: Decimal,
        annual_rate_percent: Decimal,
        amortization_months: u32,
        maturity_months: u32,
        payments_per_year: u32,
    ) -> Self {
        let twelve = dec!(12);
        Self {
            principal,
            annual_rate: annual_rate_percent / dec!(100),
            amortization_years: Decimal::from(amortization_months) / twelve,
            maturity_years: Decimal::from(maturity_months) / twelve,
            payments_per_year,
        }
    }

    /// The rate charged on the balance each period.
    pub fn periodic_rate(&self) -> Decimal {
        if self.payments_per_year == 0 {
            return Decimal::ZERO;
        }
        self.annual_rate / Decimal::from(self.payments_per_year)
    }
}

/// One payment period of the schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// 1-based period index.
    pub period: u32,
    /// Amount actually paid this period.
    pub payment: Decimal,
    /// Interest portion of the payment.
    pub interest: Decimal,
    /// Principal portion of the payment.
    pub principal: Decimal,
    /// Balance remaining after the payment.
    pub balance_end: Decimal,
    /// Lump sum called at maturity; zero on every row but a balloon row.
    pub balloon_due: Decimal,
}

impl ScheduleRow {
    pub fn new(
        period: u32,
        payment: Decimal,
        interest: Decimal,
        principal: Decimal,
        balance_end: Decimal,
    ) -> Self {
        Self {
            period,
            payment,
            interest,
            principal,
            balance_end,
            balloon_due: Decimal::ZERO,
        }
    }

    /// Returns a copy of this row carrying `amount` as the balloon due.
    pub fn with_balloon(&self, amount: Decimal) -> Self {
        Self {
            balloon_due: amount,
            ..self.clone()
        }
    }
}

/// A computed schedule together with the inputs that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub terms: LoanTerms,
    pub round_to_cents: bool,
    /// The fixed payment sized over the full amortization term, unrounded.
    pub payment: Decimal,
    pub rows: Vec<ScheduleRow>,
}

impl AmortizationSchedule {
    pub fn first_payment(&self) -> Decimal {
        self.rows.first().map(|r| r.payment).unwrap_or_default()
    }

    pub fn total_interest(&self) -> Decimal {
        self.rows.iter().map(|r| r.interest).sum()
    }

    pub fn total_paid(&self) -> Decimal {
        self.rows.iter().map(|r| r.payment).sum()
    }

    pub fn balloon_due(&self) -> Decimal {
        self.rows.last().map(|r| r.balloon_due).unwrap_or_default()
    }

    pub fn final_balance(&self) -> Decimal {
        self.rows.last().map(|r| r.balance_end).unwrap_or_default()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn has_balloon(&self) -> bool {
        self.balloon_due() > Decimal::ZERO
    }

    pub fn summary(&self) -> ScheduleSummary {
        ScheduleSummary {
            payment: self.payment.round_dp(2),
            interest_to_maturity: self.total_interest().round_dp(2),
            balloon_at_maturity: self.balloon_due().round_dp(2),
            periods_listed: self.row_count(),
        }
    }
}

/// Headline figures of a schedule, rounded for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub payment: Decimal,
    pub interest_to_maturity: Decimal,
    pub balloon_at_maturity: Decimal,
    pub periods_listed: usize,
}

/// Rolls the balance forward period by period until the loan is retired or matures.
///
/// The payment is sized over the amortization term while rows are only listed through
/// the maturity term, so a maturity shorter than the amortization leaves a balance that
/// is flagged on the last row as the balloon due.
///
/// When `round_to_cents` is set, payment, interest, principal and balance are each rounded
/// to two places on their own. A row may therefore show payment and interest + principal
/// a cent apart. The balance carried into the next period keeps full precision.
///
/// # Errors
///
/// Returns an error if the principal is not positive, if either term resolves to zero
/// periods, or if the rate is negative.
pub fn build_schedule(terms: &LoanTerms, round_to_cents: bool) -> Result<AmortizationSchedule> {
    if terms.principal <= Decimal::ZERO {
        return Err(AmortizationError::InvalidPrincipal(terms.principal));
    }
    if terms.maturity_years <= Decimal::ZERO {
        return Err(AmortizationError::term("Maturity term", terms.maturity_years));
    }

    let payment = compute_payment(
        terms.principal,
        terms.annual_rate,
        terms.amortization_years,
        terms.payments_per_year,
    )?;
    let rate = terms.periodic_rate();
    let periods_to_list = periods_for("Maturity term", terms.maturity_years, terms.payments_per_year)?;
    // the loan is retired within the amortization periods, whatever the maturity
    let amortization_periods =
        periods_for("Amortization term", terms.amortization_years, terms.payments_per_year)?;

    if terms.maturity_years > terms.amortization_years {
        warn!(
            maturity_years = %terms.maturity_years,
            amortization_years = %terms.amortization_years,
            "maturity exceeds amortization, schedule ends when the loan is retired"
        );
    }

    let mut balance = terms.principal;
    let mut rows = Vec::with_capacity(periods_to_list.min(amortization_periods) as usize);

    for period in 1..=periods_to_list {
        let interest = balance * rate;
        let mut principal_portion = payment - interest;
        let mut effective_payment = payment;

        // Final period: pay off exactly what is left instead of overpaying.
        if principal_portion > balance {
            principal_portion = balance;
            effective_payment = interest + principal_portion;
        }

        balance -= principal_portion;
        if balance.abs() < BALANCE_DUST {
            balance = Decimal::ZERO;
        }

        let row = if round_to_cents {
            ScheduleRow::new(
                period,
                effective_payment.round_dp(2),
                interest.round_dp(2),
                principal_portion.round_dp(2),
                balance.round_dp(2),
            )
        } else {
            ScheduleRow::new(period, effective_payment, interest, principal_portion, balance)
        };
        rows.push(row);

        if balance <= Decimal::ZERO {
            break;
        }
    }

    if rows.len() == periods_to_list as usize {
        if let Some(last) = rows.last_mut() {
            if last.balance_end > Decimal::ZERO {
                *last = last.with_balloon(last.balance_end);
            }
        }
    }

    debug!(
        periods_requested = periods_to_list,
        periods_listed = rows.len(),
        payment = %payment,
        balloon_due = %rows.last().map(|r| r.balloon_due).unwrap_or_default(),
        "built amortization schedule"
    );

    Ok(AmortizationSchedule {
        terms: terms.clone(),
        round_to_cents,
        payment,
        rows,
    })
}
