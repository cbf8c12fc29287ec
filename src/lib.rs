//! `amortization_table` is a Rust library for building loan amortization schedules,
//! including loans whose maturity comes before the end of their amortization.
//!
//! It provides:
//! - **Payment calculation**: the fixed periodic payment that fully retires a loan over its
//!   amortization term (straight-line when the rate is zero).
//! - **Schedule building**: a period-by-period table of payment, interest, principal and
//!   remaining balance, listed through maturity. When maturity is shorter than the
//!   amortization, the balance left on the last row is flagged as the **balloon** due.
//! - **CSV export** of the schedule.
//! - **Rate curves**: a shape-preserving (PCHIP) interpolator that fills in rates between
//!   sparse known points.
//!
//! ## Usage
//!
//! Add `amortization_table` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! amortization_table = "0.4.0"
//! rust_decimal = "1.39.0"
//! rust_decimal_macros = "1.39.0"
//! ```
//!
//! Then build a schedule from `LoanTerms`:
//!
//! ```rust
//! use amortization_table::{build_schedule, LoanTerms};
//! use rust_decimal_macros::dec;
//!
//! fn main() {
//!     // 200,000 at 5.4%, amortized over 240 months, called after 60
//!     let terms = LoanTerms::from_months(dec!(200_000), dec!(5.4), 240, 60, 12);
//!
//!     match build_schedule(&terms, true) {
//!         Ok(schedule) => {
//!             println!("Payment:        {:.2}", schedule.payment);
//!             println!("Interest paid:  {:.2}", schedule.total_interest());
//!             println!("Balloon due:    {:.2}", schedule.balloon_due());
//!             println!("Periods listed: {}", schedule.row_count());
//!         }
//!         Err(e) => {
//!             eprintln!("Error building schedule: {}", e);
//!         }
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod interpolation;
pub mod payment;
pub mod schedule;

pub use config::CalculatorConfig;
pub use error::{AmortizationError, Result};
pub use export::{to_csv_string, write_csv};
pub use interpolation::{RateCurve, RatePoint, interpolate_range, write_rates_csv};
pub use payment::{compute_payment, periods_for};
pub use schedule::{AmortizationSchedule, LoanTerms, ScheduleRow, ScheduleSummary, build_schedule};
