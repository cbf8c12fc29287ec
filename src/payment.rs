//! Fixed periodic payment of a fully amortizing loan.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::error::{AmortizationError, Result};

/// Annual rates at or below this magnitude are treated as interest free.
pub const ZERO_RATE_TOLERANCE: Decimal = dec!(0.000000000000001);

/// Resolves a term in years to a whole number of payment periods.
///
/// The product `years * payments_per_year` is rounded half-to-even. A term that resolves
/// to zero (or fewer) periods is rejected with [`AmortizationError::InvalidTerm`].
pub fn periods_for(field: &'static str, years: Decimal, payments_per_year: u32) -> Result<u32> {
    let periods = years
        .checked_mul(Decimal::from(payments_per_year))
        .map(|p| p.round());
    match periods.and_then(|p| p.to_u32()) {
        Some(n) if n > 0 => Ok(n),
        _ => Err(AmortizationError::term(field, years)),
    }
}

/// Calculates the fixed payment that retires `principal` over the amortization term.
///
/// The annuity formula is: PMT = P * r / (1 - (1 + r)^-n), evaluated here as
/// P * r * (1 + r)^n / ((1 + r)^n - 1). A zero rate degrades to straight-line P / n.
///
/// # Arguments
///
/// * `principal` - The amount borrowed.
/// * `annual_rate` - The nominal annual rate as a decimal fraction (0.054 for 5.4%).
/// * `amortization_years` - The term over which the loan would be fully repaid.
/// * `payments_per_year` - Number of payments in a year (12 for monthly).
///
/// # Errors
///
/// Returns an error if the amortization term resolves to zero periods, if the rate is
/// negative, or if the growth factor overflows.
pub fn compute_payment(
    principal: Decimal,
    annual_rate: Decimal,
    amortization_years: Decimal,
    payments_per_year: u32,
) -> Result<Decimal> {
    let n = periods_for("Amortization term", amortization_years, payments_per_year)?;
    if annual_rate.abs() <= ZERO_RATE_TOLERANCE {
        return Ok(principal / Decimal::from(n));
    }
    if annual_rate < Decimal::ZERO {
        return Err(AmortizationError::InvalidRate(annual_rate));
    }

    let periodic_rate = annual_rate / Decimal::from(payments_per_year);
    let growth = (Decimal::ONE + periodic_rate)
        .checked_powu(n.into())
        .ok_or(AmortizationError::Overflow("payment growth factor"))?;

    principal
        .checked_mul(periodic_rate)
        .and_then(|v| v.checked_mul(growth))
        .and_then(|v| v.checked_div(growth - Decimal::ONE))
        .ok_or(AmortizationError::Overflow("periodic payment"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_monthly_payment_on_twenty_year_loan() {
        let payment = compute_payment(dec!(200000), dec!(0.054), dec!(20), 12).unwrap();
        assert_eq!(payment.round_dp(2), dec!(1364.50));
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let payment = compute_payment(dec!(100000), dec!(0), dec!(10), 12).unwrap();
        assert_eq!(payment, dec!(100000) / dec!(120));
        assert_eq!(payment.round_dp(2), dec!(833.33));
    }

    #[test]
    fn test_rate_below_tolerance_counts_as_zero() {
        let payment = compute_payment(dec!(1200), dec!(0.0000000000000001), dec!(1), 12).unwrap();
        assert_eq!(payment, dec!(100));
    }

    #[rstest]
    #[case(dec!(12000), dec!(0.12), dec!(1), 12, dec!(1066.19))]
    #[case(dec!(100000), dec!(0.06), dec!(30), 12, dec!(599.55))]
    #[case(dec!(10000), dec!(0.05), dec!(1), 26, dec!(394.68))]
    #[case(dec!(1000), dec!(0.10), dec!(1), 1, dec!(1100.00))]
    fn test_known_payments(
        #[case] principal: Decimal,
        #[case] rate: Decimal,
        #[case] years: Decimal,
        #[case] per_year: u32,
        #[case] expected: Decimal,
    ) {
        let payment = compute_payment(principal, rate, years, per_year).unwrap();
        assert_eq!(payment.round_dp(2), expected);
    }

    #[rstest]
    #[case(dec!(0))]
    #[case(dec!(-5))]
    #[case(dec!(0.04))]
    fn test_term_resolving_to_zero_periods_is_rejected(#[case] years: Decimal) {
        let err = compute_payment(dec!(1000), dec!(0.05), years, 12).unwrap_err();
        assert!(matches!(err, AmortizationError::InvalidTerm { .. }));
    }

    #[test]
    fn test_zero_payments_per_year_is_rejected() {
        let err = compute_payment(dec!(1000), dec!(0.05), dec!(10), 0).unwrap_err();
        assert!(matches!(err, AmortizationError::InvalidTerm { .. }));
    }

    #[test]
    fn test_negative_rate_is_rejected() {
        let err = compute_payment(dec!(1000), dec!(-0.01), dec!(1), 12).unwrap_err();
        assert!(matches!(err, AmortizationError::InvalidRate(_)));
    }

    #[test]
    fn test_periods_round_half_to_even() {
        // 2.5 periods rounds down to 2, 3.5 rounds up to 4
        assert_eq!(periods_for("term", dec!(2.5), 1).unwrap(), 2);
        assert_eq!(periods_for("term", dec!(3.5), 1).unwrap(), 4);
        assert_eq!(periods_for("term", dec!(1.5), 12).unwrap(), 18);
    }

    #[rstest]
    #[case(Decimal::MAX)]
    #[case(Decimal::MIN)]
    #[case(dec!(1000000000))]
    fn test_out_of_range_term_is_rejected(#[case] years: Decimal) {
        let err = periods_for("Amortization term", years, 52).unwrap_err();
        assert!(matches!(err, AmortizationError::InvalidTerm { .. }));
    }
}
