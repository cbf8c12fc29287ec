use amortization_table::{
    AmortizationError, CalculatorConfig, LoanTerms, build_schedule, compute_payment, periods_for,
    to_csv_string,
};
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn loan(
    principal: Decimal,
    rate: Decimal,
    amortization_years: Decimal,
    maturity_years: Decimal,
    payments_per_year: u32,
) -> LoanTerms {
    LoanTerms {
        principal,
        annual_rate: rate,
        amortization_years,
        maturity_years,
        payments_per_year,
    }
}

#[rstest]
#[case(dec!(250000), dec!(0.065), dec!(30), 12)]
#[case(dec!(10000), dec!(0.05), dec!(1), 26)]
#[case(dec!(75000), dec!(0), dec!(7), 52)]
#[case(dec!(1000), dec!(0.10), dec!(3), 1)]
#[case(dec!(48000), dec!(0.0399), dec!(4), 24)]
fn test_full_term_loans_end_at_zero_without_balloon(
    #[case] principal: Decimal,
    #[case] rate: Decimal,
    #[case] years: Decimal,
    #[case] per_year: u32,
    #[values(true, false)] round_to_cents: bool,
) {
    let schedule = build_schedule(&loan(principal, rate, years, years, per_year), round_to_cents).unwrap();

    assert!(schedule.final_balance().abs() <= dec!(0.01));
    assert!(schedule.rows.iter().all(|r| r.balloon_due.is_zero()));
    assert_eq!(schedule.row_count() as u32, periods_for("term", years, per_year).unwrap());
}

#[rstest]
#[case(dec!(200000), dec!(0.054), dec!(20), dec!(5), 12)]
#[case(dec!(500000), dec!(0.07), dec!(25), dec!(10), 4)]
#[case(dec!(90000), dec!(0), dec!(15), dec!(2), 26)]
fn test_short_maturity_leaves_a_balloon_on_the_last_row_only(
    #[case] principal: Decimal,
    #[case] rate: Decimal,
    #[case] amortization: Decimal,
    #[case] maturity: Decimal,
    #[case] per_year: u32,
) {
    let schedule = build_schedule(&loan(principal, rate, amortization, maturity, per_year), true).unwrap();
    let (last, earlier) = schedule.rows.split_last().unwrap();

    assert_eq!(schedule.row_count() as u32, periods_for("term", maturity, per_year).unwrap());
    assert!(last.balance_end > Decimal::ZERO);
    assert_eq!(last.balloon_due, last.balance_end);
    assert!(earlier.iter().all(|r| r.balloon_due.is_zero()));
}

#[test]
fn test_balloon_scenario_from_dashboard_defaults() {
    let terms = CalculatorConfig::default().loan_terms();
    let schedule = build_schedule(&terms, true).unwrap();
    let summary = schedule.summary();

    assert_eq!(summary.payment, dec!(1364.50));
    assert_eq!(summary.periods_listed, 60);
    assert!(summary.balloon_at_maturity > dec!(168000) && summary.balloon_at_maturity < dec!(168200));
    // interest to maturity is what was paid minus what came off the principal
    let principal_paid: Decimal = schedule.rows.iter().map(|r| r.principal).sum();
    let expected_interest = schedule.total_paid() - principal_paid;
    assert!((summary.interest_to_maturity - expected_interest).abs() <= dec!(0.01) * dec!(60));
}

#[test]
fn test_zero_rate_scenario() {
    let schedule = build_schedule(&loan(dec!(100000), dec!(0), dec!(10), dec!(10), 12), true).unwrap();

    assert_eq!(schedule.payment.round_dp(2), dec!(833.33));
    assert_eq!(schedule.row_count(), 120);
    assert_eq!(schedule.final_balance(), dec!(0.00));
    assert_eq!(schedule.balloon_due(), Decimal::ZERO);
}

#[test]
fn test_zero_rate_principal_sums_to_loan_within_a_cent_per_row() {
    let schedule = build_schedule(&loan(dec!(12345.67), dec!(0), dec!(3), dec!(3), 12), true).unwrap();
    let principal_paid: Decimal = schedule.rows.iter().map(|r| r.principal).sum();
    let tolerance = dec!(0.01) * Decimal::from(schedule.row_count() as u32);

    assert!((principal_paid - dec!(12345.67)).abs() <= tolerance);
}

#[test]
fn test_long_maturity_stops_once_the_loan_is_retired() {
    let schedule = build_schedule(&loan(dec!(24000), dec!(0.08), dec!(2), dec!(10), 12), true).unwrap();

    assert_eq!(schedule.row_count(), 24);
    assert_eq!(schedule.final_balance(), dec!(0.00));
    assert!(!schedule.has_balloon());
}

#[test]
fn test_schedules_are_reproducible() {
    let terms = loan(dec!(310000), dec!(0.0475), dec!(25), dec!(7), 26);
    let first = build_schedule(&terms, false).unwrap();
    let second = build_schedule(&terms, false).unwrap();
    assert_eq!(first, second);
    assert_eq!(to_csv_string(&first.rows).unwrap(), to_csv_string(&second.rows).unwrap());
}

#[test]
fn test_payment_uses_amortization_term_not_maturity() {
    let terms = loan(dec!(200000), dec!(0.054), dec!(20), dec!(5), 12);
    let schedule = build_schedule(&terms, false).unwrap();
    let over_amortization = compute_payment(dec!(200000), dec!(0.054), dec!(20), 12).unwrap();
    let over_maturity = compute_payment(dec!(200000), dec!(0.054), dec!(5), 12).unwrap();

    assert_eq!(schedule.payment, over_amortization);
    assert!(schedule.payment < over_maturity);
}

#[test]
fn test_errors_carry_readable_messages() {
    let err = build_schedule(&loan(dec!(1000), dec!(0.05), dec!(10), dec!(0), 12), true).unwrap_err();
    assert!(matches!(err, AmortizationError::InvalidTerm { field: "Maturity term", .. }));
    assert!(err.to_string().starts_with("Maturity term must be > 0"));

    let err = build_schedule(&loan(dec!(1000), dec!(-0.05), dec!(10), dec!(10), 12), true).unwrap_err();
    assert!(err.to_string().contains("must be >= 0"));
}

#[test]
fn test_bundled_config_matches_built_in_defaults() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/amort.toml");
    assert_eq!(CalculatorConfig::from_file(path).unwrap(), CalculatorConfig::default());
}
