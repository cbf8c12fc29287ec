//! Calculator defaults, optionally loaded from a TOML file.

use std::path::Path;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schedule::LoanTerms;

/// Default inputs of the schedule calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorConfig {
    /// Amount borrowed
    #[serde(default = "default_principal")]
    pub principal: Decimal,

    /// Annual rate in percent (5.4 for 5.4%)
    #[serde(default = "default_rate_percent")]
    pub annual_rate_percent: Decimal,

    /// Amortization term in months
    #[serde(default = "default_amortization_months")]
    pub amortization_months: u32,

    /// Maturity term in months
    #[serde(default = "default_maturity_months")]
    pub maturity_months: u32,

    /// Payments per year (12 monthly, 24 semi-monthly, 26 biweekly, 52 weekly)
    #[serde(default = "default_payments_per_year")]
    pub payments_per_year: u32,

    /// Round every amount to cents
    #[serde(default = "default_true")]
    pub round_to_cents: bool,
}

fn default_principal() -> Decimal {
    dec!(200000)
}

fn default_rate_percent() -> Decimal {
    dec!(5.4)
}

fn default_amortization_months() -> u32 {
    240
}

fn default_maturity_months() -> u32 {
    60
}

fn default_payments_per_year() -> u32 {
    12
}

fn default_true() -> bool {
    true
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            principal: default_principal(),
            annual_rate_percent: default_rate_percent(),
            amortization_months: default_amortization_months(),
            maturity_months: default_maturity_months(),
            payments_per_year: default_payments_per_year(),
            round_to_cents: true,
        }
    }
}

impl CalculatorConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn loan_terms(&self) -> LoanTerms {
        LoanTerms::from_months(
            self.principal,
            self.annual_rate_percent,
            self.amortization_months,
            self.maturity_months,
            self.payments_per_year,
        )
    }
}
