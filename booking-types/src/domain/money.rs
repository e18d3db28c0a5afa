//! Type-safe monetary value with embedded currency.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::error::DomainError;

/// Currencies the payment provider is asked to charge in. Consultation fees
/// are always rupees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    INR,
}

impl Currency {
    /// Number of minor units (paise) in one major unit.
    pub fn minor_units_per_major(&self) -> i64 {
        match self {
            Currency::INR => 100,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl FromStr for Currency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "INR" => Ok(Currency::INR),
            other => Err(DomainError::ValidationError(format!(
                "Unsupported currency: {}",
                other
            ))),
        }
    }
}

/// Money in the smallest unit of its currency (paise for INR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: i64,
    currency: Currency,
}

impl Money {
    /// Creates a new Money value from minor units.
    pub fn new(amount: i64, currency: Currency) -> Result<Self, DomainError> {
        if amount <= 0 {
            return Err(DomainError::InvalidAmount(format!(
                "{} must be positive",
                amount
            )));
        }
        Ok(Self { amount, currency })
    }

    /// Converts an amount in major units (rupees) to minor units.
    ///
    /// `500` rupees becomes `50000` paise. Fractional input is rounded to the
    /// nearest minor unit.
    pub fn from_major(amount: f64, currency: Currency) -> Result<Self, DomainError> {
        if amount == 0.0 {
            return Err(DomainError::MissingAmount);
        }
        if !amount.is_finite() || amount < 0.0 {
            return Err(DomainError::InvalidAmount(amount.to_string()));
        }

        let minor = (amount * currency.minor_units_per_major() as f64).round();
        if minor > i64::MAX as f64 || minor < 1.0 {
            return Err(DomainError::InvalidAmount(amount.to_string()));
        }
        Self::new(minor as i64, currency)
    }

    /// Returns the amount in smallest currency unit.
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// Returns the currency.
    pub fn currency(&self) -> Currency {
        self.currency
    }
}
