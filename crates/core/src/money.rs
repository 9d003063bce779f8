use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;
use std::str::FromStr;

/// Largest magnitude accepted for a single ledger amount. Far below
/// `Decimal::MAX`, so summing any realistic number of rows cannot overflow.
const AMOUNT_LIMIT: i64 = 1_000_000_000_000_000;

/// A non-currency-aware decimal amount. The currency symbol is display-only.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn abs(self) -> Self {
        Money(self.0.abs())
    }

    /// True when the magnitude reaches 10^15.
    pub fn exceeds_limit(self) -> bool {
        self.0.abs() >= Decimal::from(AMOUNT_LIMIT)
    }

    /// Rounds to two decimal places, midpoints away from zero.
    pub fn round_cents(self) -> Self {
        Money(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Adds `rhs` and rounds the running total to cents immediately.
    pub fn add_rounded(self, rhs: Money) -> Self {
        (self + rhs).round_cents()
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    /// Accepts plain decimals ("-35.30") and scientific notation ("1.2e3").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Decimal::from_str(s)
            .or_else(|_| Decimal::from_scientific(s))
            .map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}
