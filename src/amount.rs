//! Fixed-point monetary amounts and percentage changes.
//!
//! Costs are held as `rust_decimal` values rescaled to 4 decimal places so
//! that differences between periods are exact. Parsed costs are bounded by
//! [`Amount::LIMIT`], which keeps every difference and percentage of two
//! costs well inside `Decimal`'s range.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Sub;
use std::str::FromStr;

/// A settlement cost (or difference of costs) with exactly 4 decimal places.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use settlement_tracker::Amount;
///
/// let cost = Amount::from_str("1250.5").unwrap();
/// assert_eq!(cost.to_string(), "1250.5000");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Amount(Decimal);

impl Amount {
    /// The number of decimal places to maintain.
    pub const SCALE: u32 = 4;

    /// Zero value.
    pub const ZERO: Self = Amount(Decimal::ZERO);

    /// Parsed amounts must satisfy `|amount| < LIMIT` (10^15).
    pub const LIMIT: i64 = 1_000_000_000_000_000;

    /// Normalizes to 4 decimal places.
    fn new(value: Decimal) -> Self {
        let mut normalized = value;
        normalized.rescale(Self::SCALE);
        Amount(normalized)
    }

    /// Percentage change of `self` relative to `baseline`.
    ///
    /// `None` when the baseline is zero, or when the percentage does not fit
    /// in a `Decimal` (not reachable for two bounded amounts).
    pub fn percent_of(self, baseline: Amount) -> Option<Percent> {
        Percent::change(self.0, baseline.0)
    }
}

impl FromStr for Amount {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        let decimal = Decimal::from_str(trimmed)?;
        if decimal >= Decimal::from(Self::LIMIT) {
            return Err(rust_decimal::Error::ExceedsMaximumPossibleValue);
        }
        if decimal <= -Decimal::from(Self::LIMIT) {
            return Err(rust_decimal::Error::LessThanMinimumPossibleValue);
        }
        Ok(Amount::new(decimal))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

/// Saturates at `Decimal`'s bounds; exact for any two parsed amounts.
impl Sub for Amount {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Amount::new(self.0.saturating_sub(rhs.0))
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// A percentage change, e.g. `20` for +20%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Percent(Decimal);

impl Percent {
    /// `diff / baseline * 100`.
    ///
    /// `None` if `baseline` is zero or the result overflows `Decimal`.
    pub fn change(diff: Decimal, baseline: Decimal) -> Option<Percent> {
        let ratio = diff.checked_div(baseline)?;
        let mut pct = ratio.checked_mul(Decimal::ONE_HUNDRED)?;
        pct.rescale(Amount::SCALE);
        Some(Percent(pct))
    }

    /// Returns the percentage as a decimal (`20` means 20%).
    pub fn value(&self) -> Decimal {
        self.0
    }
}

/// Displays with one decimal place, the precision shown for period changes.
impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}
