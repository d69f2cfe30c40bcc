//! Settlement record model and input validation.
//!
//! Raw user input arrives as strings ([`RecordInput`]) and is parsed exactly
//! once into typed [`RecordFields`]; business logic never sees the strings.

use crate::amount::Amount;
use crate::error::{Result, StoreError};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Unique record identifier, assigned by the store at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim().parse().map(RecordId)
    }
}

/// A calendar date in `YYYY-MM-DD` form.
///
/// Ordering matches the lexicographic order of the textual form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeriodDate(NaiveDate);

impl PeriodDate {
    pub const FORMAT: &'static str = "%Y-%m-%d";
}

impl FromStr for PeriodDate {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), Self::FORMAT).map(PeriodDate)
    }
}

impl fmt::Display for PeriodDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

impl Serialize for PeriodDate {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PeriodDate {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PeriodDate::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// One settlement period: a cost, and optionally a quantity, over a date range.
///
/// # Invariants
///
/// - `start_date <= end_date`, checked when the record is created or updated
/// - `id` never changes after creation
///
/// `quantity == None` means the quantity was not tracked for this period,
/// which is distinct from `Some(0)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRecord {
    pub id: RecordId,
    pub start_date: PeriodDate,
    pub end_date: PeriodDate,
    pub cost: Amount,
    pub quantity: Option<i64>,
}

impl SettlementRecord {
    /// Builds a record from already-validated fields.
    pub fn new(id: RecordId, fields: RecordFields) -> Self {
        SettlementRecord {
            id,
            start_date: fields.start_date,
            end_date: fields.end_date,
            cost: fields.cost,
            quantity: fields.quantity,
        }
    }

    /// Replaces every field except `id`.
    pub fn replace(&mut self, fields: RecordFields) {
        *self = SettlementRecord::new(self.id, fields);
    }

    /// Returns `true` if the period covers a single day.
    pub fn is_single_day(&self) -> bool {
        self.start_date == self.end_date
    }
}

/// Validated, typed fields of a record, without an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFields {
    pub start_date: PeriodDate,
    pub end_date: PeriodDate,
    pub cost: Amount,
    pub quantity: Option<i64>,
}

/// Raw record input as entered by the user.
///
/// Required fields are `start_date`, `end_date` and `cost`. An empty or
/// missing `quantity` means "not tracked".
#[derive(Debug, Clone, Default)]
pub struct RecordInput {
    pub start_date: String,
    pub end_date: String,
    pub cost: String,
    pub quantity: Option<String>,
}

impl RecordInput {
    pub fn new(
        start_date: impl Into<String>,
        end_date: impl Into<String>,
        cost: impl Into<String>,
    ) -> Self {
        RecordInput {
            start_date: start_date.into(),
            end_date: end_date.into(),
            cost: cost.into(),
            quantity: None,
        }
    }

    pub fn with_quantity(mut self, quantity: impl Into<String>) -> Self {
        self.quantity = Some(quantity.into());
        self
    }

    /// Validates the input and parses it into typed fields.
    ///
    /// Checks run in order: required fields, date format, date range, then
    /// numeric fields.
    pub fn parse(&self) -> Result<RecordFields> {
        let start = required("start_date", &self.start_date)?;
        let end = required("end_date", &self.end_date)?;
        let cost = required("cost", &self.cost)?;

        let start_date = parse_date("start_date", start)?;
        let end_date = parse_date("end_date", end)?;
        if start_date > end_date {
            return Err(StoreError::InvalidRange {
                start: start_date.to_string(),
                end: end_date.to_string(),
            });
        }

        let cost = Amount::from_str(cost).map_err(|_| StoreError::InvalidNumber {
            field: "cost",
            value: cost.to_string(),
        })?;

        let quantity = match self.quantity.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<i64>().map_err(|_| StoreError::InvalidNumber {
                field: "quantity",
                value: raw.to_string(),
            })?),
        };

        Ok(RecordFields {
            start_date,
            end_date,
            cost,
            quantity,
        })
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StoreError::MissingField { field });
    }
    Ok(trimmed)
}

fn parse_date(field: &'static str, value: &str) -> Result<PeriodDate> {
    PeriodDate::from_str(value).map_err(|_| StoreError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_input() {
        let fields = RecordInput::new("2024-01-01", "2024-01-10", "100")
            .with_quantity("5")
            .parse()
            .unwrap();

        assert_eq!(fields.start_date.to_string(), "2024-01-01");
        assert_eq!(fields.end_date.to_string(), "2024-01-10");
        assert_eq!(fields.cost.to_string(), "100.0000");
        assert_eq!(fields.quantity, Some(5));
    }

    #[test]
    fn test_parse_handles_whitespace_and_blank_quantity() {
        let fields = RecordInput::new(" 2024-01-01 ", "2024-01-01", " 99.5 ")
            .with_quantity("   ")
            .parse()
            .unwrap();

        assert_eq!(fields.cost.to_string(), "99.5000");
        assert_eq!(fields.quantity, None);
    }

    #[test]
    fn test_parse_rejects_missing_fields_in_order() {
        let err = RecordInput::new("", "2024-01-10", "100").parse().unwrap_err();
        assert!(matches!(err, StoreError::MissingField { field: "start_date" }));

        let err = RecordInput::new("2024-01-01", "", "").parse().unwrap_err();
        assert!(matches!(err, StoreError::MissingField { field: "end_date" }));

        let err = RecordInput::new("2024-01-01", "2024-01-10", " ").parse().unwrap_err();
        assert!(matches!(err, StoreError::MissingField { field: "cost" }));
    }

    #[test]
    fn test_parse_rejects_inverted_range() {
        let err = RecordInput::new("2024-02-01", "2024-01-01", "100")
            .parse()
            .unwrap_err();
        match err {
            StoreError::InvalidRange { start, end } => {
                assert_eq!(start, "2024-02-01");
                assert_eq!(end, "2024-01-01");
            }
            other => panic!("Expected InvalidRange, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_malformed_date() {
        let err = RecordInput::new("2024/01/01", "2024-01-10", "100")
            .parse()
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidDate { field: "start_date", .. }));

        let err = RecordInput::new("2024-01-01", "2024-13-01", "100")
            .parse()
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidDate { field: "end_date", .. }));
    }

    #[test]
    fn test_parse_rejects_bad_numbers() {
        let err = RecordInput::new("2024-01-01", "2024-01-10", "ten")
            .parse()
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidNumber { field: "cost", .. }));

        let err = RecordInput::new("2024-01-01", "2024-01-10", "10")
            .with_quantity("2.5")
            .parse()
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidNumber { field: "quantity", .. }));
    }

    #[test]
    fn test_negative_cost_is_accepted() {
        let fields = RecordInput::new("2024-01-01", "2024-01-10", "-15")
            .parse()
            .unwrap();
        assert_eq!(fields.cost.to_string(), "-15.0000");
    }

    #[test]
    fn test_out_of_range_cost_is_rejected() {
        let err = RecordInput::new("2024-01-01", "2024-01-10", "-79228162514264337593543950335")
            .parse()
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidNumber { field: "cost", .. }));
        assert!(err.is_validation());
    }

    #[test]
    fn test_date_order_matches_text_order() {
        let a = PeriodDate::from_str("2023-12-31").unwrap();
        let b = PeriodDate::from_str("2024-01-01").unwrap();
        assert!(a < b);
        assert!(a.to_string() < b.to_string());
    }

    #[test]
    fn test_replace_keeps_id() {
        let fields = RecordInput::new("2024-01-01", "2024-01-01", "10")
            .with_quantity("3")
            .parse()
            .unwrap();
        let mut record = SettlementRecord::new(RecordId(7), fields);
        assert!(record.is_single_day());

        let replacement = RecordInput::new("2024-03-01", "2024-03-31", "20")
            .parse()
            .unwrap();
        record.replace(replacement);

        assert_eq!(record.id, RecordId(7));
        assert_eq!(record.quantity, None);
        assert!(!record.is_single_day());
    }
}
