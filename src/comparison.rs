//! Period-over-period comparison of settlement records.
//!
//! # Zero Baseline
//!
//! A percentage change against a zero baseline is undefined. Such
//! percentages are `None`; the absolute diff is still reported. The same rule
//! applies to quantities, so `quantity_diff: Some(_)` with
//! `quantity_change_percent: None` means "baseline quantity was zero", while
//! both `None` means "quantity not tracked on one of the records".
//!
//! Two extreme quantities whose difference does not fit in an `i64` are also
//! treated as not comparable: both quantity fields are `None`. Costs are
//! bounded when parsed, so cost percentages are only ever `None` for a zero
//! baseline.

use crate::amount::{Amount, Percent};
use crate::record::SettlementRecord;
use rust_decimal::Decimal;

/// Deltas between a record and its baseline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    /// The baseline record the current one was compared against.
    pub previous: SettlementRecord,

    /// `current.cost - previous.cost`.
    pub cost_diff: Amount,

    /// `cost_diff / previous.cost * 100`; `None` if `previous.cost` is zero.
    pub cost_change_percent: Option<Percent>,

    /// `current.quantity - previous.quantity`, when both are tracked and the
    /// difference fits in an `i64`.
    pub quantity_diff: Option<i64>,

    /// `quantity_diff / previous.quantity * 100`; `None` if `quantity_diff`
    /// is `None` or the baseline quantity is zero.
    pub quantity_change_percent: Option<Percent>,
}

impl Comparison {
    pub fn cost_direction(&self) -> Direction {
        Direction::classify(self.cost_diff)
    }

    /// `None` when quantity comparison does not apply.
    pub fn quantity_direction(&self) -> Option<Direction> {
        self.quantity_diff.map(Direction::classify)
    }
}

/// Sign of a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increase,
    Decrease,
    Unchanged,
}

impl Direction {
    /// Classifies a diff by its sign relative to the type's default (zero).
    pub fn classify<T: PartialOrd + Default>(diff: T) -> Self {
        let zero = T::default();
        if diff > zero {
            Direction::Increase
        } else if diff < zero {
            Direction::Decrease
        } else {
            Direction::Unchanged
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Increase => "increase",
            Direction::Decrease => "decrease",
            Direction::Unchanged => "unchanged",
        }
    }
}

/// Compares `current` against `previous`.
///
/// Returns `None` if there is no baseline.
pub fn compare(current: &SettlementRecord, previous: Option<&SettlementRecord>) -> Option<Comparison> {
    let previous = previous?;

    let cost_diff = current.cost - previous.cost;
    let cost_change_percent = cost_diff.percent_of(previous.cost);

    let quantity_diff = match (current.quantity, previous.quantity) {
        (Some(cur), Some(prev)) => cur.checked_sub(prev).map(|diff| (diff, prev)),
        _ => None,
    };
    let quantity_change_percent = quantity_diff
        .and_then(|(diff, prev)| Percent::change(Decimal::from(diff), Decimal::from(prev)));
    let quantity_diff = quantity_diff.map(|(diff, _)| diff);

    Some(Comparison {
        previous: previous.clone(),
        cost_diff,
        cost_change_percent,
        quantity_diff,
        quantity_change_percent,
    })
}

/// A record paired with its comparison against the chronologically
/// preceding record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowComparison {
    pub record: SettlementRecord,
    pub comparison: Option<Comparison>,
}

/// Compares each record in a date-ordered collection with the record just
/// before it. The first record has no baseline.
pub fn adjacent_comparisons(records: &[SettlementRecord]) -> Vec<RowComparison> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let previous = i.checked_sub(1).and_then(|p| records.get(p));
            RowComparison {
                record: record.clone(),
                comparison: compare(record, previous),
            }
        })
        .collect()
}
