//! Two-slot selection used to compare any two records.
//!
//! Slot A holds the baseline and slot B the record compared against it.
//! Picking records cycles `Empty -> OneSelected -> TwoSelected`, and a pick
//! made after a complete pair starts over.
//!
//! # Deleted Records
//!
//! [`Selection::on_record_deleted`] clears each slot that references the
//! deleted id, independently. Deleting the slot-A record while two are
//! selected therefore leaves only slot B filled ([`SelectionState::SecondOnly`]).
//! The next pick fills slot A again, unless it is the slot-B record itself,
//! in which case the pick restarts with that record alone.

use crate::comparison::{compare, Comparison};
use crate::record::{RecordId, SettlementRecord};

/// Read-only view of the selection slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState<'a> {
    Empty,
    OneSelected(&'a SettlementRecord),
    TwoSelected(&'a SettlementRecord, &'a SettlementRecord),
    /// Slot A was cleared by a delete while slot B was filled.
    SecondOnly(&'a SettlementRecord),
}

/// The pair of records picked for comparison. Not persisted.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    slot_a: Option<SettlementRecord>,
    slot_b: Option<SettlementRecord>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SelectionState<'_> {
        match (&self.slot_a, &self.slot_b) {
            (None, None) => SelectionState::Empty,
            (Some(a), None) => SelectionState::OneSelected(a),
            (Some(a), Some(b)) => SelectionState::TwoSelected(a, b),
            (None, Some(b)) => SelectionState::SecondOnly(b),
        }
    }

    pub fn slot_a(&self) -> Option<&SettlementRecord> {
        self.slot_a.as_ref()
    }

    pub fn slot_b(&self) -> Option<&SettlementRecord> {
        self.slot_b.as_ref()
    }

    /// Picks `record` for comparison.
    pub fn select(&mut self, record: &SettlementRecord) {
        let held_a = self.slot_a.as_ref().map(|r| r.id);
        let held_b = self.slot_b.as_ref().map(|r| r.id);

        match (held_a, held_b) {
            (None, Some(b)) if b != record.id => {
                self.slot_a = Some(record.clone());
            }
            (Some(a), None) if a != record.id => {
                self.slot_b = Some(record.clone());
            }
            _ => {
                self.slot_a = Some(record.clone());
                self.slot_b = None;
            }
        }
    }

    /// Clears both slots.
    pub fn reset(&mut self) {
        self.slot_a = None;
        self.slot_b = None;
    }

    /// Clears every slot that references `id`.
    pub fn on_record_deleted(&mut self, id: RecordId) {
        if self.slot_a.as_ref().is_some_and(|r| r.id == id) {
            self.slot_a = None;
        }
        if self.slot_b.as_ref().is_some_and(|r| r.id == id) {
            self.slot_b = None;
        }
    }

    /// Refreshes any slot holding an older copy of `record`.
    pub fn on_record_updated(&mut self, record: &SettlementRecord) {
        for slot in [&mut self.slot_a, &mut self.slot_b] {
            if let Some(held) = slot {
                if held.id == record.id {
                    *held = record.clone();
                }
            }
        }
    }

    /// Returns `true` if either slot holds record `id`.
    pub fn is_selected(&self, id: RecordId) -> bool {
        [&self.slot_a, &self.slot_b]
            .into_iter()
            .flatten()
            .any(|r| r.id == id)
    }

    /// Slot B compared against slot A, regardless of their dates.
    ///
    /// Only available when both slots are filled.
    pub fn comparison(&self) -> Option<Comparison> {
        match self.state() {
            SelectionState::TwoSelected(a, b) => compare(b, Some(a)),
            _ => None,
        }
    }
}
