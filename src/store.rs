//! The authoritative, date-ordered settlement record collection.
//!
//! Every mutator validates first and only then touches the collection, so a
//! rejected call leaves it exactly as it was. Successful mutations are saved
//! through the repository; a failed save does not roll back the mutation.

use crate::error::{Result, StoreError};
use crate::record::{RecordId, RecordInput, SettlementRecord};
use crate::repository::RecordRepository;
use log::{debug, warn};
use std::collections::HashSet;

/// Owns the settlement records for one session.
///
/// # Invariants
///
/// - Records are always ordered ascending by `start_date`; ties keep
///   insertion order
/// - No two records share an id
/// - Ids are never reissued, including across reloads
pub struct RecordStore<R: RecordRepository> {
    records: Vec<SettlementRecord>,
    /// `None` once `u64::MAX` has been issued or loaded.
    next_id: Option<u64>,
    repository: R,
    last_save_error: Option<StoreError>,
}

impl<R: RecordRepository> RecordStore<R> {
    /// Opens a store over `repository`, loading whatever it holds.
    pub fn open(mut repository: R) -> Result<Self> {
        let loaded = repository.load()?;
        let mut store = RecordStore {
            records: Vec::new(),
            next_id: Some(1),
            repository,
            last_save_error: None,
        };
        store.install(loaded)?;
        debug!("Loaded {} records", store.records.len());
        Ok(store)
    }

    /// Current records, ascending by start date.
    pub fn list(&self) -> Vec<SettlementRecord> {
        self.records.clone()
    }

    /// Borrowed view of the current records, ascending by start date.
    pub fn records(&self) -> &[SettlementRecord] {
        &self.records
    }

    /// Looks up a record by id.
    pub fn get(&self, id: RecordId) -> Option<&SettlementRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Adds a new record and returns the re-sorted collection.
    ///
    /// Fails with `IdSpaceExhausted`, leaving the collection unchanged, once
    /// the largest possible id is taken.
    pub fn add(&mut self, input: &RecordInput) -> Result<Vec<SettlementRecord>> {
        let fields = input.parse()?;

        let id = RecordId(self.next_id.ok_or(StoreError::IdSpaceExhausted)?);
        self.next_id = id.0.checked_add(1);
        self.records.push(SettlementRecord::new(id, fields));
        self.sort();

        debug!("Added record {}", id);
        self.persist();
        Ok(self.list())
    }

    /// Replaces every field of record `id` except the id itself.
    ///
    /// An absent quantity in `input` clears the stored quantity.
    pub fn update(&mut self, id: RecordId, input: &RecordInput) -> Result<Vec<SettlementRecord>> {
        let fields = input.parse()?;

        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;
        record.replace(fields);
        self.sort();

        debug!("Updated record {}", id);
        self.persist();
        Ok(self.list())
    }

    /// Removes record `id`. Unknown ids are a no-op and nothing is saved.
    pub fn remove(&mut self, id: RecordId) -> Vec<SettlementRecord> {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);

        if self.records.len() != before {
            debug!("Removed record {}", id);
            self.persist();
        } else {
            debug!("Remove of unknown record {}, ignoring", id);
        }
        self.list()
    }

    /// Removes every record.
    pub fn clear(&mut self) -> Vec<SettlementRecord> {
        self.records.clear();
        debug!("Cleared all records");
        self.persist();
        self.list()
    }

    /// Replaces the whole collection, e.g. with records from an import.
    ///
    /// Fails with `DuplicateId` without changing anything if two records
    /// share an id.
    pub fn replace_all(&mut self, records: Vec<SettlementRecord>) -> Result<Vec<SettlementRecord>> {
        self.install(records)?;
        debug!("Replaced collection with {} records", self.records.len());
        self.persist();
        Ok(self.list())
    }

    /// Retries the save, returning the error if it fails again.
    pub fn flush(&mut self) -> Result<()> {
        match self.repository.save(&self.records) {
            Ok(()) => {
                self.last_save_error = None;
                Ok(())
            }
            Err(e) => {
                warn!("Saving {} records failed: {}", self.records.len(), e);
                Err(e)
            }
        }
    }

    /// The error from the most recent save, if it failed and was not retried
    /// successfully since.
    pub fn last_save_error(&self) -> Option<&StoreError> {
        self.last_save_error.as_ref()
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn repository_mut(&mut self) -> &mut R {
        &mut self.repository
    }

    /// Validates ids and installs `records` as the collection.
    fn install(&mut self, mut records: Vec<SettlementRecord>) -> Result<()> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.id) {
                return Err(StoreError::DuplicateId(record.id));
            }
        }

        // Stable sort keeps ties in insertion order
        records.sort_by(|a, b| a.start_date.cmp(&b.start_date));

        let after_max = match records.iter().map(|r| r.id.0).max() {
            Some(max_id) => max_id.checked_add(1),
            None => Some(1),
        };
        self.next_id = match (self.next_id, after_max) {
            (Some(current), Some(after_max)) => Some(current.max(after_max)),
            _ => None,
        };
        self.records = records;
        Ok(())
    }

    fn sort(&mut self) {
        self.records.sort_by(|a, b| a.start_date.cmp(&b.start_date));
    }

    fn persist(&mut self) {
        if let Err(e) = self.repository.save(&self.records) {
            warn!("Saving {} records failed: {}", self.records.len(), e);
            self.last_save_error = Some(e);
        } else {
            self.last_save_error = None;
        }
    }

    /// Verifies the ordering and uniqueness invariants.
    #[cfg(debug_assertions)]
    pub fn check_invariant(&self) -> bool {
        let sorted = self
            .records
            .windows(2)
            .all(|pair| pair[0].start_date <= pair[1].start_date);
        let ids: HashSet<_> = self.records.iter().map(|r| r.id).collect();
        sorted && ids.len() == self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryRepository;

    fn input(start: &str, end: &str, cost: &str) -> RecordInput {
        RecordInput::new(start, end, cost)
    }

    fn empty_store() -> RecordStore<MemoryRepository> {
        RecordStore::open(MemoryRepository::new()).unwrap()
    }

    fn starts(records: &[SettlementRecord]) -> Vec<String> {
        records.iter().map(|r| r.start_date.to_string()).collect()
    }

    #[test]
    fn test_add_sorts_by_start_date() {
        let mut store = empty_store();
        store.add(&input("2024-03-01", "2024-03-31", "300")).unwrap();
        store.add(&input("2024-01-01", "2024-01-31", "100")).unwrap();
        let records = store
            .add(&input("2024-02-01", "2024-02-29", "200").with_quantity("5"))
            .unwrap();

        assert_eq!(starts(&records), ["2024-01-01", "2024-02-01", "2024-03-01"]);
        assert_eq!(records[1].quantity, Some(5));
        assert!(store.check_invariant());
    }

    #[test]
    fn test_add_assigns_distinct_ids() {
        let mut store = empty_store();
        for _ in 0..5 {
            store.add(&input("2024-01-01", "2024-01-02", "1")).unwrap();
        }
        let ids: HashSet<_> = store.records().iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut store = empty_store();
        store.add(&input("2024-01-01", "2024-01-05", "1")).unwrap();
        store.add(&input("2024-01-01", "2024-01-10", "2")).unwrap();
        store.add(&input("2023-12-01", "2023-12-31", "3")).unwrap();

        let costs: Vec<String> = store.records().iter().map(|r| r.cost.to_string()).collect();
        assert_eq!(costs, ["3.0000", "1.0000", "2.0000"]);
    }

    #[test]
    fn test_failed_add_leaves_collection_unchanged() {
        let mut store = empty_store();
        store.add(&input("2024-01-01", "2024-01-31", "100")).unwrap();
        let before = store.list();

        assert!(store.add(&input("", "2024-01-10", "100")).is_err());
        assert!(store.add(&input("2024-02-01", "2024-01-01", "100")).is_err());
        assert_eq!(store.list(), before);
        assert_eq!(store.repository().save_count(), 1);
    }

    #[test]
    fn test_update_replaces_whole_record_and_resorts() {
        let mut store = empty_store();
        store
            .add(&input("2024-01-01", "2024-01-31", "100").with_quantity("10"))
            .unwrap();
        store.add(&input("2024-02-01", "2024-02-29", "200")).unwrap();
        let id = store.records()[0].id;

        let records = store.update(id, &input("2024-03-01", "2024-03-31", "150")).unwrap();

        let updated = records.iter().find(|r| r.id == id).unwrap();
        assert_eq!(updated.cost.to_string(), "150.0000");
        assert_eq!(updated.quantity, None);
        assert_eq!(records.last().unwrap().id, id);
    }

    #[test]
    fn test_update_unknown_id_is_not_found() {
        let mut store = empty_store();
        store.add(&input("2024-01-01", "2024-01-31", "100")).unwrap();
        let before = store.list();

        let err = store
            .update(RecordId(99), &input("2024-01-01", "2024-01-31", "1"))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(RecordId(99))));
        assert_eq!(store.list(), before);
    }

    #[test]
    fn test_update_validates_before_lookup() {
        let mut store = empty_store();
        let err = store
            .update(RecordId(99), &input("2024-02-01", "2024-01-01", "1"))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidRange { .. }));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut store = empty_store();
        store.add(&input("2024-01-01", "2024-01-31", "100")).unwrap();
        let id = store.records()[0].id;

        assert!(store.remove(id).is_empty());
        assert!(store.remove(id).is_empty());
        // Only the add and the first remove were saved
        assert_eq!(store.repository().save_count(), 2);
    }

    #[test]
    fn test_ids_continue_after_reload() {
        let mut store = empty_store();
        store.add(&input("2024-01-01", "2024-01-31", "100")).unwrap();
        store.add(&input("2024-02-01", "2024-02-29", "100")).unwrap();
        let saved = store.repository().records().to_vec();

        let mut reopened = RecordStore::open(MemoryRepository::with_records(saved)).unwrap();
        reopened.remove(RecordId(2));
        let records = reopened.add(&input("2024-03-01", "2024-03-31", "1")).unwrap();
        assert_eq!(records.last().unwrap().id, RecordId(3));
    }

    #[test]
    fn test_largest_id_exhausts_id_space() {
        let last = SettlementRecord::new(
            RecordId(u64::MAX),
            input("2024-01-01", "2024-01-31", "1").parse().unwrap(),
        );
        let mut store = RecordStore::open(MemoryRepository::with_records(vec![last])).unwrap();
        let before = store.list();

        let err = store.add(&input("2024-02-01", "2024-02-29", "1")).unwrap_err();
        assert!(matches!(err, StoreError::IdSpaceExhausted));
        assert!(!err.is_validation());
        assert_eq!(store.list(), before);
        assert_eq!(store.repository().save_count(), 0);

        // Existing records stay editable
        store
            .update(RecordId(u64::MAX), &input("2024-01-01", "2024-01-31", "2"))
            .unwrap();
        assert_eq!(store.records()[0].cost.to_string(), "2.0000");
    }

    #[test]
    fn test_add_issues_largest_id_once() {
        let near_last = SettlementRecord::new(
            RecordId(u64::MAX - 1),
            input("2024-01-01", "2024-01-31", "1").parse().unwrap(),
        );
        let mut store = RecordStore::open(MemoryRepository::with_records(vec![near_last])).unwrap();

        let records = store.add(&input("2024-02-01", "2024-02-29", "1")).unwrap();
        assert_eq!(records.last().unwrap().id, RecordId(u64::MAX));
        assert!(matches!(
            store.add(&input("2024-03-01", "2024-03-31", "1")),
            Err(StoreError::IdSpaceExhausted)
        ));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_open_rejects_duplicate_ids() {
        let rec = SettlementRecord::new(
            RecordId(1),
            input("2024-01-01", "2024-01-31", "1").parse().unwrap(),
        );
        let repo = MemoryRepository::with_records(vec![rec.clone(), rec]);
        assert!(matches!(
            RecordStore::open(repo),
            Err(StoreError::DuplicateId(RecordId(1)))
        ));
    }

    #[test]
    fn test_open_sorts_unsorted_data() {
        let late = SettlementRecord::new(
            RecordId(1),
            input("2024-05-01", "2024-05-31", "1").parse().unwrap(),
        );
        let early = SettlementRecord::new(
            RecordId(2),
            input("2024-01-01", "2024-01-31", "1").parse().unwrap(),
        );
        let store = RecordStore::open(MemoryRepository::with_records(vec![late, early])).unwrap();
        assert_eq!(starts(store.records()), ["2024-01-01", "2024-05-01"]);
    }

    #[test]
    fn test_clear_and_replace_all() {
        let mut store = empty_store();
        store.add(&input("2024-01-01", "2024-01-31", "100")).unwrap();
        let snapshot = store.list();

        assert!(store.clear().is_empty());
        assert!(store.repository().records().is_empty());

        let restored = store.replace_all(snapshot.clone()).unwrap();
        assert_eq!(restored, snapshot);
        assert_eq!(store.get(snapshot[0].id), Some(&snapshot[0]));
    }

    #[test]
    fn test_save_failure_is_retained_not_fatal() {
        let mut store = empty_store();
        store.repository_mut().set_fail_saves(true);

        let records = store.add(&input("2024-01-01", "2024-01-31", "100")).unwrap();
        assert_eq!(records.len(), 1);
        assert!(matches!(store.last_save_error(), Some(StoreError::SaveRejected)));
        assert!(store.flush().is_err());

        store.repository_mut().set_fail_saves(false);
        store.flush().unwrap();
        assert!(store.last_save_error().is_none());
        assert_eq!(store.repository().records().len(), 1);
    }
}
