//! Persistence collaborators for the record store.
//!
//! The store only knows the [`RecordRepository`] trait. [`CsvRepository`]
//! keeps records in a CSV file; [`MemoryRepository`] is an in-memory fake.

use crate::error::{Result, StoreError};
use crate::record::SettlementRecord;
use csv::{ReaderBuilder, Trim};
use log::debug;
use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::PathBuf;

/// Loads and saves the full record collection.
pub trait RecordRepository {
    /// Loads all stored records. Returns an empty collection if nothing was
    /// saved yet.
    fn load(&mut self) -> Result<Vec<SettlementRecord>>;

    /// Replaces the stored collection with `records`.
    fn save(&mut self, records: &[SettlementRecord]) -> Result<()>;
}

/// Stores records as CSV with columns `id,start_date,end_date,cost,quantity`.
#[derive(Debug, Clone)]
pub struct CsvRepository {
    path: PathBuf,
}

impl CsvRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvRepository { path: path.into() }
    }
}

impl RecordRepository for CsvRepository {
    fn load(&mut self) -> Result<Vec<SettlementRecord>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No store at {}, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        read_records(file)
    }

    fn save(&mut self, records: &[SettlementRecord]) -> Result<()> {
        let file = File::create(&self.path)?;
        write_records(file, records)?;
        debug!("Saved {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}

/// Reads records from CSV. A malformed row fails the whole load.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<SettlementRecord>> {
    let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let mut records = Vec::new();
    for result in csv_reader.deserialize::<SettlementRecord>() {
        records.push(result?);
    }
    Ok(records)
}

/// Writes records as CSV, header first.
pub fn write_records<W: Write>(writer: W, records: &[SettlementRecord]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    // serialize() only emits a header alongside the first row
    if records.is_empty() {
        csv_writer.write_record(["id", "start_date", "end_date", "cost", "quantity"])?;
    }
    for record in records {
        csv_writer.serialize(record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// In-memory repository for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    records: Vec<SettlementRecord>,
    saves: usize,
    fail_saves: bool,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository preloaded with `records`.
    pub fn with_records(records: Vec<SettlementRecord>) -> Self {
        MemoryRepository {
            records,
            ..Self::default()
        }
    }

    /// Makes every subsequent save fail (or succeed again).
    pub fn set_fail_saves(&mut self, fail: bool) {
        self.fail_saves = fail;
    }

    /// Records as of the last successful save.
    pub fn records(&self) -> &[SettlementRecord] {
        &self.records
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl RecordRepository for MemoryRepository {
    fn load(&mut self) -> Result<Vec<SettlementRecord>> {
        Ok(self.records.clone())
    }

    fn save(&mut self, records: &[SettlementRecord]) -> Result<()> {
        if self.fail_saves {
            return Err(StoreError::SaveRejected);
        }
        self.records = records.to_vec();
        self.saves += 1;
        Ok(())
    }
}
