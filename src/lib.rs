//! # Settlement Tracker
//!
//! Tracks recurring delivery-settlement periods (a cost and an optional
//! quantity over a date range) and compares periods with each other.
//!
//! ## Design Principles
//!
//! - **Date-ordered store**: records are always read ascending by start date
//! - **Validate once**: raw input is parsed into typed fields at the boundary
//! - **Fixed-point arithmetic**: costs use 4 decimal places via `rust_decimal`
//! - **No undefined percentages**: a zero baseline yields `None`, never NaN
//!
//! ## Example
//!
//! ```
//! use settlement_tracker::{compare, MemoryRepository, RecordInput, RecordStore};
//!
//! let mut store = RecordStore::open(MemoryRepository::new()).unwrap();
//! store.add(&RecordInput::new("2024-01-01", "2024-01-31", "100")).unwrap();
//! let records = store.add(&RecordInput::new("2024-02-01", "2024-02-29", "120")).unwrap();
//!
//! let comp = compare(&records[1], Some(&records[0])).unwrap();
//! assert_eq!(comp.cost_diff.to_string(), "20.0000");
//! ```

pub mod amount;
pub mod cli;
pub mod comparison;
pub mod error;
pub mod record;
pub mod repository;
pub mod selection;
pub mod store;

pub use amount::{Amount, Percent};
pub use comparison::{adjacent_comparisons, compare, Comparison, Direction, RowComparison};
pub use error::{Result, StoreError};
pub use record::{PeriodDate, RecordFields, RecordId, RecordInput, SettlementRecord};
pub use repository::{CsvRepository, MemoryRepository, RecordRepository};
pub use selection::{Selection, SelectionState};
pub use store::RecordStore;
