//! Error types for the settlement store.

use crate::record::RecordId;
use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while validating, storing, or persisting records.
///
/// Validation failures (`MissingField` through `DuplicateId`) are refusals:
/// the collection is left exactly as it was before the call.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A required input was empty
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    /// Start date falls after end date
    #[error("Invalid range: start date {start} is after end date {end}")]
    InvalidRange { start: String, end: String },

    /// Date is not a valid `YYYY-MM-DD` calendar date
    #[error("Invalid date in {field}: '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str, value: String },

    /// Cost or quantity did not parse as a number
    #[error("Invalid number in {field}: '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    /// No record with this id
    #[error("Record {0} not found")]
    NotFound(RecordId),

    /// Two records share an id in a loaded or replaced collection
    #[error("Duplicate record id {0}")]
    DuplicateId(RecordId),

    /// Every record id has been issued; nothing more can be added
    #[error("Record id space exhausted")]
    IdSpaceExhausted,

    /// Failed to open, read or write the store file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing or writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Injected failure from the in-memory repository
    #[error("Save rejected by repository")]
    SaveRejected,

    /// Missing positional argument
    #[error("Missing argument: {0}. Usage: settlement-tracker <store.csv> <command> [args...]")]
    MissingArgument(&'static str),

    /// Unrecognized command name
    #[error("Unknown command '{0}'. Expected one of: list, add, update, remove, compare, clear")]
    UnknownCommand(String),
}

impl StoreError {
    /// Returns `true` for errors that reject a mutation because of its input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StoreError::MissingField { .. }
                | StoreError::InvalidRange { .. }
                | StoreError::InvalidDate { .. }
                | StoreError::InvalidNumber { .. }
                | StoreError::NotFound(_)
                | StoreError::DuplicateId(_)
        )
    }
}
