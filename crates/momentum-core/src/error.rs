//! Core error types for momentum-core.
//!
//! This module defines the error hierarchy using thiserror. Every failure
//! the engine can produce maps onto one [`ErrorKind`], which is what the
//! orchestration layer branches on.

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

use crate::task::TaskTransitionError;

/// Coarse classification of a [`CoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input at the system boundary (timestamps, ranges, enums).
    InvalidInput,
    /// The conflict search ran out of steps without finding a free slot.
    NoSlotAvailable,
    /// A task status change that the state machine does not allow.
    InvalidTransition,
    /// The task/calendar store failed.
    Storage,
    /// Configuration could not be loaded, parsed or saved.
    Config,
}

/// Core error type for momentum-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Scheduling errors
    #[error("Scheduling error: {0}")]
    Schedule(#[from] ScheduleError),

    /// Task state machine errors
    #[error("Task transition error: {0}")]
    Transition(#[from] TaskTransitionError),

    /// Focus session errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Validation(_) | CoreError::Json(_) => ErrorKind::InvalidInput,
            CoreError::Schedule(ScheduleError::NoSlotAvailable { .. }) => ErrorKind::NoSlotAvailable,
            CoreError::Transition(_) | CoreError::Session(_) => ErrorKind::InvalidTransition,
            CoreError::Database(_) | CoreError::Io(_) => ErrorKind::Storage,
            CoreError::Config(_) => ErrorKind::Config,
        }
    }
}

/// Validation errors raised while turning raw records into typed values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Timestamp could not be parsed
    #[error("Invalid timestamp for '{field}': {value:?}")]
    InvalidTimestamp { field: String, value: String },

    /// Numeric value outside its allowed range
    #[error("'{field}' must be within {min}..={max}, got {value}")]
    OutOfRange {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Invalid time range
    #[error("Invalid time range: end ({end}) must be greater than start ({start})")]
    InvalidTimeRange { start: i64, end: i64 },

    /// Invalid absolute time range
    #[error("Invalid time range: end_time ({end}) must be greater than start_time ({start})")]
    InvalidInstantRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Scheduling errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    /// Bounded conflict search exhausted
    #[error("No free slot found within {steps} steps after {proposed}")]
    NoSlotAvailable {
        proposed: DateTime<Utc>,
        steps: u32,
    },
}

/// Focus session errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// A focus timer is already running
    #[error("Already focusing on task {task_id}")]
    AlreadyFocusing { task_id: String },
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Row not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Data directory could not be resolved or created
    #[error("Failed to prepare data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn kind_maps_validation_to_invalid_input() {
        let err: CoreError = ValidationError::InvalidTimestamp {
            field: "deadline".into(),
            value: "not a date".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn kind_maps_exhausted_search() {
        let err: CoreError = ScheduleError::NoSlotAvailable {
            proposed: Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
            steps: 84,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::NoSlotAvailable);
        assert!(err.to_string().contains("84 steps"));
    }

    #[test]
    fn locked_database_is_detected() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
            None,
        );
        assert!(matches!(DatabaseError::from(err), DatabaseError::Locked));
    }
}
