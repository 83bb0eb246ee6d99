//! Error handling for observation loading and querying.
//!
//! Provides the crate-level [`Error`] for fatal conditions plus the narrower
//! error types produced by row validation, date parsing and storage.

use crate::app::models::CsvColumn;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors surfaced to the command layer
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV reading error
    #[error("CSV parsing error in file '{file}': {message}")]
    CsvParsing {
        file: String,
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// Configuration file could not be decoded
    #[error("Invalid configuration file {path}: {source}")]
    ConfigParsing {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Database connection error
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: sqlx::Error,
    },

    /// The bulk load could not complete and was rolled back
    #[error("Load aborted: {message}")]
    LoadAborted {
        message: String,
        #[source]
        source: StoreError,
    },

    /// HTTP server error
    #[error("Server error: {message}")]
    Server {
        message: String,
        #[source]
        source: Option<warp::Error>,
    },

    /// Processing interrupted
    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a CSV parsing error with context
    pub fn csv_parsing(
        file: impl Into<String>,
        message: impl Into<String>,
        source: Option<csv::Error>,
    ) -> Self {
        Self::CsvParsing {
            file: file.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a database error
    pub fn database(message: impl Into<String>, source: sqlx::Error) -> Self {
        Self::Database {
            message: message.into(),
            source,
        }
    }

    /// Create a load aborted error
    pub fn load_aborted(message: impl Into<String>, source: StoreError) -> Self {
        Self::LoadAborted {
            message: message.into(),
            source,
        }
    }

    /// Create a server error
    pub fn server(message: impl Into<String>, source: Option<warp::Error>) -> Self {
        Self::Server {
            message: message.into(),
            source,
        }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::CsvParsing {
            file: "unknown".to_string(),
            message: "CSV parsing failed".to_string(),
            source: Some(error),
        }
    }
}

/// No layout in the date/time table matched the input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("datetime format not on list: '{input}'")]
pub struct DateFormatUnrecognized {
    pub input: String,
}

/// Reasons a raw CSV record is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("invalid record: expected {expected} fields, found {found}")]
    MalformedRecord { expected: usize, found: usize },

    #[error("invalid {column} column value '{value}'")]
    InvalidSequenceNumber { column: CsvColumn, value: String },

    /// Used for both date columns; `column` tells them apart
    #[error("invalid {column} column value '{value}'")]
    InvalidObservationDate { column: CsvColumn, value: String },

    #[error("column {column} exceeds maximum length of {max} characters (found {length})")]
    FieldTooLong {
        column: CsvColumn,
        length: usize,
        max: usize,
    },

    #[error("invalid {column} column value '{value}'")]
    InvalidMetricValue { column: CsvColumn, value: String },
}

impl RecordError {
    /// Column that caused the rejection, if the record had the right shape
    pub fn column(&self) -> Option<CsvColumn> {
        match self {
            Self::MalformedRecord { .. } => None,
            Self::InvalidSequenceNumber { column, .. }
            | Self::InvalidObservationDate { column, .. }
            | Self::FieldTooLong { column, .. }
            | Self::InvalidMetricValue { column, .. } => Some(*column),
        }
    }
}

/// Kinds of storage constraint violations the loader knows how to absorb
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Duplicate,
}

/// Storage layer failures
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("constraint violation ({kind:?}): {message}")]
    ConstraintViolation {
        kind: ConstraintKind,
        message: String,
    },

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("storage backend error: {message}")]
    Backend { message: String },
}

impl StoreError {
    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::ConstraintViolation {
            kind: ConstraintKind::Duplicate,
            message: message.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// True when the failure is a uniqueness violation on the row key
    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            Self::ConstraintViolation {
                kind: ConstraintKind::Duplicate,
                ..
            }
        )
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &error {
            if db_err.code().as_deref() == Some(crate::constants::PG_UNIQUE_VIOLATION) {
                return Self::ConstraintViolation {
                    kind: ConstraintKind::Duplicate,
                    message: db_err.message().to_string(),
                };
            }
        }
        Self::Database(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_duplicate_classification() {
        assert!(StoreError::duplicate("s_no 1 already exists").is_duplicate());
        assert!(!StoreError::backend("disk full").is_duplicate());
        assert!(!StoreError::from(sqlx::Error::RowNotFound).is_duplicate());
    }

    #[test]
    fn test_record_error_messages_name_the_column() {
        let err = RecordError::InvalidObservationDate {
            column: CsvColumn::LastUpdate,
            value: "yesterday".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid Last Update column value 'yesterday'"
        );
        assert_eq!(err.column(), Some(CsvColumn::LastUpdate));

        let err = RecordError::MalformedRecord {
            expected: 8,
            found: 3,
        };
        assert_eq!(err.column(), None);
        assert!(err.to_string().contains("expected 8 fields, found 3"));
    }
}
