//! Field parsing utilities for observation records
//!
//! Each function converts one raw field and reports failures against the
//! column the field came from.

use super::datetime::parse_datetime;
use crate::app::models::CsvColumn;
use crate::error::RecordError;
use chrono::NaiveDateTime;

/// Parse the integer sequence number
pub fn parse_sequence_number(value: &str) -> Result<i64, RecordError> {
    value
        .parse::<i64>()
        .map_err(|_| RecordError::InvalidSequenceNumber {
            column: CsvColumn::SequenceNumber,
            value: value.to_string(),
        })
}

/// Parse one of the two date columns
pub fn parse_date_field(column: CsvColumn, value: &str) -> Result<NaiveDateTime, RecordError> {
    parse_datetime(value).map_err(|_| RecordError::InvalidObservationDate {
        column,
        value: value.to_string(),
    })
}

/// Accept a text field no longer than `max` bytes
pub fn parse_bounded_text(column: CsvColumn, value: &str, max: usize) -> Result<String, RecordError> {
    if value.len() > max {
        return Err(RecordError::FieldTooLong {
            column,
            length: value.len(),
            max,
        });
    }
    Ok(value.to_string())
}

/// Parse a count at single precision
///
/// Finite input that overflows `f32` is rejected rather than stored as infinity.
pub fn parse_metric(column: CsvColumn, value: &str) -> Result<f32, RecordError> {
    let invalid = || RecordError::InvalidMetricValue {
        column,
        value: value.to_string(),
    };

    let parsed = value.parse::<f32>().map_err(|_| invalid())?;
    if parsed.is_infinite() && !value.to_ascii_lowercase().contains("inf") {
        return Err(invalid());
    }
    Ok(parsed)
}
