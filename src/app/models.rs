//! Data models for observation loading and querying
//!
//! This module contains the validated observation row produced from a CSV
//! record and the aggregate types returned by the query endpoint.

use crate::constants::RESULT_DATE_FORMAT;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};
use std::fmt;

// =============================================================================
// CSV Columns
// =============================================================================

/// Columns of an observation data file, in file order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CsvColumn {
    SequenceNumber,
    ObservationDate,
    ProvinceState,
    CountryRegion,
    LastUpdate,
    Confirmed,
    Deaths,
    Recovered,
}

impl CsvColumn {
    /// All columns in the order they appear in a record
    pub const ALL: [CsvColumn; 8] = [
        CsvColumn::SequenceNumber,
        CsvColumn::ObservationDate,
        CsvColumn::ProvinceState,
        CsvColumn::CountryRegion,
        CsvColumn::LastUpdate,
        CsvColumn::Confirmed,
        CsvColumn::Deaths,
        CsvColumn::Recovered,
    ];

    /// Position of the column within a record
    pub fn index(self) -> usize {
        self as usize
    }

    /// Header name used in the source files
    pub fn header(self) -> &'static str {
        match self {
            CsvColumn::SequenceNumber => "SNo",
            CsvColumn::ObservationDate => "ObservationDate",
            CsvColumn::ProvinceState => "Province/State",
            CsvColumn::CountryRegion => "Country/Region",
            CsvColumn::LastUpdate => "Last Update",
            CsvColumn::Confirmed => "Confirmed",
            CsvColumn::Deaths => "Deaths",
            CsvColumn::Recovered => "Recovered",
        }
    }
}

impl fmt::Display for CsvColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

// =============================================================================
// Observation
// =============================================================================

/// One validated row of pandemic metrics for a region on a date
///
/// Built only by the record parser; a value of this type has passed every
/// type and length check.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Source sequence number, unique in storage
    pub s_no: i64,

    pub observation_date: NaiveDateTime,

    /// May be empty
    pub province_state: String,

    pub country_region: String,

    pub last_update: NaiveDateTime,

    pub confirmed: f32,
    pub deaths: f32,
    pub recovered: f32,
}

// =============================================================================
// Query Results
// =============================================================================

/// Summed counts for one country on one date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryTotals {
    #[serde(rename = "country")]
    pub country_region: String,

    #[serde(serialize_with = "serialize_count")]
    pub confirmed: f64,

    #[serde(serialize_with = "serialize_count")]
    pub deaths: f64,

    #[serde(serialize_with = "serialize_count")]
    pub recovered: f64,
}

/// Countries ranked by confirmed count for a single observation date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopConfirmed {
    /// Date label formatted as `YYYY-MM-DD`
    pub observation_date: String,
    pub countries: Vec<CountryTotals>,
}

impl TopConfirmed {
    pub fn new(observation_date: NaiveDate, countries: Vec<CountryTotals>) -> Self {
        Self {
            observation_date: observation_date.format(RESULT_DATE_FORMAT).to_string(),
            countries,
        }
    }
}

/// Largest magnitude written as an integer literal
const MAX_INTEGRAL_COUNT: f64 = 1e15;

/// Render whole counts without a fractional part (`30` rather than `30.0`)
fn serialize_count<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.is_finite() && value.fract() == 0.0 && value.abs() < MAX_INTEGRAL_COUNT {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}
