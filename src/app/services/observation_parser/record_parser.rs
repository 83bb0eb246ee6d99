//! Whole-record validation for observation files
//!
//! A record converts completely or not at all: the first failing field
//! aborts the conversion and only its error is returned.

use csv::StringRecord;

use super::field_parsers::{
    parse_bounded_text, parse_date_field, parse_metric, parse_sequence_number,
};
use crate::app::models::{CsvColumn, Observation};
use crate::constants::{CSV_FIELD_COUNT, MAX_TEXT_FIELD_LENGTH};
use crate::error::RecordError;

/// Convert the fields of one record into an [`Observation`]
///
/// Fields are expected in file order: SNo, ObservationDate, Province/State,
/// Country/Region, Last Update, Confirmed, Deaths, Recovered.
pub fn validate_record<S: AsRef<str>>(fields: &[S]) -> Result<Observation, RecordError> {
    if fields.len() != CSV_FIELD_COUNT {
        return Err(RecordError::MalformedRecord {
            expected: CSV_FIELD_COUNT,
            found: fields.len(),
        });
    }
    let field = move |column: CsvColumn| fields[column.index()].as_ref();

    let s_no = parse_sequence_number(field(CsvColumn::SequenceNumber))?;
    let observation_date =
        parse_date_field(CsvColumn::ObservationDate, field(CsvColumn::ObservationDate))?;
    let province_state = parse_bounded_text(
        CsvColumn::ProvinceState,
        field(CsvColumn::ProvinceState),
        MAX_TEXT_FIELD_LENGTH,
    )?;
    let country_region = parse_bounded_text(
        CsvColumn::CountryRegion,
        field(CsvColumn::CountryRegion),
        MAX_TEXT_FIELD_LENGTH,
    )?;
    let last_update = parse_date_field(CsvColumn::LastUpdate, field(CsvColumn::LastUpdate))?;
    let confirmed = parse_metric(CsvColumn::Confirmed, field(CsvColumn::Confirmed))?;
    let deaths = parse_metric(CsvColumn::Deaths, field(CsvColumn::Deaths))?;
    let recovered = parse_metric(CsvColumn::Recovered, field(CsvColumn::Recovered))?;

    Ok(Observation {
        s_no,
        observation_date,
        province_state,
        country_region,
        last_update,
        confirmed,
        deaths,
        recovered,
    })
}

/// Convenience wrapper for records read with the `csv` crate
pub fn validate_csv_record(record: &StringRecord) -> Result<Observation, RecordError> {
    let fields: Vec<&str> = record.iter().collect();
    validate_record(&fields)
}
