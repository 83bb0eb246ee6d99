//! Tests for whole-record validation

use super::*;
use crate::app::models::{CsvColumn, Observation};
use crate::app::services::observation_parser::{validate_csv_record, validate_record};
use crate::error::RecordError;
use csv::StringRecord;

#[test]
fn test_anhui_record_converts() {
    let observation = validate_record(&ANHUI_RECORD).unwrap();

    assert_eq!(
        observation,
        Observation {
            s_no: 1,
            observation_date: datetime(2020, 1, 22, 0, 0, 0),
            province_state: "Anhui".to_string(),
            country_region: "Mainland China".to_string(),
            last_update: datetime(2020, 1, 22, 17, 0, 0),
            confirmed: 1.0,
            deaths: 0.0,
            recovered: 0.0,
        }
    );
}

#[test]
fn test_wrong_field_count_is_malformed() {
    let short = &ANHUI_RECORD[..7];
    assert_eq!(
        validate_record(short).unwrap_err(),
        RecordError::MalformedRecord {
            expected: 8,
            found: 7
        }
    );

    // Contents are not inspected when the shape is wrong
    let mut long: Vec<&str> = vec!["not-a-number"; 8];
    long.push("extra");
    assert!(matches!(
        validate_record(&long),
        Err(RecordError::MalformedRecord { found: 9, .. })
    ));

    let empty: [&str; 0] = [];
    assert!(matches!(
        validate_record(&empty),
        Err(RecordError::MalformedRecord { found: 0, .. })
    ));
}

#[test]
fn test_each_field_reports_its_column() {
    let cases = [
        (0, "one", CsvColumn::SequenceNumber),
        (1, "someday", CsvColumn::ObservationDate),
        (4, "later", CsvColumn::LastUpdate),
        (5, "n/a", CsvColumn::Confirmed),
        (6, "-", CsvColumn::Deaths),
        (7, "?", CsvColumn::Recovered),
    ];

    for (index, value, column) in cases {
        let err = validate_record(&record_with(index, value)).unwrap_err();
        assert_eq!(err.column(), Some(column), "field {} = '{}'", index, value);
    }
}

#[test]
fn test_date_errors_use_observation_date_kind() {
    let err = validate_record(&record_with(4, "bad")).unwrap_err();
    assert_eq!(
        err,
        RecordError::InvalidObservationDate {
            column: CsvColumn::LastUpdate,
            value: "bad".to_string()
        }
    );
}

#[test]
fn test_text_length_boundary() {
    for index in [2, 3] {
        let at_limit = record_with(index, &"a".repeat(200));
        assert!(validate_record(&at_limit).is_ok());

        let over_limit = record_with(index, &"a".repeat(201));
        assert!(matches!(
            validate_record(&over_limit),
            Err(RecordError::FieldTooLong { length: 201, .. })
        ));
    }
}

#[test]
fn test_first_failure_wins() {
    let mut fields = record_with(0, "x");
    fields[5] = "y".to_string();

    let err = validate_record(&fields).unwrap_err();
    assert_eq!(err.column(), Some(CsvColumn::SequenceNumber));
}

#[test]
fn test_empty_province_and_country_are_accepted() {
    let mut fields = record_with(2, "");
    fields[3] = String::new();

    let observation = validate_record(&fields).unwrap();
    assert!(observation.province_state.is_empty());
    assert!(observation.country_region.is_empty());
}

#[test]
fn test_validate_csv_record() {
    let record = StringRecord::from(ANHUI_RECORD.to_vec());
    let observation = validate_csv_record(&record).unwrap();
    assert_eq!(observation.s_no, 1);

    let record = StringRecord::from(vec!["1", "01/22/2020"]);
    assert!(matches!(
        validate_csv_record(&record),
        Err(RecordError::MalformedRecord { found: 2, .. })
    ));
}

#[test]
fn test_validation_is_deterministic() {
    let first = validate_record(&ANHUI_RECORD).unwrap();
    let second = validate_record(&ANHUI_RECORD).unwrap();
    assert_eq!(first, second);
}
