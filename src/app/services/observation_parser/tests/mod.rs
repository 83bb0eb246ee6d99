//! Test helpers for observation record parsing
//!
//! Provides record builders shared by the datetime and record parser tests.

use chrono::{NaiveDate, NaiveDateTime};

mod record_parser_tests;

/// The first row of the public dataset
pub const ANHUI_RECORD: [&str; 8] = [
    "1",
    "01/22/2020",
    "Anhui",
    "Mainland China",
    "1/22/2020 17:00",
    "1.0",
    "0.0",
    "0.0",
];

/// Owned copy of [`ANHUI_RECORD`] with one field replaced
pub fn record_with(index: usize, value: &str) -> Vec<String> {
    let mut fields: Vec<String> = ANHUI_RECORD.iter().map(|s| s.to_string()).collect();
    fields[index] = value.to_string();
    fields
}

/// Build a timestamp without the noise of chained `unwrap`s
pub fn datetime(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, min, sec)
        .unwrap()
}
