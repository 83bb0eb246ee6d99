//! Test helpers for observation storage

use chrono::{NaiveDate, NaiveDateTime};

use crate::app::models::Observation;


pub fn day(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Observation on 2020-01-22 with the given key, country and confirmed count
pub fn observation(s_no: i64, country: &str, confirmed: f32) -> Observation {
    Observation {
        s_no,
        observation_date: day(2020, 1, 22),
        province_state: String::new(),
        country_region: country.to_string(),
        last_update: day(2020, 1, 22),
        confirmed,
        deaths: 0.0,
        recovered: 0.0,
    }
}
