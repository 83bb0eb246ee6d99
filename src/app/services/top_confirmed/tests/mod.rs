//! Test helpers for the top confirmed endpoint

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;

use crate::app::models::{CountryTotals, Observation};
use crate::app::services::store::{
    BulkInsert, DuplicateCheck, MemoryStore, ObservationStore, StoreResult,
};
use crate::error::StoreError;


fn day(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn observation(s_no: i64, country: &str, date: NaiveDateTime, confirmed: f32) -> Observation {
    Observation {
        s_no,
        observation_date: date,
        province_state: String::new(),
        country_region: country.to_string(),
        last_update: date,
        confirmed,
        deaths: 0.0,
        recovered: 0.0,
    }
}

/// Countries A (4 + 6) and B (30) on 2020-01-22, C (7) on 2020-01-23
pub fn sample_store() -> Arc<dyn ObservationStore> {
    Arc::new(MemoryStore::with_rows(
        DuplicateCheck::OnAppend,
        vec![
            observation(1, "A", day(2020, 1, 22), 4.0),
            observation(2, "A", day(2020, 1, 22), 6.0),
            observation(3, "B", day(2020, 1, 22), 30.0),
            observation(4, "C", day(2020, 1, 23), 7.0),
        ],
    ))
}

/// Store whose queries always fail
pub struct UnavailableStore;

#[async_trait]
impl ObservationStore for UnavailableStore {
    async fn begin_bulk_insert(&self) -> StoreResult<Box<dyn BulkInsert>> {
        Err(StoreError::backend("connection refused"))
    }

    async fn top_confirmed(
        &self,
        _observation_date: NaiveDateTime,
        _limit: i64,
    ) -> StoreResult<Vec<CountryTotals>> {
        Err(StoreError::backend("connection refused"))
    }
}
