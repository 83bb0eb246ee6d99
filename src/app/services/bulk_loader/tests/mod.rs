//! Test helpers for the bulk loader
//!
//! Provides CSV fixtures and a store whose channel fails on demand.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::app::models::{CountryTotals, Observation};
use crate::app::services::store::{BulkInsert, ObservationStore, StoreResult};
use crate::error::StoreError;


pub const HEADER: &str =
    "SNo,ObservationDate,Province/State,Country/Region,Last Update,Confirmed,Deaths,Recovered";

/// A valid data line with the given key, country and confirmed count
pub fn csv_line(s_no: i64, country: &str, confirmed: u32) -> String {
    format!(
        "{},01/22/2020,,{},1/22/2020 17:00,{}.0,0.0,0.0",
        s_no, country, confirmed
    )
}

/// Header followed by the given lines
pub fn csv_file(lines: &[String]) -> String {
    let mut text = String::from(HEADER);
    for line in lines {
        text.push('\n');
        text.push_str(line);
    }
    text.push('\n');
    text
}

/// Which channel step should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    None,
    Append,
    FlushDuplicate,
    FlushBackend,
    Commit,
}

/// Store whose bulk-insert channel fails at a chosen step
#[derive(Debug, Clone)]
pub struct ScriptedStore {
    failure: Failure,
    pub appended: Arc<AtomicUsize>,
    pub committed: Arc<AtomicBool>,
    pub rolled_back: Arc<AtomicBool>,
}

impl ScriptedStore {
    pub fn new(failure: Failure) -> Self {
        Self {
            failure,
            appended: Arc::default(),
            committed: Arc::default(),
            rolled_back: Arc::default(),
        }
    }
}

struct ScriptedBulkInsert {
    store: ScriptedStore,
}

#[async_trait]
impl ObservationStore for ScriptedStore {
    async fn begin_bulk_insert(&self) -> StoreResult<Box<dyn BulkInsert>> {
        Ok(Box::new(ScriptedBulkInsert {
            store: self.clone(),
        }))
    }

    async fn top_confirmed(
        &self,
        _observation_date: NaiveDateTime,
        _limit: i64,
    ) -> StoreResult<Vec<CountryTotals>> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl BulkInsert for ScriptedBulkInsert {
    async fn append(&mut self, _observation: &Observation) -> StoreResult<()> {
        if self.store.failure == Failure::Append {
            return Err(StoreError::backend("value out of range"));
        }
        self.store.appended.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn flush(&mut self) -> StoreResult<()> {
        match self.store.failure {
            Failure::FlushDuplicate => Err(StoreError::duplicate("duplicate key value")),
            Failure::FlushBackend => Err(StoreError::backend("connection reset")),
            _ => Ok(()),
        }
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        if self.store.failure == Failure::Commit {
            return Err(StoreError::backend("could not serialize access"));
        }
        self.store.committed.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        self.store.rolled_back.store(true, Ordering::SeqCst);
        Ok(())
    }
}
