//! In-process observation store
//!
//! Keeps committed rows in a shared vector and enforces uniqueness of `s_no`.
//! [`DuplicateCheck`] selects whether a collision is reported as soon as the
//! row is appended or only when the channel is flushed, which reproduces the
//! two ways a database can surface a duplicate during a bulk load.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{BulkInsert, ObservationStore, StoreResult};
use crate::app::models::{CountryTotals, Observation};
use crate::error::StoreError;

/// When duplicate sequence numbers are detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateCheck {
    /// On `append`; the offending row is rejected and the batch continues
    #[default]
    OnAppend,
    /// On `flush`; the whole batch fails
    OnFlush,
}

/// Thread-safe in-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rows: Arc<Mutex<Vec<Observation>>>,
    duplicate_check: DuplicateCheck,
}

impl MemoryStore {
    pub fn new(duplicate_check: DuplicateCheck) -> Self {
        Self {
            rows: Arc::default(),
            duplicate_check,
        }
    }

    /// Store pre-populated with committed rows
    pub fn with_rows(duplicate_check: DuplicateCheck, rows: Vec<Observation>) -> Self {
        Self {
            rows: Arc::new(Mutex::new(rows)),
            duplicate_check,
        }
    }

    /// Snapshot of committed rows
    pub fn rows(&self) -> Vec<Observation> {
        lock(&self.rows).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.rows).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock(rows: &Mutex<Vec<Observation>>) -> MutexGuard<'_, Vec<Observation>> {
    rows.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn duplicate_error(s_no: i64) -> StoreError {
    StoreError::duplicate(format!("duplicate key value: s_no = {}", s_no))
}

#[async_trait]
impl ObservationStore for MemoryStore {
    async fn begin_bulk_insert(&self) -> StoreResult<Box<dyn BulkInsert>> {
        let committed_keys = lock(&self.rows).iter().map(|o| o.s_no).collect();
        Ok(Box::new(MemoryBulkInsert {
            rows: Arc::clone(&self.rows),
            duplicate_check: self.duplicate_check,
            committed_keys,
            staged_keys: HashSet::new(),
            staged: Vec::new(),
            flushed: true,
        }))
    }

    async fn top_confirmed(
        &self,
        observation_date: NaiveDateTime,
        limit: i64,
    ) -> StoreResult<Vec<CountryTotals>> {
        if limit < 0 {
            return Err(StoreError::backend("LIMIT must not be negative"));
        }

        let mut by_country: BTreeMap<String, CountryTotals> = BTreeMap::new();
        for row in lock(&self.rows)
            .iter()
            .filter(|o| o.observation_date == observation_date)
        {
            let totals = by_country
                .entry(row.country_region.clone())
                .or_insert_with(|| CountryTotals {
                    country_region: row.country_region.clone(),
                    confirmed: 0.0,
                    deaths: 0.0,
                    recovered: 0.0,
                });
            totals.confirmed += f64::from(row.confirmed);
            totals.deaths += f64::from(row.deaths);
            totals.recovered += f64::from(row.recovered);
        }

        // BTreeMap iteration is by country, so equal totals stay alphabetical
        let mut ranked: Vec<CountryTotals> = by_country.into_values().collect();
        ranked.sort_by(|a, b| {
            b.confirmed
                .partial_cmp(&a.confirmed)
                .unwrap_or(Ordering::Equal)
        });
        ranked.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(ranked)
    }
}

/// Staged rows for one in-memory transaction
struct MemoryBulkInsert {
    rows: Arc<Mutex<Vec<Observation>>>,
    duplicate_check: DuplicateCheck,
    committed_keys: HashSet<i64>,
    staged_keys: HashSet<i64>,
    staged: Vec<Observation>,
    flushed: bool,
}

impl MemoryBulkInsert {
    fn is_taken(&self, s_no: i64) -> bool {
        self.committed_keys.contains(&s_no) || self.staged_keys.contains(&s_no)
    }
}

#[async_trait]
impl BulkInsert for MemoryBulkInsert {
    async fn append(&mut self, observation: &Observation) -> StoreResult<()> {
        match self.duplicate_check {
            DuplicateCheck::OnAppend => {
                if self.is_taken(observation.s_no) {
                    return Err(duplicate_error(observation.s_no));
                }
                self.staged_keys.insert(observation.s_no);
            }
            DuplicateCheck::OnFlush => {}
        }
        self.staged.push(observation.clone());
        self.flushed = false;
        Ok(())
    }

    async fn flush(&mut self) -> StoreResult<()> {
        if self.duplicate_check == DuplicateCheck::OnFlush {
            self.staged_keys.clear();
            for row in &self.staged {
                if self.committed_keys.contains(&row.s_no) || !self.staged_keys.insert(row.s_no) {
                    return Err(duplicate_error(row.s_no));
                }
            }
        }
        self.flushed = true;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        if !self.flushed {
            return Err(StoreError::backend(format!(
                "{} rows appended but never flushed",
                self.staged.len()
            )));
        }
        let this = *self;
        lock(&this.rows).extend(this.staged);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        Ok(())
    }
}
