//! Storage for observations
//!
//! [`ObservationStore`] is the seam between the loader/query endpoint and the
//! database. Loading goes through a [`BulkInsert`] channel opened inside a
//! transaction: rows are appended one at a time, then flushed, then either
//! committed or rolled back.
//!
//! - [`postgres`] - PostgreSQL via sqlx, rows shipped with `COPY FROM STDIN`
//! - [`memory`] - In-process store with configurable duplicate detection

pub mod memory;
pub mod postgres;

#[cfg(test)]
pub mod tests;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::app::models::{CountryTotals, Observation};
use crate::error::StoreError;

pub use memory::{DuplicateCheck, MemoryStore};
pub use postgres::PgObservationStore;

/// Result type for storage operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// A transaction-scoped bulk-insert channel
///
/// Dropping a channel without calling [`commit`](BulkInsert::commit) discards
/// everything appended to it.
#[async_trait]
pub trait BulkInsert: Send {
    /// Stream one row into the channel
    async fn append(&mut self, observation: &Observation) -> StoreResult<()>;

    /// Push buffered rows to storage
    async fn flush(&mut self) -> StoreResult<()>;

    /// Make flushed rows permanent
    async fn commit(self: Box<Self>) -> StoreResult<()>;

    /// Discard everything appended since the channel was opened
    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}

/// Persistent observation storage
#[async_trait]
pub trait ObservationStore: Send + Sync {
    /// Open a transaction and a bulk-insert channel inside it
    async fn begin_bulk_insert(&self) -> StoreResult<Box<dyn BulkInsert>>;

    /// Per-country sums for one observation date, largest confirmed first
    async fn top_confirmed(
        &self,
        observation_date: NaiveDateTime,
        limit: i64,
    ) -> StoreResult<Vec<CountryTotals>>;
}
