//! Transactional bulk loading of observation files
//!
//! The loader reads a whole CSV file, validates each data row and streams
//! valid rows into one bulk-insert channel. Invalid rows and duplicate keys
//! are logged and skipped; a failed flush or commit aborts the batch.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use covid_observations::app::services::bulk_loader::BulkLoader;
//! use covid_observations::app::services::store::{DuplicateCheck, MemoryStore};
//!
//! # async fn example() -> covid_observations::Result<()> {
//! let store = MemoryStore::new(DuplicateCheck::OnAppend);
//! let report = BulkLoader::new(&store)
//!     .load_path(std::path::Path::new("covid_19_data.csv"))
//!     .await?;
//!
//! println!("{} rows loaded, {} skipped", report.rows_loaded(), report.rows_invalid);
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod stats;

#[cfg(test)]
pub mod tests;

pub use loader::{BulkLoader, read_records};
pub use stats::{LoadOutcome, LoadReport};
