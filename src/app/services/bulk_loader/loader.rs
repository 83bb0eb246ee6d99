//! Bulk loader implementation
//!
//! Rows are processed strictly in file order on the calling task. The
//! bulk-insert channel is always resolved before returning: committed on
//! success, rolled back on any flush failure.

use csv::StringRecord;
use std::io::Read;
use std::path::Path;
use tracing::{debug, error, info, warn};

use super::stats::{LoadOutcome, LoadReport};
use crate::app::services::observation_parser::validate_csv_record;
use crate::app::services::store::{BulkInsert, ObservationStore};
use crate::constants::HEADER_ROW_INDEX;
use crate::{Error, Result};

/// Read every record of a CSV source into memory
///
/// Records may have any number of fields; arity is checked per row during
/// validation so a short row is skipped rather than failing the file.
pub fn read_records<R: Read>(reader: R) -> std::result::Result<Vec<StringRecord>, csv::Error> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader)
        .records()
        .collect()
}

/// Loads observation files into an [`ObservationStore`] as one batch
pub struct BulkLoader<'a> {
    store: &'a dyn ObservationStore,
}

impl<'a> BulkLoader<'a> {
    pub fn new(store: &'a dyn ObservationStore) -> Self {
        Self { store }
    }

    /// Load a CSV file from disk
    pub async fn load_path(&self, path: &Path) -> Result<LoadReport> {
        info!("Loading data file `{}`", path.display());

        let file = std::fs::File::open(path)
            .map_err(|e| Error::io(format!("Failed to open {}", path.display()), e))?;
        let records = read_records(file).map_err(|e| {
            Error::csv_parsing(
                path.display().to_string(),
                "Failed to read CSV records",
                Some(e),
            )
        })?;

        self.load_records(&records).await
    }

    /// Load CSV text from any reader
    pub async fn load_reader<R: Read>(&self, reader: R) -> Result<LoadReport> {
        let records = read_records(reader)
            .map_err(|e| Error::csv_parsing("<reader>", "Failed to read CSV records", Some(e)))?;
        self.load_records(&records).await
    }

    /// Load already-read records; the first record is the header and is skipped
    pub async fn load_records(&self, records: &[StringRecord]) -> Result<LoadReport> {
        let mut batch = self
            .store
            .begin_bulk_insert()
            .await
            .map_err(|e| Error::load_aborted("Failed to open bulk insert transaction", e))?;
        let mut report = LoadReport::new();

        for (line, record) in records.iter().enumerate().skip(HEADER_ROW_INDEX + 1) {
            report.rows_read += 1;

            let observation = match validate_csv_record(record) {
                Ok(observation) => observation,
                Err(e) => {
                    warn!("line {}: {}", line, e);
                    report.rows_invalid += 1;
                    report.errors.push(format!("line {}: {}", line, e));
                    continue;
                }
            };

            match batch.append(&observation).await {
                Ok(()) => report.rows_appended += 1,
                Err(e) if e.is_duplicate() => {
                    debug!("line {}: duplicate s_no {} ignored", line, observation.s_no);
                    report.duplicates_ignored += 1;
                }
                Err(e) => {
                    warn!("line {}: insert failed: {}", line, e);
                    report.append_failures += 1;
                    report.errors.push(format!("line {}: {}", line, e));
                }
            }
        }

        self.finish(batch, report).await
    }

    /// Flush then commit, or roll back
    async fn finish(
        &self,
        mut batch: Box<dyn BulkInsert>,
        mut report: LoadReport,
    ) -> Result<LoadReport> {
        if let Err(e) = batch.flush().await {
            if let Err(rollback_err) = batch.rollback().await {
                warn!("rollback failed: {}", rollback_err);
            }

            if e.is_duplicate() {
                warn!(
                    "duplicate key at flush, discarding batch of {} rows: {}",
                    report.rows_appended, e
                );
                report.outcome = LoadOutcome::Discarded;
                return Ok(report);
            }

            error!("flush failed, batch rolled back: {}", e);
            return Err(Error::load_aborted("Flushing bulk insert failed", e));
        }

        if let Err(e) = batch.commit().await {
            error!("commit failed: {}", e);
            return Err(Error::load_aborted("Committing bulk insert failed", e));
        }

        report.outcome = LoadOutcome::Committed;
        info!(
            "Loaded {} of {} rows ({} invalid, {} duplicates, {} insert failures)",
            report.rows_loaded(),
            report.rows_read,
            report.rows_invalid,
            report.duplicates_ignored,
            report.append_failures
        );
        Ok(report)
    }
}
