//! Integration tests for loading observation CSV files
//!
//! These tests drive the public loader API end to end against the in-memory
//! store, using files written to a temporary directory.

use covid_observations::app::services::bulk_loader::{BulkLoader, LoadOutcome};
use covid_observations::app::services::store::{DuplicateCheck, MemoryStore, ObservationStore};
use std::io::Write;
use tempfile::NamedTempFile;

const SAMPLE: &str = "\
SNo,ObservationDate,Province/State,Country/Region,Last Update,Confirmed,Deaths,Recovered
1,01/22/2020,Anhui,Mainland China,1/22/2020 17:00,1.0,0.0,0.0
2,01/22/2020,Beijing,Mainland China,1/22/2020 17:00,14.0,0.0,0.0
3,01/22/2020,,Japan,1/22/2020 17:00,2.0,0.0,0.0
4,01/22/2020,Washington,US,1/22/2020 17:00,1.0,0.0,0.0
5,02/01/2020,Hubei,Mainland China,2020-02-01T19:53:03,7153.0,249.0,168.0
6,02/01/2020,,Japan,2/1/20 18:03,20.0,0.0,1.0
bad,02/01/2020,,Nowhere,2/1/20 18:03,1.0,0.0,0.0
8,13/45/2020,,Nowhere,2/1/20 18:03,1.0,0.0,0.0
";

fn write_sample(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write temp file");
    file.flush().expect("Failed to flush temp file");
    file
}

/// Test loading a mixed file with good rows, bad rows and several date layouts
///
/// Purpose: Validate the whole load path from file to committed rows
/// Benefit: Ensures invalid rows are skipped without losing their neighbours
#[tokio::test]
async fn test_load_sample_file() {
    let file = write_sample(SAMPLE);
    let store = MemoryStore::new(DuplicateCheck::OnAppend);

    let report = BulkLoader::new(&store)
        .load_path(file.path())
        .await
        .expect("Load should succeed");

    assert_eq!(report.rows_read, 8);
    assert_eq!(report.rows_loaded(), 6);
    assert_eq!(report.rows_invalid, 2);
    assert_eq!(report.outcome, LoadOutcome::Committed);

    let rows = store.rows();
    let hubei = rows.iter().find(|o| o.s_no == 5).expect("Hubei row");
    assert_eq!(hubei.last_update.to_string(), "2020-02-01 19:53:03");
    assert_eq!(hubei.confirmed, 7153.0);

    let japan = rows.iter().find(|o| o.s_no == 6).expect("Japan row");
    assert_eq!(japan.province_state, "");
    assert_eq!(japan.last_update.to_string(), "2020-02-01 18:03:00");
}

/// Test that loaded rows are immediately queryable
///
/// Purpose: Validate the loader and the aggregate query agree on dates
/// Benefit: Catches time-of-day drift between parsed and queried dates
#[tokio::test]
async fn test_loaded_rows_are_queryable() {
    let file = write_sample(SAMPLE);
    let store = MemoryStore::new(DuplicateCheck::OnAppend);
    BulkLoader::new(&store)
        .load_path(file.path())
        .await
        .expect("Load should succeed");

    let date = chrono::NaiveDate::from_ymd_opt(2020, 1, 22)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let totals = store.top_confirmed(date, 2).await.expect("Query should succeed");

    assert_eq!(totals.len(), 2);
    assert_eq!(totals[0].country_region, "Mainland China");
    assert_eq!(totals[0].confirmed, 15.0);
    assert_eq!(totals[1].country_region, "Japan");
}

/// Test reloading the same file
///
/// Purpose: Validate duplicate keys are skipped when detected per row
/// Benefit: Reruns of a load do not double-count observations
#[tokio::test]
async fn test_reload_skips_existing_keys() {
    let file = write_sample(SAMPLE);
    let store = MemoryStore::new(DuplicateCheck::OnAppend);
    let loader = BulkLoader::new(&store);

    loader.load_path(file.path()).await.expect("First load");
    let second = loader.load_path(file.path()).await.expect("Second load");

    assert_eq!(second.duplicates_ignored, 6);
    assert_eq!(second.rows_loaded(), 0);
    assert_eq!(store.len(), 6);
}

/// Test a duplicate that only surfaces when the batch is flushed
///
/// Purpose: Validate the whole batch is discarded, not partially committed
/// Benefit: Storage never holds half of a file
#[tokio::test]
async fn test_flush_time_duplicate_discards_everything() {
    let content = format!(
        "{}1,01/22/2020,Anhui,Mainland China,1/22/2020 17:00,1.0,0.0,0.0\n",
        SAMPLE
    );
    let file = write_sample(&content);
    let store = MemoryStore::new(DuplicateCheck::OnFlush);

    let report = BulkLoader::new(&store)
        .load_path(file.path())
        .await
        .expect("Discarded batch is not an error");

    assert_eq!(report.outcome, LoadOutcome::Discarded);
    assert!(store.is_empty());
}

/// Test that a file the CSV reader cannot parse is fatal
///
/// Purpose: Validate unreadable input stops the load before any insert
/// Benefit: Corrupt files fail loudly instead of loading partially
#[tokio::test]
async fn test_unparseable_file_is_fatal() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"SNo,ObservationDate\n1,\"unterminated\xff\n").unwrap();
    file.flush().unwrap();

    let store = MemoryStore::new(DuplicateCheck::OnAppend);
    let result = BulkLoader::new(&store).load_path(file.path()).await;

    assert!(result.is_err());
    assert!(store.is_empty());
}
