//! Load command implementation

use std::path::Path;
use std::time::Instant;
use tracing::info;

use crate::Result;
use crate::app::services::bulk_loader::{BulkLoader, LoadOutcome, LoadReport};
use crate::app::services::store::ObservationStore;

/// Bulk load one CSV file and report the result
pub async fn run_load(
    store: &dyn ObservationStore,
    path: &Path,
    quiet: bool,
) -> Result<LoadReport> {
    let start = Instant::now();
    let report = BulkLoader::new(store).load_path(path).await?;
    let elapsed = start.elapsed();

    info!("Load finished in {:.2?}", elapsed);
    if !quiet {
        print_summary(path, &report, elapsed);
    }
    Ok(report)
}

fn print_summary(path: &Path, report: &LoadReport, elapsed: std::time::Duration) {
    println!("\nLoad summary for `{}`", path.display());
    println!("   • Rows read: {}", report.rows_read);
    println!(
        "   • Rows loaded: {} ({:.1}%)",
        report.rows_loaded(),
        report.success_rate()
    );
    println!("   • Invalid rows: {}", report.rows_invalid);
    println!("   • Duplicates ignored: {}", report.duplicates_ignored);
    if report.append_failures > 0 {
        println!("   • Insert failures: {}", report.append_failures);
    }
    if report.outcome == LoadOutcome::Discarded {
        println!("   • Batch discarded: duplicate key detected at flush");
    }
    println!("   • Time: {:.2?}", elapsed);
}
