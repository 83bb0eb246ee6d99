//! Serve command implementation

use std::sync::Arc;
use tracing::info;

use crate::Result;
use crate::app::services::store::ObservationStore;
use crate::app::services::top_confirmed;
use crate::cli::commands::shared::shutdown_signal;
use crate::config::Config;

/// Serve the query endpoint until Ctrl+C
pub async fn run_serve(config: &Config, store: Arc<dyn ObservationStore>) -> Result<()> {
    info!("Starting query server");
    top_confirmed::serve(config, store, shutdown_signal()).await
}
