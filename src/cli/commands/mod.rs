//! Command implementations
//!
//! Startup order is fixed: logging, argument check, configuration, database
//! connection, optional load, then serve.
//! - `load`: Bulk load a CSV file in one transaction
//! - `serve`: Run the query endpoint

pub mod load;
pub mod serve;
pub mod shared;

use std::sync::Arc;
use tracing::{info, warn};

use crate::app::services::store::{ObservationStore, PgObservationStore};
use crate::cli::args::Args;
use crate::{Error, Result};

/// Main command runner
pub async fn run(args: Args) -> Result<()> {
    shared::setup_logging(&args)?;

    if args.has_unexpected_arguments() {
        warn!("invalid parameters: {:?}", args.extra);
        return Ok(());
    }

    let config = shared::load_configuration(&args)?;
    let store: Arc<dyn ObservationStore> =
        Arc::new(PgObservationStore::connect(&config.db_account).await?);
    info!(
        "Connected to database {} at {}:{}",
        config.db_account.db_name, config.db_account.host, config.db_account.port
    );

    // Interrupting a load drops its channel, which rolls the transaction back
    if let Some(path) = &args.load {
        tokio::select! {
            result = load::run_load(store.as_ref(), path, args.quiet) => {
                result?;
            }
            _ = shared::shutdown_signal() => {
                return Err(Error::processing_interrupted(
                    "Load interrupted by user, transaction rolled back",
                ));
            }
        }
    }

    serve::run_serve(&config, store).await
}
