//! Shared components for CLI commands

use tracing::{debug, info, warn};

use crate::Result;
use crate::cli::args::Args;
use crate::config::Config;

/// Set up structured logging
pub fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("covid_observations={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration from `--config` or the default location
pub fn load_configuration(args: &Args) -> Result<Config> {
    let path = match &args.config_file {
        Some(path) => path.clone(),
        None => Config::default_config_path()?,
    };

    let config = Config::load(&path)?;
    info!(
        "Configuration loaded, server will bind {}:{}",
        config.bind_host(),
        config.ws_port
    );
    Ok(config)
}

/// Resolves on the first Ctrl+C
///
/// If the handler cannot be installed the future never resolves and the
/// process keeps the default signal behaviour.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => eprintln!("\nReceived CTRL+C, shutting down gracefully..."),
        Err(e) => {
            warn!("Failed to install CTRL+C signal handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
