//! HTTP endpoint ranking countries by confirmed cases
//!
//! Serves `GET /top/confirmed?observation_date=<date>&max_results=<n>`. Each
//! request runs one read-only aggregate query through the shared
//! [`ObservationStore`]; nothing is cached between requests.

pub mod handlers;

#[cfg(test)]
pub mod tests;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use warp::Filter;

use crate::app::services::store::ObservationStore;
use crate::config::Config;
use crate::{Error, Result};

/// Query parameter holding the observation date
pub const OBSERVATION_DATE_PARAM: &str = "observation_date";

/// Query parameter holding the result limit
pub const MAX_RESULTS_PARAM: &str = "max_results";

/// Build the `/top/confirmed` route
///
/// The route matches any method so the handler can answer non-GET requests
/// with 405 rather than letting them fall through to a 404.
pub fn routes(
    store: Arc<dyn ObservationStore>,
) -> impl Filter<Extract = (warp::reply::Response,), Error = warp::Rejection> + Clone {
    let store = warp::any().map(move || Arc::clone(&store));

    warp::path!("top" / "confirmed")
        .and(warp::method())
        .and(warp::query::<Vec<(String, String)>>())
        .and(store)
        .and_then(handlers::top_confirmed)
}

/// Resolve the configured bind address
pub async fn bind_address(config: &Config) -> Result<SocketAddr> {
    let host = config.bind_host();
    tokio::net::lookup_host((host, config.ws_port))
        .await
        .map_err(|e| Error::io(format!("Failed to resolve {}:{}", host, config.ws_port), e))?
        .next()
        .ok_or_else(|| {
            Error::configuration(format!(
                "No address found for {}:{}",
                host, config.ws_port
            ))
        })
}

/// Serve the endpoint until `shutdown` resolves
///
/// In-flight requests are completed before this returns.
pub async fn serve<F>(
    config: &Config,
    store: Arc<dyn ObservationStore>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = bind_address(config).await?;
    let (bound, server) = warp::serve(routes(store))
        .try_bind_with_graceful_shutdown(addr, shutdown)
        .map_err(|e| Error::server(format!("Failed to bind {}", addr), Some(e)))?;

    info!("Server listening on {}", bound);
    info!(
        "Example: GET http://{}:{}/top/confirmed?{}=yyyy-mm-dd&{}=2",
        config.display_host(),
        bound.port(),
        OBSERVATION_DATE_PARAM,
        MAX_RESULTS_PARAM
    );

    server.await;
    info!("Server stopped");
    Ok(())
}
