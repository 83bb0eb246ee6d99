//! Request handling for `/top/confirmed`

use std::convert::Infallible;
use std::sync::Arc;
use tracing::{debug, error};
use warp::Reply;
use warp::http::{Method, StatusCode, header};
use warp::reply::Response;

use super::{MAX_RESULTS_PARAM, OBSERVATION_DATE_PARAM};
use crate::app::models::TopConfirmed;
use crate::app::services::observation_parser::parse_datetime;
use crate::app::services::store::ObservationStore;
use crate::constants::JSON_CONTENT_TYPE;

pub const MISSING_PARAMETER: &str = "observation_date or max_results parameter not found";
pub const INVALID_DATE: &str = "invalid observation date parameter";
pub const INVALID_MAX_RESULTS: &str = "invalid max result parameter";
pub const RETRIEVAL_FAILED: &str = "error while retrieving the data";
pub const SERIALIZATION_FAILED: &str = "unable to serialize the result to json";

/// First value of a repeated query parameter
fn first_param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn text(status: StatusCode, body: &'static str) -> Response {
    warp::reply::with_status(body, status).into_response()
}

/// Parse a non-negative row limit
pub fn parse_max_results(value: &str) -> Option<i64> {
    value.parse::<i64>().ok().filter(|n| *n >= 0)
}

/// Handle one `/top/confirmed` request
pub async fn top_confirmed(
    method: Method,
    params: Vec<(String, String)>,
    store: Arc<dyn ObservationStore>,
) -> Result<Response, Infallible> {
    if method != Method::GET {
        return Ok(StatusCode::METHOD_NOT_ALLOWED.into_response());
    }

    let (Some(date), Some(max_results)) = (
        first_param(&params, OBSERVATION_DATE_PARAM),
        first_param(&params, MAX_RESULTS_PARAM),
    ) else {
        return Ok(text(StatusCode::BAD_REQUEST, MISSING_PARAMETER));
    };

    let Ok(observation_date) = parse_datetime(date) else {
        return Ok(text(StatusCode::BAD_REQUEST, INVALID_DATE));
    };
    let Some(limit) = parse_max_results(max_results) else {
        return Ok(text(StatusCode::BAD_REQUEST, INVALID_MAX_RESULTS));
    };

    debug!("top confirmed for {} limit {}", observation_date, limit);

    let countries = match store.top_confirmed(observation_date, limit).await {
        Ok(countries) => countries,
        Err(e) => {
            error!("top confirmed query failed: {}", e);
            return Ok(text(StatusCode::INTERNAL_SERVER_ERROR, RETRIEVAL_FAILED));
        }
    };

    let result = TopConfirmed::new(observation_date.date(), countries);
    match serde_json::to_vec(&result) {
        Ok(body) => Ok(
            warp::reply::with_header(body, header::CONTENT_TYPE, JSON_CONTENT_TYPE).into_response(),
        ),
        Err(e) => {
            error!("failed to serialize top confirmed result: {}", e);
            Ok(text(StatusCode::INTERNAL_SERVER_ERROR, SERIALIZATION_FAILED))
        }
    }
}
