//! Application constants for the observation loader
//!
//! This module contains the CSV layout, storage names and default values
//! used throughout the application.

// =============================================================================
// CSV Layout
// =============================================================================

/// Number of fields every observation record must carry
pub const CSV_FIELD_COUNT: usize = 8;

/// Maximum byte length of the province/state and country/region columns
pub const MAX_TEXT_FIELD_LENGTH: usize = 200;

/// Index of the header row in a data file; data rows follow it
pub const HEADER_ROW_INDEX: usize = 0;

// =============================================================================
// Storage
// =============================================================================

/// Target table for loaded observations
pub const OBSERVATIONS_TABLE: &str = "covid_observations";

/// Table columns in CSV order
pub const OBSERVATION_COLUMNS: &[&str] = &[
    "s_no",
    "observation_date",
    "province_state",
    "country_region",
    "last_update",
    "confirmed",
    "deaths",
    "recovered",
];

/// SQLSTATE reported by PostgreSQL for unique constraint violations
pub const PG_UNIQUE_VIOLATION: &str = "23505";

/// Default connection pool size for the query endpoint
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

// =============================================================================
// Configuration & HTTP
// =============================================================================

/// Configuration file expected beside the executable
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Host used when `ws_host` is left empty
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";

/// Output format for the date label of query results
pub const RESULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Content type of successful query responses
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
