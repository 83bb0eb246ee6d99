//! COVID-19 Observations Library
//!
//! Loads COVID-19 observation CSV files into PostgreSQL and answers
//! "which countries had the most confirmed cases on a given day" over HTTP.
//!
//! This library provides tools for:
//! - Parsing timestamps written in any of the dataset's historical layouts
//! - Validating CSV rows into typed observations
//! - Bulk loading a whole file in one transaction via `COPY FROM STDIN`
//! - Serving per-country confirmed/deaths/recovered totals as JSON

pub mod config;
pub mod constants;
pub mod error;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod bulk_loader;
        pub mod observation_parser;
        pub mod store;
        pub mod top_confirmed;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{CountryTotals, Observation, TopConfirmed};
pub use config::Config;
pub use error::{Error, Result};
