//! Validation and conversion of raw observation records
//!
//! This module turns the string fields of one CSV record into a typed
//! [`Observation`](crate::app::models::Observation).
//!
//! ## Architecture
//!
//! - [`datetime`] - Ordered layout table and tolerant date/time parsing
//! - [`field_parsers`] - Per-field conversions with column-specific errors
//! - [`record_parser`] - Whole-record validation, all-or-nothing
//!
//! ## Usage
//!
//! ```rust
//! use covid_observations::app::services::observation_parser::validate_record;
//!
//! let fields = ["1", "01/22/2020", "Anhui", "Mainland China", "1/22/2020 17:00", "1.0", "0.0", "0.0"];
//! let observation = validate_record(&fields).unwrap();
//! assert_eq!(observation.country_region, "Mainland China");
//! ```

pub mod datetime;
pub mod field_parsers;
pub mod record_parser;

#[cfg(test)]
pub mod tests;

pub use datetime::{DATETIME_LAYOUTS, DateTimeLayout, parse_datetime};
pub use record_parser::{validate_csv_record, validate_record};
