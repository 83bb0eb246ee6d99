//! Command-line argument definitions
//!
//! The binary has a single mode: optionally bulk load a CSV file, then serve
//! the query endpoint. Positional arguments are captured rather than rejected
//! so that a stray argument without `--load` can be reported and ignored.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// CLI arguments for the COVID observation service
#[derive(Debug, Clone, Parser)]
#[command(
    name = "covid_observations",
    version,
    about = "Load COVID-19 observation CSV files into PostgreSQL and serve per-country totals",
    long_about = "Reads configuration from config.json next to the executable, connects to \
                  PostgreSQL, optionally bulk loads an observation CSV file in one transaction, \
                  then serves GET /top/confirmed?observation_date=yyyy-mm-dd&max_results=N."
)]
pub struct Args {
    /// Parse and load a covid observation CSV file before serving
    ///
    /// Relative paths are resolved against the current directory.
    #[arg(
        long = "load",
        value_name = "PATH",
        help = "Parse and load a covid observation CSV file"
    )]
    pub load: Option<PathBuf>,

    /// Configuration file, defaults to config.json beside the executable
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Configuration file (default: config.json beside the executable)"
    )]
    pub config_file: Option<PathBuf>,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        help = "Increase logging verbosity (-v info, -vv debug, -vvv trace)"
    )]
    pub verbose: u8,

    /// Only log errors
    #[arg(
        short = 'q',
        long = "quiet",
        conflicts_with = "verbose",
        help = "Only log errors"
    )]
    pub quiet: bool,

    #[arg(hide = true, value_name = "ARGS")]
    pub extra: Vec<String>,
}

impl Args {
    /// Get log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Arguments were given but none of them asked for a load
    pub fn has_unexpected_arguments(&self) -> bool {
        self.load.is_none() && !self.extra.is_empty()
    }
}

/// Whether a raw argument list asks for a load
///
/// Used when clap rejects the command line, to decide between reporting the
/// clap error and the lenient "invalid parameters" exit.
pub fn requests_load<I, S>(argv: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    argv.into_iter()
        .skip(1)
        .any(|arg| arg.as_ref() == "--load" || arg.as_ref().starts_with("--load="))
}
