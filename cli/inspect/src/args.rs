//! CLI argument definitions for mp-inspect.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use mp_cli_common::LogLevel;
use std::path::PathBuf;

/// Inspect a two-dimensional partition space.
///
/// Reads a JSON definition of two partition dimensions and answers questions
/// about the resulting key space. Results are printed to stdout as JSON; a
/// summary goes to stderr.
///
/// ## Examples
///
/// List every key:
///   mp-inspect --config space.json keys
///
/// Page through keys, newest first:
///   mp-inspect --config space.json page --limit 50 --descending
///
/// Resolve dynamic dimensions from a store snapshot:
///   mp-inspect --config space.json --store-file store.json count
#[derive(Parser, Debug)]
#[command(name = "mp-inspect")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Partition space definition (JSON)
    #[arg(short, long, env = "MP_CONFIG")]
    pub config: PathBuf,

    /// Dynamic partitions snapshot: JSON object of name to list of keys
    #[arg(long, env = "MP_STORE_FILE")]
    pub store_file: Option<PathBuf>,

    /// Evaluate at this instant instead of now (RFC 3339)
    #[arg(long, env = "MP_CURRENT_TIME", value_parser = parse_current_time)]
    pub current_time: Option<DateTime<Utc>>,

    /// Log level
    #[arg(long, value_enum, default_value = "warn")]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

/// What to inspect.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List every partition key
    Keys,

    /// List one page of partition keys
    Page {
        /// Maximum number of keys on the page
        #[arg(long, default_value = "100")]
        limit: usize,

        /// Cursor returned with the previous page
        #[arg(long)]
        cursor: Option<String>,

        /// Iterate newest/last keys first
        #[arg(long)]
        descending: bool,
    },

    /// Check whether a key exists
    Check {
        /// Encoded partition key (e.g. "red|2024-01-01")
        key: String,
    },

    /// List the keys between two keys, inclusive
    Range {
        /// First key of the range
        start: String,
        /// Last key of the range
        end: String,
    },

    /// Count partitions
    Count,

    /// Print the definition's unique identifier
    Identifier,

    /// Print the time window of a key
    TimeWindow {
        /// Encoded partition key
        key: String,
    },

    /// Print the run tags of a key
    Tags {
        /// Encoded partition key
        key: String,
    },
}

/// Parse an RFC 3339 timestamp into UTC.
fn parse_current_time(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("'{s}' is not an RFC 3339 timestamp: {e}"))
}
