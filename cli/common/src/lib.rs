//! Shared utilities for the multi-partition CLI binaries.
//!
//! Log level selection, stderr logging setup and number formatting used by
//! `mp-inspect`.

pub mod args;
pub mod format;
pub mod logging;

pub use args::LogLevel;
pub use format::format_number;
pub use logging::init_logging;
