//! Declarative configuration for partition spaces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::PartitionSchedule;

/// Configuration of a single partition dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DimensionConfig {
    /// Fixed list of keys
    Static {
        /// Partition keys, in enumeration order
        keys: Vec<String>,
    },

    /// Keys derived from a time schedule
    TimeWindow {
        /// Start of the first window
        start: DateTime<Utc>,

        /// Optional instant after which no windows are produced
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end: Option<DateTime<Utc>>,

        /// Window cadence
        #[serde(default)]
        schedule: PartitionSchedule,

        /// strftime-style key format (defaults per schedule)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fmt: Option<String>,

        /// Number of windows to add (or remove, if negative) past the last complete one
        #[serde(default)]
        end_offset: i64,
    },

    /// Keys registered at runtime in a dynamic partitions store
    Dynamic {
        /// Name the store tracks the keys under
        name: String,
    },
}

impl DimensionConfig {
    /// Short name of the configured dimension type.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Static { .. } => "static",
            Self::TimeWindow { .. } => "time_window",
            Self::Dynamic { .. } => "dynamic",
        }
    }
}

/// Configuration of a two-dimensional partition space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiPartitionsConfig {
    /// Dimension name to dimension configuration
    #[serde(default)]
    pub dimensions: BTreeMap<String, DimensionConfig>,
}

impl MultiPartitionsConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a dimension.
    pub fn with_dimension(mut self, name: impl Into<String>, dimension: DimensionConfig) -> Self {
        self.dimensions.insert(name.into(), dimension);
        self
    }
}
