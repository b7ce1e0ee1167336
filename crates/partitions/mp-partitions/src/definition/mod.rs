//! Single-dimension partitions definitions.
//!
//! [`PartitionsDefinition`] is the closed set of definition kinds a
//! partition space is built from:
//!
//! - [`StaticPartitionsDefinition`] - a fixed list of keys
//! - [`TimeWindowPartitionsDefinition`] - one key per schedule window
//! - [`DynamicPartitionsDefinition`] - keys registered at runtime
//! - [`MultiPartitionsDefinition`] - the cross-product of two of the above
//!
//! Every kind answers the same questions (enumerate, contains, range,
//! identifier, count) against a [`PartitionLoadingContext`].

mod dynamic;
mod static_partitions;
mod time_window;

pub use dynamic::{DynamicPartitionsDefinition, PartitionFn};
pub use static_partitions::StaticPartitionsDefinition;
pub use time_window::{TimeWindowPartitionsDefinition, MAX_END_OFFSET};

use mp_error::{MpError, Result};
use mp_types::{DimensionConfig, PartitionKeyRange, TimeWindow};
use serde::Serialize;
use sha1::{Digest, Sha1};

use crate::context::PartitionLoadingContext;
use crate::multi::MultiPartitionsDefinition;

/// Kind of a partitions definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartitionsDefinitionKind {
    /// [`StaticPartitionsDefinition`]
    Static,
    /// [`TimeWindowPartitionsDefinition`]
    TimeWindow,
    /// [`DynamicPartitionsDefinition`]
    Dynamic,
    /// [`MultiPartitionsDefinition`]
    Multi,
}

impl std::fmt::Display for PartitionsDefinitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static => write!(f, "StaticPartitionsDefinition"),
            Self::TimeWindow => write!(f, "TimeWindowPartitionsDefinition"),
            Self::Dynamic => write!(f, "DynamicPartitionsDefinition"),
            Self::Multi => write!(f, "MultiPartitionsDefinition"),
        }
    }
}

/// A partitions definition of any kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PartitionsDefinition {
    /// Fixed list of keys
    Static(StaticPartitionsDefinition),
    /// Keys derived from a time schedule
    TimeWindow(TimeWindowPartitionsDefinition),
    /// Keys registered at runtime
    Dynamic(DynamicPartitionsDefinition),
    /// Cross-product of two definitions
    Multi(Box<MultiPartitionsDefinition>),
}

impl PartitionsDefinition {
    /// Kind of this definition.
    pub fn kind(&self) -> PartitionsDefinitionKind {
        match self {
            Self::Static(_) => PartitionsDefinitionKind::Static,
            Self::TimeWindow(_) => PartitionsDefinitionKind::TimeWindow,
            Self::Dynamic(_) => PartitionsDefinitionKind::Dynamic,
            Self::Multi(_) => PartitionsDefinitionKind::Multi,
        }
    }

    /// Build a definition from its configuration.
    pub fn from_config(config: &DimensionConfig) -> Result<Self> {
        let def = match config {
            DimensionConfig::Static { keys } => {
                Self::Static(StaticPartitionsDefinition::new(keys.iter().cloned()))
            }
            DimensionConfig::TimeWindow {
                start,
                end,
                schedule,
                fmt,
                end_offset,
            } => {
                let mut def = TimeWindowPartitionsDefinition::new(*start, *schedule)
                    .with_end_offset(*end_offset);
                if let Some(end) = end {
                    def = def.with_end(*end);
                }
                if let Some(fmt) = fmt {
                    def = def.with_fmt(fmt.clone());
                }
                def.validate()?;
                Self::TimeWindow(def)
            }
            DimensionConfig::Dynamic { name } => {
                Self::Dynamic(DynamicPartitionsDefinition::new(name.clone()))
            }
        };
        Ok(def)
    }

    /// The time-window definition, if this is one.
    pub fn as_time_window(&self) -> Option<&TimeWindowPartitionsDefinition> {
        match self {
            Self::TimeWindow(def) => Some(def),
            _ => None,
        }
    }

    /// All keys, in the definition's enumeration order.
    pub fn get_partition_keys(&self, ctx: &PartitionLoadingContext) -> Result<Vec<String>> {
        match self {
            Self::Static(def) => Ok(def.partition_keys().to_vec()),
            Self::TimeWindow(def) => def.get_partition_keys(ctx),
            Self::Dynamic(def) => def.get_partition_keys(ctx),
            Self::Multi(def) => Ok(def
                .get_partition_keys(ctx)?
                .iter()
                .map(ToString::to_string)
                .collect()),
        }
    }

    /// Check if a key belongs to the definition.
    pub fn has_partition_key(&self, partition_key: &str, ctx: &PartitionLoadingContext) -> Result<bool> {
        match self {
            Self::Static(def) => Ok(def.has_partition_key(partition_key)),
            Self::TimeWindow(def) => def.has_partition_key(partition_key, ctx),
            Self::Dynamic(def) => def.has_partition_key(partition_key, ctx),
            Self::Multi(def) => def.has_partition_key(partition_key, ctx),
        }
    }

    /// Keys between the range endpoints, inclusive.
    ///
    /// Fails with [`MpError::UnknownPartition`] if an endpoint is not a key.
    pub fn get_partition_keys_in_range(
        &self,
        range: &PartitionKeyRange,
        ctx: &PartitionLoadingContext,
    ) -> Result<Vec<String>> {
        match self {
            Self::Static(def) => def.get_partition_keys_in_range(range),
            Self::TimeWindow(def) => def.get_partition_keys_in_range(range, ctx),
            Self::Dynamic(def) => def.get_partition_keys_in_range(range, ctx),
            Self::Multi(def) => Ok(def
                .get_partition_keys_in_range(range, ctx)?
                .iter()
                .map(ToString::to_string)
                .collect()),
        }
    }

    /// Stable fingerprint of the definition's key set.
    pub fn get_serializable_unique_identifier(&self, ctx: &PartitionLoadingContext) -> Result<String> {
        match self {
            Self::Static(def) => def.get_serializable_unique_identifier(),
            Self::TimeWindow(def) => def.get_serializable_unique_identifier(),
            Self::Dynamic(def) => def.get_serializable_unique_identifier(ctx),
            Self::Multi(def) => def.get_serializable_unique_identifier(ctx),
        }
    }

    /// Number of keys. Static definitions count duplicates.
    pub fn get_num_partitions(&self, ctx: &PartitionLoadingContext) -> Result<usize> {
        match self {
            Self::Static(def) => Ok(def.get_num_partitions()),
            Self::TimeWindow(def) => def.get_num_partitions(ctx),
            Self::Dynamic(def) => def.get_num_partitions(ctx),
            Self::Multi(def) => def.get_num_partitions(ctx),
        }
    }

    /// The time window a key covers.
    ///
    /// Only time-window definitions, and multi-partitions definitions with
    /// exactly one time-window dimension, have time windows.
    pub fn time_window_for_partition_key(&self, partition_key: &str) -> Result<TimeWindow> {
        match self {
            Self::TimeWindow(def) => def.time_window_for_partition_key(partition_key),
            Self::Multi(def) => def.time_window_for_partition_key(partition_key),
            other => Err(MpError::Invariant(format!(
                "{} has no time windows",
                other.kind()
            ))),
        }
    }
}

impl std::fmt::Display for PartitionsDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(def) => std::fmt::Display::fmt(def, f),
            Self::TimeWindow(def) => std::fmt::Display::fmt(def, f),
            Self::Dynamic(def) => std::fmt::Display::fmt(def, f),
            Self::Multi(def) => std::fmt::Display::fmt(def, f),
        }
    }
}

impl From<StaticPartitionsDefinition> for PartitionsDefinition {
    fn from(def: StaticPartitionsDefinition) -> Self {
        Self::Static(def)
    }
}

impl From<TimeWindowPartitionsDefinition> for PartitionsDefinition {
    fn from(def: TimeWindowPartitionsDefinition) -> Self {
        Self::TimeWindow(def)
    }
}

impl From<DynamicPartitionsDefinition> for PartitionsDefinition {
    fn from(def: DynamicPartitionsDefinition) -> Self {
        Self::Dynamic(def)
    }
}

impl From<MultiPartitionsDefinition> for PartitionsDefinition {
    fn from(def: MultiPartitionsDefinition) -> Self {
        Self::Multi(Box::new(def))
    }
}

/// Hex SHA-1 of the JSON encoding of `value`.
pub(crate) fn identifier_for<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let payload = serde_json::to_vec(value).map_err(|e| MpError::Other(e.into()))?;
    Ok(hex::encode(Sha1::digest(&payload)))
}

/// Inclusive slice of `keys` between the first occurrences of the endpoints.
pub(crate) fn keys_in_range(keys: &[String], range: &PartitionKeyRange) -> Result<Vec<String>> {
    let locate = |key: &str| {
        keys.iter().position(|k| k == key).ok_or_else(|| {
            MpError::UnknownPartition(format!("'{key}' is not a partition key"))
        })
    };
    let first = locate(&range.start)?;
    let last = locate(&range.end)?;
    if first > last {
        return Ok(Vec::new());
    }
    Ok(keys[first..=last].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mp_types::PartitionSchedule;

    #[test]
    fn test_kind_display() {
        let def: PartitionsDefinition = StaticPartitionsDefinition::new(["a"]).into();
        assert_eq!(def.kind(), PartitionsDefinitionKind::Static);
        assert_eq!(def.kind().to_string(), "StaticPartitionsDefinition");
    }

    #[test]
    fn test_from_config_time_window() {
        let config = DimensionConfig::TimeWindow {
            start: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end: None,
            schedule: PartitionSchedule::Hourly,
            fmt: Some("%Y%m%d%H".to_string()),
            end_offset: 0,
        };

        let def = PartitionsDefinition::from_config(&config).unwrap();
        let tw = def.as_time_window().unwrap();
        assert_eq!(tw.key_format(), "%Y%m%d%H");
        assert_eq!(tw.schedule(), PartitionSchedule::Hourly);
    }

    #[test]
    fn test_display_delegates_to_kind() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let def: PartitionsDefinition = TimeWindowPartitionsDefinition::daily(start).into();
        assert_eq!(def.to_string(), "Daily, starting 2024-01-01 00:00 UTC.");

        let def: PartitionsDefinition = StaticPartitionsDefinition::new(["a", "b"]).into();
        assert_eq!(def.to_string(), "Static partitions: ['a', 'b']");

        let def: PartitionsDefinition = DynamicPartitionsDefinition::new("customers").into();
        assert_eq!(def.to_string(), "Dynamic partitions: \"customers\"");
    }

    #[test]
    fn test_from_config_rejects_unbounded_end_offset() {
        let config = DimensionConfig::TimeWindow {
            start: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end: None,
            schedule: PartitionSchedule::Daily,
            fmt: None,
            end_offset: i64::MAX,
        };
        assert!(matches!(
            PartitionsDefinition::from_config(&config),
            Err(MpError::Definition(_))
        ));
    }

    #[test]
    fn test_from_config_rejects_bad_format() {
        let config = DimensionConfig::TimeWindow {
            start: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end: None,
            schedule: PartitionSchedule::Daily,
            fmt: Some("%Q".to_string()),
            end_offset: 0,
        };
        assert!(matches!(
            PartitionsDefinition::from_config(&config),
            Err(MpError::Definition(_))
        ));
    }

    #[test]
    fn test_time_window_for_non_time_definition() {
        let def: PartitionsDefinition = StaticPartitionsDefinition::new(["a"]).into();
        assert!(matches!(
            def.time_window_for_partition_key("a"),
            Err(MpError::Invariant(_))
        ));
    }

    #[test]
    fn test_keys_in_range_reversed_is_empty() {
        let keys: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let range = PartitionKeyRange::new("c", "a");
        assert!(keys_in_range(&keys, &range).unwrap().is_empty());
    }

    #[test]
    fn test_identifier_is_sha1_hex() {
        let id = identifier_for(&["a", "b"]).unwrap();
        assert_eq!(id.len(), 40);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
