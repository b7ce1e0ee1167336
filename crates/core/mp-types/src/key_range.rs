//! Inclusive partition key ranges.

use serde::{Deserialize, Serialize};

/// An inclusive range of partition keys.
///
/// Both endpoints are partition keys of the definition the range is applied
/// to. Whether `start` sorts before `end` is decided by the definition's own
/// enumeration order, not by string comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartitionKeyRange {
    /// First key of the range (inclusive)
    pub start: String,

    /// Last key of the range (inclusive)
    pub end: String,
}

impl PartitionKeyRange {
    /// Create a new range between two keys.
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Create a range containing exactly one key.
    pub fn single(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            start: key.clone(),
            end: key,
        }
    }
}
