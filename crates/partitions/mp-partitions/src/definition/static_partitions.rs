//! Static partitions: a fixed, ordered list of keys.

use mp_error::Result;
use mp_types::PartitionKeyRange;

use super::{identifier_for, keys_in_range};

/// A partitions definition with a fixed list of keys.
///
/// Keys keep their declared order. Duplicates are tolerated and counted by
/// [`get_num_partitions`](Self::get_num_partitions).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StaticPartitionsDefinition {
    partition_keys: Vec<String>,
}

impl StaticPartitionsDefinition {
    /// Create a static definition from keys.
    pub fn new<I, S>(partition_keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            partition_keys: partition_keys.into_iter().map(Into::into).collect(),
        }
    }

    /// The declared keys.
    pub fn partition_keys(&self) -> &[String] {
        &self.partition_keys
    }

    /// Check if a key is declared.
    pub fn has_partition_key(&self, partition_key: &str) -> bool {
        self.partition_keys.iter().any(|key| key == partition_key)
    }

    /// Keys between two declared keys, inclusive.
    pub fn get_partition_keys_in_range(&self, range: &PartitionKeyRange) -> Result<Vec<String>> {
        keys_in_range(&self.partition_keys, range)
    }

    /// Number of declared keys, duplicates included.
    pub fn get_num_partitions(&self) -> usize {
        self.partition_keys.len()
    }

    /// SHA-1 over the declared key list.
    pub fn get_serializable_unique_identifier(&self) -> Result<String> {
        identifier_for(&self.partition_keys)
    }
}

impl std::fmt::Display for StaticPartitionsDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<String> = self.partition_keys.iter().map(|k| format!("'{k}'")).collect();
        write!(f, "Static partitions: [{}]", keys.join(", "))
    }
}
