//! Dynamic partitions store trait and in-memory implementation.

use mp_error::Result;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::trace;

/// Trait for dynamic partition registries.
///
/// Implementations may perform I/O on every call, so callers should
/// enumerate a dimension once per operation instead of probing per key.
///
/// Implementations include:
/// - In-memory store (for testing/development)
/// - Instance-backed stores owned by the orchestration layer
pub trait DynamicPartitionsStore: Send + Sync {
    /// Returns the keys registered under `partitions_def_name`, in
    /// registration order. Unknown names yield an empty list.
    fn get_dynamic_partitions(&self, partitions_def_name: &str) -> Result<Vec<String>>;

    /// Checks whether `partition_key` is registered under `partitions_def_name`.
    fn has_dynamic_partition(&self, partitions_def_name: &str, partition_key: &str) -> Result<bool> {
        Ok(self
            .get_dynamic_partitions(partitions_def_name)?
            .iter()
            .any(|key| key == partition_key))
    }
}

/// In-memory dynamic partitions store.
///
/// Keeps keys in registration order and ignores duplicate registrations.
/// Counts lookups so tests can assert how often the store was consulted.
#[derive(Debug, Default)]
pub struct InMemoryPartitionsStore {
    partitions: RwLock<HashMap<String, Vec<String>>>,
    lookups: AtomicUsize,
}

impl InMemoryPartitionsStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register keys under a name, skipping keys that already exist.
    pub fn add_partitions<I, S>(&self, partitions_def_name: &str, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut partitions = self.partitions.write();
        let registered = partitions.entry(partitions_def_name.to_string()).or_default();
        for key in keys {
            let key = key.into();
            if !registered.contains(&key) {
                registered.push(key);
            }
        }
        trace!(
            name = %partitions_def_name,
            count = registered.len(),
            "Registered dynamic partitions"
        );
    }

    /// Remove a key. Returns `true` if it was registered.
    pub fn delete_partition(&self, partitions_def_name: &str, partition_key: &str) -> bool {
        let mut partitions = self.partitions.write();
        let Some(registered) = partitions.get_mut(partitions_def_name) else {
            return false;
        };
        let before = registered.len();
        registered.retain(|key| key != partition_key);
        before != registered.len()
    }

    /// Number of lookups served so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }
}

impl DynamicPartitionsStore for InMemoryPartitionsStore {
    fn get_dynamic_partitions(&self, partitions_def_name: &str) -> Result<Vec<String>> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        trace!(name = %partitions_def_name, "Dynamic partitions lookup");
        Ok(self
            .partitions
            .read()
            .get(partitions_def_name)
            .cloned()
            .unwrap_or_default())
    }

    fn has_dynamic_partition(&self, partitions_def_name: &str, partition_key: &str) -> Result<bool> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .partitions
            .read()
            .get(partitions_def_name)
            .is_some_and(|keys| keys.iter().any(|key| key == partition_key)))
    }
}
