//! Dynamic partitions: keys registered at runtime.

use chrono::{DateTime, Utc};
use mp_error::Result;
use mp_types::PartitionKeyRange;
use std::sync::Arc;
use tracing::trace;

use super::{identifier_for, keys_in_range};
use crate::context::PartitionLoadingContext;

/// Callback producing the keys of an unnamed dynamic definition.
pub type PartitionFn = Arc<dyn Fn(Option<DateTime<Utc>>) -> Vec<String> + Send + Sync>;

#[derive(Clone)]
enum DynamicSource {
    /// Keys live in the dynamic partitions store under this name.
    Store { name: String },
    /// Keys are computed by a callback from the current time.
    Function(PartitionFn),
}

/// A partitions definition whose keys are added and removed at runtime.
///
/// Named definitions read their keys from the
/// [`DynamicPartitionsStore`](mp_traits::DynamicPartitionsStore) in the
/// loading context. Unnamed definitions compute their keys with a callback;
/// those cannot be used as a dimension of a multi-partitions definition.
#[derive(Clone)]
pub struct DynamicPartitionsDefinition {
    source: DynamicSource,
}

impl DynamicPartitionsDefinition {
    /// A store-backed definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            source: DynamicSource::Store { name: name.into() },
        }
    }

    /// An unnamed definition whose keys come from `partition_fn`.
    pub fn from_fn<F>(partition_fn: F) -> Self
    where
        F: Fn(Option<DateTime<Utc>>) -> Vec<String> + Send + Sync + 'static,
    {
        Self {
            source: DynamicSource::Function(Arc::new(partition_fn)),
        }
    }

    /// Store name, if the definition is store-backed.
    pub fn name(&self) -> Option<&str> {
        match &self.source {
            DynamicSource::Store { name } => Some(name),
            DynamicSource::Function(_) => None,
        }
    }

    /// Current keys. Store-backed definitions need a store in `ctx`.
    pub fn get_partition_keys(&self, ctx: &PartitionLoadingContext) -> Result<Vec<String>> {
        match &self.source {
            DynamicSource::Store { name } => {
                let keys = ctx.require_store(name)?.get_dynamic_partitions(name)?;
                trace!(name = %name, count = keys.len(), "Loaded dynamic partition keys");
                Ok(keys)
            }
            DynamicSource::Function(partition_fn) => Ok(partition_fn(ctx.current_time())),
        }
    }

    /// Check if a key is currently registered.
    pub fn has_partition_key(&self, partition_key: &str, ctx: &PartitionLoadingContext) -> Result<bool> {
        match &self.source {
            DynamicSource::Store { name } => ctx
                .require_store(name)?
                .has_dynamic_partition(name, partition_key),
            DynamicSource::Function(partition_fn) => Ok(partition_fn(ctx.current_time())
                .iter()
                .any(|key| key == partition_key)),
        }
    }

    /// Registered keys between two registered keys, inclusive.
    pub fn get_partition_keys_in_range(
        &self,
        range: &PartitionKeyRange,
        ctx: &PartitionLoadingContext,
    ) -> Result<Vec<String>> {
        keys_in_range(&self.get_partition_keys(ctx)?, range)
    }

    /// Number of currently registered keys.
    pub fn get_num_partitions(&self, ctx: &PartitionLoadingContext) -> Result<usize> {
        Ok(self.get_partition_keys(ctx)?.len())
    }

    /// SHA-1 over the currently registered keys.
    pub fn get_serializable_unique_identifier(&self, ctx: &PartitionLoadingContext) -> Result<String> {
        identifier_for(&self.get_partition_keys(ctx)?)
    }
}

impl PartialEq for DynamicPartitionsDefinition {
    fn eq(&self, other: &Self) -> bool {
        match (&self.source, &other.source) {
            (DynamicSource::Store { name: a }, DynamicSource::Store { name: b }) => a == b,
            (DynamicSource::Function(a), DynamicSource::Function(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for DynamicPartitionsDefinition {}

impl std::hash::Hash for DynamicPartitionsDefinition {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match &self.source {
            DynamicSource::Store { name } => name.hash(state),
            // Same callback, same hash; matches `PartialEq`.
            DynamicSource::Function(partition_fn) => Arc::as_ptr(partition_fn).cast::<()>().hash(state),
        }
    }
}

impl std::fmt::Debug for DynamicPartitionsDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            DynamicSource::Store { name } => f
                .debug_struct("DynamicPartitionsDefinition")
                .field("name", name)
                .finish(),
            DynamicSource::Function(_) => f
                .debug_struct("DynamicPartitionsDefinition")
                .field("partition_fn", &"<fn>")
                .finish(),
        }
    }
}

impl std::fmt::Display for DynamicPartitionsDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => write!(f, "Dynamic partitions: \"{name}\""),
            None => write!(f, "Dynamic partitions (function-backed)"),
        }
    }
}
