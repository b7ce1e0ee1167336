//! Loading context passed to every partition query.

use chrono::{DateTime, Utc};
use mp_error::{MpError, Result};
use mp_traits::DynamicPartitionsStore;
use std::sync::Arc;

/// Inputs a partition query is evaluated against.
///
/// The context is never mutated by the partition core. A context without a
/// current time evaluates against "now"; use [`resolved`](Self::resolved) to
/// pin that instant so several queries see the same key sets.
#[derive(Clone, Default)]
pub struct PartitionLoadingContext {
    current_time: Option<DateTime<Utc>>,
    dynamic_partitions_store: Option<Arc<dyn DynamicPartitionsStore>>,
}

impl PartitionLoadingContext {
    /// Create an empty context (evaluates at "now", no store).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the instant the query is evaluated at.
    pub fn with_current_time(mut self, current_time: DateTime<Utc>) -> Self {
        self.current_time = Some(current_time);
        self
    }

    /// Set the store used to resolve dynamic dimensions.
    pub fn with_dynamic_partitions_store(mut self, store: Arc<dyn DynamicPartitionsStore>) -> Self {
        self.dynamic_partitions_store = Some(store);
        self
    }

    /// The explicitly supplied current time, if any.
    pub fn current_time(&self) -> Option<DateTime<Utc>> {
        self.current_time
    }

    /// The instant queries are evaluated at.
    pub fn effective_dt(&self) -> DateTime<Utc> {
        self.current_time.unwrap_or_else(Utc::now)
    }

    /// A copy of this context with the current time pinned.
    pub fn resolved(&self) -> Self {
        let mut ctx = self.clone();
        ctx.current_time = Some(self.effective_dt());
        ctx
    }

    /// The dynamic partitions store, if one was supplied.
    pub fn dynamic_partitions_store(&self) -> Option<&dyn DynamicPartitionsStore> {
        self.dynamic_partitions_store.as_deref()
    }

    /// The dynamic partitions store, failing if none was supplied.
    pub fn require_store(&self, partitions_def_name: &str) -> Result<&dyn DynamicPartitionsStore> {
        self.dynamic_partitions_store().ok_or_else(|| {
            MpError::InvalidInvocation(format!(
                "A dynamic partitions store is required to load partitions for '{partitions_def_name}'"
            ))
        })
    }
}

impl std::fmt::Debug for PartitionLoadingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartitionLoadingContext")
            .field("current_time", &self.current_time)
            .field("has_store", &self.dynamic_partitions_store.is_some())
            .finish()
    }
}
