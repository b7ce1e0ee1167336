//! Single-slot cache for the full composite key list.
//!
//! The slot holds the keys computed for one effective time. A lookup for a
//! different time misses, and the next insert replaces the slot. There is no
//! expiry; concurrent misses recompute and the last insert wins.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, trace};

use super::key::MultiPartitionKey;

/// Keys cached for a single effective time.
#[derive(Debug, Default)]
pub(crate) struct PartitionKeysCache {
    slot: RwLock<Option<(DateTime<Utc>, Arc<[MultiPartitionKey]>)>>,
}

impl PartitionKeysCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Cached keys for `effective_dt`, if the slot holds that time.
    pub(crate) fn get(&self, effective_dt: DateTime<Utc>) -> Option<Arc<[MultiPartitionKey]>> {
        let slot = self.slot.read();
        match slot.as_ref() {
            Some((cached_dt, keys)) if *cached_dt == effective_dt => {
                trace!(effective_dt = %effective_dt, count = keys.len(), "Partition key cache hit");
                Some(Arc::clone(keys))
            }
            _ => None,
        }
    }

    /// Replace the slot with `keys` computed at `effective_dt`.
    pub(crate) fn insert(&self, effective_dt: DateTime<Utc>, keys: Arc<[MultiPartitionKey]>) {
        let mut slot = self.slot.write();
        if let Some((previous, _)) = slot.as_ref() {
            if *previous != effective_dt {
                debug!(previous = %previous, effective_dt = %effective_dt, "Replacing cached partition keys");
            }
        }
        *slot = Some((effective_dt, keys));
    }

    /// Effective time currently cached.
    #[cfg(test)]
    pub(crate) fn cached_at(&self) -> Option<DateTime<Utc>> {
        self.slot.read().as_ref().map(|(dt, _)| *dt)
    }
}
