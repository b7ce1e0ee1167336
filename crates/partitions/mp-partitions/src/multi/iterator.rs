//! Resumable nested-loop iteration over a two-dimensional key space.
//!
//! The primary dimension is the outer loop and the secondary dimension the
//! inner loop. Each dimension is enumerated once when the iterator is built;
//! the cross-product itself is never materialized.

use mp_error::{MpError, Result};
use std::collections::{BTreeMap, HashSet};
use std::iter::FusedIterator;
use tracing::debug;

use super::cursor::MultiPartitionCursor;
use super::dimension::PartitionDimensionDefinition;
use super::key::{MultiPartitionKey, MULTIPARTITION_KEY_DELIMITER};
use crate::context::PartitionLoadingContext;

/// Lifecycle of a [`MultiDimensionalPartitionKeyIterator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IteratorState {
    /// Nothing emitted and no cursor applied.
    NotStarted,
    /// Positioned inside the key space.
    InProgress,
    /// No keys left.
    Exhausted,
}

/// Keys of one dimension, as iterated.
#[derive(Debug)]
struct DimensionSequence {
    name: String,
    keys: Vec<String>,
}

impl DimensionSequence {
    /// Enumerate a dimension. Keys that cannot be part of a composite key and
    /// repeated keys are dropped.
    fn load(
        dimension: &PartitionDimensionDefinition,
        ctx: &PartitionLoadingContext,
        ascending: bool,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut keys: Vec<String> = dimension
            .partitions_def
            .get_partition_keys(ctx)?
            .into_iter()
            .filter(|key| !key.contains(MULTIPARTITION_KEY_DELIMITER))
            .filter(|key| seen.insert(key.clone()))
            .collect();
        if !ascending {
            keys.reverse();
        }
        Ok(Self {
            name: dimension.name.clone(),
            keys,
        })
    }

    fn position(&self, key: &MultiPartitionKey) -> Result<usize> {
        let value = key.get(&self.name).ok_or_else(|| {
            MpError::UnknownDimensions(format!(
                "Cursor key '{key}' has no value for dimension '{}'",
                self.name
            ))
        })?;
        self.keys.iter().position(|k| k == value).ok_or_else(|| {
            MpError::StaleCursor(format!(
                "Cursor key '{key}' refers to '{value}', which is no longer a partition of dimension '{}'",
                self.name
            ))
        })
    }
}

/// Iterator over the composite keys of a two-dimensional space, in
/// primary-major order, starting after an optional cursor.
#[derive(Debug)]
pub struct MultiDimensionalPartitionKeyIterator {
    primary: DimensionSequence,
    secondary: DimensionSequence,
    outer: usize,
    inner: usize,
    last_seen_key: Option<MultiPartitionKey>,
    state: IteratorState,
}

impl MultiDimensionalPartitionKeyIterator {
    /// Build an iterator positioned right after the cursor's key.
    ///
    /// Fails with [`MpError::StaleCursor`] if the cursor's key is no longer
    /// part of either dimension, and [`MpError::UnknownDimensions`] if it
    /// names other dimensions.
    pub fn new(
        ctx: &PartitionLoadingContext,
        primary: &PartitionDimensionDefinition,
        secondary: &PartitionDimensionDefinition,
        cursor: &MultiPartitionCursor,
        ascending: bool,
    ) -> Result<Self> {
        let mut iterator = Self {
            primary: DimensionSequence::load(primary, ctx, ascending)?,
            secondary: DimensionSequence::load(secondary, ctx, ascending)?,
            outer: 0,
            inner: 0,
            last_seen_key: None,
            state: IteratorState::NotStarted,
        };

        // An empty inner loop means an empty space.
        if iterator.secondary.keys.is_empty() {
            iterator.outer = iterator.primary.keys.len();
        }

        if let Some(key) = &cursor.last_seen_key {
            iterator.resume_after(key)?;
        } else if !iterator.has_next() {
            iterator.state = IteratorState::Exhausted;
        }

        Ok(iterator)
    }

    fn resume_after(&mut self, key: &MultiPartitionKey) -> Result<()> {
        let names = [self.primary.name.as_str(), self.secondary.name.as_str()];
        if !key.has_dimensions(&names) {
            return Err(MpError::UnknownDimensions(format!(
                "Cursor key '{key}' does not have dimensions {names:?}"
            )));
        }

        let outer = self.primary.position(key)?;
        let inner = self.secondary.position(key)?;
        if inner + 1 < self.secondary.keys.len() {
            self.outer = outer;
            self.inner = inner + 1;
        } else {
            self.outer = outer + 1;
            self.inner = 0;
        }
        self.last_seen_key = Some(key.clone());
        self.state = if self.has_next() {
            IteratorState::InProgress
        } else {
            IteratorState::Exhausted
        };

        debug!(
            cursor = %key,
            outer = self.outer,
            inner = self.inner,
            "Resumed partition key iteration"
        );
        Ok(())
    }

    /// Check if another key is available.
    pub fn has_next(&self) -> bool {
        self.outer < self.primary.keys.len()
    }

    /// Cursor pointing at the last emitted key.
    pub fn cursor(&self) -> MultiPartitionCursor {
        MultiPartitionCursor::new(self.last_seen_key.clone())
    }

    pub fn state(&self) -> IteratorState {
        self.state
    }

    fn remaining(&self) -> usize {
        if !self.has_next() {
            return 0;
        }
        (self.primary.keys.len() - self.outer)
            .saturating_mul(self.secondary.keys.len())
            .saturating_sub(self.inner)
    }
}

impl Iterator for MultiDimensionalPartitionKeyIterator {
    type Item = MultiPartitionKey;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.has_next() {
            self.state = IteratorState::Exhausted;
            return None;
        }

        let mut keys_by_dimension = BTreeMap::new();
        keys_by_dimension.insert(
            self.primary.name.clone(),
            self.primary.keys[self.outer].clone(),
        );
        keys_by_dimension.insert(
            self.secondary.name.clone(),
            self.secondary.keys[self.inner].clone(),
        );
        let key = MultiPartitionKey::from_validated_parts(keys_by_dimension);

        self.inner += 1;
        if self.inner >= self.secondary.keys.len() {
            self.inner = 0;
            self.outer += 1;
        }
        self.last_seen_key = Some(key.clone());
        self.state = if self.has_next() {
            IteratorState::InProgress
        } else {
            IteratorState::Exhausted
        };

        Some(key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl FusedIterator for MultiDimensionalPartitionKeyIterator {}
