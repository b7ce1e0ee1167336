//! Two-dimensional partition spaces.
//!
//! A [`MultiPartitionsDefinition`] is the cross-product of two named
//! single-dimension definitions. Dimensions are kept sorted by name, which
//! fixes both the enumeration order and the order of the parts in an
//! encoded composite key.
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use mp_partitions::{
//!     MultiPartitionsDefinition, PartitionLoadingContext, PartitionsDefinition,
//!     StaticPartitionsDefinition, TimeWindowPartitionsDefinition,
//! };
//!
//! let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
//! let def = MultiPartitionsDefinition::new([
//!     ("color", PartitionsDefinition::from(StaticPartitionsDefinition::new(["red", "green"]))),
//!     ("day", PartitionsDefinition::from(TimeWindowPartitionsDefinition::daily(start))),
//! ])
//! .unwrap();
//! let ctx = PartitionLoadingContext::new()
//!     .with_current_time(Utc.with_ymd_and_hms(2020, 1, 3, 0, 0, 0).unwrap());
//!
//! assert_eq!(def.get_num_partitions(&ctx).unwrap(), 4);
//! assert!(def.has_partition_key("green|2020-01-02", &ctx).unwrap());
//! assert_eq!(def.primary_dimension().name, "day");
//! ```

mod cache;
mod cursor;
mod dimension;
mod iterator;
mod key;

pub use cursor::MultiPartitionCursor;
pub use dimension::PartitionDimensionDefinition;
pub use iterator::{IteratorState, MultiDimensionalPartitionKeyIterator};
pub use key::{
    decode_partition_key, encode_partition_key, get_tags_from_multi_partition_key,
    is_valid_key_format, MultiPartitionKey, INVALID_STATIC_PARTITIONS_KEY_CHARACTERS,
    MULTIDIMENSIONAL_PARTITION_PREFIX, MULTIPARTITION_KEY_DELIMITER, PARTITION_NAME_TAG,
};

use mp_error::{MpError, Result};
use mp_types::{MultiPartitionsConfig, PaginatedResults, PartitionKeyRange, TimeWindow};
use std::collections::{BTreeMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::debug;

use self::cache::PartitionKeysCache;
use crate::context::PartitionLoadingContext;
use crate::definition::{
    identifier_for, PartitionsDefinition, PartitionsDefinitionKind, TimeWindowPartitionsDefinition,
};

/// Definition kinds usable as a dimension.
pub const ALLOWED_DIMENSION_KINDS: [PartitionsDefinitionKind; 3] = [
    PartitionsDefinitionKind::Static,
    PartitionsDefinitionKind::TimeWindow,
    PartitionsDefinitionKind::Dynamic,
];

/// Number of dimensions a multi-partitions definition has.
pub const DIMENSION_COUNT: usize = 2;

/// The cross-product of two partitions definitions.
pub struct MultiPartitionsDefinition {
    dimensions: [PartitionDimensionDefinition; DIMENSION_COUNT],
    keys_cache: PartitionKeysCache,
}

impl MultiPartitionsDefinition {
    /// Create a definition from `(dimension name, definition)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`MpError::Definition`] if:
    /// - there are not exactly two dimensions, or two share a name
    /// - a dimension is itself a multi-partitions definition
    /// - a dynamic dimension has no name
    /// - a static dimension has a key containing `|`, `,`, `[` or `]`
    /// - a time-window dimension has an unusable key format
    pub fn new<I, S>(partitions_defs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, PartitionsDefinition)>,
        S: Into<String>,
    {
        let mut by_name = BTreeMap::new();
        for (name, partitions_def) in partitions_defs {
            let name = name.into();
            if by_name.contains_key(&name) {
                return Err(rejected(format!("Duplicate dimension name '{name}'")));
            }
            by_name.insert(name, partitions_def);
        }

        if by_name.len() != DIMENSION_COUNT {
            return Err(rejected(format!(
                "Only multi-partitions definitions with {DIMENSION_COUNT} dimensions are supported. \
                 This definition has {} dimensions.",
                by_name.len()
            )));
        }

        for (name, partitions_def) in &by_name {
            check_dimension(name, partitions_def).map_err(|e| {
                debug!(dimension = %name, error = %e, "Rejected partition dimension");
                e
            })?;
        }

        // BTreeMap iteration is sorted by name.
        let dimensions: Vec<PartitionDimensionDefinition> = by_name
            .into_iter()
            .map(|(name, partitions_def)| PartitionDimensionDefinition::new(name, partitions_def))
            .collect();
        let dimensions: [PartitionDimensionDefinition; DIMENSION_COUNT] = dimensions
            .try_into()
            .map_err(|_| MpError::Invariant("dimension count changed during construction".to_string()))?;

        Ok(Self {
            dimensions,
            keys_cache: PartitionKeysCache::new(),
        })
    }

    /// Create a definition from its configuration.
    pub fn from_config(config: &MultiPartitionsConfig) -> Result<Self> {
        let partitions_defs = config
            .dimensions
            .iter()
            .map(|(name, dimension)| Ok((name.clone(), PartitionsDefinition::from_config(dimension)?)))
            .collect::<Result<Vec<_>>>()?;
        Self::new(partitions_defs)
    }

    /// Create a definition from a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: MultiPartitionsConfig = serde_json::from_str(json)
            .map_err(|e| MpError::Config(format!("Invalid multi-partitions configuration: {e}")))?;
        Self::from_config(&config)
    }

    /// Dimensions, sorted by name.
    pub fn partitions_defs(&self) -> &[PartitionDimensionDefinition] {
        &self.dimensions
    }

    pub fn partition_dimension_names(&self) -> Vec<&str> {
        self.dimensions.iter().map(|dim| dim.name.as_str()).collect()
    }

    fn dimension_names(&self) -> [&str; DIMENSION_COUNT] {
        [self.dimensions[0].name.as_str(), self.dimensions[1].name.as_str()]
    }

    fn dimension(&self, dimension_name: &str) -> Option<&PartitionDimensionDefinition> {
        self.dimensions.iter().find(|dim| dim.name == dimension_name)
    }

    /// The definition of one dimension.
    pub fn get_partitions_def_for_dimension(&self, dimension_name: &str) -> Result<&PartitionsDefinition> {
        self.dimension(dimension_name)
            .map(|dim| &dim.partitions_def)
            .ok_or_else(|| MpError::Invariant(format!("Invalid dimension name '{dimension_name}'")))
    }

    /// Every composite key, first dimension outer, second dimension inner.
    ///
    /// Results are cached for the context's effective time; a query at a
    /// different time replaces the cached keys.
    pub fn get_partition_keys(&self, ctx: &PartitionLoadingContext) -> Result<Arc<[MultiPartitionKey]>> {
        let ctx = ctx.resolved();
        let effective_dt = ctx.effective_dt();
        if let Some(keys) = self.keys_cache.get(effective_dt) {
            return Ok(keys);
        }

        let [outer, inner] = &self.dimensions;
        let outer_keys = outer.partitions_def.get_partition_keys(&ctx)?;
        let inner_keys = inner.partitions_def.get_partition_keys(&ctx)?;
        let keys: Arc<[MultiPartitionKey]> = cross_product(outer, &outer_keys, inner, &inner_keys).collect();

        debug!(
            effective_dt = %effective_dt,
            count = keys.len(),
            "Computed multi-partition keys"
        );
        self.keys_cache.insert(effective_dt, Arc::clone(&keys));
        Ok(keys)
    }

    /// Composite keys between two composite keys, inclusive.
    ///
    /// Each dimension resolves its own part of the range; the result is the
    /// cross-product of the two per-dimension ranges.
    pub fn get_partition_keys_in_range(
        &self,
        range: &PartitionKeyRange,
        ctx: &PartitionLoadingContext,
    ) -> Result<Vec<MultiPartitionKey>> {
        let start = self.get_partition_key_from_str(&range.start)?;
        let end = self.get_partition_key_from_str(&range.end)?;

        let ctx = ctx.resolved();
        let mut ranges = Vec::with_capacity(DIMENSION_COUNT);
        for dim in &self.dimensions {
            let dim_range = PartitionKeyRange::new(part(&start, &dim.name)?, part(&end, &dim.name)?);
            ranges.push(dim.partitions_def.get_partition_keys_in_range(&dim_range, &ctx)?);
        }

        let [outer, inner] = &self.dimensions;
        Ok(cross_product(outer, &ranges[0], inner, &ranges[1]).collect())
    }

    /// Check if an encoded composite key exists.
    ///
    /// Strings that do not decode are not keys.
    pub fn has_partition_key(&self, partition_key: &str, ctx: &PartitionLoadingContext) -> Result<bool> {
        match self.get_partition_key_from_str(partition_key) {
            Ok(key) => self.has_multipartition_key(&key, ctx),
            Err(MpError::Decode(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Check if a composite key exists.
    ///
    /// Fails with [`MpError::UnknownDimensions`] if the key does not have
    /// exactly this definition's dimensions.
    pub fn has_multipartition_key(&self, key: &MultiPartitionKey, ctx: &PartitionLoadingContext) -> Result<bool> {
        let ctx = ctx.resolved();
        if !key.has_dimensions(&self.dimension_names()) {
            return Err(MpError::UnknownDimensions(format!(
                "Invalid partition key {key}. The dimensions of the partition key are not the \
                 dimensions of the partitions definition {:?}.",
                self.dimension_names()
            )));
        }

        for dim in &self.dimensions {
            let value = part(key, &dim.name)?;
            if !dim.partitions_def.has_partition_key(value, &ctx)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Keep the candidates that are well-formed, existing composite keys.
    ///
    /// Each dimension is enumerated once per call.
    pub fn filter_valid_partition_keys<I, S>(
        &self,
        partition_keys: I,
        ctx: &PartitionLoadingContext,
    ) -> Result<HashSet<MultiPartitionKey>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ctx = ctx.resolved();
        let mut keys_by_dimension = Vec::with_capacity(DIMENSION_COUNT);
        for dim in &self.dimensions {
            let keys: HashSet<String> = dim.partitions_def.get_partition_keys(&ctx)?.into_iter().collect();
            keys_by_dimension.push((dim.name.as_str(), keys));
        }

        let names = self.dimension_names();
        let mut valid = HashSet::new();
        for partition_key in partition_keys {
            let partition_key = partition_key.as_ref();
            if !is_valid_key_format(partition_key, DIMENSION_COUNT) {
                continue;
            }
            let key = decode_partition_key(partition_key, &names)?;
            let exists = keys_by_dimension
                .iter()
                .all(|(name, keys)| key.get(name).is_some_and(|value| keys.contains(value)));
            if exists {
                valid.insert(key);
            }
        }
        Ok(valid)
    }

    /// SHA-1 over each dimension's own identifier, keyed by dimension name.
    pub fn get_serializable_unique_identifier(&self, ctx: &PartitionLoadingContext) -> Result<String> {
        let ctx = ctx.resolved();
        let mut identifiers = BTreeMap::new();
        for dim in &self.dimensions {
            identifiers.insert(
                dim.name.as_str(),
                dim.partitions_def.get_serializable_unique_identifier(&ctx)?,
            );
        }
        identifier_for(&identifiers)
    }

    /// Product of the dimensions' counts.
    ///
    /// Static dimensions count duplicate keys, so this can exceed the number
    /// of distinct composite keys.
    pub fn get_num_partitions(&self, ctx: &PartitionLoadingContext) -> Result<usize> {
        let ctx = ctx.resolved();
        let mut count: usize = 1;
        for dim in &self.dimensions {
            count = count.saturating_mul(dim.partitions_def.get_num_partitions(&ctx)?);
        }
        Ok(count)
    }

    fn primary_and_secondary(&self) -> (&PartitionDimensionDefinition, &PartitionDimensionDefinition) {
        let [first, second] = &self.dimensions;
        match (first.is_time_window(), second.is_time_window()) {
            (false, true) => (second, first),
            _ => (first, second),
        }
    }

    /// The dimension iterated first: the time-window dimension if there is
    /// exactly one, the first dimension by name otherwise.
    pub fn primary_dimension(&self) -> &PartitionDimensionDefinition {
        self.primary_and_secondary().0
    }

    pub fn secondary_dimension(&self) -> &PartitionDimensionDefinition {
        self.primary_and_secondary().1
    }

    pub fn has_time_window_dimension(&self) -> bool {
        self.dimensions.iter().any(PartitionDimensionDefinition::is_time_window)
    }

    /// The only time-window dimension.
    ///
    /// Fails with [`MpError::Invariant`] unless exactly one dimension is
    /// time-windowed.
    pub fn time_window_dimension(&self) -> Result<&PartitionDimensionDefinition> {
        let mut time_dims = self.dimensions.iter().filter(|dim| dim.is_time_window());
        match (time_dims.next(), time_dims.next()) {
            (Some(dim), None) => Ok(dim),
            _ => Err(MpError::Invariant(
                "Expected exactly one time window partitioned dimension".to_string(),
            )),
        }
    }

    pub fn time_window_partitions_def(&self) -> Result<&TimeWindowPartitionsDefinition> {
        self.time_window_dimension()?
            .partitions_def
            .as_time_window()
            .ok_or_else(|| MpError::Invariant("Must have time window dimension".to_string()))
    }

    /// The time window of the time-window part of an encoded composite key.
    pub fn time_window_for_partition_key(&self, partition_key: &str) -> Result<TimeWindow> {
        let key = self.get_partition_key_from_str(partition_key)?;
        let dim = self.time_window_dimension()?;
        self.time_window_partitions_def()?
            .time_window_for_partition_key(part(&key, &dim.name)?)
    }

    /// Composite keys whose `dimension_name` part is `dimension_partition_key`,
    /// one per key of the other dimension.
    pub fn get_multipartition_keys_with_dimension_value(
        &self,
        dimension_name: &str,
        dimension_partition_key: &str,
        ctx: &PartitionLoadingContext,
    ) -> Result<Vec<MultiPartitionKey>> {
        if self.dimension(dimension_name).is_none() {
            return Err(MpError::UnknownDimensions(format!(
                "Dimension '{dimension_name}' not found in multi-partitions definition with dimensions {:?}",
                self.dimension_names()
            )));
        }
        if dimension_partition_key.contains(MULTIPARTITION_KEY_DELIMITER) {
            return Err(MpError::Encode(format!(
                "Key '{dimension_partition_key}' of dimension '{dimension_name}' contains the \
                 delimiter '{MULTIPARTITION_KEY_DELIMITER}'"
            )));
        }

        let mut keys = Vec::new();
        for other in self.dimensions.iter().filter(|dim| dim.name != dimension_name) {
            for other_key in other.partitions_def.get_partition_keys(ctx)? {
                if other_key.contains(MULTIPARTITION_KEY_DELIMITER) {
                    continue;
                }
                let mut parts = BTreeMap::new();
                parts.insert(other.name.clone(), other_key);
                parts.insert(dimension_name.to_string(), dimension_partition_key.to_string());
                keys.push(MultiPartitionKey::from_validated_parts(parts));
            }
        }
        Ok(keys)
    }

    /// Decode an encoded composite key against this definition's dimensions.
    pub fn get_partition_key_from_str(&self, partition_key: &str) -> Result<MultiPartitionKey> {
        decode_partition_key(partition_key, &self.dimension_names())
    }

    /// Encode a dimension-name to key mapping.
    ///
    /// Fails with [`MpError::UnknownDimensions`] unless the mapping has
    /// exactly this definition's dimensions.
    pub fn encode_partition_key(&self, keys_by_dimension: &BTreeMap<String, String>) -> Result<String> {
        let names = self.dimension_names();
        if keys_by_dimension.len() != DIMENSION_COUNT
            || !names.iter().all(|name| keys_by_dimension.contains_key(*name))
        {
            return Err(MpError::UnknownDimensions(format!(
                "Expected keys for dimensions {names:?}, got {:?}",
                keys_by_dimension.keys().collect::<Vec<_>>()
            )));
        }
        encode_partition_key(keys_by_dimension)
    }

    /// Run tags for a partition: the full key plus one tag per dimension.
    pub fn get_tags_for_partition_key(&self, partition_key: &str) -> Result<BTreeMap<String, String>> {
        let key = self.get_partition_key_from_str(partition_key)?;
        let mut tags = get_tags_from_multi_partition_key(&key);
        tags.insert(PARTITION_NAME_TAG.to_string(), partition_key.to_string());
        Ok(tags)
    }

    /// One page of composite keys, primary dimension outer.
    ///
    /// `cursor` is the cursor of the previous page. Absent and malformed
    /// cursors start from the first key; a cursor whose key no longer exists
    /// fails with [`MpError::StaleCursor`]. The returned cursor is empty if no
    /// key has been handed out yet.
    pub fn get_paginated_partition_keys(
        &self,
        ctx: &PartitionLoadingContext,
        limit: usize,
        ascending: bool,
        cursor: Option<&str>,
    ) -> Result<PaginatedResults<MultiPartitionKey>> {
        let ctx = ctx.resolved();
        let (primary, secondary) = self.primary_and_secondary();
        let mut iterator = MultiDimensionalPartitionKeyIterator::new(
            &ctx,
            primary,
            secondary,
            &MultiPartitionCursor::from_cursor(cursor),
            ascending,
        )?;

        let results: Vec<MultiPartitionKey> = iterator.by_ref().take(limit).collect();
        let next_cursor = iterator.cursor().to_string();
        let has_more = iterator.has_next();

        debug!(
            limit,
            count = results.len(),
            has_more,
            ascending,
            "Paginated multi-partition keys"
        );
        Ok(PaginatedResults::new(results, next_cursor, has_more))
    }
}

fn rejected(message: String) -> MpError {
    debug!(reason = %message, "Rejected multi-partitions definition");
    MpError::Definition(message)
}

fn check_dimension(name: &str, partitions_def: &PartitionsDefinition) -> Result<()> {
    match partitions_def {
        PartitionsDefinition::Multi(_) => {
            let allowed: Vec<String> = ALLOWED_DIMENSION_KINDS.iter().map(ToString::to_string).collect();
            Err(MpError::Definition(format!(
                "Invalid partitions definition type {} for dimension '{name}'. Only the following \
                 partitions definition types are supported: {}.",
                partitions_def.kind(),
                allowed.join(", ")
            )))
        }
        PartitionsDefinition::Dynamic(def) if def.name().is_none() => Err(MpError::Definition(
            format!(
                "DynamicPartitionsDefinition for dimension '{name}' must have a name to be used \
                 in a MultiPartitionsDefinition."
            ),
        )),
        PartitionsDefinition::Static(def) => {
            let invalid = def
                .partition_keys()
                .iter()
                .any(|key| key.contains(INVALID_STATIC_PARTITIONS_KEY_CHARACTERS));
            if invalid {
                return Err(MpError::Definition(format!(
                    "Invalid character in partition key for dimension '{name}'. A multi-partitions \
                     definition cannot contain partition keys with the following characters: |, [, ], ,"
                )));
            }
            Ok(())
        }
        PartitionsDefinition::TimeWindow(def) => def.validate(),
        PartitionsDefinition::Dynamic(_) => Ok(()),
    }
}

fn part<'a>(key: &'a MultiPartitionKey, dimension_name: &str) -> Result<&'a str> {
    key.get(dimension_name).ok_or_else(|| {
        MpError::UnknownDimensions(format!(
            "Partition key {key} has no value for dimension '{dimension_name}'"
        ))
    })
}

/// Composite keys for every pair, skipping parts that contain the delimiter.
fn cross_product<'a>(
    outer: &'a PartitionDimensionDefinition,
    outer_keys: &'a [String],
    inner: &'a PartitionDimensionDefinition,
    inner_keys: &'a [String],
) -> impl Iterator<Item = MultiPartitionKey> + 'a {
    let valid = |key: &&String| !key.contains(MULTIPARTITION_KEY_DELIMITER);
    outer_keys.iter().filter(valid).flat_map(move |outer_key| {
        inner_keys.iter().filter(valid).map(move |inner_key| {
            let mut parts = BTreeMap::new();
            parts.insert(outer.name.clone(), outer_key.clone());
            parts.insert(inner.name.clone(), inner_key.clone());
            MultiPartitionKey::from_validated_parts(parts)
        })
    })
}

impl Clone for MultiPartitionsDefinition {
    fn clone(&self) -> Self {
        Self {
            dimensions: self.dimensions.clone(),
            keys_cache: PartitionKeysCache::new(),
        }
    }
}

impl PartialEq for MultiPartitionsDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.dimensions == other.dimensions
    }
}

impl Eq for MultiPartitionsDefinition {}

impl Hash for MultiPartitionsDefinition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dimensions.hash(state);
    }
}

impl std::fmt::Debug for MultiPartitionsDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiPartitionsDefinition")
            .field("dimensions", &self.dimensions)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Display for MultiPartitionsDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Multi-partitioned, with dimensions: ")?;
        let [first, second] = &self.dimensions;
        writeln!(f, "{}: {} ", capitalize(&first.name), first.partitions_def)?;
        write!(f, "{}: {}", capitalize(&second.name), second.partitions_def)
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
