//! Two-dimensional partition spaces for data assets.
//!
//! This crate models an asset's partitions as the cross-product of two
//! single-dimension definitions and provides:
//!
//! - [`PartitionsDefinition`] - static, time-window and dynamic dimensions
//! - [`MultiPartitionsDefinition`] - the validated two-dimensional space
//! - [`MultiPartitionKey`] - composite keys and their `|`-delimited encoding
//! - [`MultiDimensionalPartitionKeyIterator`] - cursor-resumable pagination
//!
//! Every query takes a [`PartitionLoadingContext`] carrying the evaluation
//! time and the dynamic partitions store.
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
//! let def = MultiPartitionsDefinition::new([
//!     ("color", PartitionsDefinition::from(StaticPartitionsDefinition::new(["red", "green"]))),
//!     (
//!         "day",
//!         PartitionsDefinition::from(TimeWindowPartitionsDefinition::daily(
//!             Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
//!         )),
//!     ),
//! ])?;
//! let ctx = PartitionLoadingContext::new()
//!     .with_current_time(Utc.with_ymd_and_hms(2020, 1, 4, 0, 0, 0).unwrap());
//!
//! let page = def.get_paginated_partition_keys(&ctx, 2, true, None)?;
//! let keys: Vec<String> = page.results.iter().map(ToString::to_string).collect();
//! assert_eq!(keys, vec!["red|2020-01-01", "green|2020-01-01"]);
//!
//! let next = def.get_paginated_partition_keys(&ctx, 2, true, Some(&page.cursor))?;
//! assert_eq!(next.results[0].to_string(), "red|2020-01-02");
//! # Ok::<(), mp_error::MpError>(())
//! ```

pub mod context;
pub mod definition;
pub mod multi;

pub use context::PartitionLoadingContext;
pub use definition::{
    DynamicPartitionsDefinition, PartitionFn, PartitionsDefinition, PartitionsDefinitionKind,
    StaticPartitionsDefinition, TimeWindowPartitionsDefinition, MAX_END_OFFSET,
};
pub use multi::{
    decode_partition_key, encode_partition_key, get_tags_from_multi_partition_key,
    is_valid_key_format, IteratorState, MultiDimensionalPartitionKeyIterator, MultiPartitionCursor,
    MultiPartitionKey, MultiPartitionsDefinition, PartitionDimensionDefinition,
    ALLOWED_DIMENSION_KINDS, DIMENSION_COUNT, INVALID_STATIC_PARTITIONS_KEY_CHARACTERS,
    MULTIDIMENSIONAL_PARTITION_PREFIX, MULTIPARTITION_KEY_DELIMITER, PARTITION_NAME_TAG,
};
