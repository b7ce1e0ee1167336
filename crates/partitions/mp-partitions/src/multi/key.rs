//! Composite partition keys and their string encoding.
//!
//! A [`MultiPartitionKey`] maps each dimension name to one key of that
//! dimension. Its string form joins the per-dimension keys in dimension-name
//! order with [`MULTIPARTITION_KEY_DELIMITER`]:
//!
//! ```
//! use mp_partitions::MultiPartitionKey;
//!
//! let key = MultiPartitionKey::new([("date", "2024-01-01"), ("color", "red")]).unwrap();
//! assert_eq!(key.to_string(), "red|2024-01-01");
//! assert_eq!(key.get("date"), Some("2024-01-01"));
//! ```

use mp_error::{MpError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Separator between per-dimension keys in an encoded composite key.
pub const MULTIPARTITION_KEY_DELIMITER: char = '|';

/// Characters a static dimension's keys must not contain.
pub const INVALID_STATIC_PARTITIONS_KEY_CHARACTERS: [char; 4] = ['|', ',', '[', ']'];

/// Tag holding the full partition key.
pub const PARTITION_NAME_TAG: &str = "partition";

/// Prefix of the per-dimension partition tags.
pub const MULTIDIMENSIONAL_PARTITION_PREFIX: &str = "partition/";

/// One point of a multi-dimensional partition space.
///
/// Ordering compares the per-dimension keys in dimension-name order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, String>",
    into = "BTreeMap<String, String>"
)]
pub struct MultiPartitionKey {
    keys_by_dimension: BTreeMap<String, String>,
}

impl MultiPartitionKey {
    /// Build a key from `(dimension name, dimension key)` pairs.
    ///
    /// Fails with [`MpError::Encode`] if there are no pairs or a dimension key
    /// contains the delimiter.
    pub fn new<I, N, K>(keys_by_dimension: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, K)>,
        N: Into<String>,
        K: Into<String>,
    {
        let keys_by_dimension: BTreeMap<String, String> = keys_by_dimension
            .into_iter()
            .map(|(name, key)| (name.into(), key.into()))
            .collect();
        Self::try_from(keys_by_dimension)
    }

    /// Build a key whose parts are already known to be valid.
    pub(crate) fn from_validated_parts(keys_by_dimension: BTreeMap<String, String>) -> Self {
        Self { keys_by_dimension }
    }

    /// Key of one dimension.
    pub fn get(&self, dimension_name: &str) -> Option<&str> {
        self.keys_by_dimension.get(dimension_name).map(String::as_str)
    }

    pub fn keys_by_dimension(&self) -> &BTreeMap<String, String> {
        &self.keys_by_dimension
    }

    /// Dimension names, sorted.
    pub fn dimension_names(&self) -> impl Iterator<Item = &str> {
        self.keys_by_dimension.keys().map(String::as_str)
    }

    /// Check whether the key covers exactly `dimension_names`.
    pub(crate) fn has_dimensions(&self, dimension_names: &[&str]) -> bool {
        self.keys_by_dimension.len() == dimension_names.len()
            && dimension_names
                .iter()
                .all(|name| self.keys_by_dimension.contains_key(*name))
    }
}

impl TryFrom<BTreeMap<String, String>> for MultiPartitionKey {
    type Error = MpError;

    fn try_from(keys_by_dimension: BTreeMap<String, String>) -> Result<Self> {
        if keys_by_dimension.is_empty() {
            return Err(MpError::Encode(
                "A multi-partition key needs at least one dimension".to_string(),
            ));
        }
        if let Some((name, key)) = keys_by_dimension
            .iter()
            .find(|(_, key)| key.contains(MULTIPARTITION_KEY_DELIMITER))
        {
            return Err(MpError::Encode(format!(
                "Key '{key}' of dimension '{name}' contains the delimiter '{MULTIPARTITION_KEY_DELIMITER}'"
            )));
        }
        Ok(Self { keys_by_dimension })
    }
}

impl From<MultiPartitionKey> for BTreeMap<String, String> {
    fn from(key: MultiPartitionKey) -> Self {
        key.keys_by_dimension
    }
}

impl std::fmt::Display for MultiPartitionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, key) in self.keys_by_dimension.values().enumerate() {
            if i > 0 {
                write!(f, "{MULTIPARTITION_KEY_DELIMITER}")?;
            }
            f.write_str(key)?;
        }
        Ok(())
    }
}

impl PartialEq<str> for MultiPartitionKey {
    fn eq(&self, other: &str) -> bool {
        let mut parts = other.split(MULTIPARTITION_KEY_DELIMITER);
        self.keys_by_dimension
            .values()
            .all(|key| parts.next() == Some(key.as_str()))
            && parts.next().is_none()
    }
}

impl PartialEq<&str> for MultiPartitionKey {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

/// Encode a dimension-name to key mapping into its string form.
pub fn encode_partition_key(keys_by_dimension: &BTreeMap<String, String>) -> Result<String> {
    Ok(MultiPartitionKey::try_from(keys_by_dimension.clone())?.to_string())
}

/// Decode a composite key string against sorted dimension names.
///
/// Fails with [`MpError::Decode`] if the number of parts differs from the
/// number of dimensions.
pub fn decode_partition_key(partition_key: &str, dimension_names: &[&str]) -> Result<MultiPartitionKey> {
    let parts: Vec<&str> = partition_key.split(MULTIPARTITION_KEY_DELIMITER).collect();
    if parts.len() != dimension_names.len() {
        return Err(MpError::Decode(format!(
            "Expected {} partition keys in partition key string '{partition_key}', but got {}",
            dimension_names.len(),
            parts.len()
        )));
    }
    Ok(MultiPartitionKey::from_validated_parts(
        dimension_names
            .iter()
            .zip(parts)
            .map(|(name, key)| (name.to_string(), key.to_string()))
            .collect(),
    ))
}

/// Cheap check that `partition_key` splits into `dimension_count` parts.
pub fn is_valid_key_format(partition_key: &str, dimension_count: usize) -> bool {
    partition_key.split(MULTIPARTITION_KEY_DELIMITER).count() == dimension_count
}

/// `partition/<dimension>` tags for each part of a composite key.
pub fn get_tags_from_multi_partition_key(key: &MultiPartitionKey) -> BTreeMap<String, String> {
    key.keys_by_dimension
        .iter()
        .map(|(name, value)| (format!("{MULTIDIMENSIONAL_PARTITION_PREFIX}{name}"), value.clone()))
        .collect()
}
