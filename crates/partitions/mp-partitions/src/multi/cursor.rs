//! Pagination cursor over a multi-partitions definition.
//!
//! A cursor records the last composite key handed out. Its string form is
//! JSON (`{"last_seen_key":{"color":"red","day":"2020-01-01"}}`); a cursor
//! with no key is the empty string.

use mp_error::{MpError, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::key::MultiPartitionKey;

/// Resumption point of a paginated key listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiPartitionCursor {
    pub last_seen_key: Option<MultiPartitionKey>,
}

impl MultiPartitionCursor {
    pub fn new(last_seen_key: Option<MultiPartitionKey>) -> Self {
        Self { last_seen_key }
    }

    /// Parse a cursor string.
    ///
    /// The empty string is the cursor with no key.
    pub fn parse(cursor: &str) -> Result<Self> {
        if cursor.is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(cursor)
            .map_err(|e| MpError::Decode(format!("Invalid partition cursor '{cursor}': {e}")))
    }

    /// Cursor from an optional caller-supplied string.
    ///
    /// Absent and malformed cursors start from the beginning.
    pub fn from_cursor(cursor: Option<&str>) -> Self {
        let Some(cursor) = cursor else {
            return Self::default();
        };
        Self::parse(cursor).unwrap_or_else(|error| {
            warn!(error = %error, "Ignoring malformed partition cursor, starting from the beginning");
            Self::default()
        })
    }
}

impl std::fmt::Display for MultiPartitionCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.last_seen_key.is_none() {
            return Ok(());
        }
        let json = serde_json::to_string(self).map_err(|_| std::fmt::Error)?;
        f.write_str(&json)
    }
}
