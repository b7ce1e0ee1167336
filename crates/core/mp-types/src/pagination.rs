//! Paginated result payloads.

use serde::{Deserialize, Serialize};

/// One page of results plus the information needed to fetch the next page.
///
/// `cursor` is opaque to callers. An empty cursor means no key was ever
/// emitted, which is distinct from a caller not supplying a cursor at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatedResults<T> {
    /// Results on this page, in iteration order
    pub results: Vec<T>,

    /// Cursor to pass back to fetch the following page
    pub cursor: String,

    /// Whether more results exist after this page
    pub has_more: bool,
}

impl<T> PaginatedResults<T> {
    /// Create a new page.
    pub fn new(results: Vec<T>, cursor: impl Into<String>, has_more: bool) -> Self {
        Self {
            results,
            cursor: cursor.into(),
            has_more,
        }
    }

    /// Number of results on this page.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Check if the page has no results.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Convert the results while keeping cursor and `has_more`.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResults<U> {
        PaginatedResults {
            results: self.results.into_iter().map(f).collect(),
            cursor: self.cursor,
            has_more: self.has_more,
        }
    }
}
