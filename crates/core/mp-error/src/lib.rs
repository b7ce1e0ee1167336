//! Error types and classification for the multi-partition workspace.
//!
//! This crate provides:
//! - [`MpError`] - Top-level error enum for all partition-space errors
//! - [`StoreError`] - Errors raised by dynamic partition stores
//! - [`ErrorCategory`] for deciding who has to act on a failure
//! - Error classification via [`classify_error`]

use thiserror::Error;

/// Top-level error type for partition-space operations.
#[derive(Error, Debug)]
pub enum MpError {
    /// Structural violation detected while constructing a definition
    #[error("Invalid partitions definition: {0}")]
    Definition(String),

    /// A key or range endpoint does not exist in the targeted dimension
    #[error("Unknown partition: {0}")]
    UnknownPartition(String),

    /// A composite key's dimension names do not match the definition's
    #[error("Unknown dimensions: {0}")]
    UnknownDimensions(String),

    /// Malformed composite key or cursor string
    #[error("Decode failed: {0}")]
    Decode(String),

    /// A per-dimension key cannot be represented in a composite key
    #[error("Encode failed: {0}")]
    Encode(String),

    /// Internal precondition violated by the caller
    #[error("Invariant violated: {0}")]
    Invariant(String),

    /// Cursor references a key that is no longer part of the partition space
    #[error("Stale cursor: {0}")]
    StaleCursor(String),

    /// Operation called without the collaborators it needs
    #[error("Invalid invocation: {0}")]
    InvalidInvocation(String),

    /// Dynamic partition store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors (wrapped anyhow)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Dynamic partition store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backing storage could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A lookup against the store failed
    #[error("Lookup failed: {0}")]
    Lookup(String),
}

/// Error classification.
///
/// Nothing in the partition core retries; the category tells the calling
/// layer whether the failure is its own input, its own misuse, or an outage
/// of an external collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Broken definition or misuse by the calling layer. Never recoverable.
    ///
    /// Examples: three dimensions, time-window accessor without a time dimension
    Fatal,

    /// The caller supplied a key, range or cursor that does not fit the space.
    ///
    /// Examples: unknown partition key, malformed composite key, stale cursor
    InvalidInput,

    /// A collaborator (the dynamic partition store) failed.
    ///
    /// Examples: store unreachable, lookup error
    External,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fatal => write!(f, "Fatal"),
            Self::InvalidInput => write!(f, "InvalidInput"),
            Self::External => write!(f, "External"),
        }
    }
}

/// Classifies an error to determine who has to act on it.
pub fn classify_error(error: &MpError) -> ErrorCategory {
    match error {
        MpError::Definition(_) => ErrorCategory::Fatal,
        MpError::Invariant(_) => ErrorCategory::Fatal,
        MpError::Config(_) => ErrorCategory::Fatal,
        MpError::UnknownPartition(_) => ErrorCategory::InvalidInput,
        MpError::UnknownDimensions(_) => ErrorCategory::InvalidInput,
        MpError::Decode(_) => ErrorCategory::InvalidInput,
        MpError::Encode(_) => ErrorCategory::InvalidInput,
        MpError::StaleCursor(_) => ErrorCategory::InvalidInput,
        MpError::InvalidInvocation(_) => ErrorCategory::InvalidInput,
        MpError::Store(_) => ErrorCategory::External,
        MpError::Other(_) => ErrorCategory::External,
    }
}

/// Result type alias using MpError.
pub type Result<T> = std::result::Result<T, MpError>;
