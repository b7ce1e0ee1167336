//! Collaborator traits for the multi-partition workspace.
//!
//! This crate defines the interfaces the partition core consumes but never
//! implements for production use:
//!
//! - [`DynamicPartitionsStore`] - registry of partition keys added at runtime
//!
//! An [`InMemoryPartitionsStore`] is provided for testing and development.

pub mod store;

pub use store::{DynamicPartitionsStore, InMemoryPartitionsStore};
