//! Integration tests for mp-partitions.
//!
//! These exercise the public API end to end: building definitions from
//! configuration, paging through whole key spaces and resolving dynamic
//! dimensions through a store.
//!
//! ```bash
//! cargo test -p mp-partitions --test integration
//! ```

mod common;
mod definition_test;
mod pagination_test;
mod store_test;
