//! Dynamic dimensions resolved through a partitions store.

use crate::common::{ctx_at, day, render, static_def};
use mp_error::{classify_error, ErrorCategory, MpError, StoreError};
use mp_partitions::{DynamicPartitionsDefinition, MultiPartitionsDefinition, PartitionLoadingContext};
use mp_traits::{DynamicPartitionsStore, InMemoryPartitionsStore};
use std::sync::Arc;

fn customers_by_region() -> MultiPartitionsDefinition {
    MultiPartitionsDefinition::new([
        ("customer", DynamicPartitionsDefinition::new("customers").into()),
        ("region", static_def(&["eu", "us"])),
    ])
    .unwrap()
}

fn store_with(keys: &[&str]) -> Arc<InMemoryPartitionsStore> {
    let store = Arc::new(InMemoryPartitionsStore::new());
    store.add_partitions("customers", keys.iter().copied());
    store
}

fn ctx_with(store: &Arc<InMemoryPartitionsStore>) -> PartitionLoadingContext {
    ctx_at(day(2024, 1, 1)).with_dynamic_partitions_store(store.clone())
}

#[test]
fn test_store_consulted_once_per_page() {
    let store = store_with(&["acme", "globex", "initech"]);
    let def = customers_by_region();
    let ctx = ctx_with(&store);

    let page = def.get_paginated_partition_keys(&ctx, 4, true, None).unwrap();
    assert_eq!(
        render(&page.results),
        vec!["acme|eu", "acme|us", "globex|eu", "globex|us"]
    );
    assert_eq!(store.lookups(), 1);

    let page = def
        .get_paginated_partition_keys(&ctx, 4, true, Some(&page.cursor))
        .unwrap();
    assert_eq!(render(&page.results), vec!["initech|eu", "initech|us"]);
    assert!(!page.has_more);
    assert_eq!(store.lookups(), 2);
}

#[test]
fn test_filter_consults_store_once() {
    let store = store_with(&["acme", "globex"]);
    let def = customers_by_region();
    let candidates = ["acme|eu", "globex|us", "umbrella|eu", "acme|mars", "acme"];

    let valid = def.filter_valid_partition_keys(candidates, &ctx_with(&store)).unwrap();
    assert_eq!(valid.len(), 2);
    assert_eq!(store.lookups(), 1);
}

#[test]
fn test_full_enumeration_cached_per_time() {
    let store = store_with(&["acme"]);
    let def = customers_by_region();
    let ctx = ctx_with(&store);

    assert_eq!(def.get_partition_keys(&ctx).unwrap().len(), 2);
    assert_eq!(def.get_partition_keys(&ctx).unwrap().len(), 2);
    assert_eq!(store.lookups(), 1);

    let later = ctx_at(day(2024, 1, 2)).with_dynamic_partitions_store(store.clone());
    store.add_partitions("customers", ["globex"]);
    assert_eq!(def.get_partition_keys(&later).unwrap().len(), 4);
    assert_eq!(store.lookups(), 2);
}

#[test]
fn test_membership_follows_store() {
    let store = store_with(&["acme"]);
    let def = customers_by_region();
    let ctx = ctx_with(&store);

    assert!(def.has_partition_key("acme|us", &ctx).unwrap());
    assert!(!def.has_partition_key("globex|us", &ctx).unwrap());

    store.add_partitions("customers", ["globex"]);
    assert!(def.has_partition_key("globex|us", &ctx).unwrap());
}

#[test]
fn test_deleted_key_makes_cursor_stale() {
    let store = store_with(&["acme", "globex"]);
    let def = customers_by_region();
    let ctx = ctx_with(&store);

    let page = def.get_paginated_partition_keys(&ctx, 3, true, None).unwrap();
    assert_eq!(render(&page.results), vec!["acme|eu", "acme|us", "globex|eu"]);

    assert!(store.delete_partition("customers", "globex"));
    let err = def
        .get_paginated_partition_keys(&ctx, 3, true, Some(&page.cursor))
        .unwrap_err();
    assert!(matches!(err, MpError::StaleCursor(_)));
}

#[test]
fn test_missing_store() {
    let def = customers_by_region();
    let err = def
        .get_paginated_partition_keys(&PartitionLoadingContext::new(), 10, true, None)
        .unwrap_err();
    assert!(matches!(err, MpError::InvalidInvocation(_)));
}

#[test]
fn test_keys_with_dimension_value_uses_other_dimension() {
    let store = store_with(&["acme", "globex"]);
    let def = customers_by_region();

    let keys = def
        .get_multipartition_keys_with_dimension_value("region", "us", &ctx_with(&store))
        .unwrap();
    assert_eq!(render(&keys), vec!["acme|us", "globex|us"]);
}

struct UnavailableStore;

impl DynamicPartitionsStore for UnavailableStore {
    fn get_dynamic_partitions(&self, _partitions_def_name: &str) -> mp_error::Result<Vec<String>> {
        Err(StoreError::Unavailable("connection refused".to_string()).into())
    }
}

#[test]
fn test_store_errors_propagate() {
    let def = customers_by_region();
    let ctx = PartitionLoadingContext::new().with_dynamic_partitions_store(Arc::new(UnavailableStore));

    let err = def.get_partition_keys(&ctx).unwrap_err();
    assert!(matches!(err, MpError::Store(StoreError::Unavailable(_))));
    assert_eq!(classify_error(&err), ErrorCategory::External);

    let err = def.has_partition_key("acme|eu", &ctx).unwrap_err();
    assert_eq!(classify_error(&err), ErrorCategory::External);
}
