//! Shared fixtures for the integration tests.

use chrono::{DateTime, TimeZone, Utc};
use mp_partitions::{
    MultiPartitionKey, MultiPartitionsDefinition, PartitionLoadingContext, PartitionsDefinition,
    StaticPartitionsDefinition, TimeWindowPartitionsDefinition,
};
use mp_types::PaginatedResults;

/// Midnight UTC on the given day.
pub fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

pub fn static_def(keys: &[&str]) -> PartitionsDefinition {
    StaticPartitionsDefinition::new(keys.iter().copied()).into()
}

/// `color` (red, green) by `day` (daily from 2020-01-01).
pub fn color_by_day() -> MultiPartitionsDefinition {
    MultiPartitionsDefinition::new([
        ("color", static_def(&["red", "green"])),
        ("day", TimeWindowPartitionsDefinition::daily(day(2020, 1, 1)).into()),
    ])
    .unwrap()
}

/// Context evaluated at a fixed instant.
pub fn ctx_at(time: DateTime<Utc>) -> PartitionLoadingContext {
    PartitionLoadingContext::new().with_current_time(time)
}

pub fn render(keys: &[MultiPartitionKey]) -> Vec<String> {
    keys.iter().map(ToString::to_string).collect()
}

/// Follow cursors until the last page, returning every page.
pub fn collect_pages(
    def: &MultiPartitionsDefinition,
    ctx: &PartitionLoadingContext,
    limit: usize,
    ascending: bool,
) -> Vec<PaginatedResults<MultiPartitionKey>> {
    let mut pages = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let page = def
            .get_paginated_partition_keys(ctx, limit, ascending, cursor.as_deref())
            .unwrap();
        let has_more = page.has_more;
        cursor = Some(page.cursor.clone());
        pages.push(page);
        if !has_more {
            return pages;
        }
        assert!(pages.len() < 10_000, "pagination did not terminate");
    }
}
