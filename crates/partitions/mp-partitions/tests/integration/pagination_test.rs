//! Cursor pagination over whole key spaces.

use crate::common::{collect_pages, color_by_day, ctx_at, day, render, static_def};
use mp_error::MpError;
use mp_partitions::{MultiPartitionCursor, MultiPartitionKey, MultiPartitionsDefinition, TimeWindowPartitionsDefinition};
use std::collections::HashSet;

fn flatten(pages: &[mp_types::PaginatedResults<MultiPartitionKey>]) -> Vec<String> {
    pages.iter().flat_map(|page| render(&page.results)).collect()
}

#[test]
fn test_pages_follow_primary_dimension() {
    let def = color_by_day();
    let ctx = ctx_at(day(2020, 1, 4));

    let pages = collect_pages(&def, &ctx, 2, true);
    let rendered: Vec<Vec<String>> = pages.iter().map(|page| render(&page.results)).collect();
    assert_eq!(
        rendered,
        vec![
            vec!["red|2020-01-01", "green|2020-01-01"],
            vec!["red|2020-01-02", "green|2020-01-02"],
            vec!["red|2020-01-03", "green|2020-01-03"],
        ]
    );
    assert!(pages[0].has_more);
    assert!(pages[1].has_more);
    assert!(!pages[2].has_more);

    // Each cursor names the last key of its page.
    let last = MultiPartitionCursor::parse(&pages[1].cursor).unwrap();
    assert_eq!(last.last_seen_key.unwrap().to_string(), "green|2020-01-02");
}

#[test]
fn test_pages_match_full_enumeration_when_primary_sorts_first() {
    let def = MultiPartitionsDefinition::new([
        ("date", TimeWindowPartitionsDefinition::daily(day(2024, 2, 1)).into()),
        ("region", static_def(&["us", "eu", "apac"])),
    ])
    .unwrap();
    let ctx = ctx_at(day(2024, 2, 6));
    let expected = render(&def.get_partition_keys(&ctx).unwrap());
    assert_eq!(expected.len(), 15);

    for limit in 1..=16 {
        let pages = collect_pages(&def, &ctx, limit, true);
        assert_eq!(flatten(&pages), expected, "limit {limit}");
        assert!(pages.iter().all(|page| page.len() <= limit));
    }
}

#[test]
fn test_pages_cover_full_enumeration_when_primary_sorts_second() {
    let def = color_by_day();
    let ctx = ctx_at(day(2020, 1, 6));
    let all: HashSet<String> = render(&def.get_partition_keys(&ctx).unwrap()).into_iter().collect();

    for limit in [1, 3, 4, 10] {
        let paged = flatten(&collect_pages(&def, &ctx, limit, true));
        assert_eq!(paged.len(), all.len());
        assert_eq!(paged.into_iter().collect::<HashSet<_>>(), all);
    }
}

#[test]
fn test_descending_pages_reverse_ascending() {
    let def = color_by_day();
    let ctx = ctx_at(day(2020, 1, 4));

    let mut ascending = flatten(&collect_pages(&def, &ctx, 4, true));
    let descending = flatten(&collect_pages(&def, &ctx, 4, false));
    ascending.reverse();
    assert_eq!(descending, ascending);
    assert_eq!(descending[0], "green|2020-01-03");
}

#[test]
fn test_zero_limit_returns_empty_page() {
    let def = color_by_day();
    let page = def
        .get_paginated_partition_keys(&ctx_at(day(2020, 1, 4)), 0, true, None)
        .unwrap();
    assert!(page.is_empty());
    assert_eq!(page.cursor, "");
    assert!(page.has_more);
}

#[test]
fn test_cursor_after_last_key_is_exhausted() {
    let def = color_by_day();
    let ctx = ctx_at(day(2020, 1, 4));
    let pages = collect_pages(&def, &ctx, 6, true);
    assert_eq!(pages.len(), 1);

    let page = def
        .get_paginated_partition_keys(&ctx, 6, true, Some(&pages[0].cursor))
        .unwrap();
    assert!(page.is_empty());
    assert!(!page.has_more);
    assert_eq!(page.cursor, pages[0].cursor);
}

#[test]
fn test_malformed_cursor_restarts() {
    let def = color_by_day();
    let ctx = ctx_at(day(2020, 1, 4));

    let page = def
        .get_paginated_partition_keys(&ctx, 2, true, Some("definitely not a cursor"))
        .unwrap();
    assert_eq!(render(&page.results), vec!["red|2020-01-01", "green|2020-01-01"]);
}

#[test]
fn test_cursor_from_another_definition() {
    let def = color_by_day();
    let other = MultiPartitionsDefinition::new([
        ("size", static_def(&["s", "m"])),
        ("shape", static_def(&["round"])),
    ])
    .unwrap();
    let ctx = ctx_at(day(2020, 1, 4));

    let page = other.get_paginated_partition_keys(&ctx, 1, true, None).unwrap();
    let err = def
        .get_paginated_partition_keys(&ctx, 1, true, Some(&page.cursor))
        .unwrap_err();
    assert!(matches!(err, MpError::UnknownDimensions(_)));
}

#[test]
fn test_cursor_survives_time_advancing() {
    let def = color_by_day();

    let first = def
        .get_paginated_partition_keys(&ctx_at(day(2020, 1, 3)), 3, true, None)
        .unwrap();
    let rest = def
        .get_paginated_partition_keys(&ctx_at(day(2020, 1, 5)), 10, true, Some(&first.cursor))
        .unwrap();

    assert_eq!(
        render(&rest.results),
        vec![
            "green|2020-01-02",
            "red|2020-01-03",
            "green|2020-01-03",
            "red|2020-01-04",
            "green|2020-01-04",
        ]
    );
    assert!(!rest.has_more);
}
