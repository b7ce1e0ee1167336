//! Building and querying multi-partitions definitions.

use crate::common::{color_by_day, ctx_at, day, render, static_def};
use mp_error::{classify_error, ErrorCategory, MpError};
use mp_partitions::{
    MultiPartitionsDefinition, PartitionLoadingContext, PartitionsDefinition,
    TimeWindowPartitionsDefinition,
};
use mp_types::{DimensionConfig, MultiPartitionsConfig, PartitionKeyRange, PartitionSchedule, TimeWindow};
use std::collections::HashSet;

#[test]
fn test_from_config_matches_builder() {
    let config = MultiPartitionsConfig::new()
        .with_dimension(
            "day",
            DimensionConfig::TimeWindow {
                start: day(2020, 1, 1),
                end: None,
                schedule: PartitionSchedule::Daily,
                fmt: None,
                end_offset: 0,
            },
        )
        .with_dimension(
            "color",
            DimensionConfig::Static {
                keys: vec!["red".to_string(), "green".to_string()],
            },
        );

    let def = MultiPartitionsDefinition::from_config(&config).unwrap();
    assert_eq!(def, color_by_day());

    let ctx = ctx_at(day(2020, 1, 4));
    assert_eq!(
        def.get_serializable_unique_identifier(&ctx).unwrap(),
        color_by_day().get_serializable_unique_identifier(&ctx).unwrap()
    );
}

#[test]
fn test_cross_product_size() {
    let def = color_by_day();
    for days in 1..=5u32 {
        let ctx = ctx_at(day(2020, 1, 1 + days));
        let keys = def.get_partition_keys(&ctx).unwrap();
        assert_eq!(keys.len(), 2 * days as usize);
        assert_eq!(def.get_num_partitions(&ctx).unwrap(), keys.len());
    }
}

#[test]
fn test_enumeration_is_deterministic() {
    let ctx = ctx_at(day(2020, 1, 10));
    let first = render(&color_by_day().get_partition_keys(&ctx).unwrap());
    let second = render(&color_by_day().get_partition_keys(&ctx).unwrap());
    assert_eq!(first, second);
}

#[test]
fn test_every_enumerated_key_is_a_key() {
    let def = color_by_day();
    let ctx = ctx_at(day(2020, 1, 5));
    for key in def.get_partition_keys(&ctx).unwrap().iter() {
        let encoded = key.to_string();
        assert!(def.has_partition_key(&encoded, &ctx).unwrap(), "{encoded}");
        assert_eq!(&def.get_partition_key_from_str(&encoded).unwrap(), key);
    }
}

#[test]
fn test_range_includes_both_endpoints() {
    let def = color_by_day();
    let ctx = ctx_at(day(2020, 1, 10));
    let keys = render(
        &def.get_partition_keys_in_range(&PartitionKeyRange::new("red|2020-01-03", "red|2020-01-05"), &ctx)
            .unwrap(),
    );
    assert_eq!(keys, vec!["red|2020-01-03", "red|2020-01-04", "red|2020-01-05"]);

    let single = def
        .get_partition_keys_in_range(&PartitionKeyRange::single("green|2020-01-02"), &ctx)
        .unwrap();
    assert_eq!(render(&single), vec!["green|2020-01-02"]);
}

#[test]
fn test_range_with_unknown_endpoint() {
    let def = color_by_day();
    let err = def
        .get_partition_keys_in_range(
            &PartitionKeyRange::new("purple|2020-01-01", "red|2020-01-02"),
            &ctx_at(day(2020, 1, 10)),
        )
        .unwrap_err();
    assert!(matches!(err, MpError::UnknownPartition(_)));
    assert_eq!(classify_error(&err), ErrorCategory::InvalidInput);
}

#[test]
fn test_filter_valid_partition_keys() {
    let def = MultiPartitionsDefinition::new([
        ("color", static_def(&["red", "green"])),
        ("day", static_def(&["2020-01-01"])),
    ])
    .unwrap();

    let valid = def
        .filter_valid_partition_keys(
            ["red|2020-01-01", "red-2020-01-01", "purple|2020-01-01"],
            &PartitionLoadingContext::new(),
        )
        .unwrap();
    let rendered: HashSet<String> = valid.iter().map(ToString::to_string).collect();
    assert_eq!(rendered, HashSet::from(["red|2020-01-01".to_string()]));
}

#[test]
fn test_num_partitions_with_duplicate_static_keys() {
    let def = MultiPartitionsDefinition::new([
        ("letter", static_def(&["a", "a", "b"])),
        ("number", static_def(&["1", "2"])),
    ])
    .unwrap();
    assert_eq!(def.get_num_partitions(&PartitionLoadingContext::new()).unwrap(), 6);
}

#[test]
fn test_reserved_character_rejected() {
    let err = MultiPartitionsDefinition::new([
        ("letter", static_def(&["a|b"])),
        ("number", static_def(&["1"])),
    ])
    .unwrap_err();
    assert!(matches!(err, MpError::Definition(_)));
    assert_eq!(classify_error(&err), ErrorCategory::Fatal);
}

#[test]
fn test_time_window_lookup() {
    let def = MultiPartitionsDefinition::new([
        ("region", static_def(&["us", "eu"])),
        ("hour", TimeWindowPartitionsDefinition::hourly(day(2024, 5, 1)).into()),
    ])
    .unwrap();

    assert_eq!(def.primary_dimension().name, "hour");
    let window = def.time_window_for_partition_key("2024-05-01-13:00|eu").unwrap();
    assert_eq!(
        window,
        TimeWindow::new(
            day(2024, 5, 1) + chrono::Duration::hours(13),
            day(2024, 5, 1) + chrono::Duration::hours(14)
        )
    );

    let as_def: PartitionsDefinition = def.into();
    assert!(as_def.time_window_for_partition_key("2024-05-01-13:30|eu").is_err());
}

#[test]
fn test_tags_for_partition_key() {
    let tags = color_by_day().get_tags_for_partition_key("green|2020-01-02").unwrap();
    assert_eq!(tags.len(), 3);
    assert_eq!(tags["partition"], "green|2020-01-02");
    assert_eq!(tags["partition/color"], "green");
    assert_eq!(tags["partition/day"], "2020-01-02");
}

#[test]
fn test_custom_time_formats_round_trip() {
    let hourly = MultiPartitionsDefinition::new([
        ("color", static_def(&["red"])),
        (
            "hour",
            TimeWindowPartitionsDefinition::hourly(day(2024, 1, 1))
                .with_fmt("%Y-%m-%d-%H")
                .into(),
        ),
    ])
    .unwrap();
    let ctx = ctx_at(day(2024, 1, 1) + chrono::Duration::hours(4));

    let keys = hourly.get_partition_keys(&ctx).unwrap();
    assert_eq!(
        render(&keys),
        vec!["red|2024-01-01-00", "red|2024-01-01-01", "red|2024-01-01-02", "red|2024-01-01-03"]
    );
    for key in keys.iter() {
        assert!(hourly.has_partition_key(&key.to_string(), &ctx).unwrap(), "{key}");
    }
    let range = hourly
        .get_partition_keys_in_range(&PartitionKeyRange::new("red|2024-01-01-01", "red|2024-01-01-02"), &ctx)
        .unwrap();
    assert_eq!(render(&range), vec!["red|2024-01-01-01", "red|2024-01-01-02"]);

    let monthly = MultiPartitionsDefinition::new([
        ("color", static_def(&["red"])),
        (
            "month",
            TimeWindowPartitionsDefinition::monthly(day(2024, 1, 1))
                .with_fmt("%Y-%m")
                .into(),
        ),
    ])
    .unwrap();
    let ctx = ctx_at(day(2024, 4, 1));
    let keys = monthly.get_partition_keys(&ctx).unwrap();
    assert_eq!(render(&keys), vec!["red|2024-01", "red|2024-02", "red|2024-03"]);
    let valid = monthly
        .filter_valid_partition_keys(["red|2024-02", "red|2024-04"], &ctx)
        .unwrap();
    assert_eq!(valid.len(), 1);
    assert_eq!(
        monthly.time_window_for_partition_key("red|2024-02").unwrap(),
        TimeWindow::new(day(2024, 2, 1), day(2024, 3, 1))
    );
}

#[test]
fn test_ambiguous_time_format_rejected() {
    let err = MultiPartitionsDefinition::new([
        ("color", static_def(&["red"])),
        (
            "day",
            TimeWindowPartitionsDefinition::daily(day(2024, 1, 1))
                .with_fmt("%Y-%m")
                .into(),
        ),
    ])
    .unwrap_err();
    assert!(matches!(err, MpError::Definition(_)));
}
