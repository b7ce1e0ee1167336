//! Main execution logic for mp-inspect.

use anyhow::{Context, Result};
use mp_error::{classify_error, ErrorCategory, MpError};
use mp_partitions::{MultiPartitionsDefinition, PartitionLoadingContext};
use mp_traits::InMemoryPartitionsStore;
use mp_types::PartitionKeyRange;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::args::{Cli, Command};

/// Result of one inspection.
#[derive(Debug)]
pub struct Report {
    /// JSON written to stdout
    pub output: Value,
    /// Human-readable summary written to stderr
    pub summary: String,
}

/// Execute the inspection requested on the command line.
pub fn execute(args: &Cli) -> Result<Report> {
    let def = load_definition(&args.config)?;
    info!(definition = %def, "Loaded partition space");

    let mut ctx = PartitionLoadingContext::new();
    if let Some(current_time) = args.current_time {
        ctx = ctx.with_current_time(current_time);
    }
    if let Some(path) = &args.store_file {
        ctx = ctx.with_dynamic_partitions_store(Arc::new(load_store(path)?));
    }
    // Every command sees the same instant.
    let ctx = ctx.resolved();

    inspect(&def, &ctx, &args.command)
}

/// Run one command against a loaded definition.
pub fn inspect(
    def: &MultiPartitionsDefinition,
    ctx: &PartitionLoadingContext,
    command: &Command,
) -> Result<Report> {
    let report = match command {
        Command::Keys => {
            let keys = def.get_partition_keys(ctx)?;
            let keys: Vec<String> = keys.iter().map(ToString::to_string).collect();
            Report {
                summary: format!("Partition keys: {}", mp_cli_common::format_number(keys.len())),
                output: json!(keys),
            }
        }
        Command::Page {
            limit,
            cursor,
            descending,
        } => {
            let page = def
                .get_paginated_partition_keys(ctx, *limit, !descending, cursor.as_deref())?
                .map(|key| key.to_string());
            Report {
                summary: format!("Page of {} keys, has more: {}", page.len(), page.has_more),
                output: serde_json::to_value(&page)?,
            }
        }
        Command::Check { key } => {
            let exists = def.has_partition_key(key, ctx)?;
            Report {
                summary: format!("{key}: {}", if exists { "exists" } else { "not found" }),
                output: json!({ "key": key, "exists": exists }),
            }
        }
        Command::Range { start, end } => {
            let keys: Vec<String> = def
                .get_partition_keys_in_range(&PartitionKeyRange::new(start, end), ctx)?
                .iter()
                .map(ToString::to_string)
                .collect();
            Report {
                summary: format!("Keys in range: {}", mp_cli_common::format_number(keys.len())),
                output: json!(keys),
            }
        }
        Command::Count => {
            let count = def.get_num_partitions(ctx)?;
            Report {
                summary: format!("Partitions: {}", mp_cli_common::format_number(count)),
                output: json!({ "num_partitions": count }),
            }
        }
        Command::Identifier => {
            let identifier = def.get_serializable_unique_identifier(ctx)?;
            Report {
                summary: format!("Identifier: {identifier}"),
                output: json!({ "identifier": identifier }),
            }
        }
        Command::TimeWindow { key } => {
            let window = def.time_window_for_partition_key(key)?;
            Report {
                summary: format!("{key}: {} to {}", window.start, window.end),
                output: serde_json::to_value(window)?,
            }
        }
        Command::Tags { key } => {
            let tags = def.get_tags_for_partition_key(key)?;
            Report {
                summary: format!("Tags: {}", tags.len()),
                output: serde_json::to_value(&tags)?,
            }
        }
    };
    Ok(report)
}

/// Load a partition space definition from a JSON file.
pub fn load_definition(path: &Path) -> Result<MultiPartitionsDefinition> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read definition file {}", path.display()))?;
    let def = MultiPartitionsDefinition::from_json_str(&json)?;
    debug!(path = %path.display(), dimensions = ?def.partition_dimension_names(), "Parsed definition");
    Ok(def)
}

/// Load a dynamic partitions snapshot (`{"name": ["key", ...]}`) into a store.
pub fn load_store(path: &Path) -> Result<InMemoryPartitionsStore> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read store file {}", path.display()))?;
    let snapshot: BTreeMap<String, Vec<String>> = serde_json::from_str(&json)
        .map_err(|e| MpError::Config(format!("Invalid store file {}: {e}", path.display())))?;

    let store = InMemoryPartitionsStore::new();
    for (name, keys) in snapshot {
        debug!(name = %name, count = keys.len(), "Loading dynamic partitions");
        store.add_partitions(&name, keys);
    }
    Ok(store)
}

/// Process exit code for a failed inspection.
pub fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<MpError>().map(classify_error) {
        Some(ErrorCategory::Fatal) => 2,
        Some(ErrorCategory::InvalidInput) => 3,
        Some(ErrorCategory::External) => 4,
        None => 1,
    }
}
