//! Shared data types for the multi-partition workspace.
//!
//! Plain values exchanged between the partition core and its callers:
//! key ranges, time windows, paginated results, partition schedules and the
//! serde configuration used to declare partition spaces.

mod config;
mod key_range;
mod pagination;
mod schedule;
mod time_window;

pub use config::{DimensionConfig, MultiPartitionsConfig};
pub use key_range::PartitionKeyRange;
pub use pagination::PaginatedResults;
pub use schedule::PartitionSchedule;
pub use time_window::TimeWindow;
