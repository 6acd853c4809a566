//! Core types for bagmerge
//!
//! This crate defines the foundational types shared by the container codec,
//! the merge engine, and the CLI:
//! - SchemaDef / ChannelDef / Message: the logical records of a log container
//! - TopicFilter: include/exclude topic predicate
//! - TimeWindow: half-open `[start, end)` time window with optional bounds
//! - Error: fatal error taxonomy for a merge run
//! - MergeSummary: per-run counters reported to the caller

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod filter;
pub mod record;
pub mod summary;
pub mod window;

pub use error::{Error, Result};
pub use filter::TopicFilter;
pub use record::{ChannelDef, Message, SchemaDef, Timestamp};
pub use summary::MergeSummary;
pub use window::TimeWindow;
