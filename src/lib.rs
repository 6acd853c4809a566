//! bagmerge: merge and filter timestamped multi-channel log containers.
//!
//! Many container files, each holding schema-typed channels of timestamped
//! messages, are combined into one output container: a streaming k-way merge
//! by log timestamp, with identifiers unified across sources, topics filtered
//! by include/exclude sets, messages restricted to a time window, and
//! transient channels replayed ("latched") at each regular message's
//! timestamp.
//!
//! # Quick Start
//!
//! ```ignore
//! use bagmerge::{run, MergeConfig};
//!
//! let mut config = MergeConfig::new("/var/lib/bags", "merged.bag");
//! config.include_topics = vec!["/odom".to_string()];
//! config.relative_secs = Some(3600);
//!
//! let summary = run(&config)?;
//! println!("{summary}");
//! ```
//!
//! The container codec is available directly via [`ContainerReader`] and
//! [`ContainerWriter`] for tooling that inspects or fabricates containers.

pub use bagmerge_container::{ContainerReader, ContainerWriter, FormatError, Record};
pub use bagmerge_core::{
    ChannelDef, Error, Message, MergeSummary, Result, SchemaDef, TimeWindow, Timestamp,
    TopicFilter,
};
pub use bagmerge_merge::{
    discover, run, DiscoveredFiles, LatchTracker, MergeConfig, MergeEngine, Registry,
    SourceError, CONTAINER_EXT, TRANSIENT_DIR,
};
