//! Merge engine for bagmerge.
//!
//! Combines many log-container files into one output container: a streaming
//! k-way merge by log timestamp across all regular sources, identifier
//! unification across sources, topic and time-window filtering, and latched
//! replay of transient channels at each regular message's timestamp.
//!
//! The whole pipeline is single-threaded and single-pass. Per-source failures
//! (unopenable files, corruption, undeclared identifiers) drop the offending
//! source and continue; only configuration and output-write errors abort a
//! run. Entry point: [`run`].

pub mod assemble;
pub mod config;
pub mod discover;
pub mod engine;
pub mod latch;
pub mod registry;
pub mod source;
pub mod topics;

pub use assemble::run;
pub use config::MergeConfig;
pub use discover::{discover, DiscoveredFiles, CONTAINER_EXT, TRANSIENT_DIR};
pub use engine::MergeEngine;
pub use latch::LatchTracker;
pub use registry::Registry;
pub use source::SourceError;
