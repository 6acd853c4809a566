//! Merge run configuration.

use std::path::PathBuf;

use bagmerge_core::Timestamp;

/// Default number of latched transient messages replayed per channel.
pub const DEFAULT_LATCH_DEPTH: usize = 1;

/// Everything one merge run needs.
///
/// Built by the CLI (or any other caller) and handed to [`crate::run`].
/// Timestamps are nanoseconds since the Unix epoch; string parsing lives with
/// the caller.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Directory scanned recursively for container files
    pub root_dir: PathBuf,

    /// Output container path
    pub output: PathBuf,

    /// Absolute window start (inclusive), if any
    pub start: Option<Timestamp>,

    /// Absolute window end (exclusive), if any
    pub end: Option<Timestamp>,

    /// Relative window in seconds back from "now"; exclusive with `start`/`end`
    pub relative_secs: Option<u64>,

    /// Inline include topics (may contain comma-separated entries)
    pub include_topics: Vec<String>,

    /// Inline exclude topics (may contain comma-separated entries)
    pub exclude_topics: Vec<String>,

    /// Topic files whose contents extend the include set
    pub include_topic_files: Vec<PathBuf>,

    /// Topic files whose contents extend the exclude set
    pub exclude_topic_files: Vec<PathBuf>,

    /// Latch depth N: most recent transient messages kept per channel (>= 1)
    pub latched_transient_msgs: usize,

    /// Surface skipped-file diagnostics
    pub debug: bool,
}

impl MergeConfig {
    /// Configuration with no filters, an unbounded window, and default latch
    /// depth.
    pub fn new(root_dir: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        MergeConfig {
            root_dir: root_dir.into(),
            output: output.into(),
            start: None,
            end: None,
            relative_secs: None,
            include_topics: Vec::new(),
            exclude_topics: Vec::new(),
            include_topic_files: Vec::new(),
            exclude_topic_files: Vec::new(),
            latched_transient_msgs: DEFAULT_LATCH_DEPTH,
            debug: false,
        }
    }
}
