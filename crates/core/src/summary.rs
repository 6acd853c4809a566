//! Per-run counters reported to the caller.

use std::fmt;

/// Counts accumulated over one merge run.
///
/// A run that skipped some sources but wrote output from the survivors is
/// still a success; `files_skipped` is how the caller learns about the skips.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Container files discovered and attempted (regular + transient)
    pub files_scanned: usize,

    /// Files dropped for per-source errors (open failure, corruption,
    /// undeclared identifiers)
    pub files_skipped: usize,

    /// Regular messages written to the output
    pub messages_written: u64,

    /// Latched transient replays written to the output
    pub latched_written: u64,

    /// Schema and channel definitions written to the output
    pub definitions_written: u64,
}

impl fmt::Display for MergeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files scanned ({} skipped), {} messages written ({} latched), {} definitions",
            self.files_scanned,
            self.files_skipped,
            self.messages_written,
            self.latched_written,
            self.definitions_written
        )
    }
}
