//! Streaming k-way merge.
//!
//! An explicit min-heap over source cursors, keyed by (next message log time,
//! source ordinal). The ordinal is the order in which sources were opened,
//! so ties on equal timestamps resolve the same way on every run over the
//! same inputs.
//!
//! Filtering happens at pop time: a message whose topic or timestamp is
//! rejected still advances its source, and a message below the window start
//! never terminates a source early, since interleaved channels may still
//! have in-window messages later in the file.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::path::PathBuf;

use tracing::debug;

use bagmerge_container::ContainerReader;
use bagmerge_core::{Message, TimeWindow, TopicFilter};

use crate::registry::Registry;
use crate::source::SourceCursor;

/// Heap key: log time first, then opening ordinal for a stable tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct HeapKey {
    log_time: u64,
    ordinal: usize,
}

/// Per-engine source counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineStats {
    /// Sources attempted
    pub scanned: usize,

    /// Sources dropped for per-source errors
    pub skipped: usize,
}

/// K-way timestamp merge over a set of source containers.
///
/// Not restartable: every source reader is forward-only and single-pass.
/// Exhausted and failed cursors are dropped immediately, which closes their
/// files; nothing outlives the engine.
pub struct MergeEngine {
    cursors: Vec<Option<SourceCursor>>,
    heap: BinaryHeap<Reverse<HeapKey>>,
    filter: TopicFilter,
    window: TimeWindow,
    stats: EngineStats,
}

impl MergeEngine {
    /// Open `paths` in order and prime the heap, numbering sources from 0.
    ///
    /// A file that cannot be opened or whose first records are malformed is
    /// skipped here; the merge proceeds with whatever opened.
    pub fn open(
        paths: &[PathBuf],
        filter: TopicFilter,
        window: TimeWindow,
        registry: &mut Registry,
    ) -> Self {
        Self::open_from(paths, filter, window, registry, 0)
    }

    /// Open `paths` with source ids numbered from `first_source_id`.
    ///
    /// Engines feeding one shared registry must use disjoint source id
    /// ranges; the registry keys its local-to-global maps on
    /// `(source id, local id)`, so overlapping ranges would let one engine's
    /// channel registrations shadow another's.
    pub fn open_from(
        paths: &[PathBuf],
        filter: TopicFilter,
        window: TimeWindow,
        registry: &mut Registry,
        first_source_id: usize,
    ) -> Self {
        let mut engine = MergeEngine {
            cursors: Vec::with_capacity(paths.len()),
            heap: BinaryHeap::with_capacity(paths.len()),
            filter,
            window,
            stats: EngineStats::default(),
        };

        for (ordinal, path) in paths.iter().enumerate() {
            engine.stats.scanned += 1;
            match ContainerReader::open(path) {
                Ok(reader) => {
                    let mut cursor =
                        SourceCursor::new(first_source_id + ordinal, path.clone(), reader);
                    match cursor.advance(registry) {
                        Ok(Some(log_time)) => {
                            engine.heap.push(Reverse(HeapKey { log_time, ordinal }));
                            engine.cursors.push(Some(cursor));
                        }
                        Ok(None) => {
                            debug!(path = %path.display(), "source has no messages");
                            engine.cursors.push(None);
                        }
                        Err(e) => {
                            debug!(path = %path.display(), error = %e, "skipping malformed source");
                            engine.stats.skipped += 1;
                            engine.cursors.push(None);
                        }
                    }
                }
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "skipping unreadable source");
                    engine.stats.skipped += 1;
                    engine.cursors.push(None);
                }
            }
        }

        engine
    }

    /// Log time of the next unconsumed message across all sources, filtered
    /// or not.
    pub fn peek_time(&self) -> Option<u64> {
        self.heap.peek().map(|Reverse(key)| key.log_time)
    }

    /// Pop the next message that passes the topic filter and time window,
    /// with its channel id remapped to the global id space.
    ///
    /// Returns `None` once every source is exhausted or dropped. Sources that
    /// fail mid-stream are dropped here, keeping the already-yielded prefix;
    /// their skip is visible in [`MergeEngine::stats`].
    pub fn next_message(&mut self, registry: &mut Registry) -> Option<Message> {
        loop {
            let Reverse(key) = self.heap.pop()?;

            let Some(cursor) = self.cursors[key.ordinal].as_mut() else {
                continue;
            };
            let Some(mut message) = cursor.take_message() else {
                continue;
            };

            // Resolve the channel before advancing: a message on an
            // undeclared channel condemns the whole source.
            let (global_id, topic_ok) = match registry
                .channel_for_source(cursor.ordinal(), message.channel_id)
            {
                Some(channel) => (channel.id, self.filter.passes(&channel.topic)),
                None => {
                    debug!(
                        path = %cursor.path().display(),
                        channel_id = message.channel_id,
                        "dropping source: message on undeclared channel"
                    );
                    self.stats.skipped += 1;
                    self.cursors[key.ordinal] = None;
                    continue;
                }
            };

            self.refill(key.ordinal, registry);

            if topic_ok && self.window.contains(message.log_time) {
                message.channel_id = global_id;
                return Some(message);
            }
            // Filtered out: the source was still advanced; keep draining.
        }
    }

    /// Advance a cursor to its next message and re-key it in the heap, or
    /// drop it on exhaustion or error.
    fn refill(&mut self, ordinal: usize, registry: &mut Registry) {
        let Some(cursor) = self.cursors[ordinal].as_mut() else {
            return;
        };
        match cursor.advance(registry) {
            Ok(Some(log_time)) => {
                self.heap.push(Reverse(HeapKey { log_time, ordinal }));
            }
            Ok(None) => {
                self.cursors[ordinal] = None;
            }
            Err(e) => {
                debug!(
                    path = %cursor.path().display(),
                    error = %e,
                    "dropping source mid-stream"
                );
                self.stats.skipped += 1;
                self.cursors[ordinal] = None;
            }
        }
    }

    /// Source counters for the summary.
    pub fn stats(&self) -> EngineStats {
        self.stats
    }
}
