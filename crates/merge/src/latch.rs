//! Latched transient replay.
//!
//! Transient channels carry set-and-forget values (calibrations, static
//! transforms, configuration snapshots) whose last-known value should appear
//! to have just been published whenever a regular message is observed. The
//! tracker consumes a merge over the transient sources (topic-filtered like
//! the regular set but deliberately unwindowed, since a transient value from
//! before the window start may still be the latest value inside it) and
//! keeps the most recent N messages per channel.
//!
//! Snapshots re-emit the same latched values at every regular instant until
//! a newer transient arrives; that duplication is intended behavior, not an
//! accident (see the latch replay tests).

use std::collections::{BTreeMap, VecDeque};

use bagmerge_core::{Message, Timestamp};

use crate::engine::{EngineStats, MergeEngine};
use crate::registry::Registry;

/// Tracks the most recent N transient messages per global channel.
pub struct LatchTracker {
    engine: MergeEngine,
    depth: usize,

    /// Next transient message pulled but not yet due (log time > advance_to's t)
    pending: Option<Message>,

    /// Global channel id -> most recent messages, oldest first. BTreeMap
    /// keeps snapshot order deterministic (ascending channel id).
    states: BTreeMap<u16, VecDeque<Message>>,
}

impl LatchTracker {
    /// Track latches over `engine` with capacity `depth` per channel.
    pub fn new(engine: MergeEngine, depth: usize) -> Self {
        LatchTracker {
            engine,
            depth,
            pending: None,
            states: BTreeMap::new(),
        }
    }

    /// Absorb every transient message with log time `<= t`.
    ///
    /// Bounded pull: at most one message beyond `t` is read (and buffered for
    /// the next call), so the transient merge never runs ahead of the output.
    pub fn advance_to(&mut self, t: Timestamp, registry: &mut Registry) {
        loop {
            if self.pending.is_none() {
                self.pending = self.engine.next_message(registry);
            }
            match self.pending.take() {
                None => break,
                Some(message) if message.log_time <= t => self.absorb(message),
                Some(message) => {
                    self.pending = Some(message);
                    break;
                }
            }
        }
    }

    /// Latched replays for output instant `t`: for every channel with state,
    /// its up-to-N most recent messages, oldest first, re-stamped to `t`.
    pub fn snapshot(&self, t: Timestamp) -> Vec<Message> {
        let mut out = Vec::new();
        for (&channel_id, state) in &self.states {
            for message in state {
                out.push(message.restamped(channel_id, t));
            }
        }
        out
    }

    /// Source counters of the underlying transient merge.
    pub fn stats(&self) -> EngineStats {
        self.engine.stats()
    }

    fn absorb(&mut self, message: Message) {
        let state = self.states.entry(message.channel_id).or_default();
        state.push_back(message);
        while state.len() > self.depth {
            state.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bagmerge_container::ContainerWriter;
    use bagmerge_core::{ChannelDef, SchemaDef, TimeWindow, TopicFilter};
    use std::collections::BTreeMap;
    use std::path::Path;
    use tempfile::tempdir;

    fn write_transient(path: &Path, topic: &str, values: &[(u64, &[u8])]) {
        let mut writer = ContainerWriter::create(path).unwrap();
        writer
            .write_schema(&SchemaDef {
                id: 1,
                name: "s".to_string(),
                encoding: "jsonschema".to_string(),
                data: vec![],
            })
            .unwrap();
        writer
            .write_channel(&ChannelDef {
                id: 1,
                schema_id: 1,
                topic: topic.to_string(),
                message_encoding: "json".to_string(),
                metadata: BTreeMap::new(),
            })
            .unwrap();
        for &(t, data) in values {
            writer
                .write_message(&Message {
                    channel_id: 1,
                    log_time: t,
                    publish_time: t,
                    data: data.to_vec(),
                })
                .unwrap();
        }
        writer.finish().unwrap();
    }

    fn tracker_over(paths: &[std::path::PathBuf], depth: usize, registry: &mut Registry) -> LatchTracker {
        let engine = MergeEngine::open(
            paths,
            TopicFilter::pass_all(),
            TimeWindow::unbounded(),
            registry,
        );
        LatchTracker::new(engine, depth)
    }

    #[test]
    fn test_latest_value_wins_with_depth_one() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.bag");
        write_transient(&path, "/tf", &[(10, b"v1"), (20, b"v2")]);

        let mut registry = Registry::new();
        let mut tracker = tracker_over(&[path], 1, &mut registry);

        tracker.advance_to(30, &mut registry);
        let snapshot = tracker.snapshot(30);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].data, b"v2");
        assert_eq!(snapshot[0].log_time, 30);
        assert_eq!(snapshot[0].publish_time, 30);
    }

    #[test]
    fn test_absorbs_only_up_to_t() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.bag");
        write_transient(&path, "/tf", &[(10, b"v1"), (20, b"v2")]);

        let mut registry = Registry::new();
        let mut tracker = tracker_over(&[path], 1, &mut registry);

        tracker.advance_to(15, &mut registry);
        let snapshot = tracker.snapshot(15);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].data, b"v1");

        // v2 was buffered, not absorbed; it lands once t reaches it.
        tracker.advance_to(20, &mut registry);
        let snapshot = tracker.snapshot(25);
        assert_eq!(snapshot[0].data, b"v2");
        assert_eq!(snapshot[0].log_time, 25);
    }

    #[test]
    fn test_depth_keeps_most_recent_in_insertion_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.bag");
        write_transient(&path, "/tf", &[(10, b"v1"), (20, b"v2"), (30, b"v3")]);

        let mut registry = Registry::new();
        let mut tracker = tracker_over(&[path], 2, &mut registry);

        tracker.advance_to(40, &mut registry);
        let snapshot = tracker.snapshot(40);
        let payloads: Vec<&[u8]> = snapshot.iter().map(|m| m.data.as_slice()).collect();
        assert_eq!(payloads, vec![b"v2".as_slice(), b"v3".as_slice()]);
    }

    #[test]
    fn test_snapshot_repeats_until_newer_value() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.bag");
        write_transient(&path, "/tf", &[(10, b"v1")]);

        let mut registry = Registry::new();
        let mut tracker = tracker_over(&[path], 1, &mut registry);

        // The same latched value is re-stamped at every instant asked for.
        // This duplication is the documented latch semantics.
        tracker.advance_to(100, &mut registry);
        assert_eq!(tracker.snapshot(100)[0].log_time, 100);
        tracker.advance_to(200, &mut registry);
        assert_eq!(tracker.snapshot(200)[0].log_time, 200);
        assert_eq!(tracker.snapshot(200)[0].data, b"v1");
    }

    #[test]
    fn test_channels_snapshot_in_ascending_global_id_order() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.bag");
        let b = dir.path().join("b.bag");
        write_transient(&a, "/tf_a", &[(10, b"a")]);
        write_transient(&b, "/tf_b", &[(20, b"b")]);

        let mut registry = Registry::new();
        let mut tracker = tracker_over(&[a, b], 1, &mut registry);

        tracker.advance_to(50, &mut registry);
        let snapshot = tracker.snapshot(50);
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot[0].channel_id < snapshot[1].channel_id);
    }

    #[test]
    fn test_empty_transient_set_yields_empty_snapshots() {
        let mut registry = Registry::new();
        let mut tracker = tracker_over(&[], 1, &mut registry);
        tracker.advance_to(100, &mut registry);
        assert!(tracker.snapshot(100).is_empty());
    }
}
