//! Tree summary for the `info` subcommand.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use std::collections::HashMap;
use tracing::debug;

use bagmerge_container::{ContainerReader, Record};
use bagmerge_core::{Timestamp, TopicFilter};
use bagmerge_merge::discover;

use crate::parse::format_instant;

#[derive(Debug, Default)]
struct TreeSummary {
    files: usize,
    unreadable: usize,
    total_bytes: u64,
    messages: u64,
    first: Option<Timestamp>,
    last: Option<Timestamp>,
}

impl TreeSummary {
    fn absorb(&mut self, file: FileStats) {
        self.files += 1;
        self.total_bytes += file.bytes;
        self.messages += file.messages;
        self.first = merge_min(self.first, file.first);
        self.last = merge_max(self.last, file.last);
    }
}

#[derive(Debug, Default)]
struct FileStats {
    bytes: u64,
    messages: u64,
    first: Option<Timestamp>,
    last: Option<Timestamp>,
}

/// Scan every container under `root_dir` and print a summary.
pub fn run(root_dir: &Path, filter: &TopicFilter) -> Result<()> {
    let found = discover(root_dir)
        .with_context(|| format!("cannot scan root directory {}", root_dir.display()))?;

    let mut summary = TreeSummary::default();
    for path in found.regular.iter().chain(found.transient.iter()) {
        match scan_file(path, filter) {
            Ok(stats) => summary.absorb(stats),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "skipping unreadable container");
                summary.unreadable += 1;
            }
        }
    }

    println!("Root directory: {}", root_dir.display());
    println!(
        "Container files: {} readable, {} unreadable",
        summary.files, summary.unreadable
    );
    println!(
        "Total size: {:.2} MiB",
        summary.total_bytes as f64 / (1024.0 * 1024.0)
    );
    println!("Matching messages: {}", summary.messages);
    match (summary.first, summary.last) {
        (Some(first), Some(last)) => {
            println!(
                "Time range: {} .. {}",
                format_instant(first),
                format_instant(last)
            );
            println!(
                "Duration: {:.3} s",
                last.saturating_sub(first) as f64 / 1e9
            );
        }
        _ => println!("Time range: no messages matched"),
    }
    Ok(())
}

/// Collect per-file stats, counting only messages whose topic passes the
/// filter. A corrupt tail ends the scan of that file; what was already read
/// still counts.
fn scan_file(path: &Path, filter: &TopicFilter) -> Result<FileStats> {
    let mut reader = ContainerReader::open(path)
        .with_context(|| format!("cannot open {}", path.display()))?;

    let mut stats = FileStats {
        bytes: fs::metadata(path)
            .with_context(|| format!("cannot stat {}", path.display()))?
            .len(),
        ..FileStats::default()
    };
    let mut keep_channel: HashMap<u16, bool> = HashMap::new();

    loop {
        match reader.next_record() {
            Ok(Some(Record::Schema(_))) => {}
            Ok(Some(Record::Channel(channel))) => {
                keep_channel.insert(channel.id, filter.passes(&channel.topic));
            }
            Ok(Some(Record::Message(message))) => {
                if keep_channel.get(&message.channel_id).copied().unwrap_or(false) {
                    stats.messages += 1;
                    stats.first = merge_min(stats.first, Some(message.log_time));
                    stats.last = merge_max(stats.last, Some(message.log_time));
                }
            }
            Ok(None) => break,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "container ends early");
                break;
            }
        }
    }
    Ok(stats)
}

fn merge_min(a: Option<Timestamp>, b: Option<Timestamp>) -> Option<Timestamp> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (x, None) | (None, x) => x,
    }
}

fn merge_max(a: Option<Timestamp>, b: Option<Timestamp>) -> Option<Timestamp> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (x, None) | (None, x) => x,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bagmerge_container::ContainerWriter;
    use bagmerge_core::{ChannelDef, Message, SchemaDef};
    use tempfile::tempdir;

    fn write_sample(path: &Path) {
        let mut writer = ContainerWriter::create(path).unwrap();
        writer
            .write_schema(&SchemaDef {
                id: 1,
                name: "example/Value".to_string(),
                encoding: "ros2msg".to_string(),
                data: b"int32 value".to_vec(),
            })
            .unwrap();
        writer
            .write_channel(&ChannelDef {
                id: 1,
                schema_id: 1,
                topic: "/sensor".to_string(),
                message_encoding: "cdr".to_string(),
                metadata: Default::default(),
            })
            .unwrap();
        for t in [100u64, 250, 400] {
            writer
                .write_message(&Message {
                    channel_id: 1,
                    log_time: t,
                    publish_time: t,
                    data: vec![1],
                })
                .unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_scan_counts_matching_messages() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.bag");
        write_sample(&path);

        let stats = scan_file(&path, &TopicFilter::new(Vec::new(), Vec::new())).unwrap();
        assert_eq!(stats.messages, 3);
        assert_eq!(stats.first, Some(100));
        assert_eq!(stats.last, Some(400));
        assert!(stats.bytes > 0);
    }

    #[test]
    fn test_scan_honors_filter() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.bag");
        write_sample(&path);

        let filter = TopicFilter::new(Vec::new(), vec!["/sensor".to_string()]);
        let stats = scan_file(&path, &filter).unwrap();
        assert_eq!(stats.messages, 0);
        assert_eq!(stats.first, None);
    }
}
