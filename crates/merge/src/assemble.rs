//! Output assembly.
//!
//! Drives the registry, the regular merge, and the latch tracker, and writes
//! the ordered result. For every regular message at timestamp `t`: catch the
//! latch tracker up to `t`, write its snapshot, then write the message.
//! Definitions are written exactly once, at first use, regardless of how many
//! sources unified into them.

use std::collections::HashSet;
use std::fs;
use std::io;

use tracing::{debug, info};

use bagmerge_container::{ContainerWriter, FormatError};
use bagmerge_core::{Error, MergeSummary, Result, TimeWindow, Timestamp};

use crate::config::MergeConfig;
use crate::discover;
use crate::engine::MergeEngine;
use crate::latch::LatchTracker;
use crate::registry::Registry;
use crate::topics;

/// Execute one merge run.
///
/// Returns the summary on success. Per-source failures are absorbed into
/// `files_skipped`; only configuration and output-write errors surface here.
pub fn run(config: &MergeConfig) -> Result<MergeSummary> {
    if config.latched_transient_msgs < 1 {
        return Err(Error::Configuration(
            "latched transient message count must be at least 1".to_string(),
        ));
    }

    let window = TimeWindow::resolve(config.start, config.end, config.relative_secs, now_ns())?;
    let filter = topics::build_filter(config)?;

    let files = discover::discover(&config.root_dir).map_err(|e| {
        Error::Configuration(format!(
            "cannot scan root directory {}: {}",
            config.root_dir.display(),
            e
        ))
    })?;
    info!(
        regular = files.regular.len(),
        transient = files.transient.len(),
        "discovered container files"
    );

    let mut registry = Registry::new();
    let mut regular = MergeEngine::open(&files.regular, filter.clone(), window, &mut registry);

    // The transient merge shares the topic filter but not the window: a
    // transient value before the window start may still be the latest
    // latched value inside it. Source ids continue past the regular range
    // so the shared registry keeps the two source sets apart.
    let transient_engine = MergeEngine::open_from(
        &files.transient,
        filter,
        TimeWindow::unbounded(),
        &mut registry,
        files.regular.len(),
    );
    let mut latch = LatchTracker::new(transient_engine, config.latched_transient_msgs);

    if let Some(parent) = config.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(Error::OutputWrite)?;
        }
    }
    let mut writer = ContainerWriter::create(&config.output).map_err(as_output_error)?;

    let mut summary = MergeSummary::default();
    let mut written_schemas: HashSet<u16> = HashSet::new();
    let mut written_channels: HashSet<u16> = HashSet::new();

    while let Some(message) = regular.next_message(&mut registry) {
        let t: Timestamp = message.log_time;

        latch.advance_to(t, &mut registry);
        for latched in latch.snapshot(t) {
            ensure_definitions(
                latched.channel_id,
                &registry,
                &mut writer,
                &mut written_schemas,
                &mut written_channels,
                &mut summary,
            )?;
            writer.write_message(&latched).map_err(as_output_error)?;
            summary.latched_written += 1;
        }

        ensure_definitions(
            message.channel_id,
            &registry,
            &mut writer,
            &mut written_schemas,
            &mut written_channels,
            &mut summary,
        )?;
        writer.write_message(&message).map_err(as_output_error)?;
        summary.messages_written += 1;
    }

    writer.finish().map_err(as_output_error)?;

    let regular_stats = regular.stats();
    let transient_stats = latch.stats();
    summary.files_scanned = regular_stats.scanned + transient_stats.scanned;
    summary.files_skipped = regular_stats.skipped + transient_stats.skipped;

    info!(%summary, "merge complete");
    Ok(summary)
}

/// Write a channel's definitions (schema first) if not already written.
fn ensure_definitions(
    channel_id: u16,
    registry: &Registry,
    writer: &mut ContainerWriter,
    written_schemas: &mut HashSet<u16>,
    written_channels: &mut HashSet<u16>,
    summary: &mut MergeSummary,
) -> Result<()> {
    if written_channels.contains(&channel_id) {
        return Ok(());
    }
    let Some(channel) = registry.channel(channel_id) else {
        // The engine only emits remapped ids, so this cannot happen for its
        // output; guard anyway rather than panic on a future caller's bug.
        debug!(channel_id, "no definition registered for channel");
        return Ok(());
    };

    if written_schemas.insert(channel.schema_id) {
        if let Some(schema) = registry.schema(channel.schema_id) {
            writer.write_schema(schema).map_err(as_output_error)?;
            summary.definitions_written += 1;
        }
    }

    writer.write_channel(channel).map_err(as_output_error)?;
    written_channels.insert(channel_id);
    summary.definitions_written += 1;
    Ok(())
}

fn as_output_error(e: FormatError) -> Error {
    match e {
        FormatError::Io(io_err) => Error::OutputWrite(io_err),
        other => Error::OutputWrite(io::Error::new(io::ErrorKind::InvalidData, other.to_string())),
    }
}

fn now_ns() -> Timestamp {
    // chrono overflows nanosecond precision after 2262; saturate rather
    // than fail.
    chrono::Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or(i64::MAX)
        .max(0) as Timestamp
}
