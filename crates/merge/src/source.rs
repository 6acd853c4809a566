//! Source cursors and per-source error taxonomy.

use std::path::{Path, PathBuf};

use bagmerge_container::{ContainerReader, FormatError, Record};
use bagmerge_core::{Message, Timestamp};

use crate::registry::Registry;

/// Recoverable, per-source failure.
///
/// None of these abort a run: the source that raised one is dropped from the
/// merge and counted as skipped in the summary.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The container could not be opened, parsed, or read further
    #[error(transparent)]
    Format(#[from] FormatError),

    /// A message referenced a channel the source never declared
    #[error("message references undeclared channel {channel_id}")]
    UnknownChannel {
        /// The undeclared source-local channel id
        channel_id: u16,
    },

    /// A channel referenced a schema the source never declared
    #[error("channel {channel_id} references undeclared schema {schema_id}")]
    MissingSchema {
        /// The declaring source-local channel id
        channel_id: u16,
        /// The undeclared source-local schema id
        schema_id: u16,
    },

    /// Registering a definition would exceed the id space of the output
    #[error("definition limit exceeded: more than 65535 distinct schemas or channels")]
    DefinitionOverflow,
}

/// Forward-only cursor over one source container.
///
/// The cursor owns its reader for the duration of the merge; dropping the
/// cursor closes the file. Definition records encountered while advancing are
/// registered immediately, so by the time a message surfaces its channel is
/// known to the registry (or the source is malformed).
pub struct SourceCursor {
    ordinal: usize,
    path: PathBuf,
    reader: ContainerReader,
    next: Option<Message>,
}

impl SourceCursor {
    /// Wrap an opened reader. The cursor starts unprimed; call
    /// [`SourceCursor::advance`] to buffer the first message.
    pub fn new(ordinal: usize, path: PathBuf, reader: ContainerReader) -> Self {
        SourceCursor {
            ordinal,
            path,
            reader,
            next: None,
        }
    }

    /// Stable ordinal assigned at open time; the merge tie-break.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Path of the underlying container.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read forward to the next message, registering any definition records
    /// passed along the way.
    ///
    /// Returns the buffered message's log time, or `None` when the source is
    /// cleanly exhausted.
    pub fn advance(&mut self, registry: &mut Registry) -> Result<Option<Timestamp>, SourceError> {
        loop {
            match self.reader.next_record()? {
                Some(Record::Schema(schema)) => {
                    registry.register_schema(self.ordinal, &schema)?;
                }
                Some(Record::Channel(channel)) => {
                    registry.register_channel(self.ordinal, &channel)?;
                }
                Some(Record::Message(message)) => {
                    let t = message.log_time;
                    self.next = Some(message);
                    return Ok(Some(t));
                }
                None => {
                    self.next = None;
                    return Ok(None);
                }
            }
        }
    }

    /// Log time of the buffered message, if any.
    pub fn peek_time(&self) -> Option<Timestamp> {
        self.next.as_ref().map(|m| m.log_time)
    }

    /// Take the buffered message, leaving the cursor unprimed.
    pub fn take_message(&mut self) -> Option<Message> {
        self.next.take()
    }
}
