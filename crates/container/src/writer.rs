//! Streaming container writer.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use bagmerge_core::{ChannelDef, Message, SchemaDef};

use crate::error::Result;
use crate::format::{self, Record};

/// Streaming writer for one container file.
///
/// Records are written in call order. The caller is responsible for writing
/// a channel's schema and the channel itself before the first message that
/// references them, and for calling [`ContainerWriter::finish`] to flush and
/// sync the file. Dropping an unfinished writer leaves a truncated container
/// behind, which readers detect via the record framing.
pub struct ContainerWriter {
    out: BufWriter<File>,
    path: PathBuf,
    records_written: u64,
}

impl ContainerWriter {
    /// Create a new container file, truncating any existing file at `path`.
    pub fn create(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        let mut out = BufWriter::new(file);
        out.write_all(&format::encode_header())?;

        Ok(ContainerWriter {
            out,
            path: path.to_path_buf(),
            records_written: 0,
        })
    }

    /// Path of the file being written.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records written so far.
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Append a schema definition record.
    pub fn write_schema(&mut self, schema: &SchemaDef) -> Result<()> {
        self.write_record(&Record::Schema(schema.clone()))
    }

    /// Append a channel definition record.
    pub fn write_channel(&mut self, channel: &ChannelDef) -> Result<()> {
        self.write_record(&Record::Channel(channel.clone()))
    }

    /// Append a message record.
    pub fn write_message(&mut self, message: &Message) -> Result<()> {
        self.write_record(&Record::Message(message.clone()))
    }

    fn write_record(&mut self, record: &Record) -> Result<()> {
        self.out.write_all(&record.to_bytes())?;
        self.records_written += 1;
        Ok(())
    }

    /// Flush buffered records and sync the file to disk.
    pub fn finish(mut self) -> Result<()> {
        self.out.flush()?;
        self.out.get_ref().sync_all()?;
        Ok(())
    }
}
