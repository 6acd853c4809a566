//! Forward-only container reader.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::error::{FormatError, Result};
use crate::format::{self, Record, HEADER_SIZE, MAX_RECORD_LEN};

/// Streaming reader over one container file.
///
/// The reader is forward-only and single-pass: each record is decoded once,
/// in file order. The file handle is released when the reader is dropped.
pub struct ContainerReader {
    file: BufReader<File>,
    path: PathBuf,
    offset: u64,
}

impl ContainerReader {
    /// Open a container and validate its header.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mut file = BufReader::new(file);

        let mut header = [0u8; HEADER_SIZE];
        file.read_exact(&mut header)
            .map_err(|_| FormatError::InvalidMagic)?;
        format::decode_header(&header)?;

        Ok(ContainerReader {
            file,
            path: path.to_path_buf(),
            offset: HEADER_SIZE as u64,
        })
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode the next record, or `None` at a clean end of file.
    ///
    /// A file that ends mid-record yields `Truncated`; a record whose CRC
    /// does not match yields `ChecksumMismatch`. Callers treat both as the
    /// end of a usable source.
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        let record_offset = self.offset;

        let mut len_bytes = [0u8; 4];
        match read_exact_or_eof(&mut self.file, &mut len_bytes)? {
            ReadOutcome::Eof => return Ok(None),
            ReadOutcome::Partial => {
                return Err(FormatError::Truncated {
                    offset: record_offset,
                })
            }
            ReadOutcome::Full => {}
        }

        let len = u32::from_le_bytes(len_bytes) as usize;
        if len == 0 || len > MAX_RECORD_LEN {
            return Err(FormatError::Malformed(format!(
                "implausible record length {} at offset {}",
                len, record_offset
            )));
        }

        let mut body = vec![0u8; len];
        match read_exact_or_eof(&mut self.file, &mut body)? {
            ReadOutcome::Full => {}
            _ => {
                return Err(FormatError::Truncated {
                    offset: record_offset,
                })
            }
        }

        self.offset += 4 + len as u64;
        Record::from_body(&body, record_offset).map(Some)
    }
}

enum ReadOutcome {
    /// Buffer completely filled
    Full,
    /// Zero bytes available, clean end of file
    Eof,
    /// Some bytes read, then end of file
    Partial,
}

fn read_exact_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<ReadOutcome> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                return Ok(if filled == 0 {
                    ReadOutcome::Eof
                } else {
                    ReadOutcome::Partial
                });
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(ReadOutcome::Full)
}
