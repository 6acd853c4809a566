//! Codec error types.

use std::io;
use thiserror::Error;

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, FormatError>;

/// Errors raised while reading or writing a container file.
///
/// Every variant is recoverable from the merge's point of view: the source
/// that produced it is dropped and the run continues with the rest.
#[derive(Debug, Error)]
pub enum FormatError {
    /// I/O error from the underlying file
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file does not start with the container magic bytes
    #[error("not a container file: bad magic bytes")]
    InvalidMagic,

    /// The file declares a format version this codec cannot read
    #[error("unsupported container format version {0}")]
    UnsupportedVersion(u32),

    /// The file ends in the middle of a record
    #[error("truncated record at offset {offset}")]
    Truncated {
        /// Byte offset of the record that could not be completed
        offset: u64,
    },

    /// A record's CRC32 did not match its payload
    #[error("checksum mismatch at offset {offset}")]
    ChecksumMismatch {
        /// Byte offset of the corrupt record
        offset: u64,
    },

    /// A record's payload could not be parsed despite a valid CRC
    #[error("malformed record: {0}")]
    Malformed(String),
}
