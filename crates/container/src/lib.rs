//! Log-container codec for bagmerge.
//!
//! A container is a single file holding schema definitions, channel
//! definitions, and timestamped messages in write order. Messages within one
//! container are sorted by log timestamp; definitions appear before the first
//! message that references them.
//!
//! The format is record-oriented: a fixed header (magic + version) followed
//! by length-prefixed, CRC32-checked records. Readers are forward-only and
//! single-pass; writers are streaming and finalize on close.

pub mod error;
pub mod format;
pub mod reader;
pub mod writer;

pub use error::{FormatError, Result};
pub use format::{Record, CONTAINER_MAGIC, FORMAT_VERSION};
pub use reader::ContainerReader;
pub use writer::ContainerWriter;
