//! Error types for bagmerge
//!
//! Only *fatal* conditions live here: a configuration error prevents a run
//! from starting, and an output write error aborts it. Per-source failures
//! (unopenable files, corrupt or truncated containers, undeclared channel or
//! schema references) are recoverable: the offending source is dropped and
//! the run continues, so they are modeled as values local to the merge
//! crate, not as variants of this type.

use std::io;
use thiserror::Error;

/// Result type alias for bagmerge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors for a merge run.
#[derive(Debug, Error)]
pub enum Error {
    /// Contradictory or malformed configuration; the run never starts.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The output container could not be created or written; the run aborts
    /// and partial output is not considered valid.
    #[error("output write error: {0}")]
    OutputWrite(#[source] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_display() {
        let err = Error::Configuration("start is after end".to_string());
        assert!(err.to_string().contains("configuration error"));
        assert!(err.to_string().contains("start is after end"));
    }

    #[test]
    fn test_output_write_display() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err = Error::OutputWrite(io_err);
        assert!(err.to_string().contains("output write error"));
    }
}
