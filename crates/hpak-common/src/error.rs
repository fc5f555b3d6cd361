//! Error types for hpak-common.

use thiserror::Error;

/// Common error type for hpak binary reading.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error, including reads past the end of the source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid magic bytes encountered.
    #[error("invalid magic: expected {expected:?}, got {actual:?}")]
    InvalidMagic { expected: Vec<u8>, actual: Vec<u8> },

    /// A zero-terminated string ran past its length limit.
    #[error("string at offset {offset:#x} has no null terminator within {limit} bytes")]
    MissingNullTerminator { offset: u64, limit: usize },

    /// A byte pattern was not found within the scan window.
    #[error("pattern {pattern:?} not found within {scanned} bytes of offset {start:#x}")]
    PatternNotFound {
        pattern: Vec<u8>,
        start: u64,
        scanned: u64,
    },
}

impl Error {
    /// Whether this error comes from the underlying source rather than from
    /// the data it produced.
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io(_))
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
