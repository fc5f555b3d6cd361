//! Error types for the HPI crate.

use thiserror::Error;

/// Errors that can occur when reading HPI archives.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Binary reading error.
    #[error("{0}")]
    Common(#[from] hpak_common::Error),

    /// The archive does not start with `HAPI`.
    #[error("invalid archive marker: expected \"HAPI\", got {0:?}")]
    InvalidMagic([u8; 4]),

    /// A chunk declared a compression method this reader does not decode.
    #[error("unsupported chunk compression method {method} at offset {offset:#x}")]
    UnsupportedCompression { method: u8, offset: u64 },

    /// No chunk marker within the scan window.
    #[error("chunk marker not found within {limit} bytes of offset {offset:#x}")]
    ChunkMarkerNotFound { offset: u64, limit: u64 },

    /// A chunk header declared sizes outside the format's limits.
    #[error(
        "chunk at {offset:#x} too large: {compressed} bytes compressed, {decompressed} decompressed"
    )]
    ChunkTooLarge {
        offset: u64,
        compressed: u32,
        decompressed: u32,
    },

    /// Decoded data did not have the declared size.
    #[error("size mismatch at offset {offset:#x}: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        offset: u64,
        expected: u64,
        actual: u64,
    },

    /// Chunk payload checksum did not match the header.
    #[error(
        "checksum mismatch at offset {offset:#x}: expected {expected:#010x}, got {actual:#010x}"
    )]
    ChecksumMismatch {
        offset: u64,
        expected: u32,
        actual: u32,
    },

    /// Decompression error.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// A directory offset repeated on the current descent path.
    #[error("directory cycle at offset {0:#x}")]
    DirectoryCycle(u32),

    /// A directory index was reached through more than one entry.
    #[error("directory at offset {0:#x} is referenced more than once")]
    SharedDirectory(u32),

    /// Directories nest deeper than allowed.
    #[error("directory nesting exceeds {0} levels")]
    DirectoryTooDeep(usize),

    /// Decoding a specific file failed.
    #[error("failed to decode {path}: {source}")]
    Entry {
        path: String,
        #[source]
        source: Box<Error>,
    },
}

/// Broad classification of [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The byte source could not satisfy a read or seek.
    Io,
    /// The bytes were read but violate the format.
    Format,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) => ErrorKind::Io,
            Error::Common(e) if e.is_io() => ErrorKind::Io,
            Error::Entry { source, .. } => source.kind(),
            _ => ErrorKind::Format,
        }
    }

    /// Check if this is a format error.
    #[inline]
    pub fn is_format(&self) -> bool {
        self.kind() == ErrorKind::Format
    }

    /// Attach the virtual path of the file being decoded.
    pub(crate) fn in_entry(self, path: &str) -> Self {
        Error::Entry {
            path: path.to_string(),
            source: Box::new(self),
        }
    }
}

/// Result type for HPI operations.
pub type Result<T> = std::result::Result<T, Error>;
