//! Common utilities for hpak.
//!
//! This crate provides the binary reading layer shared by the hpak crates:
//!
//! - [`ReadExt`] - Fixed-layout struct reads from any [`std::io::Read`]
//! - [`SeekReadExt`] - Offset-addressed reads (structs, C strings, magic) from seekable sources
//! - [`scan`] - memchr-backed byte and pattern searching, in memory and over streams

mod error;
mod reader;

pub mod scan;

pub use error::{Error, Result};
pub use reader::{ReadExt, SeekReadExt};

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Re-export the little-endian integer type used by on-disk layouts
pub use zerocopy::byteorder::little_endian::U32 as LeU32;
