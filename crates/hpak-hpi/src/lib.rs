//! HPI archive reader for Total Annihilation game files.
//!
//! HPI (`HAPI`) containers package game assets under `.hpi`, `.gp3`, `.ufo`
//! and `.ccx` names. The format consists of:
//!
//! - A 20-byte header pointing at the root directory
//! - A directory tree of offset-linked index records and zero-terminated names
//! - Per-file chunk streams, each chunk introduced by an `SQSH` marker
//! - Optional per-chunk byte obfuscation keyed on the byte index
//! - zlib compression (method 2) or stored chunks (method 0)
//!
//! The legacy LZ77 method (1) is recognized but not decoded; archives using it
//! fail to open.
//!
//! # Example
//!
//! ```no_run
//! use hpak_hpi::{ArchiveStore, DirectoryLayout};
//!
//! let store = ArchiveStore::open("TAESC.gp3")?;
//!
//! // Paths are lowercase and rooted at '/'; lookups are case-insensitive
//! if let Some(data) = store.get("/unitsE/ARMCOM.FBI") {
//!     println!("{} bytes", data.len());
//! }
//!
//! let layout = DirectoryLayout::detect(&store);
//! for (path, _) in layout.unit_files(&store) {
//!     println!("{path}");
//! }
//! # Ok::<(), hpak_hpi::Error>(())
//! ```

mod archive;
mod decompress;
mod entry;
mod error;
mod layout;
mod store;
mod walker;

pub mod cipher;
pub mod format;

#[cfg(test)]
mod testutil;

pub use archive::{HpiReader, ReadOptions};
pub use decompress::decompress_zlib_sized;
pub use entry::EntryInfo;
pub use error::{Error, ErrorKind, Result};
pub use format::{CompressionMethod, HpiHeader};
pub use layout::DirectoryLayout;
pub use store::{join_path, normalize_path, ArchiveStore};
