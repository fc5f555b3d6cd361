//! Directory index records and file placement records.

use hpak_common::LeU32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Header of one directory node: how many entries it has and where they are.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct DirectoryIndex {
    /// Number of entries
    pub entry_count: LeU32,
    /// Offset of the packed entry array
    pub entry_offset: LeU32,
}

impl DirectoryIndex {
    /// Absolute offset of entry `index`.
    #[inline]
    pub fn entry_position(&self, index: u32) -> u64 {
        self.entry_offset.get() as u64 + index as u64 * DirectoryEntry::SIZE as u64
    }
}

/// One child of a directory node.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct DirectoryEntry {
    /// Offset of the zero-terminated name
    pub name_offset: LeU32,
    /// Offset of a [`DirectoryIndex`] or a [`FilePlacement`], depending on `flag`
    pub data_offset: LeU32,
    /// 1 for a subdirectory, 0 for a file
    pub flag: u8,
}

impl DirectoryEntry {
    /// Size of one packed entry.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Check if this entry points at a nested directory.
    #[inline]
    pub fn is_directory(&self) -> bool {
        self.flag == 1
    }
}

/// Where a file's chunk stream lives and how large it decodes to.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct FilePlacement {
    /// Offset of the chunk stream
    pub data_offset: LeU32,
    /// Total decompressed size
    pub decompressed_size: LeU32,
    /// Compression flag (advisory; chunk headers take precedence)
    pub compression: u8,
}

impl FilePlacement {
    /// Size of the record on disk.
    pub const SIZE: usize = std::mem::size_of::<Self>();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_sizes() {
        assert_eq!(std::mem::size_of::<DirectoryIndex>(), 8);
        assert_eq!(DirectoryEntry::SIZE, 9);
        assert_eq!(FilePlacement::SIZE, 9);
    }

    #[test]
    fn test_entry_position_is_computed() {
        let index = DirectoryIndex {
            entry_count: LeU32::new(3),
            entry_offset: LeU32::new(100),
        };
        assert_eq!(index.entry_position(0), 100);
        assert_eq!(index.entry_position(2), 118);
    }

    #[test]
    fn test_directory_flag() {
        let raw = [0u8, 0, 0, 0, 0, 0, 0, 0, 1];
        let entry = DirectoryEntry::read_from_bytes(&raw).unwrap();
        assert!(entry.is_directory());
    }
}
