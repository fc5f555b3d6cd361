//! Synthetic archive construction for tests.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use hpak_common::LeU32;
use zerocopy::IntoBytes;

use crate::cipher;
use crate::format::{
    payload_checksum, ChunkHeader, DirectoryEntry, DirectoryIndex, FilePlacement, HpiHeader,
    CHUNK_MARKER, MAX_CHUNK_SIZE,
};

/// One chunk to encode.
#[derive(Debug, Clone)]
pub(crate) struct ChunkSpec {
    data: Vec<u8>,
    method: u8,
    obfuscated: bool,
    decompressed_size: Option<u32>,
    checksum: Option<u32>,
}

impl ChunkSpec {
    pub(crate) fn stored(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
            method: 0,
            obfuscated: false,
            decompressed_size: None,
            checksum: None,
        }
    }

    pub(crate) fn zlib(data: &[u8]) -> Self {
        Self {
            method: 2,
            ..Self::stored(data)
        }
    }

    /// Override the declared method without changing how data is encoded.
    pub(crate) fn method(mut self, method: u8) -> Self {
        self.method = method;
        self
    }

    pub(crate) fn obfuscated(mut self) -> Self {
        self.obfuscated = true;
        self
    }

    pub(crate) fn decompressed_size(mut self, size: u32) -> Self {
        self.decompressed_size = Some(size);
        self
    }

    pub(crate) fn checksum(mut self, checksum: u32) -> Self {
        self.checksum = Some(checksum);
        self
    }
}

/// Encode a chunk: marker, header, payload.
pub(crate) fn encode_chunk(spec: &ChunkSpec) -> Vec<u8> {
    let mut payload = if spec.method == 2 {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&spec.data).unwrap();
        encoder.finish().unwrap()
    } else {
        spec.data.clone()
    };
    if spec.obfuscated {
        cipher::obfuscate_in_place(&mut payload);
    }

    let header = ChunkHeader {
        version: 2,
        method: spec.method,
        obfuscated: spec.obfuscated as u8,
        compressed_size: LeU32::new(payload.len() as u32),
        decompressed_size: LeU32::new(
            spec.decompressed_size.unwrap_or(spec.data.len() as u32),
        ),
        checksum: LeU32::new(spec.checksum.unwrap_or_else(|| payload_checksum(&payload))),
    };

    let mut out = Vec::with_capacity(4 + ChunkHeader::SIZE + payload.len());
    out.extend_from_slice(&CHUNK_MARKER);
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(&payload);
    out
}

/// One file to place in a synthetic archive.
#[derive(Debug, Clone)]
pub(crate) struct FileSpec {
    chunks: Vec<ChunkSpec>,
    declared_size: Option<u32>,
    flag: u8,
    padding: usize,
}

impl FileSpec {
    /// Stored chunks of at most [`MAX_CHUNK_SIZE`] bytes.
    pub(crate) fn stored(data: &[u8]) -> Self {
        Self::split(data, ChunkSpec::stored)
    }

    /// zlib chunks of at most [`MAX_CHUNK_SIZE`] bytes.
    pub(crate) fn zlib(data: &[u8]) -> Self {
        Self::split(data, ChunkSpec::zlib)
    }

    fn split(data: &[u8], make: fn(&[u8]) -> ChunkSpec) -> Self {
        let chunks: Vec<ChunkSpec> = data.chunks(MAX_CHUNK_SIZE as usize).map(make).collect();
        let flag = chunks.first().map_or(0, |c| c.method);
        Self::from_chunks(chunks).flag(flag)
    }

    pub(crate) fn from_chunks(chunks: Vec<ChunkSpec>) -> Self {
        Self {
            chunks,
            declared_size: None,
            flag: 0,
            padding: 0,
        }
    }

    pub(crate) fn obfuscated(mut self) -> Self {
        self.chunks = self.chunks.into_iter().map(ChunkSpec::obfuscated).collect();
        self
    }

    /// Override the placement record's decompressed size.
    pub(crate) fn declared_size(mut self, size: u32) -> Self {
        self.declared_size = Some(size);
        self
    }

    /// Set the placement record's compression flag.
    pub(crate) fn flag(mut self, flag: u8) -> Self {
        self.flag = flag;
        self
    }

    /// Garbage bytes written before every chunk marker.
    pub(crate) fn padding(mut self, bytes: usize) -> Self {
        self.padding = bytes;
        self
    }
}

#[derive(Debug, Clone)]
enum Node {
    Dir(Vec<(String, Node)>),
    File(FileSpec),
}

/// Builds an archive image in memory.
#[derive(Debug, Clone)]
pub(crate) struct ArchiveBuilder {
    magic: [u8; 4],
    save_marker: [u8; 4],
    key: u32,
    root: Vec<(String, Node)>,
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveBuilder {
    pub(crate) fn new() -> Self {
        Self {
            magic: HpiHeader::MAGIC,
            save_marker: HpiHeader::ARCHIVE_MARKER,
            key: 0,
            root: Vec::new(),
        }
    }

    pub(crate) fn magic(mut self, magic: [u8; 4]) -> Self {
        self.magic = magic;
        self
    }

    pub(crate) fn save_marker(mut self, marker: [u8; 4]) -> Self {
        self.save_marker = marker;
        self
    }

    pub(crate) fn key(mut self, key: u32) -> Self {
        self.key = key;
        self
    }

    /// Add a file at a `/`-separated path, creating directories as needed.
    /// Names keep their case; sibling names are never merged.
    pub(crate) fn file(mut self, path: &str, spec: FileSpec) -> Self {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let (name, dirs) = segments.split_last().expect("file path has a name");

        let mut level = &mut self.root;
        for dir in dirs {
            let pos = match level
                .iter()
                .position(|(n, node)| n == dir && matches!(node, Node::Dir(_)))
            {
                Some(pos) => pos,
                None => {
                    level.push((dir.to_string(), Node::Dir(Vec::new())));
                    level.len() - 1
                }
            };
            level = match &mut level[pos].1 {
                Node::Dir(children) => children,
                Node::File(_) => unreachable!(),
            };
        }
        level.push((name.to_string(), Node::File(spec)));
        self
    }

    /// Add an empty directory.
    pub(crate) fn dir(mut self, name: &str) -> Self {
        self.root.push((name.to_string(), Node::Dir(Vec::new())));
        self
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        let mut buf = vec![0u8; HpiHeader::SIZE];
        let root = write_dir(&mut buf, &self.root);

        let header = HpiHeader {
            magic: self.magic,
            save_marker: self.save_marker,
            directory_size: LeU32::new((buf.len() - HpiHeader::SIZE) as u32),
            header_key: LeU32::new(self.key),
            directory_offset: LeU32::new(root),
        };
        buf[..HpiHeader::SIZE].copy_from_slice(header.as_bytes());
        buf
    }
}

fn patch(buf: &mut [u8], offset: usize, bytes: &[u8]) {
    buf[offset..offset + bytes.len()].copy_from_slice(bytes);
}

fn write_dir(buf: &mut Vec<u8>, children: &[(String, Node)]) -> u32 {
    let index_offset = buf.len();
    buf.resize(index_offset + std::mem::size_of::<DirectoryIndex>(), 0);
    let entry_offset = buf.len();
    buf.resize(entry_offset + children.len() * DirectoryEntry::SIZE, 0);

    for (i, (name, node)) in children.iter().enumerate() {
        let name_offset = buf.len() as u32;
        buf.extend_from_slice(name.as_bytes());
        buf.push(0);

        let (data_offset, flag) = match node {
            Node::Dir(grandchildren) => (write_dir(buf, grandchildren), 1),
            Node::File(spec) => (write_file(buf, spec), 0),
        };
        let entry = DirectoryEntry {
            name_offset: LeU32::new(name_offset),
            data_offset: LeU32::new(data_offset),
            flag,
        };
        patch(buf, entry_offset + i * DirectoryEntry::SIZE, entry.as_bytes());
    }

    let index = DirectoryIndex {
        entry_count: LeU32::new(children.len() as u32),
        entry_offset: LeU32::new(entry_offset as u32),
    };
    patch(buf, index_offset, index.as_bytes());
    index_offset as u32
}

fn write_file(buf: &mut Vec<u8>, spec: &FileSpec) -> u32 {
    let record_offset = buf.len();
    buf.resize(record_offset + FilePlacement::SIZE, 0);
    let data_offset = buf.len();

    let encoded: Vec<Vec<u8>> = spec.chunks.iter().map(encode_chunk).collect();

    // Chunk size table, as packers write it
    for chunk in &encoded {
        buf.extend_from_slice(&(chunk.len() as u32).to_le_bytes());
    }
    for chunk in &encoded {
        buf.extend(std::iter::repeat(0xA5u8).take(spec.padding));
        buf.extend_from_slice(chunk);
    }

    let size = spec.declared_size.unwrap_or_else(|| {
        spec.chunks
            .iter()
            .map(|c| c.decompressed_size.unwrap_or(c.data.len() as u32))
            .sum()
    });
    let record = FilePlacement {
        data_offset: LeU32::new(data_offset as u32),
        decompressed_size: LeU32::new(size),
        compression: spec.flag,
    };
    patch(buf, record_offset, record.as_bytes());
    record_offset as u32
}
