//! Sidecar index loader (spec §4.3).
//!
//! Parses the `"BZIX" <u32_be total_size> <entries...>` frame, which may sit
//! at the front of the index file or be anchored by its 8-byte header at
//! `file_end - 8` with the entries preceding it.

use std::io::{Read, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};

use crate::constants::{
    INDEX_ENTRY_SIZE, INDEX_FRAME_OVERHEAD, INDEX_MAGIC, INDEX_MAX_TOTAL_SIZE, INDEX_MIN_TOTAL_SIZE,
};
use crate::error::{Error, Result};

/// One directory entry: a compressed bit offset paired with the uncompressed
/// byte offset of the block (or stream) it marks the start of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockIndexEntry {
    pub comp_bit_off: u64,
    pub uncomp_byte_off: u64,
}

/// The parsed sidecar directory: `N` block-start entries followed by one
/// end-of-stream sentinel (so `entries.len() == N + 1`).
#[derive(Debug, Clone)]
pub struct Index {
    entries: Vec<BlockIndexEntry>,
}

impl Index {
    /// Number of real blocks (excludes the trailing sentinel).
    pub fn block_count(&self) -> usize {
        self.entries.len() - 1
    }

    pub fn entry(&self, i: usize) -> BlockIndexEntry {
        self.entries[i]
    }

    /// Total uncompressed length of the stream (the sentinel's byte offset).
    pub fn total_uncompressed_len(&self) -> u64 {
        self.entries[self.entries.len() - 1].uncomp_byte_off
    }

    /// Largest block index `i` with `entry(i).uncomp_byte_off <= pos`.
    /// Caller must ensure `pos < total_uncompressed_len()`.
    pub fn locate(&self, pos: u64) -> usize {
        let mut lo = 0usize;
        let mut hi = self.entries.len() - 1;
        while hi - lo != 1 {
            let mid = (lo + hi) / 2;
            if self.entries[mid].uncomp_byte_off <= pos {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        lo
    }

    /// Reads and validates the index frame from `src`, trying the head
    /// placement first and then the tail placement. The frame is written as
    /// `header(8) entries(16*N) header(8)` — a byte-identical header at both
    /// ends — so it is self-describing from whichever end a reader checks
    /// first; `total_size_bytes` counts that whole bracketed span.
    pub fn load<S: Read + Seek>(src: &mut S) -> Result<Index> {
        src.seek(SeekFrom::Start(0))?;
        let mut header = [0u8; 8];
        let head_ok = src.read_exact(&mut header).is_ok() && header[0..4] == INDEX_MAGIC;

        let total_size: u32;
        if head_ok {
            total_size = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);
            // Cursor is already at offset 8, i.e. the start of the entries.
        } else {
            let file_len = src.seek(SeekFrom::End(0))?;
            if file_len < 8 {
                return Err(Error::BadIndex);
            }
            src.seek(SeekFrom::Start(file_len - 8))?;
            src.read_exact(&mut header)?;
            if header[0..4] != INDEX_MAGIC {
                return Err(Error::BadIndex);
            }
            total_size = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);
            // Entries sit immediately before this trailing header copy, so
            // they start `total_size - 8` bytes before EOF. Computed
            // absolutely from `file_len`, never via a relative seek chained
            // off the header read (spec.md's documented fragile-arithmetic
            // pitfall in the reference loader).
            let total_size_u64 = total_size as u64;
            if total_size_u64 > file_len || total_size_u64 < 8 {
                return Err(Error::BadIndex);
            }
            src.seek(SeekFrom::Start(file_len - total_size_u64 + 8))?;
        }

        if total_size < INDEX_MIN_TOTAL_SIZE || total_size > INDEX_MAX_TOTAL_SIZE {
            return Err(Error::BadIndex);
        }
        if total_size as u64 % INDEX_ENTRY_SIZE != 0 {
            return Err(Error::BadIndex);
        }
        let n_entries_total = (total_size as u64 - INDEX_FRAME_OVERHEAD) / INDEX_ENTRY_SIZE;

        let mut entries = Vec::with_capacity(n_entries_total as usize);
        for _ in 0..n_entries_total {
            let comp_bit_off = src.read_u64::<BigEndian>()?;
            let uncomp_bit_off = src.read_u64::<BigEndian>()?;
            entries.push(BlockIndexEntry {
                comp_bit_off,
                uncomp_byte_off: uncomp_bit_off / 8,
            });
        }

        if entries.is_empty() {
            return Err(Error::BadIndex);
        }
        for w in entries.windows(2) {
            if w[0].comp_bit_off >= w[1].comp_bit_off || w[0].uncomp_byte_off >= w[1].uncomp_byte_off {
                return Err(Error::BadIndex);
            }
        }

        Ok(Index { entries })
    }
}
