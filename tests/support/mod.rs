//! Fixture builder shared by the integration suites.
//!
//! Builds a real bzip2 stream with the `bzip2` crate's encoder, then scans
//! the compressed bytes for block-start/stream-end magic occurrences to
//! synthesize a matching `BZIX` sidecar index — the "index builder" role
//! the library itself never plays, reappearing here only as test plumbing.
//! Each block's uncompressed length is learned by running it, alone,
//! through the library's own [`bzseek::assemble::assemble_block`] +
//! [`bzseek::decompress::Decompressor`], the same primitives `CompressedFile`
//! uses at read time.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use bzseek::assemble::assemble_block;
use bzseek::decompress::Decompressor;

const BLOCK_MAGIC: [u8; 6] = [0x31, 0x41, 0x59, 0x26, 0x53, 0x59];
const EOS_MAGIC: [u8; 6] = [0x17, 0x72, 0x45, 0x38, 0x50, 0x90];

/// A built fixture: the compressed stream bytes and a `BZIX`-framed index.
pub struct Fixture {
    pub data: Vec<u8>,
    pub index: Vec<u8>,
    pub plaintext: Vec<u8>,
}

fn bit_at(data: &[u8], bit: u64) -> u8 {
    let byte = data[(bit / 8) as usize];
    let shift = 7 - (bit % 8) as u32;
    (byte >> shift) & 1
}

fn pattern_at(data: &[u8], start_bit: u64, pattern: &[u8; 6]) -> bool {
    for i in 0..48u64 {
        let want_byte = pattern[(i / 8) as usize];
        let want_shift = 7 - (i % 8) as u32;
        let want = (want_byte >> want_shift) & 1;
        if bit_at(data, start_bit + i) != want {
            return false;
        }
    }
    true
}

/// All bit offsets at or after `from_bit` where `pattern` occurs.
fn find_all(data: &[u8], pattern: &[u8; 6], from_bit: u64) -> Vec<u64> {
    let total_bits = data.len() as u64 * 8;
    let mut found = Vec::new();
    let mut bit = from_bit;
    while bit + 48 <= total_bits {
        if pattern_at(data, bit, pattern) {
            found.push(bit);
        }
        bit += 1;
    }
    found
}

/// Decompresses one standalone block (bit range `[start_bit, end_bit)` of
/// `data`) and returns how many uncompressed bytes it produces.
fn block_uncompressed_len(data: &[u8], start_bit: u64, end_bit: u64, block_size_digit: u8) -> u64 {
    let mut cursor = Cursor::new(data);
    let mut assembled = Vec::new();
    let assembled_len =
        assemble_block(&mut cursor, start_bit, end_bit, block_size_digit, &mut assembled).unwrap();

    let mut decompressor = Decompressor::new();
    let mut sink = [0u8; 8192];
    let mut consumed = 0usize;
    loop {
        let pumped = decompressor
            .pump(&assembled[consumed..assembled_len], &mut sink)
            .unwrap();
        consumed += pumped.consumed;
        if pumped.stream_end {
            break;
        }
        if pumped.consumed == 0 && pumped.produced == 0 {
            panic!("block decompression stalled while building fixture");
        }
    }
    decompressor.total_out()
}

/// Compresses `plaintext` at `block_size_digit` (1-9) and builds a matching
/// head-placed `BZIX` index.
pub fn build(plaintext: &[u8], block_size_digit: u8) -> Fixture {
    let mut encoder = bzip2::write::BzEncoder::new(
        Vec::new(),
        bzip2::Compression::new(block_size_digit as u32),
    );
    encoder.write_all(plaintext).unwrap();
    let data = encoder.finish().unwrap();

    let mut block_starts = find_all(&data, &BLOCK_MAGIC, 32);
    block_starts.sort_unstable();
    block_starts.dedup();
    assert!(!block_starts.is_empty(), "fixture stream has no blocks");

    let eos_starts = find_all(&data, &EOS_MAGIC, *block_starts.last().unwrap() + 48);
    let eos_bit = *eos_starts
        .first()
        .expect("fixture stream has no end-of-stream magic");

    let mut comp_bit_offs = block_starts.clone();
    comp_bit_offs.push(eos_bit);

    let mut uncomp_byte_offs = vec![0u64; comp_bit_offs.len()];
    for i in 0..block_starts.len() {
        let start = comp_bit_offs[i];
        let end = comp_bit_offs[i + 1];
        let produced = block_uncompressed_len(&data, start, end, block_size_digit);
        uncomp_byte_offs[i + 1] = uncomp_byte_offs[i] + produced;
    }
    assert_eq!(
        *uncomp_byte_offs.last().unwrap(),
        plaintext.len() as u64,
        "fixture index total length disagrees with source plaintext"
    );

    let mut index = Vec::new();
    let total_size = 16u32 + (comp_bit_offs.len() as u32) * 16;
    index.extend_from_slice(b"BZIX");
    index.extend_from_slice(&total_size.to_be_bytes());
    for (comp_bit, uncomp_byte) in comp_bit_offs.iter().zip(uncomp_byte_offs.iter()) {
        index.extend_from_slice(&comp_bit.to_be_bytes());
        index.extend_from_slice(&(uncomp_byte * 8).to_be_bytes());
    }
    index.extend_from_slice(b"BZIX");
    index.extend_from_slice(&total_size.to_be_bytes());

    Fixture {
        data,
        index,
        plaintext: plaintext.to_vec(),
    }
}
