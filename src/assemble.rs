//! Block assembler: reconstitutes a standalone bzip2 stream from one block's
//! bit range in the source file (spec §4.2).
//!
//! Layout built into `buf`, with `data = &mut buf[4..]`:
//!
//! ```text
//! buf[0..4)                preamble "BZh" + block-size digit
//! data[0..nread)            bytes read from the source, covering [start_bit, end_bit)
//! data[nread..nread+6)      stream-end magic
//! data[nread+6..nread+10)   captured per-block CRC (doubles as the single-block stream CRC)
//! data[nread+10]            sentinel zero byte — shift-pad, never itself a meaningful output byte
//! ```
//!
//! `buflen = 4 + round_up_bytes(end_bit - start_bit) + 10` is the portion of
//! `buf` a decompressor should actually be fed; the rest is shift-pad slack.

use std::io::{Read, Seek, SeekFrom};

use crate::bitbuf::{mask_tail_bits, shift_left_in_place};
use crate::constants::{round_up_bytes, BLOCK_MAGIC, EOS_MAGIC};
use crate::error::{Error, Result};

/// Reads `[start_bit, end_bit)` of `source` and wraps it as a standalone
/// single-block bzip2 stream in `buf`, growing `buf` as needed. Returns the
/// number of leading bytes of `buf` that make up the assembled stream.
pub fn assemble_block<R: Read + Seek>(
    source: &mut R,
    start_bit: u64,
    end_bit: u64,
    block_size_digit: u8,
    buf: &mut Vec<u8>,
) -> Result<usize> {
    if end_bit <= start_bit {
        return Err(Error::BadIndex);
    }

    let start_byte = start_bit / 8;
    let start_off = (start_bit % 8) as u32;
    let end_off = (end_bit % 8) as u32;
    let nbits = end_bit - start_bit;
    let nbytes = round_up_bytes(nbits) as usize;
    let nread = round_up_bytes(end_bit - start_byte * 8) as usize;
    if nread == 0 {
        return Err(Error::BadIndex);
    }

    // data[0..nread) payload, data[nread..nread+10) trailer, data[nread+10] pad.
    let total_len = 4 + nread + 10 + 1;
    buf.clear();
    buf.resize(total_len, 0);

    {
        let data = &mut buf[4..];

        source.seek(SeekFrom::Start(start_byte))?;
        source.read_exact(&mut data[0..nread])?;

        // Validate the block-start magic without mutating `data` yet: shift a
        // scratch copy of the first 10 bytes (+1 pad) into byte alignment.
        let mut header = [0u8; 11];
        header.copy_from_slice(&data[0..11]);
        shift_left_in_place(&mut header, 10, start_off);
        if header[0..6] != BLOCK_MAGIC {
            return Err(Error::BadData);
        }
        let mut block_crc = [0u8; 4];
        block_crc.copy_from_slice(&header[6..10]);

        data[nread..nread + 6].copy_from_slice(&EOS_MAGIC);
        data[nread + 6..nread + 10].copy_from_slice(&block_crc);
        data[nread + 10] = 0;

        // The source continues past end_bit with the next block's bits; only
        // clean and merge when the boundary actually falls mid-byte. At
        // end_off == 0 the byte at nread-1 is wholly this block's payload and
        // the trailer already starts byte-aligned, so there is nothing to
        // merge — treating it as a generic shift by (8 - end_off) would shift
        // by a full 8 bits, the same width hazard spec.md calls out for
        // start_off.
        if end_off != 0 {
            let trailer_first = data[nread];
            data[nread - 1] = mask_tail_bits(data[nread - 1], end_off) | (trailer_first >> end_off);
        }
        let trailer_shift = (8 - end_off) % 8;
        shift_left_in_place(&mut data[nread..], 10, trailer_shift);

        shift_left_in_place(data, nread + 10, start_off);
    }

    buf[0] = b'B';
    buf[1] = b'Z';
    buf[2] = b'h';
    buf[3] = b'0' + block_size_digit;

    Ok(4 + nbytes + 10)
}
