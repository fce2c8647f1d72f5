//! Seek engine: locates the block enclosing a requested offset, rewinds or
//! fast-forwards a live decompression session to it, and yields its output
//! (spec §4.5).

use std::io::{Read, Seek};

use crate::assemble::assemble_block;
use crate::constants::SKIP_SINK_SIZE;
use crate::decompress::Decompressor;
use crate::error::{Error, Result};
use crate::index::Index;

/// Tracks which block is currently loaded and how far its decompressor has
/// progressed, so repeated nearby reads don't re-assemble or re-decompress
/// from scratch.
pub struct SeekEngine {
    block_size_digit: u8,
    curr_block: Option<usize>,
    assembled: Vec<u8>,
    assembled_len: usize,
    /// Bytes of `assembled[..assembled_len]` already fed to `decompressor`.
    raw_consumed: usize,
    decompressor: Option<Decompressor>,
}

impl SeekEngine {
    pub fn new(block_size_digit: u8) -> Self {
        SeekEngine {
            block_size_digit,
            curr_block: None,
            assembled: Vec::new(),
            assembled_len: 0,
            raw_consumed: 0,
            decompressor: None,
        }
    }

    fn reinit_decompressor(&mut self) {
        self.decompressor = Some(Decompressor::new());
        self.raw_consumed = 0;
    }

    /// Uncompressed byte position the live decompressor has produced up to,
    /// relative to the start of the whole stream (not just the block).
    fn bz_uncomp_pos(&self, index: &Index, block: usize) -> u64 {
        let produced = self
            .decompressor
            .as_ref()
            .map(|d| d.total_out())
            .unwrap_or(0);
        produced + index.entry(block).uncomp_byte_off
    }

    /// Ensures the block enclosing `pos` is loaded and, if a different block
    /// than the one already loaded, assembles it and starts a fresh
    /// decompressor at its beginning.
    fn ensure_block_loaded<R: Read + Seek>(
        &mut self,
        source: &mut R,
        index: &Index,
        pos: u64,
    ) -> Result<()> {
        if let Some(b) = self.curr_block {
            let start = index.entry(b).uncomp_byte_off;
            let end = index.entry(b + 1).uncomp_byte_off;
            if start <= pos && pos < end {
                return Ok(());
            }
        }
        if pos >= index.total_uncompressed_len() {
            return Err(Error::Eof);
        }

        let block = index.locate(pos);
        log::trace!("loading block {} for offset {}", block, pos);

        let start_bit = index.entry(block).comp_bit_off;
        let end_bit = index.entry(block + 1).comp_bit_off;
        self.assembled_len = assemble_block(
            source,
            start_bit,
            end_bit,
            self.block_size_digit,
            &mut self.assembled,
        )?;
        self.curr_block = Some(block);
        self.reinit_decompressor();
        Ok(())
    }

    /// Advances the live decompressor from wherever it is to exactly `pos`
    /// (must already fall within the loaded block's range), rewinding to the
    /// block's start first if it has overshot.
    fn position_within_block(&mut self, index: &Index, pos: u64) -> Result<()> {
        let block = self.curr_block.expect("ensure_block_loaded called first");

        let mut bzpos = self.bz_uncomp_pos(index, block);
        if bzpos > pos {
            log::debug!("rewinding block {} to reach offset {}", block, pos);
            self.reinit_decompressor();
            bzpos = self.bz_uncomp_pos(index, block);
            debug_assert_eq!(bzpos, index.entry(block).uncomp_byte_off);
        }

        let mut remaining = (pos - bzpos) as usize;
        let mut sink = [0u8; SKIP_SINK_SIZE];
        while remaining > 0 {
            let take = remaining.min(SKIP_SINK_SIZE);
            let pumped = self.decompressor.as_mut().unwrap().pump(
                &self.assembled[self.raw_consumed..self.assembled_len],
                &mut sink[..take],
            )?;
            self.raw_consumed += pumped.consumed;
            if pumped.produced == 0 && pumped.consumed == 0 {
                return Err(Error::BadData);
            }
            remaining -= pumped.produced.min(remaining);
        }
        Ok(())
    }

    /// Reads up to `out.len()` bytes starting at `pos` into `out`, spanning
    /// block boundaries transparently. Returns the number of bytes written,
    /// which is less than `out.len()` only when the stream ends first.
    pub fn read<R: Read + Seek>(
        &mut self,
        source: &mut R,
        index: &Index,
        mut pos: u64,
        out: &mut [u8],
    ) -> Result<usize> {
        let mut written = 0usize;

        while written < out.len() {
            if pos >= index.total_uncompressed_len() {
                break;
            }
            self.ensure_block_loaded(source, index, pos)?;
            self.position_within_block(index, pos)?;

            let pumped = self.decompressor.as_mut().unwrap().pump(
                &self.assembled[self.raw_consumed..self.assembled_len],
                &mut out[written..],
            )?;
            self.raw_consumed += pumped.consumed;
            written += pumped.produced;
            pos += pumped.produced as u64;

            if pumped.stream_end {
                // This block is exhausted; the next loop iteration (if any)
                // re-locates via `ensure_block_loaded` for the following one.
                self.curr_block = None;
            } else if pumped.produced == 0 && pumped.consumed == 0 {
                return Err(Error::BadData);
            }
        }
        Ok(written)
    }
}
