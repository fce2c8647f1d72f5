//! Decompressor adapter: a thin wrapper over `bzip2::Decompress` (spec §4.4).
//!
//! The low-level binding exposes no `avail_in`/`avail_out` fields to poke at
//! directly the way the reference C loop does; instead each call's
//! consumed/produced byte counts are recovered from the deltas of
//! `total_in()`/`total_out()` taken before and after. That means a `pump`
//! call only needs to borrow its input for the duration of the call itself —
//! the wrapper carries no lifetime parameter, so [`crate::reader::CompressedFile`]
//! can own both its scratch buffer and its `Decompressor` without a
//! self-referential struct.

use bzip2::{Decompress, Error as RawError, Status};

use crate::error::{Error, Result};

/// The result of one `pump` call: how much of the input was consumed, how
/// much output was produced, and whether the underlying stream has reached
/// its end-of-stream magic.
pub struct Pumped {
    pub consumed: usize,
    pub produced: usize,
    pub stream_end: bool,
}

/// One decompression session over a single standalone block stream.
///
/// There is no `reset` — the reference implementation tears down and
/// reinitializes libbz2's state for every new block (`init_bz`), which here
/// is just dropping the old `Decompressor` and constructing a new one; the
/// inner `bzip2::Decompress` calls `BZ2_bzDecompressEnd` on drop.
pub struct Decompressor {
    inner: Decompress,
}

impl Decompressor {
    pub fn new() -> Self {
        Decompressor {
            inner: Decompress::new(false),
        }
    }

    /// Cumulative uncompressed bytes produced so far in this session.
    pub fn total_out(&self) -> u64 {
        self.inner.total_out()
    }

    /// Feeds `input` (the remaining unconsumed bytes of the assembled block,
    /// from wherever the previous call left off) and writes decompressed
    /// output into `output`. Returns how much of each was actually
    /// used/filled this call.
    pub fn pump(&mut self, input: &[u8], output: &mut [u8]) -> Result<Pumped> {
        let in_before = self.inner.total_in();
        let out_before = self.inner.total_out();

        let status = self.inner.decompress(input, output).map_err(map_raw_err)?;

        let consumed = (self.inner.total_in() - in_before) as usize;
        let produced = (self.inner.total_out() - out_before) as usize;
        Ok(Pumped {
            consumed,
            produced,
            stream_end: matches!(status, Status::StreamEnd),
        })
    }
}

fn map_raw_err(e: RawError) -> Error {
    match e {
        RawError::Mem => Error::OutOfMem,
        RawError::Data | RawError::DataMagic => Error::BadData,
        RawError::Param | RawError::Sequence => Error::UsageErr,
        _ => Error::UsageErr,
    }
}
