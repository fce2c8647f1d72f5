//! Public reader facade: opens a compressed stream plus its sidecar index
//! and serves positioned reads over the uncompressed content (spec §4.6).

use std::io::{Read, Seek, SeekFrom};

use crate::constants::{MAX_BLOCK_SIZE_CLASS, MIN_BLOCK_SIZE_CLASS, STREAM_PREAMBLE_PREFIX};
use crate::error::{Error, Result};
use crate::index::Index;
use crate::seek::SeekEngine;

/// Blanket trait for handles that are both [`Read`] and [`Seek`]; lets
/// [`CompressedFile::open_dyn`] accept a `Box<dyn ReadSeek>` the way the
/// teacher's `open_src_file` erases its source to `Box<dyn Read>` at the
/// one boundary where the concrete handle type genuinely varies at runtime.
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

/// A bzip2 stream opened for random access, paired with its sidecar index.
///
/// `R` is the compressed data source and `I` the index source; callers may
/// pass the same handle for both when the index is appended to the data
/// file (spec §4.3's tail placement), or two distinct handles when it is
/// kept alongside in a separate file.
pub struct CompressedFile<R, I> {
    source: R,
    /// Kept alive for the handle's lifetime even though the index is parsed
    /// once up front; callers may hold a `File` here whose lifetime they
    /// expect this struct to own.
    #[allow(dead_code)]
    idx_source: I,
    index: Index,
    engine: SeekEngine,
}

impl<R: Read + Seek, I: Read + Seek> CompressedFile<R, I> {
    /// Validates the stream preamble, loads the index from `idx_source`, and
    /// returns a handle ready for `read`.
    pub fn open(mut source: R, mut idx_source: I) -> Result<Self> {
        source.seek(SeekFrom::Start(0))?;
        let mut header = [0u8; 4];
        source.read_exact(&mut header).map_err(|_| Error::BadData)?;
        if header[0..3] != STREAM_PREAMBLE_PREFIX {
            return Err(Error::BadData);
        }
        let digit = header[3];
        if !digit.is_ascii_digit() {
            return Err(Error::BadData);
        }
        let block_size_digit = digit - b'0';
        if block_size_digit < MIN_BLOCK_SIZE_CLASS || block_size_digit > MAX_BLOCK_SIZE_CLASS {
            return Err(Error::BadData);
        }

        let index = Index::load(&mut idx_source)?;
        log::debug!(
            "opened stream: block_size={}, blocks={}, uncompressed_len={}",
            block_size_digit,
            index.block_count(),
            index.total_uncompressed_len()
        );

        Ok(CompressedFile {
            source,
            idx_source,
            index,
            engine: SeekEngine::new(block_size_digit),
        })
    }

    /// Total length of the uncompressed content, in bytes.
    pub fn len(&self) -> u64 {
        self.index.total_uncompressed_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads up to `out.len()` bytes of uncompressed content starting at
    /// `pos`, spanning block boundaries transparently. Returns the number of
    /// bytes written, which is less than `out.len()` only once `pos + n`
    /// reaches `len()`. A zero-length read always succeeds, even at `pos ==
    /// len()`; otherwise `pos >= len()` is `Eof` (spec.md §7/§8).
    pub fn read(&mut self, pos: u64, out: &mut [u8]) -> Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        if pos >= self.len() {
            return Err(Error::Eof);
        }
        self.engine.read(&mut self.source, &self.index, pos, out)
    }

    /// Consumes the handle. Present alongside the automatic [`Drop`] impl so
    /// callers who want a clearly-named close point can get one; ownership
    /// makes a double-close a compile error rather than the runtime hazard
    /// it is in the reference C API.
    pub fn close(self) {
        drop(self)
    }
}

/// Opens a stream and index behind type-erased handles, for callers that
/// don't know the concrete source type at compile time (e.g. a `File` in
/// one code path and an in-memory `Cursor` in another).
pub type DynCompressedFile = CompressedFile<Box<dyn ReadSeek>, Box<dyn ReadSeek>>;

impl CompressedFile<Box<dyn ReadSeek>, Box<dyn ReadSeek>> {
    pub fn open_dyn(
        source: Box<dyn ReadSeek>,
        idx_source: Box<dyn ReadSeek>,
    ) -> Result<Self> {
        Self::open(source, idx_source)
    }
}
