//! Random-access reading of bzip2 streams via a sidecar block index.
//!
//! A bzip2 stream is a sequence of independently Huffman-coded blocks; full
//! decompression is sequential because a block's start is only found by
//! scanning from the previous one. This crate trades that for O(log n)
//! seeks: a sidecar index (written ahead of time, out of scope for this
//! crate) records each block's compressed bit offset and uncompressed byte
//! offset, so [`CompressedFile::read`] can binary-search straight to the
//! block enclosing a requested position and decompress only what's needed.

pub mod assemble;
pub mod bitbuf;
pub mod constants;
pub mod decompress;
pub mod error;
pub mod index;
pub mod reader;
pub mod seek;

/// The random-access reader facade. Equivalent to `bzseek_file` /
/// `bzseek_open`/`bzseek_read`/`bzseek_close` in the reference API.
pub use reader::{CompressedFile, DynCompressedFile, ReadSeek};

/// Error type returned by every fallible operation in this crate.
pub use error::{Error, Result};

/// The parsed sidecar index and its per-block entries.
pub use index::{BlockIndexEntry, Index};
