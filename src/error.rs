//! Error type for the bzseek public API.
//!
//! Mirrors the `bzseek_err` codes from the reference C implementation, with
//! one exception: `BZSEEK_OK` has no variant here, since a real `Result::Ok`
//! already covers the success case.

use std::fmt;
use std::io;

/// Everything that can go wrong while opening or reading a seekable bzip2
/// stream.
#[derive(Debug)]
pub enum Error {
    /// The compressed stream's preamble didn't match `"BZh" + digit`, the
    /// assembled block's leading bits didn't match the block-start magic, or
    /// the decompressor reported malformed data.
    BadData,
    /// The sidecar index is missing its framing, its declared size is out of
    /// bounds, or its entries are not strictly monotone.
    BadIndex,
    /// A scratch-buffer grow or a decompressor allocation failed.
    OutOfMem,
    /// A positioned read against the data or index source failed or returned
    /// fewer bytes than required.
    Io(io::Error),
    /// The caller requested an offset at or past the end of the uncompressed
    /// content.
    Eof,
    /// The decompressor reported invalid parameters, or an internal
    /// consistency check failed. Indicates a bug in this crate or its caller.
    UsageErr,
}

impl Error {
    /// Human-readable message, matching the table in `bzseek_errmsg`.
    pub fn message(&self) -> &'static str {
        match self {
            Error::BadData => "Malformed bzip2 data",
            Error::BadIndex => "Error reading index",
            Error::OutOfMem => "Out of memory",
            Error::Io(_) => "I/O Error",
            Error::Eof => "End of file",
            Error::UsageErr => "Error",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "{}: {}", self.message(), e),
            _ => f.write_str(self.message()),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
