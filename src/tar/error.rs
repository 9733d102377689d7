use std::io;
use thiserror::Error;

/// Failures surfaced by archive traversal.
///
/// The three structural kinds carry the offset of the offending header and
/// map onto the conventional check codes (-1, -2, -3). I/O faults are
/// fatal and never retried by the engine.
#[derive(Debug, Error)]
pub enum TarError {
    #[error("bad magic in header at offset {offset}")]
    BadMagic { offset: u64 },

    #[error("bad version in header at offset {offset}")]
    BadVersion { offset: u64 },

    #[error("bad checksum in header at offset {offset}")]
    BadChecksum { offset: u64 },

    /// The stream ended before one complete header block could be read
    #[error("archive truncated: no complete header at offset {offset}")]
    Truncated { offset: u64 },

    #[error("too many levels of links resolving {path:?}")]
    SymlinkLoop { path: String },

    #[error("archive read failed")]
    Io(#[from] io::Error),
}
