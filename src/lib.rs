//! # runtar
//!
//! A read-only ustar archive navigator with HTTP URL support using Range requests.
//!
//! This library treats a tar archive as a virtual filesystem: it validates
//! structural integrity, looks entries up by path, resolves symlinks, lists
//! directory children and reads file content at arbitrary byte offsets. For
//! remote archives it uses HTTP Range requests to fetch only the blocks a
//! navigation step touches, so a single file can be pulled out of a large
//! remote archive without downloading the whole thing.
//!
//! ## Features
//!
//! - Navigate tar archives on the local filesystem or behind HTTP/HTTPS URLs
//! - Ustar structural validation (magic, version, checksum) with fail-fast
//!   error reporting
//! - Symlink resolution bounded against link cycles
//! - Non-recursive directory listing and offset-bounded file reads
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use runtar::{LocalFileReader, TarExtractor};
//!
//! fn main() -> anyhow::Result<()> {
//!     let reader = Arc::new(LocalFileReader::new("archive.tar".as_ref())?);
//!     let extractor = TarExtractor::new(reader);
//!
//!     // Validate before trusting any lookup
//!     let headers = extractor.check()?;
//!     println!("{headers} entries");
//!
//!     // List the top-level children of a directory
//!     if let Some(entries) = extractor.list("dir/", 64)? {
//!         for entry in entries {
//!             println!("{entry}");
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod io;
pub mod tar;

pub use cli::Cli;
pub use io::{HttpRangeReader, LocalFileReader, ReadAt};
pub use tar::{EntryType, FileRead, TarError, TarExtractor, TarHeader, TarParser};
