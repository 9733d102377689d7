//! Ustar archive navigation and extraction.
//!
//! This module provides read-only access to tar archives in the ustar
//! format, treating the flat block stream as a virtual filesystem.
//!
//! ## Architecture
//!
//! The module is organized into three main components:
//!
//! - [`header`]: the fixed 512-byte header record codec and its checksum
//! - [`parser`]: the structural walk — end-of-content detection, header
//!   iteration, validation and path lookup
//! - [`extractor`]: the navigation API for end users — type queries,
//!   directory listing and bounded file reads
//!
//! ## Format Overview
//!
//! A ustar archive is a run of 512-byte blocks with no central index:
//! each entry is one header block followed by its content rounded up to
//! whole blocks, and the run ends in zero-filled padding. Listing or
//! looking anything up is therefore always a sequential scan from offset
//! 0, bounded by the logical end of content found by trimming the
//! padding backwards from the physical end.
//!
//! Every operation re-derives that bound and rescans; nothing is cached
//! between calls, and the underlying stream is never written to.
//!
//! ## Supported Features
//!
//! - Ustar magic/version/checksum validation with fail-fast error codes
//! - Exact path lookup with width-bounded name comparison
//! - Symlink and hard-link chasing, bounded at [`MAX_LINK_DEPTH`] hops
//! - Non-recursive directory listing with caller-bounded capacity
//! - File extraction windows at arbitrary byte offsets
//!
//! ## Limitations
//!
//! - No GNU or PAX extended headers (long names, sparse files)
//! - Hard links are chased like symlinks, never materialized
//! - No write or append support

mod error;
mod extractor;
mod header;
mod parser;

pub use error::TarError;
pub use extractor::{FileRead, MAX_LINK_DEPTH, TarExtractor};
pub use header::{BLOCK_SIZE, EntryType, NAME_LEN, TarHeader};
pub use parser::{Headers, Located, TarParser};

/// Builds well-formed ustar byte streams for unit tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use super::header::BLOCK_SIZE;

    const BLOCK: usize = BLOCK_SIZE as usize;

    pub struct ArchiveBuilder {
        data: Vec<u8>,
        padding_blocks: usize,
    }

    impl ArchiveBuilder {
        pub fn new() -> Self {
            Self {
                data: Vec::new(),
                padding_blocks: 2,
            }
        }

        pub fn file(mut self, name: &str, content: &[u8]) -> Self {
            self.push_header(name, content.len() as u64, b'0', "");
            self.data.extend_from_slice(content);
            let tail = content.len() % BLOCK;
            if tail != 0 {
                self.data.extend(std::iter::repeat_n(0u8, BLOCK - tail));
            }
            self
        }

        pub fn dir(mut self, name: &str) -> Self {
            self.push_header(name, 0, b'5', "");
            self
        }

        pub fn symlink(mut self, name: &str, target: &str) -> Self {
            self.push_header(name, 0, b'2', target);
            self
        }

        pub fn hardlink(mut self, name: &str, target: &str) -> Self {
            self.push_header(name, 0, b'1', target);
            self
        }

        pub fn padding_blocks(mut self, blocks: usize) -> Self {
            self.padding_blocks = blocks;
            self
        }

        pub fn build(mut self) -> Vec<u8> {
            self.data
                .extend(std::iter::repeat_n(0u8, self.padding_blocks * BLOCK));
            self.data
        }

        fn push_header(&mut self, name: &str, size: u64, typeflag: u8, linkname: &str) {
            let mut block = [0u8; BLOCK];
            block[..name.len()].copy_from_slice(name.as_bytes());
            block[100..107].copy_from_slice(b"0000644");
            block[108..115].copy_from_slice(b"0001750");
            block[116..123].copy_from_slice(b"0001750");
            block[124..136].copy_from_slice(format!("{:011o}\0", size).as_bytes());
            block[136..148].copy_from_slice(b"14460000000\0");
            block[156] = typeflag;
            block[157..157 + linkname.len()].copy_from_slice(linkname.as_bytes());
            block[257..263].copy_from_slice(b"ustar\0");
            block[263..265].copy_from_slice(b"00");

            let sum: u64 = block
                .iter()
                .enumerate()
                .map(|(i, &b)| if (148..156).contains(&i) { b' ' as u64 } else { b as u64 })
                .sum();
            block[148..156].copy_from_slice(format!("{:06o}\0 ", sum).as_bytes());

            self.data.extend_from_slice(&block);
        }
    }
}
