//! Low-level ustar archive parser.
//!
//! This module handles the structural walk over a tar byte stream,
//! reading from any source that implements the [`ReadAt`] trait.
//!
//! ## Parsing Strategy
//!
//! A tar archive is a flat run of 512-byte blocks: each entry is one
//! header block followed by `ceil(size / 512)` content blocks, and the
//! run is terminated by zero-filled padding blocks of unspecified count.
//! There is no central directory, so every operation here is a fresh
//! sequential scan:
//!
//! 1. Trim the trailing zero padding backwards from the physical end to
//!    find the logical end of content
//! 2. Decode the header at offset 0
//! 3. Hop header to header using each entry's declared size, until the
//!    logical end is reached
//!
//! Offsets are threaded explicitly through every step; the parser keeps
//! no cursor, so operations cannot race each other on stream position.

use std::sync::Arc;

use crate::io::ReadAt;

use super::error::TarError;
use super::header::{BLOCK_SIZE, TarHeader, content_blocks};

/// Low-level tar archive parser.
///
/// Handles end-of-content detection, header iteration, structural
/// validation and path lookup. It's generic over the reader type to
/// support both local files and HTTP sources.
///
/// Typically used through [`TarExtractor`](super::TarExtractor) rather
/// than directly.
pub struct TarParser<R: ReadAt> {
    /// The underlying data source
    reader: Arc<R>,
    /// Total physical size of the stream in bytes
    size: u64,
}

/// An entry found by path lookup: the decoded header plus the offset of
/// its header block within the stream.
#[derive(Debug, Clone)]
pub struct Located {
    pub header: TarHeader,
    pub header_offset: u64,
}

impl Located {
    /// Offset of the first content byte, one block past the header
    pub fn content_offset(&self) -> u64 {
        self.header_offset + BLOCK_SIZE
    }
}

/// Cursor over consecutive header records, bounded by the logical end of
/// content. Created by [`TarParser::headers`].
pub struct Headers<'a, R: ReadAt> {
    parser: &'a TarParser<R>,
    end: u64,
    next_offset: Option<u64>,
}

impl<R: ReadAt> Headers<'_, R> {
    /// Advance to the next header record.
    ///
    /// Yields the header's offset and decoded fields, or `None` once the
    /// logical end is reached or the stream runs out of full blocks. The
    /// first header is decoded unconditionally at offset 0; only
    /// subsequent hops are gated by the logical end, matching the
    /// on-disk contract that at least one header precedes the padding.
    pub fn next(&mut self) -> Result<Option<(u64, TarHeader)>, TarError> {
        let Some(offset) = self.next_offset else {
            return Ok(None);
        };

        let Some(header) = self.parser.read_header(offset)? else {
            self.next_offset = None;
            return Ok(None);
        };

        let after = offset + BLOCK_SIZE + content_blocks(header.size) * BLOCK_SIZE;
        self.next_offset = (after < self.end).then_some(after);

        Ok(Some((offset, header)))
    }
}

impl<R: ReadAt> TarParser<R> {
    /// Create a new parser for the given reader.
    pub fn new(reader: Arc<R>) -> Self {
        let size = reader.size();
        Self { reader, size }
    }

    /// Total physical size of the underlying stream
    pub fn stream_len(&self) -> u64 {
        self.size
    }

    /// Get a reference to the underlying reader.
    ///
    /// Useful for reading entry content after locating it with
    /// [`find()`](Self::find).
    pub fn reader(&self) -> &Arc<R> {
        &self.reader
    }

    /// Find the logical end of content.
    ///
    /// Returns the smallest offset `E` such that every full block in
    /// `[E, physical_end)` is entirely zero-filled, scanning backward
    /// from the physical end in block strides. A stream shorter than one
    /// block yields its own length; the scan never reads before offset 0.
    pub fn content_end(&self) -> Result<u64, TarError> {
        let mut end = self.size;
        let mut block = [0u8; BLOCK_SIZE as usize];

        while end >= BLOCK_SIZE {
            let candidate = end - BLOCK_SIZE;
            let n = self.read_fully(candidate, &mut block)?;
            if block[..n].iter().any(|&b| b != 0) {
                break;
            }
            end = candidate;
        }

        Ok(end)
    }

    /// Decode the header block at `offset`.
    ///
    /// Returns `None` when fewer bytes than one full block remain — an
    /// exhausted stream, not a format error.
    pub fn read_header(&self, offset: u64) -> Result<Option<TarHeader>, TarError> {
        let mut block = [0u8; BLOCK_SIZE as usize];
        let n = self.read_fully(offset, &mut block)?;
        if n < BLOCK_SIZE as usize {
            return Ok(None);
        }
        Ok(Some(TarHeader::from_block(&block)))
    }

    /// Start a header walk from offset 0, bounded by the logical end
    pub fn headers(&self) -> Result<Headers<'_, R>, TarError> {
        let end = self.content_end()?;
        Ok(Headers {
            parser: self,
            end,
            next_offset: Some(0),
        })
    }

    /// Validate the archive's structure.
    ///
    /// Walks every header from offset 0 checking, in this order, magic,
    /// version and checksum; the first violation aborts the walk. On a
    /// clean traversal the number of headers visited is returned. An
    /// empty or sub-block stream is rejected as [`TarError::Truncated`]
    /// rather than decoding undefined header content.
    pub fn check(&self) -> Result<u64, TarError> {
        let mut headers = self.headers()?;
        let mut count = 0u64;

        while let Some((offset, header)) = headers.next()? {
            if !header.has_valid_magic() {
                return Err(TarError::BadMagic { offset });
            }
            if !header.has_valid_version() {
                return Err(TarError::BadVersion { offset });
            }
            if !header.has_valid_checksum() {
                return Err(TarError::BadChecksum { offset });
            }
            count += 1;
        }

        if count == 0 {
            return Err(TarError::Truncated { offset: 0 });
        }
        Ok(count)
    }

    /// Look up an entry by exact path.
    ///
    /// Scans from offset 0 and returns the first header whose name field
    /// equals `path` under width-bounded comparison, in on-disk order.
    /// Duplicate names are not detected; the first wins.
    pub fn find(&self, path: &[u8]) -> Result<Option<Located>, TarError> {
        let mut headers = self.headers()?;

        while let Some((header_offset, header)) = headers.next()? {
            if header.name_matches(path) {
                return Ok(Some(Located {
                    header,
                    header_offset,
                }));
            }
        }

        Ok(None)
    }

    /// Read until `buf` is full or the stream is exhausted, returning the
    /// byte count actually read
    pub(crate) fn read_fully(&self, offset: u64, buf: &mut [u8]) -> Result<usize, TarError> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self
                .reader
                .read_at(offset + filled as u64, &mut buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(filled)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::ArchiveBuilder;
    use super::*;
    use crate::tar::EntryType;

    #[test]
    fn content_end_trims_trailing_padding() {
        let archive = ArchiveBuilder::new()
            .file("a.txt", b"hello")
            .padding_blocks(4)
            .build();
        let parser = TarParser::new(Arc::new(archive));
        // one header block + one content block
        assert_eq!(parser.content_end().unwrap(), 1024);
    }

    #[test]
    fn content_end_tolerates_missing_padding() {
        let archive = ArchiveBuilder::new()
            .file("a.txt", b"hello")
            .padding_blocks(0)
            .build();
        let parser = TarParser::new(Arc::new(archive));
        assert_eq!(parser.content_end().unwrap(), 1024);
    }

    #[test]
    fn content_end_of_sub_block_stream() {
        let parser = TarParser::new(Arc::new(vec![0u8; 100]));
        assert_eq!(parser.content_end().unwrap(), 100);
    }

    #[test]
    fn counts_headers_in_order() {
        let archive = ArchiveBuilder::new()
            .dir("ok/")
            .file("ok/a.c", b"aaaa")
            .file("ok/b.c", b"bbbbbbbb")
            .build();
        let parser = TarParser::new(Arc::new(archive));
        assert_eq!(parser.check().unwrap(), 3);

        let mut headers = parser.headers().unwrap();
        let mut names = Vec::new();
        while let Some((_, header)) = headers.next().unwrap() {
            names.push(header.name_lossy().into_owned());
        }
        assert_eq!(names, ["ok/", "ok/a.c", "ok/b.c"]);
    }

    #[test]
    fn check_rejects_empty_stream() {
        let parser = TarParser::new(Arc::new(Vec::new()));
        assert!(matches!(
            parser.check(),
            Err(TarError::Truncated { offset: 0 })
        ));
    }

    #[test]
    fn check_is_fail_fast_in_rule_order() {
        // Second header gets both a broken magic and a broken checksum;
        // magic is checked first so it must win.
        let mut archive = ArchiveBuilder::new()
            .file("one", b"x")
            .file("two", b"y")
            .build();
        let second = 1024 + 257; // magic field of the second header
        archive[second] = b'X';
        let parser = TarParser::new(Arc::new(archive));
        assert!(matches!(
            parser.check(),
            Err(TarError::BadMagic { offset: 1024 })
        ));
    }

    #[test]
    fn check_reports_bad_version() {
        let mut archive = ArchiveBuilder::new().file("one", b"x").build();
        archive[263] = b'9';
        let parser = TarParser::new(Arc::new(archive));
        assert!(matches!(parser.check(), Err(TarError::BadVersion { offset: 0 })));
    }

    #[test]
    fn check_reports_bad_checksum() {
        let mut archive = ArchiveBuilder::new().file("one", b"x").build();
        archive[0] = b'z'; // name byte no longer matches the stored sum
        let parser = TarParser::new(Arc::new(archive));
        assert!(matches!(parser.check(), Err(TarError::BadChecksum { offset: 0 })));
    }

    #[test]
    fn find_is_exact_not_prefix() {
        let archive = ArchiveBuilder::new()
            .dir("ok/")
            .file("ok/ok_file.c", b"abcd")
            .build();
        let parser = TarParser::new(Arc::new(archive));

        let located = parser.find(b"ok/ok_file.c").unwrap().unwrap();
        assert_eq!(located.header.entry_type, EntryType::Regular);
        assert_eq!(located.header.size, 4);
        assert_eq!(located.header_offset, 512);
        assert_eq!(located.content_offset(), 1024);

        assert!(parser.find(b"ok/ok_file").unwrap().is_none());
        assert!(parser.find(b"nope").unwrap().is_none());
    }

    #[test]
    fn find_returns_first_duplicate() {
        let archive = ArchiveBuilder::new()
            .file("dup", b"first")
            .file("dup", b"second!")
            .build();
        let parser = TarParser::new(Arc::new(archive));
        assert_eq!(parser.find(b"dup").unwrap().unwrap().header.size, 5);
    }
}
