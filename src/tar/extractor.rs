use std::sync::Arc;

use crate::io::ReadAt;

use super::error::TarError;
use super::header::EntryType;
use super::parser::{Located, TarParser};

/// Maximum number of link hops followed while resolving a path.
/// Chains longer than this are reported as [`TarError::SymlinkLoop`].
pub const MAX_LINK_DEPTH: usize = 16;

/// Outcome of a bounded file read.
///
/// Mirrors the conventional sentinel contract: not-found-or-wrong-type
/// and offset-out-of-range are ordinary outcomes of navigating an
/// untrusted archive, not faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRead {
    /// `bytes_written` bytes were copied into the destination;
    /// `remaining` is the unread tail length past the copied window,
    /// zero when the read reached end-of-entry.
    Read { bytes_written: usize, remaining: u64 },
    /// No regular file lives at the path, after link resolution
    NotFound,
    /// The offset lies beyond the entry's length (or the whole stream)
    OffsetOutOfRange,
}

/// High-level tar navigator: existence and type queries, directory
/// listing and offset-bounded file extraction.
///
/// Callers are expected to run [`check()`](Self::check) once before
/// trusting lookup results; no operation re-validates per lookup.
pub struct TarExtractor<R: ReadAt> {
    parser: TarParser<R>,
}

impl<R: ReadAt> TarExtractor<R> {
    pub fn new(reader: Arc<R>) -> Self {
        Self {
            parser: TarParser::new(reader),
        }
    }

    /// The underlying structural parser
    pub fn parser(&self) -> &TarParser<R> {
        &self.parser
    }

    /// Validate archive structure; see [`TarParser::check`]
    pub fn check(&self) -> Result<u64, TarError> {
        self.parser.check()
    }

    /// Whether any entry has exactly this path as its literal name
    pub fn exists(&self, path: &str) -> Result<bool, TarError> {
        Ok(self.parser.find(path.as_bytes())?.is_some())
    }

    /// Whether the entry at `path` is a directory. Links are not resolved.
    pub fn is_dir(&self, path: &str) -> Result<bool, TarError> {
        Ok(self
            .find_type(path)?
            .is_some_and(|t| t == EntryType::Directory))
    }

    /// Whether the entry at `path` is a regular file. Links are not resolved.
    pub fn is_file(&self, path: &str) -> Result<bool, TarError> {
        Ok(self
            .find_type(path)?
            .is_some_and(|t| t == EntryType::Regular))
    }

    /// Whether the entry at `path` is a symlink or hard link
    pub fn is_symlink(&self, path: &str) -> Result<bool, TarError> {
        Ok(self.find_type(path)?.is_some_and(|t| t.is_link()))
    }

    /// List the direct children of the directory at `path`.
    ///
    /// Link entries at `path` are resolved first, each hop restarting the
    /// scan from offset 0 with a `/`-terminated target. Returns `None`
    /// when no directory lives at the path (absent, broken link, or a
    /// non-directory entry). At most `capacity` children are collected,
    /// in on-disk order; a zero capacity against a real directory is
    /// "found, nothing collected", not "not found".
    ///
    /// Children are direct only: for `dir/a` and `dir/c/d`, listing
    /// `dir/` yields `dir/a` and `dir/c/` but never `dir/c/d`.
    pub fn list(&self, path: &str, capacity: usize) -> Result<Option<Vec<String>>, TarError> {
        let Some((dir_path, located)) = self.resolve_links(path, true)? else {
            return Ok(None);
        };
        if located.header.entry_type != EntryType::Directory {
            return Ok(None);
        }

        let prefix = dir_path.as_bytes();
        let mut entries = Vec::new();
        let mut headers = self.parser.headers()?;

        while let Some((_, header)) = headers.next()? {
            if entries.len() >= capacity {
                break;
            }
            let name = header.name_bytes();
            if is_direct_child(prefix, name) {
                entries.push(String::from_utf8_lossy(name).into_owned());
            }
        }

        Ok(Some(entries))
    }

    /// Read a window of the regular file at `path` into `dest`, starting
    /// at byte `offset` within the file.
    ///
    /// Link entries are resolved first. An offset equal to the file's
    /// length is a valid zero-length read at the end boundary; anything
    /// beyond it (or beyond the physical stream) is
    /// [`FileRead::OffsetOutOfRange`]. On success the unread tail length
    /// is reported so a caller can advance `offset` and call again until
    /// `remaining` reaches zero.
    pub fn read_file(
        &self,
        path: &str,
        offset: u64,
        dest: &mut [u8],
    ) -> Result<FileRead, TarError> {
        // Coarse pre-check against the whole stream before any lookup
        if offset > self.parser.stream_len() {
            return Ok(FileRead::OffsetOutOfRange);
        }

        let Some((_, located)) = self.resolve_links(path, false)? else {
            return Ok(FileRead::NotFound);
        };
        if located.header.entry_type != EntryType::Regular {
            return Ok(FileRead::NotFound);
        }

        let size = located.header.size;
        if offset > size {
            return Ok(FileRead::OffsetOutOfRange);
        }

        let want = (size - offset).min(dest.len() as u64) as usize;
        let n = self
            .parser
            .read_fully(located.content_offset() + offset, &mut dest[..want])?;
        if n < want {
            // Declared size reaches past the physical stream
            return Err(TarError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "entry content truncated",
            )));
        }

        Ok(FileRead::Read {
            bytes_written: n,
            remaining: size - offset - n as u64,
        })
    }

    fn find_type(&self, path: &str) -> Result<Option<EntryType>, TarError> {
        Ok(self
            .parser
            .find(path.as_bytes())?
            .map(|located| located.header.entry_type))
    }

    /// Chase link entries iteratively until a non-link is found.
    ///
    /// Each hop replaces the path with the entry's link target and
    /// restarts the lookup from offset 0. When resolving for a listing,
    /// a target that does not match as written is retried with a
    /// trailing separator appended, since directory entries carry one in
    /// their stored name. Returns the final resolved path together with
    /// its entry, `None` when the chain dead-ends on a missing target (a
    /// broken link is reported the same as an absent path).
    fn resolve_links(
        &self,
        path: &str,
        dir_target: bool,
    ) -> Result<Option<(String, Located)>, TarError> {
        let mut resolved = path.to_owned();

        for hop in 0..=MAX_LINK_DEPTH {
            let mut located = self.parser.find(resolved.as_bytes())?;
            // The separator fallback applies to link targets, never to
            // the caller's own path
            if located.is_none() && dir_target && hop > 0 && !resolved.ends_with('/') {
                resolved.push('/');
                located = self.parser.find(resolved.as_bytes())?;
            }
            let Some(located) = located else {
                return Ok(None);
            };
            if !located.header.entry_type.is_link() {
                return Ok(Some((resolved, located)));
            }

            resolved = located.header.linkname_lossy().into_owned();
        }

        Err(TarError::SymlinkLoop {
            path: path.to_owned(),
        })
    }
}

/// Whether `name` names a direct child of the directory `prefix`: a
/// strict extension of the prefix with no interior separator before the
/// final byte
fn is_direct_child(prefix: &[u8], name: &[u8]) -> bool {
    if name.len() <= prefix.len() || !name.starts_with(prefix) {
        return false;
    }
    let rest = &name[prefix.len()..];
    !rest[..rest.len() - 1].contains(&b'/')
}
