use std::borrow::Cow;

/// Size of one tar block; headers occupy exactly one block and entry
/// content is padded up to a block multiple.
pub const BLOCK_SIZE: u64 = 512;

/// Maximum width of the `name` and `linkname` fields. A name exactly this
/// long carries no NUL terminator.
pub const NAME_LEN: usize = 100;

const NAME_RANGE: std::ops::Range<usize> = 0..100;
const SIZE_RANGE: std::ops::Range<usize> = 124..136;
const CHKSUM_RANGE: std::ops::Range<usize> = 148..156;
const TYPEFLAG_OFFSET: usize = 156;
const LINKNAME_RANGE: std::ops::Range<usize> = 157..257;
const MAGIC_RANGE: std::ops::Range<usize> = 257..263;
const VERSION_RANGE: std::ops::Range<usize> = 263..265;

/// Entry kinds distinguished by the header's typeflag byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    Regular,
    Directory,
    Symlink,
    HardLink,
    Unknown(u8),
}

impl EntryType {
    pub fn from_flag(flag: u8) -> Self {
        match flag {
            b'0' | 0 => EntryType::Regular,
            b'5' => EntryType::Directory,
            b'2' => EntryType::Symlink,
            b'1' => EntryType::HardLink,
            other => EntryType::Unknown(other),
        }
    }

    /// Link-like entries carry their target in the linkname field. Hard
    /// links are not materialized as first-class targets; they are chased
    /// through linkname resolution exactly like symlinks.
    pub fn is_link(&self) -> bool {
        matches!(self, EntryType::Symlink | EntryType::HardLink)
    }
}

/// One decoded ustar header record.
///
/// Values are ephemeral: the parser decodes one 512-byte block into a
/// `TarHeader`, the caller inspects it, and it is dropped before the next
/// block is read. Name fields stay as fixed-width byte arrays because the
/// format does not guarantee NUL termination at full width.
#[derive(Debug, Clone)]
pub struct TarHeader {
    name: [u8; NAME_LEN],
    /// Content length in bytes; zero for directories and links
    pub size: u64,
    pub entry_type: EntryType,
    linkname: [u8; NAME_LEN],
    magic: [u8; 6],
    version: [u8; 2],
    stored_checksum: u64,
    computed_checksum: u64,
}

impl TarHeader {
    pub const MAGIC: &'static [u8; 6] = b"ustar\0";
    pub const VERSION: &'static [u8; 2] = b"00";

    /// Decode one header block into typed fields.
    ///
    /// The checksum over the raw block is computed here, while the bytes
    /// are still at hand, so validation later needs no second read.
    pub fn from_block(block: &[u8; BLOCK_SIZE as usize]) -> Self {
        let mut name = [0u8; NAME_LEN];
        name.copy_from_slice(&block[NAME_RANGE]);
        let mut linkname = [0u8; NAME_LEN];
        linkname.copy_from_slice(&block[LINKNAME_RANGE]);

        Self {
            name,
            size: parse_octal(&block[SIZE_RANGE]),
            entry_type: EntryType::from_flag(block[TYPEFLAG_OFFSET]),
            linkname,
            magic: block[MAGIC_RANGE].try_into().unwrap(),
            version: block[VERSION_RANGE].try_into().unwrap(),
            stored_checksum: parse_octal(&block[CHKSUM_RANGE]),
            computed_checksum: block_checksum(block),
        }
    }

    /// Entry name as bytes, bounded at the field width and trimmed at the
    /// first NUL if one is present
    pub fn name_bytes(&self) -> &[u8] {
        trim_at_nul(&self.name)
    }

    /// Entry name for display; non-UTF8 bytes are replaced
    pub fn name_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.name_bytes())
    }

    /// Link target as bytes, same bounding rules as [`name_bytes`](Self::name_bytes)
    pub fn linkname_bytes(&self) -> &[u8] {
        trim_at_nul(&self.linkname)
    }

    pub fn linkname_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.linkname_bytes())
    }

    pub fn has_valid_magic(&self) -> bool {
        &self.magic == Self::MAGIC
    }

    pub fn has_valid_version(&self) -> bool {
        &self.version == Self::VERSION
    }

    pub fn has_valid_checksum(&self) -> bool {
        self.stored_checksum == self.computed_checksum
    }

    /// Width-bounded exact name comparison.
    ///
    /// Matches the full compared width: a path longer than the field can
    /// only match a name filling all 100 bytes, and a name is never a
    /// prefix match for a longer path.
    pub fn name_matches(&self, path: &[u8]) -> bool {
        let name = self.name_bytes();
        if path.len() >= NAME_LEN {
            name.len() == NAME_LEN && name == &path[..NAME_LEN]
        } else {
            name == path
        }
    }
}

/// Number of content blocks following a header, given the declared size
pub fn content_blocks(size: u64) -> u64 {
    size.div_ceil(BLOCK_SIZE)
}

/// Unsigned byte-sum of a header block with the checksum field counted as
/// ASCII spaces
fn block_checksum(block: &[u8; BLOCK_SIZE as usize]) -> u64 {
    let mut sum = 0u64;
    for (i, byte) in block.iter().enumerate() {
        if CHKSUM_RANGE.contains(&i) {
            sum += b' ' as u64;
        } else {
            sum += *byte as u64;
        }
    }
    sum
}

/// Parse an octal ASCII numeric field.
///
/// Leading spaces and NULs are skipped; parsing stops at the first
/// non-octal byte. Garbage fields decode to 0, matching strtol leniency.
fn parse_octal(field: &[u8]) -> u64 {
    let mut value = 0u64;
    let mut seen_digit = false;
    for &byte in field {
        match byte {
            b'0'..=b'7' => {
                value = value * 8 + (byte - b'0') as u64;
                seen_digit = true;
            }
            b' ' | 0 if !seen_digit => continue,
            _ => break,
        }
    }
    value
}

fn trim_at_nul(field: &[u8]) -> &[u8] {
    match field.iter().position(|&b| b == 0) {
        Some(end) => &field[..end],
        None => field,
    }
}
