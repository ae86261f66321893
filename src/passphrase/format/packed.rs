//! Packed corpus decoding and random access.
//!
//! A packed corpus is an immutable blob holding a suffix-deduplicated pool of
//! newline-terminated strings and a textual offset table. Records are decoded
//! lazily: opening a file only validates the framing, and each lookup scans a
//! single string out of the pool.

use std::fs::{self, File};
use std::io::Read;
use std::ops::Range;
use std::path::Path;

use log::{debug, info, trace};
use memmap2::Mmap;

use crate::passphrase::types::error::{PassphraseError, Result};
use crate::passphrase::types::models::{LoadMode, WordTuple};
use crate::passphrase::utils;

/// First line of every packed corpus file.
pub const HEADER: &[u8] = b"#format packed\n";
/// Marker closing the comment section and the offset table.
pub const SECTION_MARK: &[u8] = b"#_-_-_-\n";
/// Signature tag opening the signature line.
pub const SIGNATURE_TAG: &[u8] = b"#!!PCK!!";
/// Magic constant, stored in the signature line and as offset-table entry 0.
pub const MAGIC: u32 = 0x03b9_c787;
/// Current packed format version.
pub const VERSION: u32 = 3;
/// `#!!PCK!! ` + five `%08x ` fields + `!\n`.
pub const SIGNATURE_LEN: usize = SIGNATURE_TAG.len() + 1 + 5 * 9 + 2;
/// Width of one offset-table entry in bytes.
pub const TABLE_ENTRY_LEN: usize = 8;

enum Buffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Buffer {
    fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Mmap(m) => m.as_ref(),
            Buffer::Owned(v) => v.as_slice(),
        }
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Buffer::Mmap(m) => write!(f, "Mmap({} bytes)", m.len()),
            Buffer::Owned(v) => write!(f, "Owned({} bytes)", v.len()),
        }
    }
}

/// Byte ranges of the sections of a validated packed blob.
#[derive(Debug, Clone)]
struct Layout {
    comment: Range<usize>,
    data: Range<usize>,
    table: Range<usize>,
    count: usize,
}

/// Sequential reader over a byte slice that reports short reads per section.
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, len: usize, context: &'static str) -> Result<Range<usize>> {
        let available = self.bytes.len() - self.pos;
        if available < len {
            return Err(PassphraseError::Truncated {
                context,
                expected: len as u64,
                found: available as u64,
            });
        }
        let range = self.pos..self.pos + len;
        self.pos += len;
        Ok(range)
    }

    fn expect(&mut self, marker: &'static [u8], context: &'static str) -> Result<()> {
        let range = self.take(marker.len(), context)?;
        let found = &self.bytes[range];
        if found != marker {
            return Err(PassphraseError::BadField {
                field: context,
                expected: format!("{:?}", String::from_utf8_lossy(marker)),
                found: format!("{:?}", String::from_utf8_lossy(found)),
            });
        }
        Ok(())
    }
}

/// A random-access view of a packed corpus.
#[derive(Debug)]
pub struct PackedCorpus {
    buffer: Buffer,
    layout: Layout,
}

impl PackedCorpus {
    /// Open and validate a packed corpus file.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file cannot be opened or mapped
    /// - The file exceeds `max_size` bytes
    /// - Any header field, section length or marker is wrong
    pub fn open(path: impl AsRef<Path>, mode: LoadMode, max_size: u64) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening packed corpus: {}", path.display());

        let size = fs::metadata(path)?.len();
        if size > max_size {
            return Err(PassphraseError::TooLarge {
                path: path.to_path_buf(),
                size,
                limit: max_size,
            });
        }

        let buffer = match mode {
            LoadMode::Mmap => {
                let file = File::open(path)?;
                // SAFETY: corpus files are treated as read-only for the lifetime of the map.
                Buffer::Mmap(unsafe { Mmap::map(&file) }?)
            }
            LoadMode::Owned => Buffer::Owned(fs::read(path)?),
        };
        Self::from_buffer(buffer)
    }

    /// Decode a packed corpus held in memory.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::from_buffer(Buffer::Owned(bytes))
    }

    /// Read a whole stream and decode it as a packed corpus.
    pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(bytes)
    }

    fn from_buffer(buffer: Buffer) -> Result<Self> {
        let layout = parse_layout(buffer.as_slice())?;
        info!(
            "Packed corpus opened: {} records, {} byte pool",
            layout.count,
            layout.data.len()
        );
        Ok(Self { buffer, layout })
    }

    /// Number of (word, hint) records.
    pub fn len(&self) -> usize {
        self.layout.count
    }

    pub fn is_empty(&self) -> bool {
        self.layout.count == 0
    }

    /// The opaque comment section (copyright / generation metadata).
    pub fn comment(&self) -> &[u8] {
        &self.buffer.as_slice()[self.layout.comment.clone()]
    }

    /// Size of the deduplicated string pool in bytes.
    pub fn pool_len(&self) -> usize {
        self.layout.data.len()
    }

    pub fn get_word(&self, index: usize) -> Result<String> {
        self.check_index(index)?;
        self.string_at(self.table_entry(2 * index + 1)?)
    }

    pub fn get_hint(&self, index: usize) -> Result<String> {
        self.check_index(index)?;
        self.string_at(self.table_entry(2 * index + 2)?)
    }

    /// The record at `index` as a (word, hint) pair.
    pub fn get(&self, index: usize) -> Result<WordTuple> {
        Ok(WordTuple::new(self.get_word(index)?, self.get_hint(index)?))
    }

    /// Iterate over all records in table order.
    pub fn iter(&self) -> impl Iterator<Item = Result<WordTuple>> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.layout.count {
            return Err(PassphraseError::IndexOutOfRange {
                index: index.to_string(),
                len: self.layout.count.to_string(),
            });
        }
        Ok(())
    }

    fn table_entry(&self, entry: usize) -> Result<usize> {
        let start = self.layout.table.start + entry * TABLE_ENTRY_LEN;
        let raw = &self.buffer.as_slice()[start..start + TABLE_ENTRY_LEN];
        Ok(utils::parse_hex_field(raw, "offset table entry")? as usize)
    }

    fn string_at(&self, offset: usize) -> Result<String> {
        let pool = &self.buffer.as_slice()[self.layout.data.clone()];
        if offset >= pool.len() {
            return Err(PassphraseError::Format(format!(
                "bad corpus: string offset {:#x} beyond pool of {} bytes",
                offset,
                pool.len()
            )));
        }
        let len = pool[offset..]
            .iter()
            .position(|&b| b == b'\n')
            .ok_or_else(|| {
                PassphraseError::Format(format!(
                    "bad corpus: unterminated string at offset {:#x}",
                    offset
                ))
            })?;
        let bytes = &pool[offset..offset + len];
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|e| {
                PassphraseError::Format(format!(
                    "bad corpus: invalid UTF-8 at offset {:#x}: {}",
                    offset, e
                ))
            })
    }
}

/// Validate the framing of a packed blob and locate its sections.
///
/// # Structure
/// ```text
/// #format packed\n
/// #!!PCK!! <magic> <version> <comment-len> <data-len> <count> !\n
/// [comment-len bytes]   opaque comment
/// #_-_-_-\n
/// [data-len bytes]      newline-terminated string pool
/// [(2*count+1) * 8]     offset table, entry 0 == magic
/// #_-_-_-\n
/// ```
fn parse_layout(bytes: &[u8]) -> Result<Layout> {
    let mut cursor = Cursor::new(bytes);

    // Step 1: Fixed header
    cursor.expect(HEADER, "header")?;

    // Step 2: Signature line
    let signature = cursor.take(SIGNATURE_LEN, "signature line")?;
    let fields = parse_signature(&bytes[signature])?;
    trace!(
        "Signature: magic={:#010x}, version={}, comment={} bytes, data={} bytes, count={}",
        fields.magic,
        fields.version,
        fields.comment_len,
        fields.data_len,
        fields.count
    );

    // Step 3: Comment section (not interpreted)
    let comment = cursor.take(fields.comment_len, "comment section")?;

    // Step 4: Second marker
    cursor.expect(SECTION_MARK, "section marker")?;

    // Step 5: String pool
    let data = cursor.take(fields.data_len, "data section")?;

    // Step 6: Offset table
    let table_len = fields
        .count
        .checked_mul(2)
        .and_then(|n| n.checked_add(1))
        .and_then(|n| n.checked_mul(TABLE_ENTRY_LEN))
        .ok_or_else(|| {
            PassphraseError::Format(format!("bad corpus: record count {} too large", fields.count))
        })?;
    let table = cursor.take(table_len, "offset table")?;

    // Step 7: Entry 0 sanity check
    let index_magic = utils::parse_hex_field(
        &bytes[table.start..table.start + TABLE_ENTRY_LEN],
        "index magic",
    )?;
    if index_magic != MAGIC as u64 {
        return Err(PassphraseError::BadField {
            field: "index magic",
            expected: format!("{:08x}", MAGIC),
            found: format!("{:08x}", index_magic),
        });
    }

    // Step 8: Trailing marker
    cursor.expect(SECTION_MARK, "trailing marker")?;
    debug!("Packed layout validated: {} bytes total", cursor.pos);

    Ok(Layout {
        comment,
        data,
        table,
        count: fields.count,
    })
}

struct Signature {
    magic: u64,
    version: u64,
    comment_len: usize,
    data_len: usize,
    count: usize,
}

fn parse_signature(line: &[u8]) -> Result<Signature> {
    let parts: Vec<&[u8]> = line.split(|&b| b == b' ').collect();
    if parts.len() != 7 || parts[0] != SIGNATURE_TAG || parts[6] != b"!\n" {
        return Err(PassphraseError::BadField {
            field: "signature line",
            expected: "#!!PCK!! <magic> <version> <comment-len> <data-len> <count> !".to_string(),
            found: format!("{:?}", String::from_utf8_lossy(line)),
        });
    }
    for (i, part) in parts[1..6].iter().enumerate() {
        if part.len() != 8 {
            return Err(PassphraseError::BadField {
                field: "signature field width",
                expected: "8 hex digits".to_string(),
                found: format!("{:?} in field {}", String::from_utf8_lossy(part), i + 1),
            });
        }
    }

    let magic = utils::parse_hex_field(parts[1], "magic")?;
    if magic != MAGIC as u64 {
        return Err(PassphraseError::BadField {
            field: "magic",
            expected: format!("{:08x}", MAGIC),
            found: format!("{:08x}", magic),
        });
    }
    let version = utils::parse_hex_field(parts[2], "version")?;
    if version != VERSION as u64 {
        return Err(PassphraseError::BadField {
            field: "version",
            expected: VERSION.to_string(),
            found: version.to_string(),
        });
    }

    Ok(Signature {
        magic,
        version,
        comment_len: utils::parse_hex_field(parts[3], "comment length")? as usize,
        data_len: utils::parse_hex_field(parts[4], "data length")? as usize,
        count: utils::parse_hex_field(parts[5], "record count")? as usize,
    })
}
