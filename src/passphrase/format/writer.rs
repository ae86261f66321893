//! Packed corpus encoding.
//!
//! Strings are pooled once each; a string that is a suffix of an already
//! emitted string (terminator included) points into that string instead of
//! being written again. Sorting the pool by reversed bytes puts every string
//! right after the longer strings that end with it, so a single pass finds
//! all shared suffixes.

use std::collections::{BTreeSet, HashMap};
use std::io::Write;

use log::{debug, info};

use super::packed::{HEADER, MAGIC, SECTION_MARK, SIGNATURE_LEN, SIGNATURE_TAG, VERSION};
use crate::passphrase::types::error::{PassphraseError, Result};
use crate::passphrase::types::models::WordTuple;

/// Largest offset representable in a 7-digit table entry.
pub const MAX_POOL_OFFSET: usize = 0x0fff_ffff;

/// Encode `records` as a packed corpus.
///
/// Records are sorted by word (then hint) and exact duplicates dropped, so
/// record `i` of the decoded corpus is the `i`-th record in that order. A
/// non-empty `comment` is stored verbatim with a trailing newline added if
/// missing. Returns the number of records written.
pub fn write_packed<W: Write>(out: &mut W, records: &[WordTuple], comment: &str) -> Result<usize> {
    let records: Vec<&WordTuple> = records
        .iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut comment = comment.as_bytes().to_vec();
    if !comment.is_empty() && !comment.ends_with(b"\n") {
        comment.push(b'\n');
    }

    let (pool, offsets) = build_pool(&records)?;

    let mut table = Vec::with_capacity((records.len() * 2 + 1) * 8);
    table.extend_from_slice(format!("{:07x}\n", MAGIC).as_bytes());
    for record in &records {
        let word = offsets[&terminated(&record.word)];
        let hint = offsets[&terminated(&record.hint)];
        table.extend_from_slice(format!("{:07x} {:07x}\n", word, hint).as_bytes());
    }

    let signature = format!(
        "{} {:08x} {:08x} {:08x} {:08x} {:08x} !\n",
        String::from_utf8_lossy(SIGNATURE_TAG),
        MAGIC,
        VERSION,
        comment.len(),
        pool.len(),
        records.len()
    );
    debug_assert_eq!(signature.len(), SIGNATURE_LEN);

    out.write_all(HEADER)?;
    out.write_all(signature.as_bytes())?;
    out.write_all(&comment)?;
    out.write_all(SECTION_MARK)?;
    out.write_all(&pool)?;
    out.write_all(&table)?;
    out.write_all(SECTION_MARK)?;

    info!(
        "Packed {} records into a {} byte pool",
        records.len(),
        pool.len()
    );
    Ok(records.len())
}

fn terminated(s: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(s.len() + 1);
    bytes.extend_from_slice(s.as_bytes());
    bytes.push(b'\n');
    bytes
}

/// Build the suffix-shared string pool and the offset of every distinct string.
fn build_pool(records: &[&WordTuple]) -> Result<(Vec<u8>, HashMap<Vec<u8>, usize>)> {
    let mut offsets: HashMap<Vec<u8>, Option<usize>> = HashMap::new();
    for record in records {
        if record.word.contains('\n') || record.hint.contains('\n') {
            return Err(PassphraseError::Format(format!(
                "corpus record {:?} contains a newline",
                record.word
            )));
        }
        offsets.insert(terminated(&record.word), None);
        offsets.insert(terminated(&record.hint), None);
    }

    // A string sorts after every longer string ending with it.
    let mut strings: Vec<Vec<u8>> = offsets.keys().cloned().collect();
    strings.sort_by_cached_key(|s| {
        let mut key: Vec<u16> = s.iter().rev().map(|&b| b as u16).collect();
        key.push(256);
        key
    });

    let mut pool = Vec::new();
    let mut shared = 0usize;
    for s in &strings {
        if offsets[s].is_some() {
            shared += 1;
            continue;
        }
        let base = pool.len();
        pool.extend_from_slice(s);
        for start in 0..s.len() {
            if let Some(slot) = offsets.get_mut(&s[start..]) {
                if slot.is_none() {
                    *slot = Some(base + start);
                }
            }
        }
    }
    debug!(
        "Pooled {} distinct strings, {} shared as suffixes",
        strings.len(),
        shared
    );

    if pool.len() > MAX_POOL_OFFSET {
        return Err(PassphraseError::Domain(format!(
            "string pool of {} bytes exceeds the packed format limit of {} bytes",
            pool.len(),
            MAX_POOL_OFFSET
        )));
    }

    let offsets = offsets
        .into_iter()
        .map(|(s, offset)| (s, offset.unwrap_or_default()))
        .collect();
    Ok((pool, offsets))
}
