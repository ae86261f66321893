//! Text corpus formats: plain word lists and tab-separated hinted lists.

use std::collections::BTreeSet;

use log::debug;

use super::packed;
use crate::passphrase::types::error::{PassphraseError, Result};
use crate::passphrase::types::models::WordTuple;

const HINTED_HEADER: &[u8] = b"#format hinted\n";
const FORMAT_PREFIX: &[u8] = b"#format ";

/// On-disk corpus encodings, detected from the first line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpusFormat {
    Plain,
    Hinted,
    Packed,
}

/// Detect the corpus encoding from the leading bytes of a file.
pub fn detect_format(head: &[u8]) -> Result<CorpusFormat> {
    if head.starts_with(HINTED_HEADER) {
        Ok(CorpusFormat::Hinted)
    } else if head.starts_with(packed::HEADER) {
        Ok(CorpusFormat::Packed)
    } else if head.starts_with(FORMAT_PREFIX) {
        let line = head.split(|&b| b == b'\n').next().unwrap_or_default();
        Err(PassphraseError::Format(format!(
            "unrecognized corpus format {:?}",
            String::from_utf8_lossy(line)
        )))
    } else {
        Ok(CorpusFormat::Plain)
    }
}

/// Parse a plain or hinted text corpus into sorted, deduplicated records.
///
/// Leading `#` lines form the header until the first blank or non-comment
/// line; the only recognized option is `#option no-apostroph`. Plain words
/// are kept only if made of ASCII letters and apostrophes, and possessive or
/// trailing-apostrophe forms are dropped.
pub fn parse_text_corpus(bytes: &[u8], format: CorpusFormat) -> Result<Vec<WordTuple>> {
    let mut no_apostrophe = false;
    let mut in_header = true;
    let mut words = BTreeSet::new();

    for raw in bytes.split(|&b| b == b'\n') {
        let line = raw.trim_ascii();
        if line.is_empty() {
            in_header = false;
            continue;
        }
        if line.starts_with(b"#") {
            if in_header && (line == b"#option no-apostroph" || line == b"#option no-apostrophe") {
                no_apostrophe = true;
            }
            continue;
        }
        in_header = false;

        match format {
            CorpusFormat::Hinted => {
                let fields: Vec<&[u8]> = line.split(|&b| b == b'\t').collect();
                if fields.len() != 2 {
                    return Err(PassphraseError::Format(format!(
                        "invalid line in corpus: {:?}",
                        String::from_utf8_lossy(line)
                    )));
                }
                let word = decode_utf8(fields[0])?;
                let hint = decode_utf8(fields[1])?;
                words.insert(WordTuple::new(word, hint));
            }
            CorpusFormat::Plain => {
                for token in line.split(|b| b.is_ascii_whitespace()) {
                    if accept_plain_word(token, no_apostrophe) {
                        // Accepted tokens are pure ASCII.
                        words.insert(WordTuple::plain(String::from_utf8_lossy(token)));
                    }
                }
            }
            CorpusFormat::Packed => {
                return Err(PassphraseError::Format(
                    "packed corpus passed to the text parser".to_string(),
                ))
            }
        }
    }

    debug!(
        "Parsed {:?} text corpus: {} records (no-apostrophe={})",
        format,
        words.len(),
        no_apostrophe
    );
    Ok(words.into_iter().collect())
}

fn accept_plain_word(token: &[u8], no_apostrophe: bool) -> bool {
    if token.is_empty() || token.ends_with(b"'") || token.ends_with(b"'s") {
        return false;
    }
    token
        .iter()
        .all(|&c| c.is_ascii_alphabetic() || (c == b'\'' && !no_apostrophe))
}

fn decode_utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|e| PassphraseError::Format(format!("invalid UTF-8 in corpus: {}", e)))
}
