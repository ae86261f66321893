//! Word-list corpora, held in memory or served from a packed file.

use std::collections::BTreeSet;

use log::debug;

use crate::passphrase::format::packed::PackedCorpus;
use crate::passphrase::types::error::{PassphraseError, Result};
use crate::passphrase::types::models::WordTuple;

#[derive(Debug)]
enum WordSource {
    Memory(Vec<WordTuple>),
    Packed(PackedCorpus),
}

/// A list of (word, hint) records; in-memory lists are sorted and distinct.
#[derive(Debug)]
pub struct WordList {
    name: String,
    source: WordSource,
    /// Records are grouped by non-decreasing initial.
    sorted: bool,
}

impl WordList {
    /// Build an in-memory list; records are sorted and deduplicated.
    pub fn from_words(name: impl Into<String>, words: impl IntoIterator<Item = WordTuple>) -> Self {
        let words: BTreeSet<WordTuple> = words.into_iter().collect();
        Self {
            name: name.into(),
            source: WordSource::Memory(words.into_iter().collect()),
            sorted: true,
        }
    }

    /// Serve records lazily from a packed corpus.
    ///
    /// Packed files keep whatever record order their writer chose, so the
    /// initials are scanned once to decide whether subsets may binary search.
    ///
    /// # Errors
    /// Returns an error if a word in the data section cannot be decoded.
    pub fn from_packed(name: impl Into<String>, packed: PackedCorpus) -> Result<Self> {
        let name = name.into();
        let mut sorted = true;
        let mut previous = None;
        for i in 0..packed.len() {
            let initial = packed.get_word(i)?.chars().next();
            if initial < previous {
                sorted = false;
                break;
            }
            previous = initial;
        }
        debug!("Packed corpus {}: sorted by initial: {}", name, sorted);
        Ok(Self {
            name,
            source: WordSource::Packed(packed),
            sorted,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        match &self.source {
            WordSource::Memory(words) => words.len(),
            WordSource::Packed(packed) => packed.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether records are grouped by non-decreasing initial.
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    pub fn is_packed(&self) -> bool {
        matches!(self.source, WordSource::Packed(_))
    }

    pub fn get(&self, index: usize) -> Result<WordTuple> {
        match &self.source {
            WordSource::Memory(words) => {
                words
                    .get(index)
                    .cloned()
                    .ok_or_else(|| PassphraseError::IndexOutOfRange {
                        index: index.to_string(),
                        len: words.len().to_string(),
                    })
            }
            WordSource::Packed(packed) => packed.get(index),
        }
    }

    /// First character of the word at `index`, decoding only the word for packed lists.
    pub fn initial(&self, index: usize) -> Result<Option<char>> {
        match &self.source {
            WordSource::Memory(_) => Ok(self.get(index)?.initial()),
            WordSource::Packed(packed) => Ok(packed.get_word(index)?.chars().next()),
        }
    }
}
