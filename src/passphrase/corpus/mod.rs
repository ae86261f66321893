//! Corpora: finite, indexable sets of candidate password elements.
//!
//! Every corpus kind answers the same questions (how many elements, are they
//! words or characters, what is element `i`) through the [`Corpus`] enum:
//!
//! - [`CharacterSet`]: single characters with optional reading hints
//! - [`WordList`]: sorted words, in memory or served from a packed file
//! - [`Subset`]: a view of another corpus restricted by leading character
//! - [`CombinatorialDictionary`]: fixed-length strings over disjoint
//!   character sets with per-set minimum counts

pub mod charset;
pub mod combinatorial;
pub mod subset;
pub mod wordlist;

use std::sync::Arc;

use num_bigint::{BigUint, RandBigInt};
use num_traits::ToPrimitive;
use rand::{CryptoRng, Rng};

use crate::passphrase::types::error::{PassphraseError, Result};
use crate::passphrase::types::models::WordTuple;
use crate::passphrase::utils;

pub use charset::CharacterSet;
pub use combinatorial::{CombinatorialDictionary, CombinatorialGenerator};
pub use subset::Subset;
pub use wordlist::WordList;

#[derive(Debug)]
pub enum Corpus {
    Characters(CharacterSet),
    Words(WordList),
    Subset(Subset),
    Combinatorial(CombinatorialDictionary),
}

impl Corpus {
    /// Diagnostic label.
    pub fn name(&self) -> &str {
        match self {
            Corpus::Characters(c) => c.name(),
            Corpus::Words(w) => w.name(),
            Corpus::Subset(s) => s.name(),
            Corpus::Combinatorial(d) => d.name(),
        }
    }

    /// Number of distinct elements.
    pub fn len(&self) -> BigUint {
        match self {
            Corpus::Combinatorial(d) => d.len().clone(),
            _ => BigUint::from(self.simple_len().unwrap_or_default()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Corpus::Combinatorial(d) => d.is_empty(),
            _ => self.simple_len() == Some(0),
        }
    }

    /// Element count of a non-combinatorial corpus.
    pub fn simple_len(&self) -> Option<usize> {
        match self {
            Corpus::Characters(c) => Some(c.len()),
            Corpus::Words(w) => Some(w.len()),
            Corpus::Subset(s) => Some(s.len()),
            Corpus::Combinatorial(_) => None,
        }
    }

    /// Whether elements are words (joined with separators) rather than characters.
    pub fn is_words(&self) -> bool {
        match self {
            Corpus::Characters(_) | Corpus::Combinatorial(_) => false,
            Corpus::Words(_) => true,
            Corpus::Subset(s) => s.base().is_words(),
        }
    }

    /// How many output units one element contributes.
    pub fn password_elements(&self) -> usize {
        match self {
            Corpus::Combinatorial(d) => d.length(),
            _ => 1,
        }
    }

    /// `log2(len())` in bits.
    ///
    /// # Errors
    /// Returns a domain error for an empty corpus.
    pub fn entropy(&self) -> Result<f64> {
        if self.is_empty() {
            return Err(PassphraseError::Domain(format!(
                "empty corpus {} has no entropy",
                self.name()
            )));
        }
        Ok(utils::log2_biguint(&self.len()))
    }

    /// The element at `index` with its reading hint.
    pub fn get_with_hint(&self, index: &BigUint) -> Result<WordTuple> {
        match self {
            Corpus::Combinatorial(d) => d.get(index),
            _ => {
                let i = index
                    .to_usize()
                    .ok_or_else(|| PassphraseError::IndexOutOfRange {
                        index: index.to_string(),
                        len: self.len().to_string(),
                    })?;
                self.entry(i)
            }
        }
    }

    /// A uniformly drawn element.
    pub fn get_randomly<R>(&self, rng: &mut R) -> Result<WordTuple>
    where
        R: Rng + CryptoRng + ?Sized,
    {
        if self.is_empty() {
            return Err(PassphraseError::Domain(format!(
                "cannot draw from empty corpus {}",
                self.name()
            )));
        }
        let index = rng.gen_biguint_below(&self.len());
        self.get_with_hint(&index)
    }

    /// The element at a machine-sized index.
    pub fn entry(&self, index: usize) -> Result<WordTuple> {
        match self {
            Corpus::Characters(c) => {
                c.get(index)
                    .cloned()
                    .ok_or_else(|| PassphraseError::IndexOutOfRange {
                        index: index.to_string(),
                        len: c.len().to_string(),
                    })
            }
            Corpus::Words(w) => w.get(index),
            Corpus::Subset(s) => s.get(index),
            Corpus::Combinatorial(d) => d.get(&BigUint::from(index)),
        }
    }

    /// Leading character of element `index`.
    pub fn initial(&self, index: usize) -> Result<Option<char>> {
        match self {
            Corpus::Words(w) => w.initial(index),
            Corpus::Subset(s) => s.base().initial(s.base_index(index)?),
            _ => Ok(self.entry(index)?.initial()),
        }
    }

    /// Whether elements are grouped by non-decreasing initial.
    pub fn is_sorted(&self) -> bool {
        match self {
            Corpus::Words(w) => w.is_sorted(),
            Corpus::Subset(s) => s.base().is_sorted(),
            Corpus::Characters(_) | Corpus::Combinatorial(_) => false,
        }
    }

    /// All elements of a character corpus as `(character, hint)` pairs.
    ///
    /// # Errors
    /// Returns a format error for word corpora, combinatorial corpora and any
    /// element longer than one character.
    pub fn characters(&self) -> Result<Vec<(char, String)>> {
        let len = match self.simple_len() {
            Some(len) if !self.is_words() => len,
            _ => {
                return Err(PassphraseError::Format(format!(
                    "only character-based set can be used for combinatorial passwords ({})",
                    self.name()
                )))
            }
        };
        let mut out = Vec::with_capacity(len);
        for i in 0..len {
            let entry = self.entry(i)?;
            let mut chars = entry.word.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => out.push((c, entry.hint)),
                _ => {
                    return Err(PassphraseError::Format(format!(
                        "element {:?} of {} is not a single character",
                        entry.word,
                        self.name()
                    )))
                }
            }
        }
        Ok(out)
    }

    /// Restrict this corpus to elements starting with the given initials.
    pub fn subset(self: &Arc<Self>, initials: &str) -> Result<Corpus> {
        Ok(Corpus::Subset(Subset::new(Arc::clone(self), initials)?))
    }
}
