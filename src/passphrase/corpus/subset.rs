//! Restricted views of a corpus by leading character.

use std::ops::Range;
use std::sync::Arc;

use log::debug;

use super::Corpus;
use crate::passphrase::types::error::{PassphraseError, Result};
use crate::passphrase::types::models::WordTuple;
use crate::passphrase::utils;

/// A view over `base` exposing only the elements whose first character is
/// one of the requested initials. Elements are not copied; index access is
/// remapped through half-open ranges of the base corpus.
#[derive(Debug)]
pub struct Subset {
    name: String,
    base: Arc<Corpus>,
    ranges: Vec<Range<usize>>,
    len: usize,
}

impl Subset {
    /// Restrict `base` to elements starting with a character named by
    /// `initials` (single characters and `a-f` ranges).
    ///
    /// # Errors
    /// Returns a format error for a combinatorial base, and when fewer than
    /// two elements remain.
    pub fn new(base: Arc<Corpus>, initials: &str) -> Result<Self> {
        let wanted = utils::expand_initials(initials)?;
        let base_len = base.simple_len().ok_or_else(|| {
            PassphraseError::Format(format!(
                "combinatorial corpus {} is not subsettable",
                base.name()
            ))
        })?;

        let mut ranges: Vec<Range<usize>> = Vec::new();
        if base.is_sorted() {
            // Binary search each initial's run in the sorted base.
            for &c in &wanted {
                let lo = lower_bound(base_len, |i| Ok(base.initial(i)? < Some(c)))?;
                let hi = lower_bound(base_len, |i| Ok(base.initial(i)? <= Some(c)))?;
                if lo < hi {
                    push_range(&mut ranges, lo..hi);
                }
            }
        } else {
            for i in 0..base_len {
                if let Some(c) = base.initial(i)? {
                    if wanted.contains(&c) {
                        push_range(&mut ranges, i..i + 1);
                    }
                }
            }
        }

        let len: usize = ranges.iter().map(|r| r.len()).sum();
        match len {
            0 => {
                return Err(PassphraseError::Format(format!(
                    "no words starting with [{}] in wordset {}",
                    initials,
                    base.name()
                )))
            }
            1 => {
                return Err(PassphraseError::Format(format!(
                    "only one word starting with [{}] in wordset {}",
                    initials,
                    base.name()
                )))
            }
            _ => {}
        }
        debug!(
            "Subset {}^{}: {} of {} elements in {} ranges",
            base.name(),
            initials,
            len,
            base_len,
            ranges.len()
        );

        Ok(Self {
            name: format!("{}^{}", base.name(), initials),
            base,
            ranges,
            len,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn base(&self) -> &Arc<Corpus> {
        &self.base
    }

    /// Translate a subset index into the base corpus index.
    pub fn base_index(&self, index: usize) -> Result<usize> {
        let mut remaining = index;
        for range in &self.ranges {
            if remaining < range.len() {
                return Ok(range.start + remaining);
            }
            remaining -= range.len();
        }
        Err(PassphraseError::IndexOutOfRange {
            index: index.to_string(),
            len: self.len.to_string(),
        })
    }

    pub fn get(&self, index: usize) -> Result<WordTuple> {
        self.base.entry(self.base_index(index)?)
    }
}

/// Append `range`, merging it into the previous one when adjacent.
fn push_range(ranges: &mut Vec<Range<usize>>, range: Range<usize>) {
    if let Some(last) = ranges.last_mut() {
        if last.end == range.start {
            last.end = range.end;
            return;
        }
    }
    ranges.push(range);
}

/// First index in `[0, len)` for which `pred` is false, assuming `pred` is
/// true on a prefix. A fallible `partition_point`.
fn lower_bound<F>(len: usize, mut pred: F) -> Result<usize>
where
    F: FnMut(usize) -> Result<bool>,
{
    let (mut lo, mut hi) = (0, len);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if pred(mid)? {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    Ok(lo)
}
