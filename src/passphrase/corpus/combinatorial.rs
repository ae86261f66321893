//! Combinatorial corpora: fixed-length strings over several disjoint
//! character sets with a minimum count required from each.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info, trace};
use num_bigint::BigUint;
use num_traits::Zero;

use super::Corpus;
use crate::passphrase::combinatorics::{self, CountCache};
use crate::passphrase::types::error::{PassphraseError, Result};
use crate::passphrase::types::models::WordTuple;
use crate::passphrase::utils;

/// Longest combinatorial password, for explicit lengths and the entropy search alike.
pub const MAX_COMBINATORIAL_LENGTH: usize = 1024;

/// A set of character classes with per-class minimums, not yet bound to a length.
///
/// Construction canonicalizes the sets so they are pairwise disjoint. Bind
/// it to a length with [`by_length`](Self::by_length) or
/// [`by_entropy`](Self::by_entropy) to obtain a usable corpus.
#[derive(Debug, Clone)]
pub struct CombinatorialGenerator {
    name: String,
    sets: Vec<Vec<char>>,
    lens: Vec<usize>,
    reqcounts: Vec<usize>,
    /// Longest hint of each character over all original (uncanonicalized) sets.
    hints: HashMap<char, String>,
    cache: Arc<Mutex<CountCache>>,
}

impl CombinatorialGenerator {
    /// Build from `(character corpus, minimum count)` pairs.
    ///
    /// A set that is a proper superset of a smaller set loses the smaller
    /// set's characters, unless `canonical` is requested, in which case any
    /// overlap is an error.
    ///
    /// # Errors
    /// Returns a format error if a corpus is word-based, if two sets
    /// partially overlap, or if a set is exactly covered by others.
    pub fn new(wordsets: Vec<(Arc<Corpus>, usize)>, canonical: bool) -> Result<Self> {
        if wordsets.is_empty() {
            return Err(PassphraseError::Format(
                "combinatorial corpus needs at least one character set".to_string(),
            ));
        }

        let mut members = Vec::with_capacity(wordsets.len());
        let mut hints: HashMap<char, String> = HashMap::new();
        for (corpus, _) in &wordsets {
            if corpus.is_words() {
                return Err(PassphraseError::Format(format!(
                    "only character-based set can be used for combinatorial passwords ({} is a word corpus)",
                    corpus.name()
                )));
            }
            let mut set = BTreeSet::new();
            for (c, hint) in corpus.characters()? {
                set.insert(c);
                let longest = hints.entry(c).or_default();
                if hint.chars().count() > longest.chars().count() {
                    *longest = hint;
                }
            }
            members.push(set);
        }

        let names: Vec<&str> = wordsets.iter().map(|(c, _)| c.name()).collect();
        let sets = canonicalize(members, &names, canonical)?;
        let lens: Vec<usize> = sets.iter().map(Vec::len).collect();
        let reqcounts: Vec<usize> = wordsets.iter().map(|(_, r)| *r).collect();
        let name = format!("combinatorial({})", names.join(","));
        debug!(
            "{}: canonical set sizes {:?}, required counts {:?}",
            name, lens, reqcounts
        );

        Ok(Self {
            name,
            sets,
            lens,
            reqcounts,
            hints,
            cache: Arc::new(Mutex::new(CountCache::new())),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical (disjoint, sorted) character sets, in input order.
    pub fn sets(&self) -> &[Vec<char>] {
        &self.sets
    }

    pub fn lens(&self) -> &[usize] {
        &self.lens
    }

    pub fn reqcounts(&self) -> &[usize] {
        &self.reqcounts
    }

    /// Total characters across all sets.
    pub fn total_chars(&self) -> usize {
        self.lens.iter().sum()
    }

    /// Minimum length able to hold every required character.
    pub fn required_length(&self) -> usize {
        self.reqcounts.iter().sum()
    }

    /// Number of valid strings of length `n`.
    pub fn count(&self, n: usize) -> Result<BigUint> {
        let mut cache = self.lock_cache()?;
        Ok(combinatorics::count(n, &self.lens, &self.reqcounts, &mut cache))
    }

    /// Smallest length whose number of valid strings reaches `entropy` bits.
    ///
    /// # Errors
    /// Returns a format error when fewer than two characters are available,
    /// and a domain error if no length up to [`MAX_COMBINATORIAL_LENGTH`] suffices.
    pub fn minimal_length(&self, entropy: f64) -> Result<usize> {
        let nc = self.total_chars();
        if nc < 2 {
            return Err(PassphraseError::Format(format!(
                "impossible to generate combinatorial corpus {}: fewer than two characters",
                self.name
            )));
        }
        // No string count exceeds nc^n, so this estimate never overshoots.
        let estimate = (entropy / (nc as f64).log2()).ceil().max(0.0) as usize;
        let mut n = estimate.max(self.required_length()).max(1);

        let mut cache = self.lock_cache()?;
        while n <= MAX_COMBINATORIAL_LENGTH {
            let combs = combinatorics::count(n, &self.lens, &self.reqcounts, &mut cache);
            let bits = utils::log2_biguint(&combs);
            if !combs.is_zero() && bits >= entropy {
                debug!("{}: {} characters give {:.3} bits", self.name, n, bits);
                return Ok(n);
            }
            trace!(
                "{}: {} characters give {:.3} bits < {:.3}",
                self.name,
                n,
                bits,
                entropy
            );
            n += 1;
        }
        Err(PassphraseError::Domain(format!(
            "impossible to reach {} bits with combinatorial corpus {} within {} characters",
            entropy, self.name, MAX_COMBINATORIAL_LENGTH
        )))
    }

    /// Bind to an exact output length.
    pub fn by_length(&self, n: usize) -> Result<CombinatorialDictionary> {
        CombinatorialDictionary::new(self.clone(), n)
    }

    /// Bind to the shortest length reaching `entropy` bits.
    pub fn by_entropy(&self, entropy: f64) -> Result<CombinatorialDictionary> {
        let n = self.minimal_length(entropy)?;
        CombinatorialDictionary::new(self.clone(), n)
    }

    /// Number of memoized subproblems shared by this generator's dictionaries.
    pub fn cached_subproblems(&self) -> Result<usize> {
        Ok(self.lock_cache()?.len())
    }

    fn lock_cache(&self) -> Result<MutexGuard<'_, CountCache>> {
        self.cache.lock().map_err(|_| PassphraseError::LockPoisoned)
    }

    fn hint_for(&self, c: char) -> String {
        self.hints.get(&c).cloned().unwrap_or_else(|| c.to_string())
    }
}

/// Make `members` pairwise disjoint.
///
/// Sets are settled smallest first. Each remaining set must be either
/// disjoint from the settled one or a proper superset of it, in which case
/// the settled characters are subtracted. Output keeps the input order.
fn canonicalize(
    members: Vec<BTreeSet<char>>,
    names: &[&str],
    canonical: bool,
) -> Result<Vec<Vec<char>>> {
    let mut pending: Vec<(BTreeSet<char>, usize)> = Vec::with_capacity(members.len());
    for (i, set) in members.into_iter().enumerate() {
        if set.is_empty() {
            return Err(PassphraseError::Format(format!(
                "set {} ({}) is empty",
                i, names[i]
            )));
        }
        pending.push((set, i));
    }

    let mut settled: Vec<Option<BTreeSet<char>>> = vec![None; pending.len()];
    while !pending.is_empty() {
        pending.sort_by_key(|(s, i)| (s.len(), *i));
        let (first, i1) = pending.remove(0);

        let mut rest = Vec::with_capacity(pending.len());
        for (set, i) in pending {
            if set.is_disjoint(&first) {
                rest.push((set, i));
            } else if set.is_superset(&first) {
                if canonical {
                    return Err(PassphraseError::Format(format!(
                        "set {} ({}) is not disjoint with set {}: {} (non-canonical input)",
                        i, names[i], i1, names[i1]
                    )));
                }
                if set.len() == first.len() {
                    return Err(PassphraseError::Format(format!(
                        "set {} ({}) is sum of some other sets (including set {}: {})",
                        i, names[i], i1, names[i1]
                    )));
                }
                let reduced: BTreeSet<char> = set.difference(&first).copied().collect();
                debug!(
                    "set {} ({}) reduced by set {} ({}): {} -> {} characters",
                    i,
                    names[i],
                    i1,
                    names[i1],
                    set.len(),
                    reduced.len()
                );
                rest.push((reduced, i));
            } else {
                return Err(PassphraseError::Format(format!(
                    "set {} ({}) has partial overlap with set {}: {}",
                    i, names[i], i1, names[i1]
                )));
            }
        }
        settled[i1] = Some(first);
        pending = rest;
    }

    Ok(settled
        .into_iter()
        .map(|s| s.unwrap_or_default().into_iter().collect())
        .collect())
}

/// A combinatorial corpus bound to output length `n`.
///
/// Element `x` is the `x`-th valid string in rank order, so sampling a
/// uniform index samples a uniform valid password.
#[derive(Debug, Clone)]
pub struct CombinatorialDictionary {
    generator: CombinatorialGenerator,
    n: usize,
    combs: BigUint,
}

impl CombinatorialDictionary {
    fn new(generator: CombinatorialGenerator, n: usize) -> Result<Self> {
        if n == 0 {
            return Err(PassphraseError::Format(format!(
                "combinatorial corpus {} needs a positive length",
                generator.name
            )));
        }
        if n > MAX_COMBINATORIAL_LENGTH {
            return Err(PassphraseError::Domain(format!(
                "combinatorial corpus {} is limited to {} characters, {} requested",
                generator.name, MAX_COMBINATORIAL_LENGTH, n
            )));
        }
        let combs = generator.count(n)?;
        if combs.is_zero() {
            return Err(PassphraseError::Domain(format!(
                "impossible to generate combinatorial corpus {}: {} characters cannot hold {} required ones",
                generator.name,
                n,
                generator.required_length()
            )));
        }
        info!(
            "{}: length {}, {:.3} bits",
            generator.name,
            n,
            utils::log2_biguint(&combs)
        );
        Ok(Self {
            generator,
            n,
            combs,
        })
    }

    pub fn name(&self) -> &str {
        &self.generator.name
    }

    /// Characters per element.
    pub fn length(&self) -> usize {
        self.n
    }

    /// Number of valid strings.
    pub fn len(&self) -> &BigUint {
        &self.combs
    }

    pub fn is_empty(&self) -> bool {
        self.combs.is_zero()
    }

    pub fn generator(&self) -> &CombinatorialGenerator {
        &self.generator
    }

    /// The string ranked `index`, with a hint built from the longest
    /// annotation each character has in any original set.
    pub fn get(&self, index: &BigUint) -> Result<WordTuple> {
        let g = &self.generator;
        let picks = {
            let mut cache = g.lock_cache()?;
            combinatorics::decode(index, self.n, &g.lens, &g.reqcounts, &mut cache)?
        };
        let mut word = String::with_capacity(self.n);
        let mut hint = String::new();
        for (set, member) in picks {
            let c = g.sets[set][member];
            word.push(c);
            hint.push_str(&g.hint_for(c));
        }
        Ok(WordTuple { word, hint })
    }
}
