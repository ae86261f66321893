//! Counting and ranking of fixed-length strings under per-set minimums.
//!
//! Given disjoint character sets of sizes `N_i` and required minimum counts
//! `v_i`, the number of valid strings of length `n` is
//!
//! ```text
//! f(0, v) = [v == 0]
//! f(n, v) = Σ_i N_i · f(n - 1, v - e_i)      (components floored at 0)
//! f(n, v) = 0                                 if Σ v > n
//! ```
//!
//! Memoizing on `(n, v)` bounds the work by `n · Π (v_i + 1)` keys. The same
//! table drives [`decode`], which maps every index in `[0, f(n, v))` to a
//! distinct valid string: at each position the index range is split into one
//! block per eligible set, each block `N_i · f(n - 1, v - e_i)` wide.

use std::collections::HashMap;

use log::trace;
use num_bigint::BigUint;
use num_traits::{One, Zero};

use super::types::error::{PassphraseError, Result};

/// Memoized values of `f`, keyed by remaining length and remaining requirements.
#[derive(Debug, Default, Clone)]
pub struct CountCache {
    map: HashMap<(usize, Vec<usize>), BigUint>,
}

impl CountCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of memoized subproblems.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// `v` with component `i` reduced by one, floored at zero.
pub fn decrement(v: &[usize], i: usize) -> Vec<usize> {
    let mut out = v.to_vec();
    out[i] = out[i].saturating_sub(1);
    out
}

/// Number of strings of length `n` over sets of sizes `lens` holding at
/// least `reqs[i]` characters from set `i`.
pub fn count(n: usize, lens: &[usize], reqs: &[usize], cache: &mut CountCache) -> BigUint {
    debug_assert_eq!(lens.len(), reqs.len());
    if let Some(hit) = cache.map.get(&(n, reqs.to_vec())) {
        return hit.clone();
    }

    let value = if n == 0 {
        if reqs.iter().all(|&r| r == 0) {
            BigUint::one()
        } else {
            BigUint::zero()
        }
    } else if reqs.iter().sum::<usize>() > n {
        BigUint::zero()
    } else {
        let mut total = BigUint::zero();
        for (i, &size) in lens.iter().enumerate() {
            let sub = count(n - 1, lens, &decrement(reqs, i), cache);
            total += sub * BigUint::from(size);
        }
        total
    };

    cache.map.insert((n, reqs.to_vec()), value.clone());
    value
}

/// Decode `index` into the string it ranks, as `(set, member)` pairs.
///
/// `member` indexes the set's characters in their canonical (sorted) order.
///
/// # Errors
/// Returns `IndexOutOfRange` unless `index < count(n, lens, reqs)`.
pub fn decode(
    index: &BigUint,
    n: usize,
    lens: &[usize],
    reqs: &[usize],
    cache: &mut CountCache,
) -> Result<Vec<(usize, usize)>> {
    let total = count(n, lens, reqs, cache);
    if *index >= total {
        return Err(PassphraseError::IndexOutOfRange {
            index: index.to_string(),
            len: total.to_string(),
        });
    }

    let mut out = Vec::with_capacity(n);
    let mut remaining = n;
    let mut v = reqs.to_vec();
    // Offset of the index inside the current block; always < f(remaining, v).
    let mut offset = index.clone();

    while remaining > 0 {
        // Once every slot left is forced, only still-required sets may appear.
        let forced = v.iter().sum::<usize>() == remaining;
        let mut chosen = None;
        for (i, &size) in lens.iter().enumerate() {
            if forced && v[i] == 0 {
                continue;
            }
            let next = decrement(&v, i);
            let per_char = count(remaining - 1, lens, &next, cache);
            let width = &per_char * BigUint::from(size);
            if offset < width {
                let member = &offset / &per_char;
                offset -= &member * &per_char;
                let member = usize::try_from(&member).map_err(|_| {
                    PassphraseError::Domain(format!("member index {} overflows", member))
                })?;
                chosen = Some((i, member, next));
                break;
            }
            offset -= width;
        }

        let (set, member, next) = chosen.ok_or_else(|| {
            PassphraseError::Domain(format!(
                "combination table inconsistent at length {} with requirements {:?}",
                remaining, v
            ))
        })?;
        trace!("position {}: set {} member {}", n - remaining, set, member);
        out.push((set, member));
        v = next;
        remaining -= 1;
    }

    debug_assert!(offset.is_zero());
    Ok(out)
}
