//! Turn a parsed [`Pattern`] into concrete group counts.
//!
//! # Counting rules
//! ```text
//! explicit repeat n          -> n draws
//! no repeat, not last group  -> 1 draw
//! no repeat, last, no target -> 1 draw
//! no repeat, last, target E  -> ceil((E - e) / e1) draws (0 if already met)
//! {...} with length n        -> one n-character draw
//! {...} last, target E       -> one draw of the shortest length reaching E - e
//! ```
//! After every group is counted, a target that is still unmet is reached by
//! appending whole copies of the last group.

use std::sync::Arc;

use log::{debug, info};

use super::parser::{GroupSource, Pattern};
use crate::passphrase::corpus::Corpus;
use crate::passphrase::types::error::{PassphraseError, Result};

/// A group with its draw count fixed.
#[derive(Debug, Clone)]
pub struct ResolvedGroup {
    pub separator: Option<String>,
    pub corpus: Arc<Corpus>,
    /// Number of elements drawn from `corpus`.
    pub count: usize,
    /// True only for the first group; filling copies are never initial.
    pub initial: bool,
    /// Bits contributed by one draw.
    pub entropy: f64,
}

impl ResolvedGroup {
    /// Bits contributed by the whole group.
    pub fn total_entropy(&self) -> f64 {
        self.entropy * self.count as f64
    }
}

/// Every group of a pattern with counts fixed, plus the total entropy.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub groups: Vec<ResolvedGroup>,
    pub entropy: f64,
}

/// Fix the draw count of every group of `pattern`.
///
/// Appends one "Entropy computation" line per contributing group and a
/// final total line to `diag`.
///
/// # Errors
/// Returns a format error for a combinatorial group with neither a length
/// nor a final entropy target, and propagates length search failures.
pub fn resolve_entropy(pattern: &Pattern, diag: &mut Vec<String>) -> Result<Resolution> {
    let target = pattern.entropy;
    let last = pattern.groups.len().saturating_sub(1);
    let mut groups: Vec<ResolvedGroup> = Vec::with_capacity(pattern.groups.len());
    let mut e = 0.0;

    for (i, group) in pattern.groups.iter().enumerate() {
        let fills_target = target.filter(|_| i == last);

        let (corpus, count) = match &group.source {
            GroupSource::Simple(corpus) => {
                let e1 = corpus.entropy()?;
                let count = match (group.repeat, fills_target) {
                    (Some(n), _) => n,
                    (None, None) => 1,
                    (None, Some(t)) if e >= t => 0,
                    (None, Some(t)) => ((t - e) / e1).ceil() as usize,
                };
                (Arc::clone(corpus), count)
            }
            GroupSource::Combinatorial(generator) => match (group.repeat, fills_target) {
                (Some(n), _) => (Arc::new(Corpus::Combinatorial(generator.by_length(n)?)), 1),
                (None, Some(t)) if e >= t => {
                    debug!("{}: entropy target already met, skipped", generator.name());
                    continue;
                }
                (None, Some(t)) => (
                    Arc::new(Corpus::Combinatorial(generator.by_entropy(t - e)?)),
                    1,
                ),
                (None, None) => {
                    return Err(PassphraseError::Format(format!(
                        "combinatorial set {} needs a length or a final entropy target",
                        generator.name()
                    )))
                }
            },
        };

        let resolved = ResolvedGroup {
            separator: group.separator.clone(),
            entropy: corpus.entropy()?,
            corpus,
            count,
            initial: i == 0,
        };
        if count > 0 {
            diag.push(entropy_line(&resolved));
        }
        e += resolved.total_entropy();
        groups.push(resolved);
    }

    if let Some(t) = target.filter(|&t| e < t) {
        // Filling: repeat the whole last group until the target is met.
        // A target met without any group leaves nothing to fill.
        let template = groups.last().cloned().ok_or_else(|| {
            PassphraseError::Format("No format specifier found".to_string())
        })?;
        let block = template.total_entropy();
        if block <= 0.0 {
            return Err(PassphraseError::Domain(format!(
                "impossible to reach {} bits by repeating {}",
                t,
                template.corpus.name()
            )));
        }
        while e < t {
            let filler = ResolvedGroup {
                initial: false,
                ..template.clone()
            };
            diag.push(entropy_line(&filler));
            e += block;
            groups.push(filler);
        }
    }

    diag.push(format!(
        "Entropy computation: total generated entropy {:.3} bits",
        e
    ));
    info!(
        "Resolved {} groups, {:.3} bits per password",
        groups.len(),
        e
    );
    Ok(Resolution { groups, entropy: e })
}

fn entropy_line(group: &ResolvedGroup) -> String {
    format!(
        "Entropy computation: {:.3} * {} = {:.3} bits",
        group.entropy,
        group.count,
        group.total_entropy()
    )
}
