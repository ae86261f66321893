//! The generation driver: format specifier in, passwords with hints out.

use log::{debug, info};
use rand::{CryptoRng, Rng};

use super::pattern::{self, Resolution, ResolvedGroup};
use super::registry::CorpusRegistry;
use super::types::error::{PassphraseError, Result};
use super::types::models::{Element, Generation, Passphrase};

/// Generate `count` passwords formatted by `spec`.
///
/// Corpora are resolved through `registry`; every draw uses `rng`.
///
/// # Errors
/// Returns a format error for a bad specifier or a `count` below one, and
/// propagates corpus loading and sampling failures.
pub fn generate<R>(
    spec: &str,
    count: usize,
    registry: &CorpusRegistry,
    rng: &mut R,
) -> Result<Generation>
where
    R: Rng + CryptoRng + ?Sized,
{
    let mut diag = Vec::new();
    let pattern = pattern::parse(spec, registry, &mut diag)?;
    if count < 1 {
        return Err(PassphraseError::Format(
            "bad count of passwords specified".to_string(),
        ));
    }
    let resolution = pattern::resolve_entropy(&pattern, &mut diag)?;
    let mut generation = generate_resolved(&resolution, count, rng)?;
    diag.append(&mut generation.diag);
    generation.diag = diag;
    Ok(generation)
}

/// Generate `count` passwords from an already resolved pattern.
pub fn generate_resolved<R>(
    resolution: &Resolution,
    count: usize,
    rng: &mut R,
) -> Result<Generation>
where
    R: Rng + CryptoRng + ?Sized,
{
    info!(
        "Generating {} passwords of {:.3} bits from {} groups",
        count,
        resolution.entropy,
        resolution.groups.len()
    );

    let mut passwords = Vec::with_capacity(count);
    let mut elements = Vec::with_capacity(count);
    for _ in 0..count {
        let mut out = Vec::new();
        for group in &resolution.groups {
            emit_group(group, rng, &mut out)?;
        }
        let password: String = out.iter().map(|e| e.password.as_str()).collect();
        let hint: String = out.iter().map(|e| e.hint.as_str()).collect();
        debug!("Generated password of {} elements", out.len());
        passwords.push(Passphrase { password, hint });
        elements.push(out);
    }

    Ok(Generation {
        passwords,
        elements,
        diag: Vec::new(),
        entropy: resolution.entropy,
    })
}

/// Append the elements of one group.
///
/// Word groups emit one element per word with separators between them;
/// character groups emit a single element holding every drawn character.
fn emit_group<R>(group: &ResolvedGroup, rng: &mut R, out: &mut Vec<Element>) -> Result<()>
where
    R: Rng + CryptoRng + ?Sized,
{
    if group.corpus.is_words() {
        let inter = group.separator.as_deref().unwrap_or(" ");
        let pre = if group.initial { "" } else { inter };
        for c in 0..group.count {
            let sep = if c == 0 { pre } else { inter };
            // Words stay readable in the hint even when glued together.
            let hint_sep = if sep.is_empty() && c != 0 { " " } else { sep };
            if !hint_sep.is_empty() {
                out.push(Element::separator(sep, hint_sep));
            }
            let word = group.corpus.get_randomly(rng)?;
            out.push(Element::sampled(group.entropy, word.word, word.hint));
        }
    } else if group.count > 0 {
        if !group.initial {
            if let Some(sep) = group.separator.as_deref().filter(|s| !s.is_empty()) {
                out.push(Element::separator(sep, sep));
            }
        }
        let mut password = String::new();
        let mut hint = String::new();
        for _ in 0..group.count {
            let drawn = group.corpus.get_randomly(rng)?;
            password.push_str(&drawn.word);
            hint.push_str(&drawn.hint);
        }
        out.push(Element::sampled(group.total_entropy(), password, hint));
    }
    Ok(())
}
