//! Low-level helpers shared across modules

use std::collections::BTreeSet;

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

use super::types::error::{PassphraseError, Result};

/// Parse a fixed-width, zero-padded hexadecimal field.
///
/// Surrounding ASCII whitespace is ignored, so an 8-byte table entry of
/// 7 hex digits plus a space or newline parses the same as 8 digits.
pub fn parse_hex_field(raw: &[u8], field: &'static str) -> Result<u64> {
    let text = std::str::from_utf8(raw).map_err(|_| PassphraseError::BadField {
        field,
        expected: "hexadecimal digits".to_string(),
        found: format!("{:?}", String::from_utf8_lossy(raw)),
    })?;
    let trimmed = text.trim_matches(|c: char| c.is_ascii_whitespace());
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(PassphraseError::BadField {
            field,
            expected: "hexadecimal digits".to_string(),
            found: format!("{:?}", text),
        });
    }
    u64::from_str_radix(trimmed, 16).map_err(|e| PassphraseError::BadField {
        field,
        expected: "hexadecimal number".to_string(),
        found: format!("{:?} ({})", text, e),
    })
}

/// Base-2 logarithm of an arbitrary-precision integer.
///
/// Returns negative infinity for zero, matching `f64::log2(0.0)`.
pub fn log2_biguint(value: &BigUint) -> f64 {
    if value.is_zero() {
        return f64::NEG_INFINITY;
    }
    let bits = value.bits();
    let shift = bits.saturating_sub(64);
    let top = (value >> shift).to_u64().unwrap_or(u64::MAX);
    (top as f64).log2() + shift as f64
}

/// Expand a subset descriptor such as `a-fx` into the set of characters it names.
///
/// Each item is either a single character or an inclusive `first-last` range.
pub fn expand_initials(spec: &str) -> Result<BTreeSet<char>> {
    let chars: Vec<char> = spec.chars().collect();
    let mut out = BTreeSet::new();
    let mut i = 0;
    while i < chars.len() {
        let first = chars[i];
        if i + 2 < chars.len() && chars[i + 1] == '-' {
            let last = chars[i + 2];
            if last < first {
                return Err(PassphraseError::Format(format!(
                    "bad character range {}-{} in subset [{}]",
                    first, last, spec
                )));
            }
            out.extend(first..=last);
            i += 3;
        } else {
            out.insert(first);
            i += 1;
        }
    }
    Ok(out)
}
