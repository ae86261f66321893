//! Parser for format specifiers such as `-e4`, `A8:64` or `{l1 d1}:40`.
//!
//! # Grammar
//! ```text
//! spec      := group+ (' '* ':' bits)?
//! group     := separator? source repeat?
//! separator := ' ' | '-' | '/' | ',' | '.' | '"' quoted '"'
//! source    := letter | '[' ':'? name ('^' initials)? ':'? ']' | '{' (source repeat?)+ '}'
//! repeat    := digits
//! ```
//! Inside braces each repeat is the minimum count for that set (default 1);
//! the repeat after the closing brace is the total length.

use std::sync::{Arc, OnceLock};

use log::debug;
use regex::{Captures, Regex};

use crate::passphrase::corpus::{CombinatorialGenerator, Corpus};
use crate::passphrase::registry::CorpusRegistry;
use crate::passphrase::types::error::{PassphraseError, Result};

static GROUP_PATTERN: OnceLock<Regex> = OnceLock::new();
static MEMBER_PATTERN: OnceLock<Regex> = OnceLock::new();
static TAIL_PATTERN: OnceLock<Regex> = OnceLock::new();
static ESCAPE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn group_regex() -> &'static Regex {
    GROUP_PATTERN.get_or_init(|| {
        Regex::new(
            r#"(?x)^
            (?:
                (?P<sep1>[\ \-/,.])
              | "(?P<sep2>(?:[^\\"]|\\.)*)"
            )?
            (?:
                (?P<pat1>[a-zA-Z])
              | \[:?(?P<pat2>[\w\-]+)(?:\^(?P<subs>[\w\-]+))?:?\]
              | \{(?P<combi>[^}]*)\}
            )
            (?P<dig>\d*)"#,
        )
        .expect("Invalid group regex pattern")
    })
}

fn member_regex() -> &'static Regex {
    MEMBER_PATTERN.get_or_init(|| {
        Regex::new(
            r"(?x)^\s*
            (?:
                (?P<pat1>[a-zA-Z])
              | \[:?(?P<pat2>[\w\-]+)(?:\^(?P<subs>[\w\-]+))?:?\]
            )
            \s*(?P<dig>\d*)\s*",
        )
        .expect("Invalid member regex pattern")
    })
}

fn tail_regex() -> &'static Regex {
    TAIL_PATTERN.get_or_init(|| {
        Regex::new(r"^(?: *:(?P<bits>\d+(?:\.\d+)?))?$").expect("Invalid tail regex pattern")
    })
}

fn escape_regex() -> &'static Regex {
    ESCAPE_PATTERN.get_or_init(|| Regex::new(r"\\(.)").expect("Invalid escape regex pattern"))
}

/// Where a group draws its elements from.
#[derive(Debug, Clone)]
pub enum GroupSource {
    Simple(Arc<Corpus>),
    /// Not yet bound to a length; the repeat count (or the entropy target)
    /// decides the output length.
    Combinatorial(CombinatorialGenerator),
}

impl GroupSource {
    pub fn name(&self) -> &str {
        match self {
            GroupSource::Simple(c) => c.name(),
            GroupSource::Combinatorial(g) => g.name(),
        }
    }
}

/// One `separator? source repeat?` unit of a format specifier.
#[derive(Debug, Clone)]
pub struct Group {
    /// `None` when no separator was written; `Some("")` for an explicit `""`.
    pub separator: Option<String>,
    pub source: GroupSource,
    /// `None` when no repeat count was written.
    pub repeat: Option<usize>,
}

/// A parsed format specifier.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub groups: Vec<Group>,
    /// Target entropy in bits from a trailing `:bits`.
    pub entropy: Option<f64>,
}

/// Parse `spec`, resolving every corpus reference through `registry`.
///
/// # Errors
/// Returns a format error naming the unparsed remainder, or any corpus
/// resolution / subset / combinatorial construction error.
pub fn parse(spec: &str, registry: &CorpusRegistry, diag: &mut Vec<String>) -> Result<Pattern> {
    let mut groups = Vec::new();
    let mut rest = spec;

    while let Some(caps) = group_regex().captures(rest) {
        let matched = caps.get(0).map_or(0, |m| m.end());
        let separator = match (caps.name("sep1"), caps.name("sep2")) {
            (Some(s), _) => Some(s.as_str().to_string()),
            (None, Some(q)) => Some(escape_regex().replace_all(q.as_str(), "$1").into_owned()),
            (None, None) => None,
        };
        let repeat = parse_repeat(caps.name("dig").map_or("", |m| m.as_str()))?;

        let source = if let Some(inner) = caps.name("combi") {
            GroupSource::Combinatorial(parse_combinatorial(inner.as_str(), registry, diag)?)
        } else {
            GroupSource::Simple(resolve_reference(&caps, registry, diag)?)
        };

        debug!(
            "Parsed group: separator={:?}, source={}, repeat={:?}",
            separator,
            source.name(),
            repeat
        );
        groups.push(Group {
            separator,
            source,
            repeat,
        });
        rest = &rest[matched..];
    }

    let tail = tail_regex()
        .captures(rest)
        .ok_or_else(|| PassphraseError::Format(format!("parse failed at {:?}", rest)))?;

    if groups.is_empty() {
        return Err(PassphraseError::Format(format!(
            "No format specifier found in {:?}",
            spec
        )));
    }

    let entropy = match tail.name("bits") {
        Some(bits) => Some(bits.as_str().parse::<f64>().map_err(|e| {
            PassphraseError::Format(format!("bad entropy target {:?}: {}", bits.as_str(), e))
        })?),
        None => None,
    };

    Ok(Pattern { groups, entropy })
}

fn parse_repeat(digits: &str) -> Result<Option<usize>> {
    if digits.is_empty() {
        return Ok(None);
    }
    let n: usize = digits
        .parse()
        .map_err(|e| PassphraseError::Format(format!("bad repeat count {:?}: {}", digits, e)))?;
    if n == 0 {
        return Err(PassphraseError::Format(
            "repeat count must be positive".to_string(),
        ));
    }
    Ok(Some(n))
}

/// Resolve `pat1` / `pat2` (with optional `subs`) captures into a corpus.
fn resolve_reference(
    caps: &Captures<'_>,
    registry: &CorpusRegistry,
    diag: &mut Vec<String>,
) -> Result<Arc<Corpus>> {
    let name = caps
        .name("pat1")
        .or_else(|| caps.name("pat2"))
        .map(|m| m.as_str())
        .ok_or_else(|| PassphraseError::Format("missing corpus reference".to_string()))?;

    let mut corpus = registry.resolve(name, diag)?;
    if let Some(initials) = caps.name("subs") {
        corpus = Arc::new(corpus.subset(initials.as_str())?);
    }

    match corpus.simple_len() {
        Some(len) if len > 1 => Ok(corpus),
        _ => Err(PassphraseError::Format(format!(
            "not enough candidate in wordset {}",
            corpus.name()
        ))),
    }
}

fn parse_combinatorial(
    inner: &str,
    registry: &CorpusRegistry,
    diag: &mut Vec<String>,
) -> Result<CombinatorialGenerator> {
    let mut members = Vec::new();
    let mut rest = inner;
    while !rest.trim().is_empty() {
        let caps = member_regex().captures(rest).ok_or_else(|| {
            PassphraseError::Format(format!("parse failed at {:?} in {{{}}}", rest, inner))
        })?;
        let corpus = resolve_reference(&caps, registry, diag)?;
        let digits = caps.name("dig").map_or("", |m| m.as_str());
        let required = if digits.is_empty() {
            1
        } else {
            digits.parse().map_err(|e| {
                PassphraseError::Format(format!("bad minimum count {:?}: {}", digits, e))
            })?
        };
        members.push((corpus, required));
        rest = &rest[caps.get(0).map_or(rest.len(), |m| m.end())..];
    }
    CombinatorialGenerator::new(members, false)
}
