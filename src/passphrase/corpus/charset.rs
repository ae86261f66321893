//! Character-set corpora and the builtin character classes.

use std::collections::HashSet;

use crate::passphrase::types::error::{PassphraseError, Result};
use crate::passphrase::types::models::WordTuple;

pub const DIGITS: &str = "0123456789";
pub const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
pub const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const HEXADECIMAL: &str = "0123456789abcdef";
pub const UPPER_HEXADECIMAL: &str = "0123456789ABCDEF";

/// Reading hints for characters that are easily confused or hard to name.
const ANNOTATIONS: &[(char, &str)] = &[
    ('0', "[zero 0]"),
    ('O', "[capital O]"),
    ('1', "[one 1]"),
    ('I', "[capital I]"),
    ('l', "[lower l]"),
    ('|', "[vert. bar |]"),
    ('!', "[excl. mark !]"),
    ('-', "[hyphen -]"),
    ('~', "[symbol tilde ~]"),
    ('_', "[underbar _]"),
    (',', "[comma ,]"),
    ('.', "[period .]"),
    (';', "[semicolon ;]"),
    (':', "[colon :]"),
    ('[', "[open bracket]"),
    (']', "[close bracket]"),
    ('{', "[open brace]"),
    ('}', "[close brace]"),
    ('<', "[less than]"),
    ('>', "[gtr. than]"),
    ('(', "[open paren]"),
    (')', "[close paren]"),
    ('"', "[dbl. quote \"]"),
    ('\'', "[single quote ']"),
    ('`', "[back quote `]"),
    ('\\', "[back slash \\]"),
    ('/', "[slash /]"),
    ('8', "[eight 8]"),
    ('&', "[ampersand &]"),
    ('%', "[percent %]"),
    ('@', "[at mark @]"),
    ('$', "[dollar $]"),
    ('*', "[asterisk *]"),
    ('#', "[number mark #]"),
    ('+', "[plus +]"),
    ('=', "[equals =]"),
    ('^', "[circumflex ^]"),
];

fn annotation(c: char) -> Option<&'static str> {
    ANNOTATIONS
        .iter()
        .find(|(ch, _)| *ch == c)
        .map(|(_, hint)| *hint)
}

/// A corpus whose elements are single characters, kept in insertion order.
#[derive(Debug, Clone)]
pub struct CharacterSet {
    name: String,
    entries: Vec<WordTuple>,
}

impl CharacterSet {
    /// Characters hinted by themselves. Repeated characters are kept once.
    pub fn new(name: impl Into<String>, chars: &str) -> Self {
        Self::build(name.into(), chars.chars().map(|c| (c, c.to_string())))
    }

    /// Characters hinted with the builtin annotation table where one exists.
    pub fn annotated(name: impl Into<String>, chars: &str) -> Self {
        Self::build(
            name.into(),
            chars.chars().map(|c| {
                let hint = annotation(c).map_or_else(|| c.to_string(), str::to_owned);
                (c, hint)
            }),
        )
    }

    /// Build from explicit (word, hint) pairs; each word must be one character.
    pub fn from_entries(name: impl Into<String>, entries: Vec<WordTuple>) -> Result<Self> {
        let name = name.into();
        let mut pairs = Vec::with_capacity(entries.len());
        for entry in entries {
            let mut chars = entry.word.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => pairs.push((c, entry.hint)),
                _ => {
                    return Err(PassphraseError::Format(format!(
                        "character set {} has a non-character element {:?}",
                        name, entry.word
                    )))
                }
            }
        }
        Ok(Self::build(name, pairs.into_iter()))
    }

    fn build(name: String, pairs: impl Iterator<Item = (char, String)>) -> Self {
        let mut seen = HashSet::new();
        let entries = pairs
            .filter(|(c, _)| seen.insert(*c))
            .map(|(c, hint)| WordTuple::new(c.to_string(), hint))
            .collect();
        Self { name, entries }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&WordTuple> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[WordTuple] {
        &self.entries
    }
}

/// Resolve a builtin character class by short code or long name.
pub fn builtin(code: &str) -> Option<CharacterSet> {
    let alnum = format!("{}{}{}", DIGITS, LOWER, UPPER);
    let set = match code {
        "d" | "digit" => CharacterSet::new(code, DIGITS),
        "l" | "lower" => CharacterSet::new(code, LOWER),
        "upper" => CharacterSet::new(code, UPPER),
        "a" => CharacterSet::annotated(code, &format!("{}{}", DIGITS, LOWER)),
        "A" | "alnum" => CharacterSet::annotated(code, &alnum),
        "x" | "xdigit" => CharacterSet::new(code, HEXADECIMAL),
        "X" => CharacterSet::new(code, UPPER_HEXADECIMAL),
        "B" => CharacterSet::annotated(code, &format!("{}+/", alnum)),
        "b" => CharacterSet::annotated(code, &format!("{}-_", alnum)),
        "s" => {
            let symbols: String = (33u8..127).map(char::from).collect();
            CharacterSet::annotated(code, &symbols)
        }
        "base32" => CharacterSet::new(code, &format!("{}234567", LOWER)),
        "base32upper" => CharacterSet::new(code, &format!("{}234567", UPPER)),
        _ => return None,
    };
    Some(set)
}

/// Every code and name accepted by [`builtin`].
pub const BUILTIN_CODES: &[&str] = &[
    "d", "l", "a", "A", "x", "X", "B", "b", "s", "alnum", "digit", "lower", "upper", "xdigit",
    "base32", "base32upper",
];
