//! Data structures shared between corpora, the pattern resolver and the generator.

use serde::Serialize;

/// A corpus element: the text emitted into a password and its reading hint.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct WordTuple {
    pub word: String,
    pub hint: String,
}

impl WordTuple {
    pub fn new(word: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            hint: hint.into(),
        }
    }

    /// An element whose hint is the word itself.
    pub fn plain(word: impl Into<String>) -> Self {
        let word = word.into();
        Self {
            hint: word.clone(),
            word,
        }
    }

    /// The first character of the word, used for subset ranges.
    pub fn initial(&self) -> Option<char> {
        self.word.chars().next()
    }
}

/// One emitted chunk of a generated password.
///
/// Separators carry zero entropy; sampled chunks carry their marginal
/// contribution in bits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub entropy: f64,
    pub separator: bool,
    pub password: String,
    pub hint: String,
}

impl Element {
    pub fn separator(password: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            entropy: 0.0,
            separator: true,
            password: password.into(),
            hint: hint.into(),
        }
    }

    pub fn sampled(entropy: f64, password: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            entropy,
            separator: false,
            password: password.into(),
            hint: hint.into(),
        }
    }
}

/// A generated password together with its reading hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Passphrase {
    pub password: String,
    pub hint: String,
}

/// The result of one generation run.
#[derive(Debug, Clone, Serialize)]
pub struct Generation {
    pub passwords: Vec<Passphrase>,
    /// Per-password element breakdown, parallel to `passwords`.
    pub elements: Vec<Vec<Element>>,
    /// Human-readable diagnostics (entropy computation, corpus loads).
    pub diag: Vec<String>,
    /// Estimated entropy of each generated password in bits.
    pub entropy: f64,
}

/// Strategy for loading packed corpus files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Memory-map the file (zero-copy).
    #[default]
    Mmap,
    /// Read the whole file into an owned buffer.
    Owned,
}
