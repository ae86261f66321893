//! Custom error types for the make-password crate.

use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum PassphraseError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The format specifier or a corpus reference cannot be used as given.
    ///
    /// Raised for bad pattern syntax, unknown corpora, overlapping
    /// combinatorial sets and subsets that leave too few candidates.
    #[error("{0}")]
    Format(String),

    /// The request is well-formed but cannot be satisfied (empty corpus,
    /// impossible combinatorial constraint).
    #[error("{0}")]
    Domain(String),

    /// Random access outside `[0, len)`.
    #[error("Index {index} out of range for corpus of {len} elements")]
    IndexOutOfRange { index: String, len: String },

    /// A field of a packed corpus header does not hold the expected value.
    #[error("bad corpus: {field} mismatch (expected {expected}, found {found})")]
    BadField {
        field: &'static str,
        expected: String,
        found: String,
    },

    /// A packed corpus section ended before its declared length.
    #[error("bad corpus: truncated {context} (expected {expected} bytes, found {found})")]
    Truncated {
        context: &'static str,
        expected: u64,
        found: u64,
    },

    /// The corpus file exceeds the configured size safety valve.
    #[error("too large corpus {}: {size} bytes exceeds the {limit} byte safety valve", path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    /// Loading a named corpus failed; wraps the underlying cause.
    #[error("unknown or bad wordlist {name} (file {}): {source}", path.display())]
    CorpusLoad {
        name: String,
        path: PathBuf,
        #[source]
        source: Box<PassphraseError>,
    },

    /// A mutex lock was poisoned, indicating a panic in another thread holding the lock.
    #[error("A mutex lock was poisoned, indicating a panic in another thread holding the lock.")]
    LockPoisoned,
}

impl PassphraseError {
    /// Whether the driving front end should report this as a user-facing
    /// "bad format" diagnostic rather than an internal failure.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            PassphraseError::Format(_)
                | PassphraseError::Domain(_)
                | PassphraseError::CorpusLoad { .. }
                | PassphraseError::IndexOutOfRange { .. }
        )
    }
}

/// A convenience `Result` type alias using the crate's `PassphraseError` type.
pub type Result<T> = std::result::Result<T, PassphraseError>;
