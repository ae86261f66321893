//! # make-password
//!
//! Generates random passwords and passphrases from compact format
//! specifiers, reporting the entropy of what it generates.
//!
//! Elements are drawn from character classes, word lists (embedded, plain
//! text, hinted or packed corpus files) and combinatorial sets that
//! guarantee a minimum number of characters from each class.
pub mod passphrase;

// Re-export the main types for convenience
pub use passphrase::{
    corpus::Corpus,
    models::{Element, Generation, Passphrase, WordTuple},
    CorpusRegistry, GeneratorConfig, PassphraseError, PasswordGenerator, Result,
};
