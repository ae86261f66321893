//! Core passphrase generation module

pub mod combinatorics;
pub mod config;
pub mod corpus;
pub mod format;
pub mod generator;
pub mod pattern;
pub mod registry;
pub mod types;
mod utils;

use log::info;
use rand::{CryptoRng, Rng};

pub use config::GeneratorConfig;
pub use registry::CorpusRegistry;
pub use types::error::{PassphraseError, Result};
pub use types::models;

use models::Generation;

/// Generates passwords and passphrases from format specifiers.
///
/// Holds the corpus registry, so corpora loaded by one call are reused by
/// the next.
#[derive(Debug)]
pub struct PasswordGenerator {
    registry: CorpusRegistry,
}

impl PasswordGenerator {
    /// Create a generator resolving external corpora as `config` describes.
    pub fn new(config: GeneratorConfig) -> Self {
        info!(
            "Password generator using corpus directory {}",
            config.corpus_dir.display()
        );
        Self {
            registry: CorpusRegistry::new(config),
        }
    }

    /// Wrap an existing registry, e.g. one with extra corpora registered.
    pub fn with_registry(registry: CorpusRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &CorpusRegistry {
        &self.registry
    }

    /// Generate `count` passwords formatted by `spec`.
    ///
    /// # Arguments
    /// * `spec` - Format specifier such as `-e6`, `A12` or `{l [upper] d}:64`
    /// * `count` - Number of passwords, at least one
    /// * `rng` - Cryptographically secure random source
    ///
    /// # Errors
    /// Returns an error if:
    /// - The specifier cannot be parsed
    /// - A corpus cannot be loaded or has too few candidates
    /// - Combinatorial sets overlap or cannot meet their constraints
    pub fn generate<R>(&self, spec: &str, count: usize, rng: &mut R) -> Result<Generation>
    where
        R: Rng + CryptoRng + ?Sized,
    {
        generator::generate(spec, count, &self.registry, rng)
    }
}

impl Default for PasswordGenerator {
    fn default() -> Self {
        Self::new(GeneratorConfig::from_env())
    }
}
