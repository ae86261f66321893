//! Runtime configuration for corpus lookup and loading.

use std::env;
use std::path::PathBuf;

use super::types::models::LoadMode;

/// Environment variable overriding the external corpus directory.
pub const CORPUS_DIR_ENV: &str = "MAKE_PASSWORD_CORPUS_DIR";

/// Files larger than this are refused before parsing (100 MiB).
pub const DEFAULT_MAX_CORPUS_SIZE: u64 = 104_857_600;

/// Where external corpora live and how they are read.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Directory searched for `<name>.corpus` files.
    pub corpus_dir: PathBuf,
    pub load_mode: LoadMode,
    /// Safety valve on corpus file size in bytes.
    pub max_corpus_size: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            corpus_dir: PathBuf::from("corpus"),
            load_mode: LoadMode::default(),
            max_corpus_size: DEFAULT_MAX_CORPUS_SIZE,
        }
    }
}

impl GeneratorConfig {
    /// Defaults, with the corpus directory taken from `MAKE_PASSWORD_CORPUS_DIR` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(dir) = env::var_os(CORPUS_DIR_ENV).filter(|d| !d.is_empty()) {
            config.corpus_dir = PathBuf::from(dir);
        }
        config
    }

    pub fn with_corpus_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.corpus_dir = dir.into();
        self
    }

    pub fn with_load_mode(mut self, mode: LoadMode) -> Self {
        self.load_mode = mode;
        self
    }

    /// Path of the file backing the external corpus `name`.
    pub fn corpus_path(&self, name: &str) -> PathBuf {
        self.corpus_dir.join(format!("{}.corpus", name))
    }
}
