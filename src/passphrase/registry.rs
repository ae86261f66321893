//! Name resolution for corpora.
//!
//! A [`CorpusRegistry`] maps corpus names to factories for the builtin
//! character classes and embedded word lists. Any other name is looked up as
//! `<corpus_dir>/<name>.corpus`. Built corpora are cached for the lifetime
//! of the registry, so a name used twice in one pattern is loaded once.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Read;
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info};

use super::config::GeneratorConfig;
use super::corpus::charset::{self, BUILTIN_CODES};
use super::corpus::{Corpus, WordList};
use super::format::packed::PackedCorpus;
use super::format::text::{self, CorpusFormat};
use super::types::error::{PassphraseError, Result};

const ENGLISH: &str = include_str!("../../data/more_basic_english.txt");
const BASIC_ENGLISH: &str = include_str!("../../data/basic_english.txt");

/// Single-letter codes for word corpora.
const WORD_CODES: &[(&str, &str)] = &[
    ("e", "english"),
    ("E", "gutenberg10k"),
    ("j", "naist-jdic-simple"),
    ("J", "naist-jdic"),
];

/// Bytes inspected to detect a corpus file's format.
const HEAD_LEN: u64 = 64;

type Factory = Box<dyn Fn() -> Result<Corpus> + Send + Sync>;

/// Resolves corpus names to shared corpora.
pub struct CorpusRegistry {
    config: GeneratorConfig,
    factories: HashMap<String, Factory>,
    loaded: Mutex<HashMap<String, Arc<Corpus>>>,
}

impl std::fmt::Debug for CorpusRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("CorpusRegistry")
            .field("config", &self.config)
            .field("factories", &names)
            .finish_non_exhaustive()
    }
}

impl Default for CorpusRegistry {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

impl CorpusRegistry {
    /// A registry with every builtin character class and embedded word list.
    pub fn new(config: GeneratorConfig) -> Self {
        let mut registry = Self {
            config,
            factories: HashMap::new(),
            loaded: Mutex::new(HashMap::new()),
        };

        for &code in BUILTIN_CODES {
            registry.register(code, move || {
                charset::builtin(code)
                    .map(Corpus::Characters)
                    .ok_or_else(|| PassphraseError::Format(format!("unknown character set {}", code)))
            });
        }
        registry.register("english", || embedded("english", ENGLISH));
        registry.register("basicenglish", || embedded("basicenglish", BASIC_ENGLISH));

        registry
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Register (or replace) the factory for `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<Corpus> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Whether `name` resolves without touching the filesystem.
    pub fn is_builtin(&self, name: &str) -> bool {
        self.factories.contains_key(canonical_name(name))
    }

    /// Resolve `name` (a code or a corpus name) to a shared corpus.
    ///
    /// Word corpora record a "loaded N words" line in `diag` the first time
    /// they are built.
    ///
    /// # Errors
    /// Returns [`PassphraseError::CorpusLoad`] when an external corpus file
    /// is missing or malformed.
    pub fn resolve(&self, name: &str, diag: &mut Vec<String>) -> Result<Arc<Corpus>> {
        let name = canonical_name(name);
        if let Some(corpus) = self.lock_loaded()?.get(name) {
            debug!("Corpus {} served from cache", name);
            return Ok(Arc::clone(corpus));
        }

        let corpus = match self.factories.get(name) {
            Some(factory) => factory()?,
            None => self.load_file(name).map_err(|e| PassphraseError::CorpusLoad {
                name: name.to_string(),
                path: self.config.corpus_path(name),
                source: Box::new(e),
            })?,
        };

        if let Corpus::Words(words) = &corpus {
            info!("Loaded {} words of corpus as {}", words.len(), name);
            diag.push(format!("loaded {} words of corpus as {}", words.len(), name));
        }

        let corpus = Arc::new(corpus);
        let mut loaded = self.lock_loaded()?;
        Ok(Arc::clone(
            loaded.entry(name.to_string()).or_insert(corpus),
        ))
    }

    /// Load `<corpus_dir>/<name>.corpus` in whichever format its header names.
    fn load_file(&self, name: &str) -> Result<Corpus> {
        let path = self.config.corpus_path(name);
        info!("Loading corpus {} from {}", name, path.display());

        // Step 1: Refuse oversized files before reading anything
        let size = fs::metadata(&path)?.len();
        if size > self.config.max_corpus_size {
            return Err(PassphraseError::TooLarge {
                path,
                size,
                limit: self.config.max_corpus_size,
            });
        }

        // Step 2: Sniff the format from the first line
        let mut head = Vec::new();
        File::open(&path)?.take(HEAD_LEN).read_to_end(&mut head)?;
        let format = text::detect_format(&head)?;
        debug!("Corpus {} detected as {:?}", name, format);

        // Step 3: Packed files are served in place; text files are parsed whole
        let list = match format {
            CorpusFormat::Packed => WordList::from_packed(
                name,
                PackedCorpus::open(&path, self.config.load_mode, self.config.max_corpus_size)?,
            )?,
            CorpusFormat::Plain | CorpusFormat::Hinted => {
                let bytes = fs::read(&path)?;
                WordList::from_words(name, text::parse_text_corpus(&bytes, format)?)
            }
        };

        if list.is_empty() {
            return Err(PassphraseError::Domain(format!(
                "empty or bad corpus {}",
                name
            )));
        }
        Ok(Corpus::Words(list))
    }

    fn lock_loaded(&self) -> Result<MutexGuard<'_, HashMap<String, Arc<Corpus>>>> {
        self.loaded.lock().map_err(|_| PassphraseError::LockPoisoned)
    }
}

/// Whether `code` names a builtin character class or a word corpus code.
pub fn is_corpus_code(code: &str) -> bool {
    charset::builtin(code).is_some() || WORD_CODES.iter().any(|(c, _)| *c == code)
}

/// Expand single-letter word codes to corpus names.
fn canonical_name(name: &str) -> &str {
    WORD_CODES
        .iter()
        .find(|(code, _)| *code == name)
        .map_or(name, |&(_, full)| full)
}

fn embedded(name: &str, contents: &str) -> Result<Corpus> {
    let words = text::parse_text_corpus(contents.as_bytes(), CorpusFormat::Plain)?;
    Ok(Corpus::Words(WordList::from_words(name, words)))
}
