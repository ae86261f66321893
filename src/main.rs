use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser};
use log::debug;
use rand::rngs::OsRng;

use make_password::passphrase::config::CORPUS_DIR_ENV;
use make_password::passphrase::models::LoadMode;
use make_password::passphrase::registry::is_corpus_code;
use make_password::{GeneratorConfig, PasswordGenerator};

const FORMAT_HELP: &str = "\
password format specifier:
    <charset><numbers> (d8, A8, x8 etc...):
      sequences of characters from predefined sets.
        d: digits  l: lowercase  a: lowercase + digits
        A: lowercase + upper + digits  x,X: hexadecimal
        B: Base64  b: Base64-FSSAFE  s: ASCII printable symbols

    <wordset><numbers> (e8, [english]8, j8):
      words selected from wordset corpora separated by spaces.
        e: Basic English words  E: English from Gutenberg project
        j, J: Japanese romanization from NAIST-JDIC
      More corpora can be added as <corpus-dir>/<name>.corpus files.

    [e^a-f]4: only words starting with a letter from a to f.

    -e8, -j8 etc.: words separated by a hyphen
      (period, comma, space, slash and \"quoted\" strings also work)

    d8a8, d8-a8, -e8-d8 etc.: concatenated specifiers.

    {l [upper] d}12, {l2 d}:64: characters from several sets, at least the
      given number (default 1) from each set.

    d:128, -e:128, d8-a:128:
      \":<bits>\" repeats the last specifier until generated passwords
      have <bits> bits of entropy.";

/// Command-line options
#[derive(Debug, Clone, Parser)]
#[command(name = "make-password", version)]
#[command(about = "Generate passphrase candidates")]
#[command(after_help = FORMAT_HELP)]
struct Config {
    /// Show additional diagnostics on stderr
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Show pronunciation hints
    #[arg(short = 'H', long)]
    hint: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Directory holding external <name>.corpus files
    #[arg(long, env = CORPUS_DIR_ENV, default_value = "corpus")]
    corpus_dir: PathBuf,

    /// Read packed corpora into memory instead of mapping them
    #[arg(long)]
    no_mmap: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Password format
    format: String,

    /// Number of generated passwords
    #[arg(default_value = "1")]
    count: usize,
}

impl Config {
    fn generator_config(&self) -> GeneratorConfig {
        let mode = if self.no_mmap {
            LoadMode::Owned
        } else {
            LoadMode::Mmap
        };
        GeneratorConfig::default()
            .with_corpus_dir(self.corpus_dir.clone())
            .with_load_mode(mode)
    }
}

/// Insert `--` before the first argument that looks like a format
/// specifier starting with a separator (`-e6`, `-[english]4`), so it is not
/// taken for an option.
fn preprocess_args(mut args: Vec<String>) -> Vec<String> {
    let mut insert_at = None;
    for (i, arg) in args.iter().enumerate().skip(1) {
        if arg == "--" {
            break;
        }
        let mut chars = arg.chars();
        if let (Some('-'), Some(c)) = (chars.next(), chars.next()) {
            if c == '[' || c == '{' || c == '"' || is_corpus_code(&c.to_string()) {
                insert_at = Some(i);
                break;
            }
        }
    }
    if let Some(i) = insert_at {
        args.insert(i, "--".to_string());
    }
    args
}

fn main() -> Result<()> {
    let config = Config::parse_from(preprocess_args(env::args().collect()));

    // Initialize logger
    let mut logger_builder = env_logger::Builder::from_default_env();
    logger_builder.filter_level(
        config
            .log_level
            .parse()
            .unwrap_or(log::LevelFilter::Warn),
    );
    if let Ok(filters) = env::var("RUST_LOG") {
        logger_builder.parse_filters(&filters);
    }
    logger_builder.init();
    debug!("{:?}", config);

    let generator = PasswordGenerator::new(config.generator_config());
    let generation = match generator.generate(&config.format, config.count, &mut OsRng) {
        Ok(generation) => generation,
        Err(e) if e.is_user_error() => {
            Config::command()
                .error(ErrorKind::ValueValidation, format!("Bad format: {}", e))
                .exit();
        }
        Err(e) => return Err(e).context("password generation failed"),
    };

    if config.json {
        println!("{}", serde_json::to_string_pretty(&generation)?);
        return Ok(());
    }

    if config.verbose > 0 {
        for line in &generation.diag {
            eprintln!("{}", line);
        }
    }
    for passphrase in &generation.passwords {
        println!("{}", passphrase.password);
        if config.hint {
            println!("# {}\n", passphrase.hint);
        }
    }
    Ok(())
}
