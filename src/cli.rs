//! CLI argument parser.
//!
//! The binary either serves JSON-RPC commands (`--daemon`) or previews the
//! candidates a session would try (`--preview N`).

use std::path::PathBuf;

use clap::Parser;

use crate::config::ProbeConfig;
use crate::types::{ProbeSettings, MAX_CANDIDATE_LENGTH};

/// formprobe: paced login form attempt scheduler
#[derive(Parser, Debug)]
#[command(name = "formprobe")]
#[command(about = "Paced login form attempt scheduler with wordlist and sequential candidates")]
#[command(version)]
pub struct Cli {
    /// Run in daemon mode (JSON-RPC over stdio)
    #[arg(long)]
    pub daemon: bool,

    /// Print the first N candidates the session would try, then exit
    #[arg(long, value_name = "N")]
    pub preview: Option<usize>,

    /// Exact alphabet for sequential generation (replaces the saved charset)
    #[arg(short, long)]
    pub alphabet: Option<String>,

    /// Minimum candidate length
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=MAX_CANDIDATE_LENGTH as u64))]
    pub min_length: Option<u64>,

    /// Maximum candidate length
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=MAX_CANDIDATE_LENGTH as u64))]
    pub max_length: Option<u64>,

    /// Wordlist file tried before sequential generation
    #[arg(short, long)]
    pub wordlist: Option<PathBuf>,

    /// Directory for persisted settings and lists
    #[arg(long)]
    pub store_dir: Option<PathBuf>,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Returns true if running in daemon mode.
    pub fn is_daemon_mode(&self) -> bool {
        self.daemon
    }

    /// Returns the preview count when not in daemon mode.
    pub fn preview_count(&self) -> Option<usize> {
        if self.daemon {
            None
        } else {
            self.preview
        }
    }

    /// Applies `--store-dir` to the process configuration.
    pub fn apply_to_config(&self, config: &mut ProbeConfig) {
        if let Some(dir) = &self.store_dir {
            config.store_path = Some(dir.clone());
        }
    }

    /// Applies charset and length overrides to session settings.
    ///
    /// An explicit alphabet is used verbatim: the extra character sets are
    /// switched off.
    pub fn apply_to_settings(&self, settings: &mut ProbeSettings) {
        if let Some(alphabet) = &self.alphabet {
            settings.charset.custom_characters = alphabet.clone();
            settings.charset.include_uppercase = false;
            settings.charset.include_numbers = false;
            settings.charset.include_symbols = false;
        }
        if let Some(min) = self.min_length {
            settings.min_length = min as usize;
        }
        if let Some(max) = self.max_length {
            settings.max_length = max as usize;
        }
    }
}
