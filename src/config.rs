//! Process configuration.
//!
//! Runtime settings for the formprobe process, read from the environment
//! at startup. User settings for a probing session live in
//! [`ProbeSettings`](crate::types::ProbeSettings) and are persisted through
//! the store instead.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default tracing filter when `FORMPROBE_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Runtime configuration for the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Directory for persisted settings and lists.
    /// If None, uses the platform-specific default data location.
    pub store_path: Option<PathBuf>,

    /// Tracing filter directive, e.g. `info` or `formprobe=debug`.
    pub log_filter: String,

    /// Seed for the delay jitter RNG. None seeds from entropy.
    pub seed: Option<u64>,

    /// Save the session after every change and when a run stops.
    pub autosave: bool,
}

impl ProbeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ProbeConfig from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `FORMPROBE_STORE_PATH` - Store directory
    /// - `FORMPROBE_LOG` - Tracing filter
    /// - `FORMPROBE_SEED` - Jitter seed (u64)
    /// - `FORMPROBE_AUTOSAVE` - `true`/`false`, `1`/`0`
    ///
    /// Falls back to defaults for unset or unparsable variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("FORMPROBE_STORE_PATH") {
            config.store_path = Some(PathBuf::from(path));
        }

        if let Ok(filter) = std::env::var("FORMPROBE_LOG") {
            if !filter.trim().is_empty() {
                config.log_filter = filter;
            }
        }

        if let Ok(seed) = std::env::var("FORMPROBE_SEED") {
            if let Ok(seed) = seed.trim().parse::<u64>() {
                config.seed = Some(seed);
            }
        }

        if let Ok(autosave) = std::env::var("FORMPROBE_AUTOSAVE") {
            if let Some(autosave) = parse_bool(&autosave) {
                config.autosave = autosave;
            }
        }

        config
    }

    /// Returns the effective store path, using platform defaults if not specified.
    pub fn effective_store_path(&self) -> PathBuf {
        match &self.store_path {
            Some(path) => path.clone(),
            None => default_store_path(),
        }
    }

    /// Validates the configuration.
    ///
    /// Returns an error message if validation fails, None otherwise.
    pub fn validate(&self) -> Option<String> {
        if let Some(path) = &self.store_path {
            if path.as_os_str().is_empty() {
                return Some("store path must not be empty".to_string());
            }
            if path.is_file() {
                return Some(format!("store path {} is a file", path.display()));
            }
        }
        None
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            store_path: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            seed: None,
            autosave: true,
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Returns the platform-specific default store path.
///
/// - macOS: ~/Library/Application Support/formprobe/store
/// - Linux: ~/.local/share/formprobe/store
/// - Windows: C:\Users\<user>\AppData\Roaming\formprobe\data\store
fn default_store_path() -> PathBuf {
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "formprobe") {
        proj_dirs.data_dir().join("store")
    } else {
        PathBuf::from("./store")
    }
}
