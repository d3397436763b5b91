//! Saving and restoring a session through a [`SettingsStore`].
//!
//! Each list is stored as a JSON array under its own key. A list whose
//! serialized form reaches [`MAX_LIST_BYTES`] is not stored; its key is
//! removed and a LIST_TOO_LARGE warning is returned instead.

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::SettingsStore;
use crate::candidates::{SourceProgress, Wordlist};
use crate::error::{ProbeError, Result};
use crate::scheduler::SchedulerContext;
use crate::types::ProbeSettings;

/// Size limit for one persisted list.
pub const MAX_LIST_BYTES: usize = 4000 * 1024;

/// Store keys.
pub mod keys {
    pub const SETTINGS: &str = "settings";
    pub const WORDLIST: &str = "wordlist";
    pub const EXCLUDED: &str = "excluded";
    pub const FAILED: &str = "failed";
    pub const PROGRESS: &str = "progress";
}

/// Writes settings, lists and cursor progress.
///
/// Returns the persistence warnings raised for oversized lists. Storage
/// failures are errors.
pub fn save_session(
    context: &SchedulerContext,
    store: &mut dyn SettingsStore,
) -> Result<Vec<ProbeError>> {
    let mut warnings = Vec::new();

    put_json(store, keys::SETTINGS, context.settings())?;

    let source = context.source();
    let lists: [(&str, &str, Vec<String>); 3] = [
        (keys::WORDLIST, "Common passwords", source.wordlist().entries().to_vec()),
        (keys::EXCLUDED, "Excluded passwords", source.exclusions().to_sorted_vec()),
        (keys::FAILED, "Failed passwords", context.failed().to_vec()),
    ];
    for (key, label, list) in lists {
        if let Some(warning) = put_list(store, key, label, &list)? {
            warnings.push(warning);
        }
    }

    put_json(store, keys::PROGRESS, &source.progress())?;
    debug!("Session saved with {} warning(s)", warnings.len());
    Ok(warnings)
}

/// Rebuilds a context from the store.
///
/// Missing keys fall back to defaults, and so do keys that cannot be read
/// or decoded. Saved settings that no longer validate are replaced by
/// defaults with a warning. Cursor progress is
/// applied only when it matches the restored wordlist and alphabet.
pub fn load_session(store: &dyn SettingsStore) -> Result<SchedulerContext> {
    let settings: ProbeSettings = get_json(store, keys::SETTINGS).unwrap_or_default();
    let mut context = match SchedulerContext::new(settings) {
        Ok(context) => context,
        Err(e) => {
            warn!("Saved settings rejected, using defaults: {}", e);
            SchedulerContext::new(ProbeSettings::default())?
        }
    };

    if let Some(entries) = get_json::<Vec<String>>(store, keys::WORDLIST) {
        let wordlist = Wordlist::from_entries(entries);
        if !wordlist.is_empty() {
            info!("Restored {} wordlist entries", wordlist.len());
            context.source_mut().load_wordlist(wordlist);
        }
    }

    if let Some(excluded) = get_json::<Vec<String>>(store, keys::EXCLUDED) {
        let count = context.exclude(excluded);
        info!("Restored {} excluded passwords", count);
    }

    if let Some(failed) = get_json::<Vec<String>>(store, keys::FAILED) {
        context.set_failed(failed);
    }

    if let Some(progress) = get_json::<SourceProgress>(store, keys::PROGRESS) {
        if context.source_mut().restore_progress(&progress) {
            info!("Resumed candidate progress from saved session");
        } else {
            debug!("Saved progress does not match current wordlist or alphabet");
        }
    }

    Ok(context)
}

fn put_json<T: serde::Serialize + ?Sized>(
    store: &mut dyn SettingsStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let json = serde_json::to_string(value).map_err(|e| ProbeError::storage_failed(key, e))?;
    store.set(key, &json)
}

fn put_list(
    store: &mut dyn SettingsStore,
    key: &str,
    label: &str,
    list: &[String],
) -> Result<Option<ProbeError>> {
    let json = serde_json::to_string(list).map_err(|e| ProbeError::storage_failed(key, e))?;
    if json.len() >= MAX_LIST_BYTES {
        store.remove(key)?;
        let warning = ProbeError::list_too_large(label, json.len() as f64 / 1024.0);
        warn!("{}", warning.message);
        return Ok(Some(warning));
    }
    store.set(key, &json)?;
    Ok(None)
}

/// Reads and decodes one key. A key that cannot be read or decoded is
/// logged as STORAGE_FAILED and treated as missing.
fn get_json<T: DeserializeOwned>(store: &dyn SettingsStore, key: &str) -> Option<T> {
    let json = match store.get(key) {
        Ok(json) => json?,
        Err(e) => {
            warn!("{}, ignoring saved value", e);
            return None;
        }
    };
    match serde_json::from_str(&json) {
        Ok(value) => Some(value),
        Err(e) => {
            let detail = e.to_string();
            let err = ProbeError::storage_failed(key, e);
            warn!("{} ({}), ignoring saved value", err, detail);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Outcome;
    use crate::error::ErrorCode;
    use crate::store::{FileStore, MemoryStore};
    use tempfile::TempDir;

    fn small_settings() -> ProbeSettings {
        let mut settings = ProbeSettings::default();
        settings.charset.custom_characters = "xy".to_string();
        settings.charset.include_numbers = false;
        settings.charset.include_symbols = false;
        settings.max_length = 3;
        settings.username.value = "admin".to_string();
        settings
    }

    #[test]
    fn empty_store_loads_defaults() {
        let store = MemoryStore::new();
        let context = load_session(&store).unwrap();
        assert_eq!(context.settings(), &ProbeSettings::default());
        assert!(context.source().wordlist().is_empty());
    }

    #[test]
    fn session_round_trip_restores_lists_and_cursors() {
        let mut context = SchedulerContext::new(small_settings()).unwrap();
        context
            .load_wordlist(Wordlist::parse("alpha\nbeta\ngamma"))
            .unwrap();
        context.exclude(["beta"]);
        context.record_outcome("alpha", Outcome::Failure);
        let first = context.source_mut().next_candidate().unwrap();
        assert_eq!(first.value, "alpha");

        let mut store = MemoryStore::new();
        let warnings = save_session(&context, &mut store).unwrap();
        assert!(warnings.is_empty());

        let mut restored = load_session(&store).unwrap();
        assert_eq!(restored.settings(), context.settings());
        assert_eq!(restored.failed(), &["alpha"]);
        assert!(restored.source().exclusions().contains("beta"));
        let next = restored.source_mut().next_candidate().unwrap();
        assert_eq!(next.value, "gamma");
    }

    #[test]
    fn progress_ignored_when_wordlist_changed() {
        let mut context = SchedulerContext::new(small_settings()).unwrap();
        context.load_wordlist(Wordlist::parse("one\ntwo")).unwrap();
        context.source_mut().next_candidate();

        let mut store = MemoryStore::new();
        save_session(&context, &mut store).unwrap();
        store.set(keys::WORDLIST, "[\"three\",\"four\"]").unwrap();

        let mut restored = load_session(&store).unwrap();
        let next = restored.source_mut().next_candidate().unwrap();
        assert_eq!(next.value, "three");
    }

    #[test]
    fn oversized_list_is_dropped_with_warning() {
        let mut context = SchedulerContext::new(small_settings()).unwrap();
        let big = "x".repeat(1024);
        let entries: Vec<String> = (0..4000).map(|i| format!("{}{}", big, i)).collect();
        context.load_wordlist(Wordlist::from_entries(entries)).unwrap();

        let mut store = MemoryStore::new();
        store.set(keys::WORDLIST, "[\"stale\"]").unwrap();
        let warnings = save_session(&context, &mut store).unwrap();

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, ErrorCode::ListTooLarge);
        assert!(warnings[0].message.starts_with("Common passwords list ("));
        assert_eq!(store.get(keys::WORDLIST).unwrap(), None);
        assert!(store.get(keys::EXCLUDED).unwrap().is_some());
    }

    #[test]
    fn corrupt_blob_is_skipped_and_other_keys_load() {
        let mut context = SchedulerContext::new(small_settings()).unwrap();
        context.load_wordlist(Wordlist::parse("alpha\nbeta")).unwrap();
        context.record_outcome("alpha", Outcome::Failure);
        let mut store = MemoryStore::new();
        save_session(&context, &mut store).unwrap();
        store.set(keys::EXCLUDED, "not json").unwrap();

        let restored = load_session(&store).unwrap();
        assert_eq!(restored.settings(), context.settings());
        assert_eq!(restored.source().wordlist().len(), 2);
        assert_eq!(restored.failed(), &["alpha"]);
        assert!(restored.source().exclusions().is_empty());
    }

    #[test]
    fn corrupt_settings_fall_back_to_defaults() {
        let mut store = MemoryStore::new();
        store.set(keys::SETTINGS, "{").unwrap();
        store.set(keys::FAILED, r#"["qwerty"]"#).unwrap();
        let context = load_session(&store).unwrap();
        assert_eq!(context.settings(), &ProbeSettings::default());
        assert_eq!(context.failed(), &["qwerty"]);
    }

    #[test]
    fn unreadable_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        store.set(keys::FAILED, r#"["qwerty"]"#).unwrap();
        std::fs::create_dir(dir.path().join("excluded.json")).unwrap();

        let context = load_session(&store).unwrap();
        assert_eq!(context.failed(), &["qwerty"]);
        assert!(context.source().exclusions().is_empty());
    }

    #[test]
    fn invalid_saved_settings_fall_back_to_defaults() {
        let mut store = MemoryStore::new();
        store
            .set(keys::SETTINGS, r#"{"min_length": 9, "max_length": 2}"#)
            .unwrap();
        let context = load_session(&store).unwrap();
        assert_eq!(context.settings().min_length, 1);
    }

    #[test]
    fn partial_settings_take_field_defaults() {
        let mut store = MemoryStore::new();
        store
            .set(keys::SETTINGS, r#"{"rate": {"safe_mode": true}}"#)
            .unwrap();
        let context = load_session(&store).unwrap();
        assert!(context.settings().rate.safe_mode);
        assert_eq!(context.settings().rate.fixed_delay_ms, 100.0);
        assert_eq!(context.settings().max_length, 8);
    }

    #[test]
    fn file_store_session_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut context = SchedulerContext::new(small_settings()).unwrap();
        context.exclude(["secret"]);

        let mut store = FileStore::open(dir.path()).unwrap();
        save_session(&context, &mut store).unwrap();

        let store = FileStore::open(dir.path()).unwrap();
        let restored = load_session(&store).unwrap();
        assert!(restored.source().exclusions().contains("secret"));
        assert_eq!(restored.settings().username.value, "admin");
    }
}
