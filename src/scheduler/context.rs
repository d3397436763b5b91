//! All mutable session state in one owned value.
//!
//! Settings, the candidate source, the attempt log and the failed-attempt
//! list live here. The scheduler owns the context and is the only writer
//! while a run is active.

use tracing::info;

use crate::candidates::{CandidateSource, Wordlist};
use crate::driver::Outcome;
use crate::error::{ProbeError, Result};
use crate::types::{AttemptLog, ProbeSettings};

/// Owned session state.
#[derive(Debug, Clone)]
pub struct SchedulerContext {
    pub(crate) settings: ProbeSettings,
    pub(crate) source: CandidateSource,
    pub(crate) attempts: AttemptLog,
    pub(crate) failed: Vec<String>,
    pub(crate) successes: Vec<String>,
}

impl SchedulerContext {
    /// Creates a context from validated settings.
    pub fn new(settings: ProbeSettings) -> Result<Self> {
        settings.validate()?;
        let source = CandidateSource::new(settings.generation_config()?, settings.use_wordlist_first);
        Ok(Self {
            settings,
            source,
            attempts: AttemptLog::new(),
            failed: Vec::new(),
            successes: Vec::new(),
        })
    }

    pub fn settings(&self) -> &ProbeSettings {
        &self.settings
    }

    pub fn source(&self) -> &CandidateSource {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut CandidateSource {
        &mut self.source
    }

    pub fn attempts(&self) -> &AttemptLog {
        &self.attempts
    }

    /// Candidates reported as failed, in report order.
    pub fn failed(&self) -> &[String] {
        &self.failed
    }

    /// Candidates reported as successful, in report order.
    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    /// Replaces the settings.
    ///
    /// A changed alphabet or length bound restarts the sequential cursor.
    pub fn apply_settings(&mut self, settings: ProbeSettings) -> Result<()> {
        settings.validate()?;
        self.source.set_generation_config(settings.generation_config()?);
        self.source.set_use_wordlist_first(settings.use_wordlist_first);
        self.settings = settings;
        Ok(())
    }

    /// Installs a new wordlist, rewinding the candidate source.
    ///
    /// An empty list is rejected with WORDLIST_EMPTY and the current list is
    /// kept.
    pub fn load_wordlist(&mut self, wordlist: Wordlist) -> Result<usize> {
        if wordlist.is_empty() {
            return Err(ProbeError::wordlist_empty());
        }
        let count = wordlist.len();
        self.source.load_wordlist(wordlist);
        info!("Successfully loaded {} wordlist entries", count);
        Ok(count)
    }

    /// Excludes candidates. Entries are trimmed; blank entries are ignored.
    ///
    /// Returns the number of newly excluded candidates.
    pub fn exclude<I, S>(&mut self, candidates: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let exclusions = self.source.exclusions_mut();
        candidates
            .into_iter()
            .filter_map(|c| {
                let trimmed = c.as_ref().trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .filter(|c| exclusions.add(c.clone()))
            .count()
    }

    /// Records a classified outcome for a candidate.
    pub fn record_outcome(&mut self, candidate: &str, outcome: Outcome) {
        match outcome {
            Outcome::Failure => self.failed.push(candidate.to_string()),
            Outcome::Success => {
                info!("Login reported successful with password: {}", candidate);
                self.successes.push(candidate.to_string());
            }
            Outcome::Unknown => {}
        }
    }

    /// Replaces the failed-attempt list, as restored from the store.
    pub fn set_failed(&mut self, failed: Vec<String>) {
        self.failed = failed;
    }

    pub fn clear_attempts(&mut self) {
        self.attempts.clear();
    }
}
