//! The merged candidate stream.
//!
//! Wordlist entries come first when enabled. Once the wordlist runs out the
//! phase switches to sequential generation for the rest of the run. Excluded
//! candidates are never yielded by either phase.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::types::GenerationConfig;

use super::exclusion::ExclusionSet;
use super::sequential::SequentialGenerator;
use super::wordlist::Wordlist;

/// Which stream a candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Wordlist,
    Sequential,
}

/// A password candidate and its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub value: String,
    pub phase: Phase,
}

/// Saved cursor positions of a candidate source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceProgress {
    /// Digest of the wordlist the index refers to.
    pub wordlist_digest: String,
    pub wordlist_index: usize,
    pub wordlist_exhausted: bool,
    /// Alphabet the sequential cursor refers to.
    pub alphabet: String,
    pub sequential_candidate: Option<String>,
    pub sequential_exhausted: bool,
}

/// Produces the next password to try.
#[derive(Debug, Clone)]
pub struct CandidateSource {
    wordlist: Wordlist,
    wordlist_exhausted: bool,
    use_wordlist_first: bool,
    sequential: SequentialGenerator,
    exclusions: ExclusionSet,
    skipped: u64,
}

impl CandidateSource {
    /// Creates a source with an empty wordlist and no exclusions.
    pub fn new(config: GenerationConfig, use_wordlist_first: bool) -> Self {
        Self {
            wordlist: Wordlist::default(),
            wordlist_exhausted: false,
            use_wordlist_first,
            sequential: SequentialGenerator::new(config),
            exclusions: ExclusionSet::new(),
            skipped: 0,
        }
    }

    /// Returns the next candidate, or `None` once both phases are exhausted.
    pub fn next_candidate(&mut self) -> Option<Candidate> {
        // Wordlist entries are filtered while they are taken, so every pass
        // that reaches `continue` consumes one distinct sequential string.
        // The loop runs at most `exclusions.len()` extra times per call.
        loop {
            let candidate = match self.take_from_wordlist() {
                Some(value) => Candidate {
                    value,
                    phase: Phase::Wordlist,
                },
                None => Candidate {
                    value: self.sequential.next_candidate()?,
                    phase: Phase::Sequential,
                },
            };

            if self.exclusions.contains(&candidate.value) {
                debug!("Skipping excluded password: {}", candidate.value);
                self.skipped += 1;
                continue;
            }
            return Some(candidate);
        }
    }

    fn take_from_wordlist(&mut self) -> Option<String> {
        if !self.use_wordlist_first || self.wordlist_exhausted {
            return None;
        }

        while let Some(entry) = self.wordlist.take_next() {
            if entry.is_empty() {
                continue;
            }
            if self.exclusions.contains(entry) {
                debug!("Skipping excluded password: {}", entry);
                self.skipped += 1;
                continue;
            }
            return Some(entry.to_string());
        }

        self.wordlist_exhausted = true;
        self.sequential.reset();
        info!("All wordlist entries exhausted. Starting sequential generation.");
        None
    }

    /// The phase the next candidate will be drawn from.
    pub fn phase(&self) -> Phase {
        if self.use_wordlist_first && !self.wordlist_exhausted {
            Phase::Wordlist
        } else {
            Phase::Sequential
        }
    }

    /// Replaces the wordlist and starts over from its first entry.
    pub fn load_wordlist(&mut self, wordlist: Wordlist) {
        self.wordlist = wordlist;
        self.reset();
    }

    /// Rewinds both phases to their initial state.
    pub fn reset(&mut self) {
        self.wordlist.rewind();
        self.wordlist_exhausted = false;
        self.sequential.reset();
    }

    /// Replaces the alphabet and length bounds.
    ///
    /// The sequential cursor restarts when they differ from the current ones.
    pub fn set_generation_config(&mut self, config: GenerationConfig) {
        self.sequential.set_config(config);
    }

    pub fn generation_config(&self) -> &GenerationConfig {
        self.sequential.config()
    }

    pub fn set_use_wordlist_first(&mut self, enabled: bool) {
        self.use_wordlist_first = enabled;
    }

    pub fn use_wordlist_first(&self) -> bool {
        self.use_wordlist_first
    }

    pub fn wordlist(&self) -> &Wordlist {
        &self.wordlist
    }

    pub fn is_wordlist_exhausted(&self) -> bool {
        self.wordlist_exhausted
    }

    /// Last candidate produced by the sequential phase.
    pub fn sequential_cursor(&self) -> Option<String> {
        self.sequential.current()
    }

    pub fn exclusions(&self) -> &ExclusionSet {
        &self.exclusions
    }

    pub fn exclusions_mut(&mut self) -> &mut ExclusionSet {
        &mut self.exclusions
    }

    /// Number of candidates skipped because they were excluded.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Snapshot of both cursors.
    pub fn progress(&self) -> SourceProgress {
        SourceProgress {
            wordlist_digest: self.wordlist.digest(),
            wordlist_index: self.wordlist.index(),
            wordlist_exhausted: self.wordlist_exhausted,
            alphabet: self.sequential.config().alphabet().as_string(),
            sequential_candidate: self.sequential.current(),
            sequential_exhausted: self.sequential.is_exhausted(),
        }
    }

    /// Restores cursors from a snapshot.
    ///
    /// The wordlist cursor is restored only when the digest matches the
    /// loaded wordlist, the sequential cursor only when the alphabet matches.
    /// Returns true if anything was restored.
    pub fn restore_progress(&mut self, progress: &SourceProgress) -> bool {
        let mut restored = false;

        if progress.wordlist_digest == self.wordlist.digest() {
            self.wordlist.seek(progress.wordlist_index);
            self.wordlist_exhausted = progress.wordlist_exhausted;
            restored = true;
        }

        if progress.alphabet == self.sequential.config().alphabet().as_string()
            && self.sequential.restore(
                progress.sequential_candidate.as_deref(),
                progress.sequential_exhausted,
            )
        {
            restored = true;
        }

        restored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::Alphabet;

    fn source(chars: &str, min: usize, max: usize, wordlist_first: bool) -> CandidateSource {
        let config = GenerationConfig::new(Alphabet::new(chars), min, max).unwrap();
        CandidateSource::new(config, wordlist_first)
    }

    fn drain(source: &mut CandidateSource) -> Vec<String> {
        std::iter::from_fn(|| source.next_candidate().map(|c| c.value)).collect()
    }

    fn entries(items: &[&str]) -> Wordlist {
        Wordlist::from_entries(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn sequential_only_when_wordlist_disabled() {
        let mut src = source("ab", 1, 2, false);
        src.load_wordlist(entries(&["ignored"]));
        assert_eq!(drain(&mut src), vec!["a", "b", "aa", "ab", "ba", "bb"]);
        assert!(src.next_candidate().is_none());
    }

    #[test]
    fn wordlist_trimmed_filtered_then_sequential() {
        let mut src = source("ab", 1, 1, true);
        src.load_wordlist(entries(&["foo", " bar ", "", "foo"]));
        src.exclusions_mut().add("foo");

        let first = src.next_candidate().unwrap();
        assert_eq!(first.value, "bar");
        assert_eq!(first.phase, Phase::Wordlist);

        let second = src.next_candidate().unwrap();
        assert_eq!(second.value, "a");
        assert_eq!(second.phase, Phase::Sequential);
        assert!(src.is_wordlist_exhausted());
        assert_eq!(src.skipped(), 2);
    }

    #[test]
    fn empty_wordlist_falls_through_immediately() {
        let mut src = source("ab", 1, 1, true);
        assert_eq!(src.phase(), Phase::Wordlist);
        assert_eq!(drain(&mut src), vec!["a", "b"]);
        assert_eq!(src.phase(), Phase::Sequential);
    }

    #[test]
    fn exclusion_applies_to_both_phases() {
        let mut src = source("ab", 1, 2, true);
        src.load_wordlist(entries(&["ab", "zz", "b"]));
        for excluded in ["ab", "b", "ba"] {
            src.exclusions_mut().add(excluded);
        }

        let all = drain(&mut src);
        assert_eq!(all, vec!["zz", "a", "aa", "bb"]);
        for excluded in ["ab", "b", "ba"] {
            assert!(!all.iter().any(|c| c == excluded));
        }
    }

    #[test]
    fn all_excluded_terminates() {
        let mut src = source("ab", 1, 2, false);
        for c in ["a", "b", "aa", "ab", "ba", "bb"] {
            src.exclusions_mut().add(c);
        }
        assert!(src.next_candidate().is_none());
        assert_eq!(src.skipped(), 6);
    }

    #[test]
    fn wordlist_exhaustion_resets_sequential_cursor() {
        let mut src = source("ab", 1, 2, false);
        src.next_candidate();
        src.next_candidate();
        assert_eq!(src.sequential_cursor().as_deref(), Some("b"));

        src.set_use_wordlist_first(true);
        src.load_wordlist(entries(&["x"]));
        assert_eq!(src.next_candidate().unwrap().value, "x");
        assert_eq!(src.next_candidate().unwrap().value, "a");
    }

    #[test]
    fn progress_round_trip_continues_enumeration() {
        let mut src = source("ab", 1, 2, true);
        src.load_wordlist(entries(&["w1", "w2"]));
        src.next_candidate();
        src.next_candidate();
        src.next_candidate();
        let progress = src.progress();
        assert!(progress.wordlist_exhausted);
        assert_eq!(progress.sequential_candidate.as_deref(), Some("a"));

        let mut restored = source("ab", 1, 2, true);
        restored.load_wordlist(entries(&["w1", "w2"]));
        assert!(restored.restore_progress(&progress));
        assert_eq!(restored.next_candidate().unwrap().value, "b");
    }

    #[test]
    fn progress_for_other_wordlist_is_ignored() {
        let mut src = source("ab", 1, 2, true);
        src.load_wordlist(entries(&["w1", "w2"]));
        src.next_candidate();
        let progress = src.progress();

        let mut other = source("xy", 1, 2, true);
        other.load_wordlist(entries(&["other"]));
        assert!(!other.restore_progress(&progress));
        assert_eq!(other.next_candidate().unwrap().value, "other");
    }
}
