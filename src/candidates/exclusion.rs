//! Candidates barred from being yielded.
//!
//! Exact, case-sensitive string matching. Nothing is trimmed here; callers
//! trim before adding or testing.

use std::collections::HashSet;

/// Set of excluded candidates.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    entries: HashSet<String>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the candidate is excluded.
    pub fn contains(&self, candidate: &str) -> bool {
        self.entries.contains(candidate)
    }

    /// Excludes a candidate. Returns true if it was not excluded before.
    pub fn add(&mut self, candidate: impl Into<String>) -> bool {
        self.entries.insert(candidate.into())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entries sorted, for stable persistence.
    pub fn to_sorted_vec(&self) -> Vec<String> {
        let mut entries: Vec<String> = self.entries.iter().cloned().collect();
        entries.sort();
        entries
    }
}

impl FromIterator<String> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Extend<String> for ExclusionSet {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_only() {
        let mut set = ExclusionSet::new();
        assert!(set.add("Secret"));
        assert!(!set.add("Secret"));

        assert!(set.contains("Secret"));
        assert!(!set.contains("secret"));
        assert!(!set.contains(" Secret"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn sorted_export() {
        let set: ExclusionSet = ["b", "c", "a"].iter().map(|s| s.to_string()).collect();
        assert_eq!(set.to_sorted_vec(), vec!["a", "b", "c"]);
    }
}
