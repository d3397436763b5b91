//! Uploaded wordlist with a forward-only cursor.
//!
//! Entries keep file order and their original surrounding whitespace;
//! trimming happens when an entry is taken. The cursor only moves forward
//! and is reset by loading a new list.

use sha2::{Digest, Sha256};
use std::path::Path;

use crate::error::{ErrorCode, ProbeError, Result};

/// Ordered wordlist and its cursor.
#[derive(Debug, Clone, Default)]
pub struct Wordlist {
    entries: Vec<String>,
    index: usize,
}

impl Wordlist {
    /// Creates a wordlist from raw entries, cursor at the start.
    pub fn from_entries(entries: Vec<String>) -> Self {
        Self { entries, index: 0 }
    }

    /// Splits a text blob on `\n` / `\r\n` line endings, dropping lines
    /// that are empty after trimming.
    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect();
        Self::from_entries(entries)
    }

    /// Parses an uploaded byte stream. Invalid UTF-8 is replaced, not rejected.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::parse(&String::from_utf8_lossy(bytes))
    }

    /// Reads and parses a wordlist file.
    ///
    /// Fails with WORDLIST_EMPTY when the file cannot be read or holds no
    /// usable entries.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            ProbeError::with_source(
                ErrorCode::WordlistEmpty,
                format!("Could not read wordlist {}", path.display()),
                e,
            )
        })?;
        let wordlist = Self::from_bytes(&bytes);
        if wordlist.is_empty() {
            return Err(ProbeError::wordlist_empty());
        }
        Ok(wordlist)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Index of the next entry to be taken.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns true once the cursor has passed the last entry.
    pub fn at_end(&self) -> bool {
        self.index >= self.entries.len()
    }

    /// Takes the next entry, trimmed, advancing the cursor.
    pub fn take_next(&mut self) -> Option<&str> {
        let entry = self.entries.get(self.index)?;
        self.index += 1;
        Some(entry.trim())
    }

    /// Moves the cursor back to the first entry.
    pub fn rewind(&mut self) {
        self.index = 0;
    }

    /// Places the cursor at a saved position, clamped to the list length.
    pub fn seek(&mut self, index: usize) {
        self.index = index.min(self.entries.len());
    }

    /// Fingerprint of the entries, used to match saved progress to a list.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for entry in &self.entries {
            hasher.update(entry.as_bytes());
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())
    }
}
