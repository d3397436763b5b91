//! Exhaustive odometer-style enumeration over an alphabet.
//!
//! The cursor is a vector of digit positions into the alphabet. The empty
//! cursor means "not started" and yields the first alphabet character.
//! Each step increments the rightmost digit, wrapping to zero and carrying
//! left on overflow. A carry past the leftmost digit prepends a zero digit,
//! growing the candidate by one character.
//!
//! For alphabet `ab` and lengths `1..=2` the sequence is
//! `a, b, aa, ab, ba, bb`, then exhausted.

use crate::types::GenerationConfig;

/// Sequential candidate generator.
#[derive(Debug, Clone)]
pub struct SequentialGenerator {
    config: GenerationConfig,
    digits: Vec<usize>,
    exhausted: bool,
}

impl SequentialGenerator {
    /// Creates a generator with an empty cursor.
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            config,
            digits: Vec::new(),
            exhausted: false,
        }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Replaces the generation config.
    ///
    /// The cursor is reset when the alphabet or the bounds change.
    pub fn set_config(&mut self, config: GenerationConfig) {
        if config != self.config {
            self.config = config;
            self.reset();
        }
    }

    /// Resets the cursor to "not started".
    pub fn reset(&mut self) {
        self.digits.clear();
        self.exhausted = false;
    }

    /// Returns the last yielded candidate, or `None` before the first call.
    pub fn current(&self) -> Option<String> {
        if self.digits.is_empty() || self.exhausted {
            None
        } else {
            Some(self.config.alphabet().render(&self.digits))
        }
    }

    /// Length of the current candidate (0 when not started).
    pub fn current_length(&self) -> usize {
        self.digits.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Moves the cursor onto a previously yielded candidate.
    ///
    /// Returns false, leaving the cursor untouched, when the candidate
    /// contains characters outside the alphabet or violates the bounds.
    pub fn restore(&mut self, candidate: Option<&str>, exhausted: bool) -> bool {
        if exhausted {
            self.exhausted = true;
            return true;
        }
        let Some(candidate) = candidate else {
            self.reset();
            return true;
        };
        match self.config.alphabet().parse(candidate) {
            Some(digits)
                if digits.len() >= self.config.min_length()
                    && digits.len() <= self.config.max_length() =>
            {
                self.digits = digits;
                self.exhausted = false;
                true
            }
            _ => false,
        }
    }

    /// Yields the next candidate, or `None` once every string up to
    /// `max_length` has been produced. Exhaustion is terminal until reset.
    pub fn next_candidate(&mut self) -> Option<String> {
        if self.exhausted {
            return None;
        }

        if self.digits.is_empty() {
            self.digits.push(0);
        } else if !self.increment() && self.digits.len() > self.config.max_length() {
            self.exhausted = true;
            return None;
        }

        // Every string shorter than min_length would be skipped in turn, and
        // the carry out of the longest of them is min_length zero digits.
        if self.digits.len() < self.config.min_length() {
            self.digits = vec![0; self.config.min_length()];
        }

        Some(self.config.alphabet().render(&self.digits))
    }

    /// Increments the cursor by one.
    ///
    /// Returns false when the carry ran past the leftmost digit and the
    /// cursor grew by one position.
    fn increment(&mut self) -> bool {
        let top = self.config.alphabet().len() - 1;
        for digit in self.digits.iter_mut().rev() {
            if *digit < top {
                *digit += 1;
                return true;
            }
            *digit = 0;
        }
        self.digits.insert(0, 0);
        false
    }
}

impl Iterator for SequentialGenerator {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.next_candidate()
    }
}
