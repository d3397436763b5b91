//! Enumeration alphabet.
//!
//! An ordered set of characters. The first character is the "zero" digit
//! of the odometer; order defines enumeration priority.

use crate::types::CharsetOptions;

/// `A-Z`, appended when uppercase letters are enabled.
pub const UPPERCASE_CHAR_SET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// `0-9`, appended when numbers are enabled.
pub const NUMBERS_CHAR_SET: &str = "0123456789";

/// Symbols appended when symbols are enabled.
pub const SYMBOLS_CHAR_SET: &str = "!@#$%^&*()-_+=[]{}|;:,.<>?";

/// Ordered, duplicate-free character set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    chars: Vec<char>,
}

impl Alphabet {
    /// Creates an alphabet from a string.
    ///
    /// Repeated characters keep their first position only, so every
    /// character has exactly one successor.
    pub fn new(chars: &str) -> Self {
        let mut unique = Vec::with_capacity(chars.len());
        for c in chars.chars() {
            if !unique.contains(&c) {
                unique.push(c);
            }
        }
        Self { chars: unique }
    }

    /// Composes the alphabet from charset options:
    /// custom characters, then uppercase, numbers and symbols when enabled.
    pub fn compose(options: &CharsetOptions) -> Self {
        let mut chars = options.custom_characters.clone();
        if options.include_uppercase {
            chars.push_str(UPPERCASE_CHAR_SET);
        }
        if options.include_numbers {
            chars.push_str(NUMBERS_CHAR_SET);
        }
        if options.include_symbols {
            chars.push_str(SYMBOLS_CHAR_SET);
        }
        Self::new(&chars)
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Returns the character at a digit position.
    pub fn char_at(&self, digit: usize) -> Option<char> {
        self.chars.get(digit).copied()
    }

    /// Returns the digit position of a character.
    pub fn digit_of(&self, c: char) -> Option<usize> {
        self.chars.iter().position(|&x| x == c)
    }

    /// Renders digit positions as a string.
    pub fn render(&self, digits: &[usize]) -> String {
        digits.iter().filter_map(|&d| self.char_at(d)).collect()
    }

    /// Parses a string into digit positions.
    ///
    /// Returns `None` if any character is not part of the alphabet.
    pub fn parse(&self, s: &str) -> Option<Vec<usize>> {
        s.chars().map(|c| self.digit_of(c)).collect()
    }

    pub fn as_string(&self) -> String {
        self.chars.iter().collect()
    }
}
