//! User settings persisted through the settings store.
//!
//! Every field carries a serde default so a partially saved settings blob
//! loads with the missing values taken from [`ProbeSettings::default`].

use serde::{Deserialize, Serialize};

use crate::candidates::Alphabet;
use crate::error::{ProbeError, Result};

use super::binding::FormBindings;

/// Default custom characters: the lowercase latin alphabet.
pub const DEFAULT_CUSTOM_CHARACTERS: &str = "abcdefghijklmnopqrstuvwxyz";

/// Upper bound for every timing field, in milliseconds.
pub const MAX_DELAY_MS: f64 = u32::MAX as f64;

/// Upper bound for `min_length` and `max_length`.
pub const MAX_CANDIDATE_LENGTH: usize = 256;

/// Character set composition for sequential generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharsetOptions {
    /// Characters placed first in the alphabet, in enumeration order.
    pub custom_characters: String,
    /// Append `A-Z`.
    pub include_uppercase: bool,
    /// Append `0-9`.
    pub include_numbers: bool,
    /// Append the symbol set.
    pub include_symbols: bool,
}

impl Default for CharsetOptions {
    fn default() -> Self {
        Self {
            custom_characters: DEFAULT_CUSTOM_CHARACTERS.to_string(),
            include_uppercase: false,
            include_numbers: true,
            include_symbols: true,
        }
    }
}

impl CharsetOptions {
    /// Builds the enumeration alphabet from these options.
    pub fn alphabet(&self) -> Alphabet {
        Alphabet::compose(self)
    }
}

/// Pacing parameters for the attempt loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateConfig {
    /// Minimum delay between attempts in milliseconds.
    pub base_rate_ms: f64,
    /// Upper bound of the random jitter added to `base_rate_ms`.
    pub variance_ms: f64,
    /// Use `fixed_delay_ms` instead of base + jitter.
    pub safe_mode: bool,
    /// Delay used when `safe_mode` is enabled.
    pub fixed_delay_ms: f64,
    /// Divides every delay. 1 = normal speed, higher = faster.
    pub speed_multiplier: u32,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            base_rate_ms: 50.0,
            variance_ms: 50.0,
            safe_mode: false,
            fixed_delay_ms: 100.0,
            speed_multiplier: 1,
        }
    }
}

impl RateConfig {
    /// Validates the pacing parameters.
    ///
    /// Returns an error message if validation fails, None otherwise.
    pub fn validate(&self) -> Option<String> {
        if self.speed_multiplier < 1 {
            return Some("speed_multiplier must be >= 1".to_string());
        }
        for (name, value) in [
            ("base_rate_ms", self.base_rate_ms),
            ("variance_ms", self.variance_ms),
            ("fixed_delay_ms", self.fixed_delay_ms),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Some(format!("{} must be a non-negative number, got {}", name, value));
            }
            if value > MAX_DELAY_MS {
                return Some(format!(
                    "{} must be at most {} ms, got {}",
                    name, MAX_DELAY_MS, value
                ));
            }
        }
        None
    }
}

/// Username handling for each attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsernameConfig {
    /// A run refuses to tick without a username when set.
    pub require_username: bool,
    /// Fill the username field on every attempt.
    pub autofill_each_attempt: bool,
    /// The username to submit.
    pub value: String,
}

impl Default for UsernameConfig {
    fn default() -> Self {
        Self {
            require_username: true,
            autofill_each_attempt: true,
            value: String::new(),
        }
    }
}

impl UsernameConfig {
    /// Returns true if a required username is missing.
    pub fn is_missing(&self) -> bool {
        self.require_username && self.value.trim().is_empty()
    }

    /// Returns the username handed to the form driver, if any.
    pub fn for_attempt(&self) -> Option<&str> {
        if self.require_username && self.autofill_each_attempt {
            Some(self.value.as_str())
        } else {
            None
        }
    }
}

/// Outcome detection patterns.
///
/// Accepted and persisted so hosts can read them back; the scheduler
/// itself never matches against them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub success_url_pattern: String,
    pub failure_text_pattern: String,
    pub success_text_pattern: String,
    pub check_network_responses: bool,
    pub expected_status_code: u16,
    pub success_response_text: String,
    pub failure_response_text: String,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            success_url_pattern: String::new(),
            failure_text_pattern: String::new(),
            success_text_pattern: String::new(),
            check_network_responses: false,
            expected_status_code: 200,
            success_response_text: String::new(),
            failure_response_text: String::new(),
        }
    }
}

/// All user-facing settings of a probing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSettings {
    pub charset: CharsetOptions,
    pub min_length: usize,
    pub max_length: usize,
    pub rate: RateConfig,
    pub username: UsernameConfig,
    /// Try wordlist entries before sequential generation.
    pub use_wordlist_first: bool,
    pub detection: DetectionConfig,
    pub bindings: FormBindings,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            charset: CharsetOptions::default(),
            min_length: 1,
            max_length: 8,
            rate: RateConfig::default(),
            username: UsernameConfig::default(),
            use_wordlist_first: true,
            detection: DetectionConfig::default(),
            bindings: FormBindings::default(),
        }
    }
}

impl ProbeSettings {
    /// Builds and validates the generation config for the sequential phase.
    pub fn generation_config(&self) -> Result<GenerationConfig> {
        GenerationConfig::new(self.charset.alphabet(), self.min_length, self.max_length)
    }

    /// Validates every section of the settings.
    pub fn validate(&self) -> Result<()> {
        self.generation_config()?;
        if let Some(reason) = self.rate.validate() {
            return Err(ProbeError::invalid_config(reason));
        }
        Ok(())
    }
}

/// Alphabet and length bounds of the sequential phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    alphabet: Alphabet,
    min_length: usize,
    max_length: usize,
}

impl GenerationConfig {
    /// Creates a validated generation config.
    ///
    /// Fails on an empty alphabet, a zero minimum length, `min > max`, or a
    /// maximum above [`MAX_CANDIDATE_LENGTH`].
    pub fn new(alphabet: Alphabet, min_length: usize, max_length: usize) -> Result<Self> {
        if alphabet.is_empty() {
            return Err(ProbeError::invalid_config("character set is empty"));
        }
        if min_length == 0 {
            return Err(ProbeError::invalid_config("min_length must be >= 1"));
        }
        if max_length > MAX_CANDIDATE_LENGTH {
            return Err(ProbeError::invalid_config(format!(
                "max_length must be at most {}, got {}",
                MAX_CANDIDATE_LENGTH, max_length
            )));
        }
        if min_length > max_length {
            return Err(ProbeError::invalid_config(format!(
                "min_length ({}) must not exceed max_length ({})",
                min_length, max_length
            )));
        }
        Ok(Self {
            alphabet,
            min_length,
            max_length,
        })
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tool_defaults() {
        let settings = ProbeSettings::default();
        assert_eq!(settings.min_length, 1);
        assert_eq!(settings.max_length, 8);
        assert_eq!(settings.rate.base_rate_ms, 50.0);
        assert_eq!(settings.rate.variance_ms, 50.0);
        assert_eq!(settings.rate.fixed_delay_ms, 100.0);
        assert_eq!(settings.rate.speed_multiplier, 1);
        assert!(settings.username.require_username);
        assert!(settings.use_wordlist_first);
        assert_eq!(settings.detection.expected_status_code, 200);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn partial_blob_falls_back_to_defaults() {
        let settings: ProbeSettings =
            serde_json::from_str(r#"{"max_length": 3, "rate": {"safe_mode": true}}"#).unwrap();
        assert_eq!(settings.max_length, 3);
        assert_eq!(settings.min_length, 1);
        assert!(settings.rate.safe_mode);
        assert_eq!(settings.rate.fixed_delay_ms, 100.0);
        assert_eq!(settings.charset, CharsetOptions::default());
    }

    #[test]
    fn generation_config_validation() {
        let abc = Alphabet::new("abc");
        assert!(GenerationConfig::new(abc.clone(), 1, 3).is_ok());
        assert!(GenerationConfig::new(abc.clone(), 0, 3).is_err());
        assert!(GenerationConfig::new(abc, 4, 3).is_err());
        assert!(GenerationConfig::new(Alphabet::new(""), 1, 3).is_err());
    }

    #[test]
    fn generation_config_caps_length() {
        let abc = Alphabet::new("abc");
        assert!(GenerationConfig::new(abc.clone(), 1, MAX_CANDIDATE_LENGTH).is_ok());

        let err = GenerationConfig::new(abc.clone(), 1, MAX_CANDIDATE_LENGTH + 1).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InvalidConfig);
        assert!(GenerationConfig::new(abc, 1 << 40, 1 << 40).is_err());
    }

    #[test]
    fn rate_validation() {
        let mut rate = RateConfig::default();
        assert!(rate.validate().is_none());

        rate.speed_multiplier = 0;
        assert!(rate.validate().is_some());

        rate.speed_multiplier = 2;
        rate.variance_ms = -1.0;
        assert!(rate.validate().is_some());
    }

    #[test]
    fn rate_validation_caps_timing_fields() {
        let mut rate = RateConfig {
            fixed_delay_ms: MAX_DELAY_MS,
            ..Default::default()
        };
        assert!(rate.validate().is_none());

        rate.fixed_delay_ms = 1e300;
        assert!(rate.validate().unwrap().contains("fixed_delay_ms"));

        rate.fixed_delay_ms = 100.0;
        rate.base_rate_ms = MAX_DELAY_MS * 2.0;
        assert!(rate.validate().unwrap().contains("base_rate_ms"));
    }

    #[test]
    fn username_for_attempt_needs_both_flags() {
        let mut username = UsernameConfig {
            value: "admin".to_string(),
            ..Default::default()
        };
        assert_eq!(username.for_attempt(), Some("admin"));

        username.autofill_each_attempt = false;
        assert_eq!(username.for_attempt(), None);

        username.autofill_each_attempt = true;
        username.require_username = false;
        assert_eq!(username.for_attempt(), None);
    }

    #[test]
    fn username_missing_only_when_required() {
        let mut username = UsernameConfig {
            value: "   ".to_string(),
            ..Default::default()
        };
        assert!(username.is_missing());

        username.require_username = false;
        assert!(!username.is_missing());
    }
}
