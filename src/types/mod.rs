//! Core types for formprobe.
//!
//! - [`ProbeSettings`]: user settings persisted through the settings store
//! - [`GenerationConfig`]: validated alphabet and length bounds
//! - [`AttemptRecord`] / [`AttemptLog`]: per-attempt timing log
//! - [`FormBindings`]: the username, password and submit element descriptors

mod attempt;
mod binding;
mod settings;

pub use attempt::{AttemptLog, AttemptRecord, AttemptStats};
pub use binding::{BindingRole, ElementRef, FormBindings};
pub use settings::{
    CharsetOptions, DetectionConfig, GenerationConfig, ProbeSettings, RateConfig, UsernameConfig,
    DEFAULT_CUSTOM_CHARACTERS, MAX_CANDIDATE_LENGTH, MAX_DELAY_MS,
};
