//! Form driving and outcome detection seams.
//!
//! The scheduler never touches a page. A [`FormDriver`] performs the
//! fill-and-submit for one candidate, and an [`OutcomeDetector`] may
//! classify the attempt afterwards.

mod notify;
mod recording;

pub use notify::NotifyDriver;
pub use recording::{AttemptCall, RecordingDriver};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{AttemptRecord, DetectionConfig, FormBindings};

/// Performs one login attempt against the bound form elements.
///
/// Implementations are expected to make the password field editable, set
/// its value, notify the page of the input and change, optionally set the
/// username field, then activate the submit control.
pub trait FormDriver {
    /// Fills and submits the form with `candidate`.
    ///
    /// `username` is `Some` only when the username should be filled on
    /// this attempt. An error stops the run.
    fn attempt(&mut self, form: &FormBindings, candidate: &str, username: Option<&str>)
        -> Result<()>;
}

impl<D: FormDriver + ?Sized> FormDriver for Box<D> {
    fn attempt(
        &mut self,
        form: &FormBindings,
        candidate: &str,
        username: Option<&str>,
    ) -> Result<()> {
        (**self).attempt(form, candidate, username)
    }
}

/// Classification of a finished attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    #[default]
    Unknown,
    Success,
    Failure,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Unknown => "unknown",
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        }
    }
}

/// Classifies an attempt from the configured detection patterns.
pub trait OutcomeDetector {
    fn classify(&self, detection: &DetectionConfig, record: &AttemptRecord) -> Outcome;
}

/// Detector that never classifies. Outcomes arrive from the host instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct Undetected;

impl OutcomeDetector for Undetected {
    fn classify(&self, _detection: &DetectionConfig, _record: &AttemptRecord) -> Outcome {
        Outcome::Unknown
    }
}
