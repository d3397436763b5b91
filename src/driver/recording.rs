//! In-process driver that records every attempt.
//!
//! Used by the preview mode, by embedders that drive the form themselves
//! after the fact, and by tests.

use std::collections::HashSet;

use crate::error::{ProbeError, Result};
use crate::types::FormBindings;

use super::FormDriver;

/// One recorded call to [`FormDriver::attempt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptCall {
    pub candidate: String,
    pub username: Option<String>,
}

/// Records attempts, optionally failing on chosen candidates.
#[derive(Debug, Clone, Default)]
pub struct RecordingDriver {
    calls: Vec<AttemptCall>,
    fail_on: HashSet<String>,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the attempt for `candidate` fail with DRIVER_FAILED.
    pub fn fail_on(mut self, candidate: impl Into<String>) -> Self {
        self.fail_on.insert(candidate.into());
        self
    }

    pub fn calls(&self) -> &[AttemptCall] {
        &self.calls
    }

    /// Candidates attempted so far, in order.
    pub fn candidates(&self) -> Vec<&str> {
        self.calls.iter().map(|c| c.candidate.as_str()).collect()
    }
}

impl FormDriver for RecordingDriver {
    fn attempt(
        &mut self,
        _form: &FormBindings,
        candidate: &str,
        username: Option<&str>,
    ) -> Result<()> {
        if self.fail_on.contains(candidate) {
            return Err(ProbeError::driver_failed(
                "password element is no longer attached to the page",
            ));
        }
        self.calls.push(AttemptCall {
            candidate: candidate.to_string(),
            username: username.map(str::to_string),
        });
        Ok(())
    }
}
