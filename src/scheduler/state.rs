//! Scheduler run state.
//!
//! ```text
//! Idle ──start──▶ Running ◀──resume── Paused
//!                  │   └────pause────▶  │
//!                  └──stop──▶ Stopped ◀─┘ stop
//! Stopped ──start──▶ Running      Stopped ──reset──▶ Idle
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, ProbeError};

/// Lifecycle state of the attempt scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    /// Nothing has run since creation or the last reset.
    #[default]
    Idle,
    /// Ticks are being scheduled.
    Running,
    /// No tick is pending; cursors are kept for resumption.
    Paused,
    /// The run ended by request, completion or error.
    Stopped,
}

impl SchedulerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchedulerState::Idle => "idle",
            SchedulerState::Running => "running",
            SchedulerState::Paused => "paused",
            SchedulerState::Stopped => "stopped",
        }
    }

    /// Returns true while a run holds the candidate cursors.
    pub fn is_active(&self) -> bool {
        matches!(self, SchedulerState::Running | SchedulerState::Paused)
    }
}

impl std::fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why the last run stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "lowercase")]
pub enum StopReason {
    /// An explicit stop command.
    Requested,
    /// Both candidate phases were exhausted.
    Completed,
    /// A configuration or driver error ended the run.
    Failed {
        #[serde(serialize_with = "serialize_code")]
        error_code: ErrorCode,
        message: String,
    },
}

impl StopReason {
    pub fn failed(error: &ProbeError) -> Self {
        StopReason::Failed {
            error_code: error.code,
            message: error.message.clone(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::Requested => "requested",
            StopReason::Completed => "completed",
            StopReason::Failed { .. } => "failed",
        }
    }
}

fn serialize_code<S>(code: &ErrorCode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(code.as_str())
}
