//! formprobe: a paced login form attempt scheduler.
//!
//! Candidates come from an uploaded wordlist first and then from an
//! exhaustive sequential enumeration over a configurable alphabet and
//! length range. A timer-driven scheduler hands each candidate to a
//! [`FormDriver`](driver::FormDriver) and supports pause, resume and stop
//! without skipping or repeating a candidate.
//!
//! # Modules
//!
//! - [`candidates`]: Alphabet, sequential enumeration, wordlist, exclusions
//! - [`scheduler`]: Run state machine, delays, timers
//! - [`driver`]: Form driver and outcome detector seams
//! - [`store`]: Session persistence
//! - [`rpc`]: JSON-RPC command server
//! - [`types`]: Settings, bindings, attempt records
//! - [`config`]: Process configuration (ProbeConfig)
//! - [`error`]: Error types and codes (ProbeError, ErrorCode)
//!
//! # Example
//!
//! ```rust,ignore
//! use formprobe::driver::RecordingDriver;
//! use formprobe::scheduler::{AttemptScheduler, ManualTimer, SchedulerContext};
//! use formprobe::types::ProbeSettings;
//!
//! let context = SchedulerContext::new(ProbeSettings::default())?;
//! let mut scheduler =
//!     AttemptScheduler::new(context, RecordingDriver::new(), ManualTimer::new(), Some(7));
//! scheduler.start();
//! while let Some(tick) = scheduler.pending() {
//!     scheduler.on_tick(tick);
//! }
//! ```

pub mod candidates;
pub mod cli;
pub mod config;
pub mod driver;
pub mod error;
pub mod rpc;
pub mod scheduler;
pub mod store;
pub mod types;

// Re-export commonly used types at crate root for convenience
pub use candidates::{Alphabet, CandidateSource, ExclusionSet, SequentialGenerator, Wordlist};
pub use config::ProbeConfig;
pub use driver::{FormDriver, Outcome, OutcomeDetector};
pub use error::{ErrorCode, ProbeError, Result};
pub use scheduler::{AttemptScheduler, SchedulerContext, SchedulerState, StopReason, Timer};
pub use store::{MemoryStore, SettingsStore};
pub use types::{FormBindings, GenerationConfig, ProbeSettings};
