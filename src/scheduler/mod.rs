//! The attempt scheduler.
//!
//! A cooperative, single-threaded control loop. Each tick draws one
//! candidate, hands it to the [`FormDriver`], records the timing and arms
//! the next tick through a [`Timer`]. At most one tick is pending at any
//! time; pause and stop cancel it.

mod context;
mod delay;
mod state;
mod timer;

pub use context::SchedulerContext;
pub use delay::{next_delay, next_delay_ms};
pub use state::{SchedulerState, StopReason};
pub use timer::{ManualTimer, TickHandle, Timer, TokioTimer};

use std::time::{Duration, Instant, SystemTime};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::candidates::{Candidate, Phase, Wordlist};
use crate::driver::{FormDriver, Outcome, OutcomeDetector, Undetected};
use crate::error::{ProbeError, Result};
use crate::types::{AttemptRecord, BindingRole, ElementRef, ProbeSettings};

/// Result of delivering one tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The handle was not the pending tick (cancelled or superseded).
    Stale,
    /// The scheduler was not running; nothing was rescheduled.
    NotRunning,
    /// An attempt was made and the next tick armed after `delay`.
    Attempted { candidate: Candidate, delay: Duration },
    /// The run stopped during this tick.
    Stopped(StopReason),
}

/// Point-in-time view of the scheduler for status reporting.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub state: SchedulerState,
    pub phase: Phase,
    pub last_candidate: Option<String>,
    pub attempts: usize,
    pub wordlist_entries: usize,
    pub wordlist_index: usize,
    pub exclusions: usize,
    pub skipped: u64,
    pub failed: usize,
    pub successes: usize,
    pub pending_tick: bool,
    pub last_stop: Option<StopReason>,
}

/// Drives login attempts on a timer.
pub struct AttemptScheduler<D: FormDriver, T: Timer> {
    state: SchedulerState,
    context: SchedulerContext,
    driver: D,
    timer: T,
    detector: Box<dyn OutcomeDetector>,
    rng: ChaCha8Rng,
    pending: Option<TickHandle>,
    last_stop: Option<StopReason>,
}

impl<D: FormDriver, T: Timer> AttemptScheduler<D, T> {
    /// Creates an idle scheduler.
    ///
    /// `seed` fixes the jitter sequence; `None` seeds from entropy.
    pub fn new(context: SchedulerContext, driver: D, timer: T, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            state: SchedulerState::Idle,
            context,
            driver,
            timer,
            detector: Box::new(Undetected),
            rng,
            pending: None,
            last_stop: None,
        }
    }

    /// Replaces the outcome detector.
    pub fn with_detector(mut self, detector: impl OutcomeDetector + 'static) -> Self {
        self.detector = Box::new(detector);
        self
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn context(&self) -> &SchedulerContext {
        &self.context
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// The single pending tick, if any.
    pub fn pending(&self) -> Option<TickHandle> {
        self.pending
    }

    pub fn last_stop(&self) -> Option<&StopReason> {
        self.last_stop.as_ref()
    }

    /// Starts a run from Idle or Stopped, or resumes a paused one.
    ///
    /// Cursors are not reset: a restarted run continues where the last
    /// one left off.
    pub fn start(&mut self) -> SchedulerState {
        match self.state {
            SchedulerState::Running => {}
            SchedulerState::Paused => self.resume_run(),
            SchedulerState::Idle | SchedulerState::Stopped => {
                self.state = SchedulerState::Running;
                self.last_stop = None;
                info!("Run started.");
                self.arm(Duration::ZERO);
            }
        }
        self.state
    }

    /// Pauses a running run, cancelling the pending tick.
    pub fn pause(&mut self) -> Result<SchedulerState> {
        if self.state != SchedulerState::Running {
            return Err(ProbeError::invalid_transition("pause", self.state));
        }
        self.cancel_pending();
        self.state = SchedulerState::Paused;
        info!("Run paused.");
        Ok(self.state)
    }

    /// Resumes a paused run.
    pub fn resume(&mut self) -> Result<SchedulerState> {
        if self.state != SchedulerState::Paused {
            return Err(ProbeError::invalid_transition("resume", self.state));
        }
        self.resume_run();
        Ok(self.state)
    }

    fn resume_run(&mut self) {
        self.state = SchedulerState::Running;
        info!("Run resumed.");
        self.arm(Duration::ZERO);
    }

    /// Stops an active run. Stopping an inactive scheduler is a no-op.
    pub fn stop(&mut self) -> SchedulerState {
        if self.state.is_active() {
            self.halt(StopReason::Requested);
        }
        self.state
    }

    /// Returns a stopped scheduler to Idle and rewinds the candidate source.
    pub fn reset(&mut self) -> Result<SchedulerState> {
        if self.state.is_active() {
            return Err(ProbeError::run_active("reset"));
        }
        self.context.source.reset();
        self.state = SchedulerState::Idle;
        self.last_stop = None;
        info!("Candidate source reset.");
        Ok(self.state)
    }

    /// Delivers a fired tick.
    pub fn on_tick(&mut self, handle: TickHandle) -> TickOutcome {
        if self.pending != Some(handle) {
            return TickOutcome::Stale;
        }
        self.pending = None;

        if self.state != SchedulerState::Running {
            return TickOutcome::NotRunning;
        }

        if let Err(e) = self.check_preconditions() {
            error!("Error: {}", e);
            return self.halt(StopReason::failed(&e));
        }

        let Some(candidate) = self.context.source.next_candidate() else {
            info!("All password combinations exhausted. Stopping run.");
            return self.halt(StopReason::Completed);
        };

        let started_at = SystemTime::now();
        let clock = Instant::now();
        let username = self.context.settings.username.for_attempt();
        if let Err(e) = self.driver.attempt(
            &self.context.settings.bindings,
            &candidate.value,
            username,
        ) {
            error!("Error: {}", e);
            return self.halt(StopReason::failed(&e));
        }
        let record = AttemptRecord::new(candidate.value.clone(), started_at, clock.elapsed());

        let shown_user = match self.context.settings.username.value.as_str() {
            "" => "[No Username]",
            user => user,
        };
        info!("Attempted with: {} / {}", shown_user, candidate.value);

        let outcome = self
            .detector
            .classify(&self.context.settings.detection, &record);
        self.context.record_outcome(&candidate.value, outcome);
        self.context.attempts.push(record);

        let delay = next_delay(&self.context.settings.rate, &mut self.rng);
        self.arm(delay);
        TickOutcome::Attempted { candidate, delay }
    }

    fn check_preconditions(&self) -> Result<()> {
        let missing = self.context.settings.bindings.missing();
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|r| r.as_str()).collect();
            return Err(ProbeError::missing_binding(&names));
        }
        if self.context.settings.username.is_missing() {
            return Err(ProbeError::missing_username());
        }
        Ok(())
    }

    fn arm(&mut self, delay: Duration) {
        self.cancel_pending();
        self.pending = Some(self.timer.arm(delay));
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.timer.cancel(handle);
        }
    }

    fn halt(&mut self, reason: StopReason) -> TickOutcome {
        self.cancel_pending();
        self.state = SchedulerState::Stopped;
        match &reason {
            StopReason::Failed { .. } => warn!("Run stopped after error."),
            _ => info!("Run stopped."),
        }
        self.last_stop = Some(reason.clone());
        TickOutcome::Stopped(reason)
    }

    // Commands against the context.

    /// Replaces the settings. Rejected while a run is active.
    pub fn configure(&mut self, settings: ProbeSettings) -> Result<()> {
        if self.state.is_active() {
            return Err(ProbeError::run_active("change settings"));
        }
        self.context.apply_settings(settings)
    }

    /// Installs a new wordlist. Rejected while a run is active.
    pub fn load_wordlist(&mut self, wordlist: Wordlist) -> Result<usize> {
        if self.state.is_active() {
            return Err(ProbeError::run_active("load a wordlist"));
        }
        self.context.load_wordlist(wordlist)
    }

    /// Binds or clears a form element. Allowed at any time; an unbound
    /// element stops a running run on its next tick.
    pub fn bind(&mut self, role: BindingRole, element: Option<ElementRef>) {
        match &element {
            Some(el) => info!("Selected {} element: {}", role, el),
            None => info!("Cleared {} element", role),
        }
        self.context.settings.bindings.set(role, element);
    }

    /// Excludes candidates. Allowed at any time.
    pub fn exclude<I, S>(&mut self, candidates: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.context.exclude(candidates)
    }

    /// Records an outcome reported by the host. Never stops the run.
    pub fn report_outcome(&mut self, candidate: &str, outcome: Outcome) {
        self.context.record_outcome(candidate, outcome);
    }

    pub fn clear_attempts(&mut self) {
        self.context.clear_attempts();
    }

    pub fn status(&self) -> StatusSnapshot {
        let source = &self.context.source;
        StatusSnapshot {
            state: self.state,
            phase: source.phase(),
            last_candidate: self.context.attempts.last().map(|r| r.candidate.clone()),
            attempts: self.context.attempts.len(),
            wordlist_entries: source.wordlist().len(),
            wordlist_index: source.wordlist().index(),
            exclusions: source.exclusions().len(),
            skipped: source.skipped(),
            failed: self.context.failed.len(),
            successes: self.context.successes.len(),
            pending_tick: self.pending.is_some(),
            last_stop: self.last_stop.clone(),
        }
    }
}
