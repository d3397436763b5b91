//! One-shot deferred tick timers.
//!
//! The scheduler arms a timer after every attempt and keeps the returned
//! [`TickHandle`] as its single pending tick. A fired handle that no longer
//! matches the pending one is dropped, which makes cancel-vs-fire races
//! harmless.

use std::time::Duration;

use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Identifies one armed tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TickHandle(u64);

impl TickHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// A cancellable single-shot deferred task source.
pub trait Timer {
    /// Arms a tick that fires after `delay`.
    fn arm(&mut self, delay: Duration) -> TickHandle;

    /// Cancels an armed tick. Cancelling a fired or unknown handle is a no-op.
    fn cancel(&mut self, handle: TickHandle);
}

/// Timer that never fires on its own.
///
/// Records every armed delay and cancellation; the owner delivers ticks by
/// calling the scheduler with the pending handle.
#[derive(Debug, Default)]
pub struct ManualTimer {
    next_id: u64,
    armed: Vec<(TickHandle, Duration)>,
    cancelled: Vec<TickHandle>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delay armed so far, in order.
    pub fn delays(&self) -> Vec<Duration> {
        self.armed.iter().map(|(_, d)| *d).collect()
    }

    pub fn armed_count(&self) -> usize {
        self.armed.len()
    }

    pub fn cancelled(&self) -> &[TickHandle] {
        &self.cancelled
    }
}

impl Timer for ManualTimer {
    fn arm(&mut self, delay: Duration) -> TickHandle {
        self.next_id += 1;
        let handle = TickHandle(self.next_id);
        self.armed.push((handle, delay));
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        self.cancelled.push(handle);
    }
}

/// Timer backed by tokio sleeps.
///
/// Each armed tick is a spawned task that sleeps and then sends its handle
/// over the channel. Cancelling aborts the task.
pub struct TokioTimer {
    runtime: Handle,
    sender: UnboundedSender<TickHandle>,
    next_id: u64,
    task: Option<(TickHandle, JoinHandle<()>)>,
}

impl TokioTimer {
    pub fn new(runtime: Handle, sender: UnboundedSender<TickHandle>) -> Self {
        Self {
            runtime,
            sender,
            next_id: 0,
            task: None,
        }
    }
}

impl Timer for TokioTimer {
    fn arm(&mut self, delay: Duration) -> TickHandle {
        // The scheduler keeps at most one pending tick; an older task is stale.
        if let Some((_, task)) = self.task.take() {
            task.abort();
        }

        self.next_id += 1;
        let handle = TickHandle(self.next_id);
        let sender = self.sender.clone();
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            sender.send(handle).ok();
        });
        self.task = Some((handle, task));
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        if matches!(&self.task, Some((armed, _)) if *armed == handle) {
            if let Some((_, task)) = self.task.take() {
                task.abort();
            }
        }
    }
}

impl Drop for TokioTimer {
    fn drop(&mut self) {
        if let Some((_, task)) = self.task.take() {
            task.abort();
        }
    }
}
