//! JSON-RPC server over stdin/stdout.
//!
//! Requests arrive one per line on stdin. Responses and notifications are
//! written one per line to stdout; logs go to stderr. Timer ticks and
//! requests are multiplexed on a single task, so the scheduler is never
//! touched concurrently.

use std::io::{self, Write};

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::config::ProbeConfig;
use crate::driver::{FormDriver, NotifyDriver};
use crate::error::{ProbeError, Result};
use crate::scheduler::{
    AttemptScheduler, SchedulerState, TickHandle, TickOutcome, Timer, TokioTimer,
};
use crate::store::{load_session, save_session, FileStore, SettingsStore};

use super::methods::handle_request;
use super::types::{
    JsonRpcError, JsonRpcErrorResponse, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse,
    RunStoppedParams,
};

/// State shared across all request handlers.
pub struct ServerState<D: FormDriver, T: Timer> {
    /// The attempt scheduler and its session.
    pub scheduler: AttemptScheduler<D, T>,
    /// Process configuration.
    pub config: ProbeConfig,
    store: Box<dyn SettingsStore>,
    /// Serialized notifications waiting to be written.
    events: Vec<String>,
    shutdown: bool,
}

impl<D: FormDriver, T: Timer> ServerState<D, T> {
    pub fn new(
        scheduler: AttemptScheduler<D, T>,
        store: Box<dyn SettingsStore>,
        config: ProbeConfig,
    ) -> Self {
        Self {
            scheduler,
            config,
            store,
            events: Vec::new(),
            shutdown: false,
        }
    }

    /// Signals the server to shut down.
    pub fn shutdown(&mut self) {
        self.shutdown = true;
    }

    /// Returns true if shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown
    }

    pub fn store(&self) -> &dyn SettingsStore {
        self.store.as_ref()
    }

    /// Saves the session, returning persistence warnings.
    pub fn save(&mut self) -> Result<Vec<ProbeError>> {
        save_session(self.scheduler.context(), self.store.as_mut())
    }

    /// Saves the session if autosave is enabled. Failures are logged.
    pub fn autosave(&mut self) {
        if !self.config.autosave {
            return;
        }
        if let Err(e) = self.save() {
            warn!("Autosave failed: {}", e);
        }
    }

    /// Queues a notification for the host.
    pub fn notify<P: Serialize>(&mut self, method: &'static str, params: P) {
        match serde_json::to_string(&JsonRpcNotification::new(method, params)) {
            Ok(json) => self.events.push(json),
            Err(e) => error!("Could not encode {} notification: {}", method, e),
        }
    }

    /// Takes the queued notifications.
    pub fn drain_events(&mut self) -> Vec<String> {
        std::mem::take(&mut self.events)
    }

    /// Delivers a fired timer tick to the scheduler.
    pub fn deliver_tick(&mut self, handle: TickHandle) -> TickOutcome {
        let before = self.scheduler.state();
        let outcome = self.scheduler.on_tick(handle);
        self.observe(before);
        outcome
    }

    /// Stops any active run and saves the session, whatever the autosave
    /// setting.
    pub fn finish(&mut self) -> Result<()> {
        let before = self.scheduler.state();
        self.scheduler.stop();
        self.observe(before);
        self.save()?;
        Ok(())
    }

    /// Emits `run_stopped` and autosaves when a run has just ended.
    pub(crate) fn observe(&mut self, before: SchedulerState) {
        if !before.is_active() || self.scheduler.state() != SchedulerState::Stopped {
            return;
        }
        if let Some(reason) = self.scheduler.last_stop() {
            let params = RunStoppedParams::from(reason);
            self.notify("run_stopped", params);
        }
        self.autosave();
    }
}

/// Runs the JSON-RPC server, reading from stdin and writing to stdout.
///
/// The session is restored from the store at startup and saved when the
/// server exits.
pub async fn run_server(config: ProbeConfig) -> Result<()> {
    let store = FileStore::open(config.effective_store_path())?;
    let context = load_session(&store)?;
    info!("Using store at {}", store.dir().display());

    let (tick_tx, mut tick_rx) = mpsc::unbounded_channel();
    let timer = TokioTimer::new(Handle::current(), tick_tx);
    let driver = NotifyDriver::new(io::stdout());
    let scheduler = AttemptScheduler::new(context, driver, timer, config.seed);
    let mut state = ServerState::new(scheduler, Box::new(store), config);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = io::stdout();

    info!("JSON-RPC server started, waiting for requests...");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(l)) => l,
                    Ok(None) => break,
                    Err(e) => {
                        error!("Error reading stdin: {}", e);
                        break;
                    }
                };

                if line.trim().is_empty() {
                    continue;
                }

                if let Some(response) = process_request(&line, &mut state) {
                    writeln!(stdout, "{}", response).ok();
                }
            }
            Some(handle) = tick_rx.recv() => {
                state.deliver_tick(handle);
            }
        }

        write_events(&mut stdout, &mut state);

        if state.is_shutdown() {
            info!("Server shutdown requested");
            break;
        }
    }

    let finished = state.finish();
    write_events(&mut stdout, &mut state);
    finished?;

    info!("JSON-RPC server stopped");
    Ok(())
}

fn write_events<D: FormDriver, T: Timer>(stdout: &mut io::Stdout, state: &mut ServerState<D, T>) {
    for event in state.drain_events() {
        writeln!(stdout, "{}", event).ok();
    }
    stdout.flush().ok();
}

/// Processes a single JSON-RPC request line.
pub fn process_request<D: FormDriver, T: Timer>(
    line: &str,
    state: &mut ServerState<D, T>,
) -> Option<String> {
    let request: JsonRpcRequest = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            let error = JsonRpcErrorResponse::new(
                None,
                JsonRpcError::parse_error(format!("Invalid JSON: {}", e)),
            );
            return Some(serde_json::to_string(&error).unwrap_or_default());
        }
    };

    if request.jsonrpc != "2.0" {
        let error = JsonRpcErrorResponse::new(
            Some(request.id),
            JsonRpcError::invalid_request("Invalid JSON-RPC version (expected 2.0)"),
        );
        return Some(serde_json::to_string(&error).unwrap_or_default());
    }

    let before = state.scheduler.state();
    let result = handle_request(&request.method, request.params, state);
    state.observe(before);

    let encoded = match result {
        Ok(value) => serde_json::to_string(&JsonRpcResponse::new(request.id, value)),
        Err(error) => serde_json::to_string(&JsonRpcErrorResponse::new(Some(request.id), error)),
    };
    Some(encoded.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::RecordingDriver;
    use crate::scheduler::{ManualTimer, SchedulerContext};
    use crate::store::{keys, MemoryStore};
    use crate::types::ProbeSettings;

    fn test_state() -> ServerState<RecordingDriver, ManualTimer> {
        let context = SchedulerContext::new(ProbeSettings::default()).unwrap();
        let scheduler =
            AttemptScheduler::new(context, RecordingDriver::new(), ManualTimer::new(), Some(1));
        ServerState::new(scheduler, Box::new(MemoryStore::new()), ProbeConfig::default())
    }

    fn call(state: &mut ServerState<RecordingDriver, ManualTimer>, line: &str) -> serde_json::Value {
        let response = process_request(line, state).unwrap();
        serde_json::from_str(&response).unwrap()
    }

    #[test]
    fn server_state_shutdown() {
        let mut state = test_state();
        assert!(!state.is_shutdown());
        state.shutdown();
        assert!(state.is_shutdown());
    }

    #[test]
    fn process_invalid_json() {
        let mut state = test_state();
        let response = call(&mut state, "not json");
        assert_eq!(response["error"]["code"], -32700);
        assert!(response["id"].is_null());
    }

    #[test]
    fn process_invalid_version() {
        let mut state = test_state();
        let response = call(&mut state, r#"{"jsonrpc":"1.0","method":"ping","id":1}"#);
        assert_eq!(response["error"]["code"], -32600);
    }

    #[test]
    fn process_unknown_method() {
        let mut state = test_state();
        let response = call(&mut state, r#"{"jsonrpc":"2.0","method":"unknown","id":"x"}"#);
        assert_eq!(response["error"]["code"], -32601);
        assert_eq!(response["id"], "x");
    }

    #[test]
    fn process_ping() {
        let mut state = test_state();
        let response = call(&mut state, r#"{"jsonrpc":"2.0","method":"ping","id":7}"#);
        assert_eq!(response["result"]["status"], "ok");
        assert_eq!(response["id"], 7);
    }

    #[test]
    fn failed_tick_emits_run_stopped_and_saves() {
        let mut state = test_state();
        call(&mut state, r#"{"jsonrpc":"2.0","method":"start","id":1}"#);
        assert!(state.drain_events().is_empty());

        let handle = state.scheduler.pending().unwrap();
        state.deliver_tick(handle);

        let events = state.drain_events();
        assert_eq!(events.len(), 1);
        let event: serde_json::Value = serde_json::from_str(&events[0]).unwrap();
        assert_eq!(event["method"], "run_stopped");
        assert_eq!(event["params"]["reason"], "failed");
        assert_eq!(event["params"]["error_code"], "MISSING_BINDING");
        assert!(state.store().get(keys::PROGRESS).unwrap().is_some());
    }

    #[test]
    fn stop_command_emits_run_stopped_once() {
        let mut state = test_state();
        call(&mut state, r#"{"jsonrpc":"2.0","method":"start","id":1}"#);
        call(&mut state, r#"{"jsonrpc":"2.0","method":"stop","id":2}"#);
        call(&mut state, r#"{"jsonrpc":"2.0","method":"stop","id":3}"#);

        let events = state.drain_events();
        assert_eq!(events.len(), 1);
        assert!(events[0].contains("\"requested\""));
    }

    #[test]
    fn autosave_disabled_leaves_store_empty() {
        let mut state = test_state();
        state.config.autosave = false;
        call(&mut state, r#"{"jsonrpc":"2.0","method":"start","id":1}"#);
        call(&mut state, r#"{"jsonrpc":"2.0","method":"stop","id":2}"#);
        assert!(state.store().get(keys::SETTINGS).unwrap().is_none());
    }

    #[test]
    fn finish_saves_changes_that_skipped_autosave() {
        let mut state = test_state();
        call(&mut state, r#"{"jsonrpc":"2.0","method":"save","id":1}"#);
        state.scheduler.exclude(["hunter2"]);
        call(&mut state, r#"{"jsonrpc":"2.0","method":"start","id":2}"#);

        state.finish().unwrap();

        assert_eq!(state.scheduler.state(), SchedulerState::Stopped);
        let events = state.drain_events();
        assert_eq!(events.len(), 1);
        assert!(events[0].contains("run_stopped"));
        let excluded = state.store().get(keys::EXCLUDED).unwrap().unwrap();
        assert_eq!(excluded, r#"["hunter2"]"#);
    }

    #[test]
    fn finish_saves_when_idle() {
        let mut state = test_state();
        call(&mut state, r#"{"jsonrpc":"2.0","method":"save","id":1}"#);
        state.scheduler.exclude(["letmein"]);

        state.finish().unwrap();

        assert!(state.drain_events().is_empty());
        let excluded = state.store().get(keys::EXCLUDED).unwrap().unwrap();
        assert_eq!(excluded, r#"["letmein"]"#);
    }

    #[test]
    fn finish_saves_with_autosave_disabled() {
        let mut state = test_state();
        state.config.autosave = false;
        state.finish().unwrap();
        assert!(state.store().get(keys::SETTINGS).unwrap().is_some());
        assert!(state.drain_events().is_empty());
    }
}
