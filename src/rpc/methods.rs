//! JSON-RPC method handlers.
//!
//! Each command maps onto one scheduler operation. Scheduler errors are
//! returned as application errors carrying the [`ErrorCode`] string.
//!
//! [`ErrorCode`]: crate::error::ErrorCode

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::candidates::Wordlist;
use crate::driver::{FormDriver, Outcome};
use crate::scheduler::Timer;

use super::server::ServerState;
use super::types::{
    BindParams, ConfigureParams, ExcludeParams, ExcludeResult, JsonRpcError, LoadWordlistParams,
    LoadWordlistResult, ReportOutcomeParams, SaveResult, StateResult, UnbindParams, WarningInfo,
};

type MethodResult = Result<Value, JsonRpcError>;

/// Handles a JSON-RPC method call.
pub fn handle_request<D: FormDriver, T: Timer>(
    method: &str,
    params: Value,
    state: &mut ServerState<D, T>,
) -> MethodResult {
    match method {
        "ping" => handle_ping(),
        "status" => to_result(state.scheduler.status()),
        "start" => state_result(state.scheduler.start()),
        "pause" => state_result(state.scheduler.pause()?),
        "resume" => state_result(state.scheduler.resume()?),
        "stop" => state_result(state.scheduler.stop()),
        "reset" => handle_reset(state),
        "bind" => handle_bind(params, state),
        "unbind" => handle_unbind(params, state),
        "configure" => handle_configure(params, state),
        "load_wordlist" => handle_load_wordlist(params, state),
        "exclude" => handle_exclude(params, state),
        "report_outcome" => handle_report_outcome(params, state),
        "stats" => to_result(state.scheduler.context().attempts().stats()),
        "clear_attempts" => {
            state.scheduler.clear_attempts();
            Ok(serde_json::json!({ "status": "ok" }))
        }
        "save" => handle_save(state),
        "shutdown" => handle_shutdown(state),
        _ => Err(JsonRpcError::method_not_found(method)),
    }
}

/// Handles the ping method for health checks.
fn handle_ping() -> MethodResult {
    Ok(serde_json::json!({ "status": "ok" }))
}

/// Handles the shutdown method. An active run is stopped first.
fn handle_shutdown<D: FormDriver, T: Timer>(state: &mut ServerState<D, T>) -> MethodResult {
    state.scheduler.stop();
    state.shutdown();
    Ok(serde_json::json!({ "status": "shutting_down" }))
}

/// Rewinds both cursors and saves the rewound progress.
fn handle_reset<D: FormDriver, T: Timer>(state: &mut ServerState<D, T>) -> MethodResult {
    let new_state = state.scheduler.reset()?;
    state.autosave();
    state_result(new_state)
}

fn handle_bind<D: FormDriver, T: Timer>(params: Value, state: &mut ServerState<D, T>) -> MethodResult {
    let params: BindParams = parse_params(params)?;
    state.scheduler.bind(params.role, Some(params.element));
    state.autosave();
    Ok(serde_json::json!({ "role": params.role }))
}

fn handle_unbind<D: FormDriver, T: Timer>(
    params: Value,
    state: &mut ServerState<D, T>,
) -> MethodResult {
    let params: UnbindParams = parse_params(params)?;
    state.scheduler.bind(params.role, None);
    state.autosave();
    Ok(serde_json::json!({ "role": params.role }))
}

fn handle_configure<D: FormDriver, T: Timer>(
    params: Value,
    state: &mut ServerState<D, T>,
) -> MethodResult {
    let params: ConfigureParams = parse_params(params)?;
    state.scheduler.configure(params.settings)?;
    state.autosave();
    to_result(state.scheduler.context().settings())
}

fn handle_load_wordlist<D: FormDriver, T: Timer>(
    params: Value,
    state: &mut ServerState<D, T>,
) -> MethodResult {
    let params: LoadWordlistParams = parse_params(params)?;
    let wordlist = match (params.text, params.path) {
        (Some(text), None) => Wordlist::parse(&text),
        (None, Some(path)) => Wordlist::load(&path)?,
        _ => {
            return Err(JsonRpcError::invalid_params(
                "Exactly one of 'text' or 'path' is required",
            ))
        }
    };
    let entries = state.scheduler.load_wordlist(wordlist)?;
    state.autosave();
    to_result(LoadWordlistResult { entries })
}

fn handle_exclude<D: FormDriver, T: Timer>(
    params: Value,
    state: &mut ServerState<D, T>,
) -> MethodResult {
    let params: ExcludeParams = parse_params(params)?;
    let added = state.scheduler.exclude(&params.candidates);
    let total = state.scheduler.context().source().exclusions().len();
    if added > 0 {
        state.autosave();
    }
    to_result(ExcludeResult { added, total })
}

fn handle_report_outcome<D: FormDriver, T: Timer>(
    params: Value,
    state: &mut ServerState<D, T>,
) -> MethodResult {
    let params: ReportOutcomeParams = parse_params(params)?;
    state.scheduler.report_outcome(&params.candidate, params.outcome);
    if params.outcome == Outcome::Failure {
        state.autosave();
    }
    Ok(serde_json::json!({ "outcome": params.outcome }))
}

fn handle_save<D: FormDriver, T: Timer>(state: &mut ServerState<D, T>) -> MethodResult {
    let warnings = state.save()?;
    to_result(SaveResult {
        warnings: warnings.iter().map(WarningInfo::from).collect(),
    })
}

fn parse_params<P: DeserializeOwned>(params: Value) -> Result<P, JsonRpcError> {
    serde_json::from_value(params)
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {}", e)))
}

fn to_result<R: Serialize>(result: R) -> MethodResult {
    serde_json::to_value(result)
        .map_err(|e| JsonRpcError::internal_error(format!("Could not encode result: {}", e)))
}

fn state_result(state: crate::scheduler::SchedulerState) -> MethodResult {
    to_result(StateResult { state })
}
