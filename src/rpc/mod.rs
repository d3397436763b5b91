//! JSON-RPC command interface.
//!
//! Methods:
//! - `ping`, `status`, `stats`
//! - `start`, `pause`, `resume`, `stop`, `reset`
//! - `bind`, `unbind`, `configure`, `load_wordlist`, `exclude`
//! - `report_outcome`, `clear_attempts`, `save`, `shutdown`
//!
//! Notifications:
//! - `attempt`: fill and submit the form with one candidate
//! - `run_stopped`: the run ended by request, completion or error

pub mod methods;
pub mod server;
pub mod types;

pub use server::{process_request, run_server, ServerState};
pub use types::{
    AttemptParams, JsonRpcError, JsonRpcErrorResponse, JsonRpcNotification, JsonRpcRequest,
    JsonRpcResponse, RequestId, RunStoppedParams,
};
