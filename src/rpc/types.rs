//! JSON-RPC types for the command protocol.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::driver::Outcome;
use crate::error::{ErrorCode, ProbeError};
use crate::scheduler::{SchedulerState, StopReason};
use crate::types::{BindingRole, ElementRef, FormBindings, ProbeSettings};

/// JSON-RPC version constant.
pub const JSONRPC_VERSION: &str = "2.0";

/// A JSON-RPC request ID.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RequestId {
    Integer(i64),
    String(String),
}

impl From<i64> for RequestId {
    fn from(id: i64) -> Self {
        RequestId::Integer(id)
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        RequestId::String(id)
    }
}

/// A JSON-RPC request wrapper.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub id: RequestId,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// A JSON-RPC response wrapper.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse<T: Serialize> {
    pub jsonrpc: &'static str,
    pub id: RequestId,
    pub result: T,
}

impl<T: Serialize> JsonRpcResponse<T> {
    pub fn new(id: RequestId, result: T) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result,
        }
    }
}

/// A JSON-RPC error response.
#[derive(Debug, Serialize)]
pub struct JsonRpcErrorResponse {
    pub jsonrpc: &'static str,
    pub id: Option<RequestId>,
    pub error: JsonRpcError,
}

impl JsonRpcErrorResponse {
    pub fn new(id: Option<RequestId>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            error,
        }
    }
}

/// A JSON-RPC error object.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonRpcErrorData>,
}

/// Extended error data for application errors.
#[derive(Debug, Serialize)]
pub struct JsonRpcErrorData {
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl JsonRpcError {
    /// Creates a parse error (-32700).
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self {
            code: -32700,
            message: message.into(),
            data: None,
        }
    }

    /// Creates an invalid request error (-32600).
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            code: -32600,
            message: message.into(),
            data: None,
        }
    }

    /// Creates a method not found error (-32601).
    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: format!("Method not found: {}", method),
            data: None,
        }
    }

    /// Creates an invalid params error (-32602).
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            code: -32602,
            message: message.into(),
            data: None,
        }
    }

    /// Creates an internal error (-32603).
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self {
            code: -32603,
            message: message.into(),
            data: None,
        }
    }
}

/// Application error code for an [`ErrorCode`], counting down from -32000.
pub fn application_code(code: ErrorCode) -> i32 {
    match code {
        ErrorCode::MissingBinding => -32000,
        ErrorCode::MissingUsername => -32001,
        ErrorCode::InvalidConfig => -32002,
        ErrorCode::InvalidTransition => -32003,
        ErrorCode::RunActive => -32004,
        ErrorCode::DriverFailed => -32005,
        ErrorCode::StorageFailed => -32006,
        ErrorCode::ListTooLarge => -32007,
        ErrorCode::WordlistEmpty => -32008,
    }
}

impl From<ProbeError> for JsonRpcError {
    fn from(error: ProbeError) -> Self {
        Self {
            code: application_code(error.code),
            message: error.code.description().to_string(),
            data: Some(JsonRpcErrorData {
                error_code: error.code.as_str().to_string(),
                details: Some(error.message),
            }),
        }
    }
}

// ============================================================================
// Request params
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct BindParams {
    pub role: BindingRole,
    pub element: ElementRef,
}

#[derive(Debug, Deserialize)]
pub struct UnbindParams {
    pub role: BindingRole,
}

#[derive(Debug, Deserialize)]
pub struct ConfigureParams {
    pub settings: ProbeSettings,
}

/// Wordlist source: inline text or a file path. Exactly one must be given.
#[derive(Debug, Deserialize)]
pub struct LoadWordlistParams {
    pub text: Option<String>,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct ExcludeParams {
    pub candidates: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReportOutcomeParams {
    pub candidate: String,
    pub outcome: Outcome,
}

// ============================================================================
// Results
// ============================================================================

/// Result of a lifecycle command.
#[derive(Debug, Serialize)]
pub struct StateResult {
    pub state: SchedulerState,
}

#[derive(Debug, Serialize)]
pub struct LoadWordlistResult {
    pub entries: usize,
}

#[derive(Debug, Serialize)]
pub struct ExcludeResult {
    /// Newly excluded candidates.
    pub added: usize,
    /// Size of the exclusion set afterwards.
    pub total: usize,
}

/// A non-fatal persistence warning.
#[derive(Debug, Serialize)]
pub struct WarningInfo {
    pub error_code: String,
    pub message: String,
}

impl From<&ProbeError> for WarningInfo {
    fn from(error: &ProbeError) -> Self {
        Self {
            error_code: error.code.as_str().to_string(),
            message: error.message.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SaveResult {
    pub warnings: Vec<WarningInfo>,
}

// ============================================================================
// Notifications
// ============================================================================

/// A JSON-RPC notification (no id field).
#[derive(Debug, Serialize)]
pub struct JsonRpcNotification<T: Serialize> {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: T,
}

impl<T: Serialize> JsonRpcNotification<T> {
    pub fn new(method: &'static str, params: T) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            method,
            params,
        }
    }
}

/// Sent for every attempt; the host fills and submits the form.
#[derive(Debug, Serialize)]
pub struct AttemptParams {
    pub candidate: String,
    /// Username to fill, or null to leave the field alone.
    pub username: Option<String>,
    pub bindings: FormBindings,
}

/// Sent when a run stops for any reason.
#[derive(Debug, Serialize)]
pub struct RunStoppedParams {
    pub reason: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    pub message: String,
}

impl From<&StopReason> for RunStoppedParams {
    fn from(reason: &StopReason) -> Self {
        match reason {
            StopReason::Requested => Self {
                reason: reason.as_str(),
                error_code: None,
                message: "Stopped by request".to_string(),
            },
            StopReason::Completed => Self {
                reason: reason.as_str(),
                error_code: None,
                message: "All password combinations exhausted".to_string(),
            },
            StopReason::Failed {
                error_code,
                message,
            } => Self {
                reason: reason.as_str(),
                error_code: Some(error_code.as_str().to_string()),
                message: message.clone(),
            },
        }
    }
}
