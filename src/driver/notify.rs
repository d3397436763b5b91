//! Driver that hands each attempt to the host as a JSON-RPC notification.
//!
//! The host page script receives an `attempt` notification on stdout and
//! performs the fill-and-submit on the live page.

use std::io::Write;

use crate::error::{ProbeError, Result};
use crate::rpc::types::{AttemptParams, JsonRpcNotification};
use crate::types::FormBindings;

use super::FormDriver;

/// Writes `attempt` notifications, one JSON object per line.
pub struct NotifyDriver<W: Write> {
    writer: W,
}

impl<W: Write> NotifyDriver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }
}

impl<W: Write> FormDriver for NotifyDriver<W> {
    fn attempt(
        &mut self,
        form: &FormBindings,
        candidate: &str,
        username: Option<&str>,
    ) -> Result<()> {
        let notification = JsonRpcNotification::new(
            "attempt",
            AttemptParams {
                candidate: candidate.to_string(),
                username: username.map(str::to_string),
                bindings: form.clone(),
            },
        );
        let json = serde_json::to_string(&notification)
            .map_err(|e| ProbeError::driver_failed(format!("could not encode attempt: {}", e)))?;

        writeln!(self.writer, "{}", json)
            .and_then(|_| self.writer.flush())
            .map_err(|e| ProbeError::driver_failed(format!("host connection lost: {}", e)))
    }
}
