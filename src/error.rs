//! Error types for formprobe.
//!
//! Defines the error codes and the error type shared by the candidate
//! source, the scheduler, the settings store and the command server.

use std::fmt;

/// Error codes attached to every [`ProbeError`].
///
/// These codes are reported in JSON-RPC error responses and in
/// `run_stopped` notifications so hosts can react to specific conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A required form element is not bound.
    /// Trigger: username, password or submit binding missing at tick time.
    MissingBinding,

    /// A username is required but none is configured.
    /// Trigger: `require_username` set with an empty username value.
    MissingUsername,

    /// Settings failed validation.
    /// Trigger: empty alphabet, bad length bounds, speed multiplier below 1.
    InvalidConfig,

    /// The requested state change is not allowed from the current state.
    /// Trigger: pause while not running, resume while not paused.
    InvalidTransition,

    /// A configuration mutation was attempted while a run is active.
    /// Trigger: configure, load_wordlist or reset while Running or Paused.
    RunActive,

    /// The form driver could not complete an attempt.
    /// Trigger: element vanished from the page, host disconnected.
    DriverFailed,

    /// The settings store failed to read or write.
    /// Trigger: I/O error, corrupt JSON blob.
    StorageFailed,

    /// A list was too large to persist.
    /// Trigger: serialized list at or above 4000 KB.
    ListTooLarge,

    /// An uploaded wordlist contained no usable entries.
    /// Trigger: empty file or only blank lines.
    WordlistEmpty,
}

impl ErrorCode {
    /// Returns the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::MissingBinding => "MISSING_BINDING",
            ErrorCode::MissingUsername => "MISSING_USERNAME",
            ErrorCode::InvalidConfig => "INVALID_CONFIG",
            ErrorCode::InvalidTransition => "INVALID_TRANSITION",
            ErrorCode::RunActive => "RUN_ACTIVE",
            ErrorCode::DriverFailed => "DRIVER_FAILED",
            ErrorCode::StorageFailed => "STORAGE_FAILED",
            ErrorCode::ListTooLarge => "LIST_TOO_LARGE",
            ErrorCode::WordlistEmpty => "WORDLIST_EMPTY",
        }
    }

    /// Returns a human-readable description of the error.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::MissingBinding => "A required form element is not bound",
            ErrorCode::MissingUsername => "A username is required but not set",
            ErrorCode::InvalidConfig => "Settings failed validation",
            ErrorCode::InvalidTransition => "State change not allowed from the current state",
            ErrorCode::RunActive => "Configuration cannot change while a run is active",
            ErrorCode::DriverFailed => "The form driver could not complete the attempt",
            ErrorCode::StorageFailed => "The settings store failed to read or write",
            ErrorCode::ListTooLarge => "List is too large to persist (4000 KB limit)",
            ErrorCode::WordlistEmpty => "The wordlist is empty or could not be read",
        }
    }

    /// Returns a recovery hint suggesting how to resolve this error.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCode::MissingBinding => {
                "Bind the username, password and submit elements before starting"
            }
            ErrorCode::MissingUsername => {
                "Set a username in the settings or disable the require_username option"
            }
            ErrorCode::InvalidConfig => {
                "Use a non-empty character set, 1 <= min_length <= max_length \
                 and a speed multiplier of at least 1"
            }
            ErrorCode::InvalidTransition => "Check the current status before sending the command",
            ErrorCode::RunActive => "Stop the run first, then change the configuration",
            ErrorCode::DriverFailed => {
                "Re-bind the form elements on the current page and start again"
            }
            ErrorCode::StorageFailed => {
                "Check that the store directory is writable, or delete the corrupt entry"
            }
            ErrorCode::ListTooLarge => {
                "The list still works for this session but will not survive a reload"
            }
            ErrorCode::WordlistEmpty => "Upload a text file with one candidate per line",
        }
    }

    /// Returns true for codes that are reported as warnings rather than errors.
    pub fn is_warning(&self) -> bool {
        matches!(self, ErrorCode::ListTooLarge | ErrorCode::WordlistEmpty)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for formprobe operations.
#[derive(Debug)]
pub struct ProbeError {
    /// The error code identifying the type of error.
    pub code: ErrorCode,
    /// Human-readable error message with context.
    pub message: String,
    /// Optional underlying cause of the error.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProbeError {
    /// Creates a new ProbeError with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new ProbeError with an underlying cause.
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a MISSING_BINDING error naming the unbound roles.
    pub fn missing_binding(roles: &[&str]) -> Self {
        Self::new(
            ErrorCode::MissingBinding,
            format!("Missing form element binding: {}", roles.join(", ")),
        )
    }

    /// Creates a MISSING_USERNAME error.
    pub fn missing_username() -> Self {
        Self::new(
            ErrorCode::MissingUsername,
            "Username is required but not set",
        )
    }

    /// Creates an INVALID_CONFIG error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfig, reason)
    }

    /// Creates an INVALID_TRANSITION error.
    pub fn invalid_transition(action: &str, state: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::InvalidTransition,
            format!("Cannot {} while {}", action, state),
        )
    }

    /// Creates a RUN_ACTIVE error.
    pub fn run_active(action: &str) -> Self {
        Self::new(
            ErrorCode::RunActive,
            format!("Cannot {} while a run is active", action),
        )
    }

    /// Creates a DRIVER_FAILED error.
    pub fn driver_failed(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::DriverFailed,
            format!("Attempt failed: {}", reason.into()),
        )
    }

    /// Creates a STORAGE_FAILED error wrapping the underlying cause.
    pub fn storage_failed(
        key: &str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::with_source(
            ErrorCode::StorageFailed,
            format!("Storage operation failed for key '{}'", key),
            source,
        )
    }

    /// Creates a LIST_TOO_LARGE warning.
    pub fn list_too_large(list: &str, size_kb: f64) -> Self {
        Self::new(
            ErrorCode::ListTooLarge,
            format!(
                "{} list ({:.2} KB) is too large to save. It will not be persistent",
                list, size_kb
            ),
        )
    }

    /// Creates a WORDLIST_EMPTY warning.
    pub fn wordlist_empty() -> Self {
        Self::new(
            ErrorCode::WordlistEmpty,
            "The selected wordlist is empty or could not be read",
        )
    }
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}. Recovery: {}",
            self.code,
            self.message,
            self.code.recovery_hint()
        )
    }
}

impl std::error::Error for ProbeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Result type alias using ProbeError.
pub type Result<T> = std::result::Result<T, ProbeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_as_str() {
        assert_eq!(ErrorCode::MissingBinding.as_str(), "MISSING_BINDING");
        assert_eq!(ErrorCode::MissingUsername.as_str(), "MISSING_USERNAME");
        assert_eq!(ErrorCode::InvalidConfig.as_str(), "INVALID_CONFIG");
        assert_eq!(ErrorCode::InvalidTransition.as_str(), "INVALID_TRANSITION");
        assert_eq!(ErrorCode::RunActive.as_str(), "RUN_ACTIVE");
        assert_eq!(ErrorCode::DriverFailed.as_str(), "DRIVER_FAILED");
        assert_eq!(ErrorCode::StorageFailed.as_str(), "STORAGE_FAILED");
        assert_eq!(ErrorCode::ListTooLarge.as_str(), "LIST_TOO_LARGE");
        assert_eq!(ErrorCode::WordlistEmpty.as_str(), "WORDLIST_EMPTY");
    }

    #[test]
    fn only_persistence_and_parse_codes_are_warnings() {
        assert!(ErrorCode::ListTooLarge.is_warning());
        assert!(ErrorCode::WordlistEmpty.is_warning());
        assert!(!ErrorCode::MissingBinding.is_warning());
        assert!(!ErrorCode::DriverFailed.is_warning());
    }

    #[test]
    fn missing_binding_names_roles() {
        let err = ProbeError::missing_binding(&["password", "submit"]);
        assert_eq!(err.code, ErrorCode::MissingBinding);
        assert!(err.message.contains("password, submit"));
    }

    #[test]
    fn probe_error_display() {
        let err = ProbeError::list_too_large("Wordlist", 4100.5);
        let text = err.to_string();
        assert!(text.contains("LIST_TOO_LARGE"));
        assert!(text.contains("4100.50 KB"));
        assert!(text.contains("Recovery:"));
    }

    #[test]
    fn storage_error_keeps_source() {
        use std::error::Error;

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ProbeError::storage_failed("settings", io);
        assert!(err.source().is_some());
        assert!(err.message.contains("settings"));
    }
}
