//! CLI error types mapped to exit codes.

use std::fmt;

use notelock_core::NoteLockError;

#[derive(Debug)]
pub enum CliError {
    /// Config, notes file or note not found
    NotFound { message: String, hint: String },

    /// Wrong PIN, biometric refused, or no PIN available
    AuthFailed {
        message: String,
        hint: Option<String>,
    },

    /// Invalid user input
    InvalidInput(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, .. } => write!(f, "{}", message),
            CliError::AuthFailed { message, .. } => write!(f, "{}", message),
            CliError::InvalidInput(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    pub fn auth_failed(message: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: None,
        }
    }

    pub fn auth_failed_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    pub fn hint(&self) -> Option<&str> {
        match self {
            CliError::NotFound { hint, .. } => Some(hint),
            CliError::AuthFailed { hint, .. } => hint.as_deref(),
            CliError::InvalidInput(_) => None,
        }
    }

    pub fn exit_code(&self) -> i32 {
        use super::constants::exit_codes;
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::AuthFailed { .. } => exit_codes::AUTH_FAILED,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
        }
    }
}

/// Translate a core error into what the user should see.
pub fn describe(err: NoteLockError) -> anyhow::Error {
    let cli = match err {
        NoteLockError::IncorrectPin => CliError::auth_failed("Incorrect PIN"),
        NoteLockError::BiometricUnavailable => CliError::auth_failed_with_hint(
            "Biometric authentication is unavailable",
            "Enter your PIN instead.",
        ),
        NoteLockError::BiometricDenied => CliError::auth_failed("Biometric authentication was denied"),
        NoteLockError::PinRequired => CliError::auth_failed_with_hint(
            "This note needs its PIN",
            "Biometric approval cannot open a note whose PIN this session has not seen.",
        ),
        NoteLockError::PinNotProvisioned => CliError::auth_failed_with_hint(
            "No master PIN has been set",
            "Run `pin set` first, or set master_pin_policy = \"adopt_first\".",
        ),
        NoteLockError::NoteNotFound(id) => {
            CliError::not_found(format!("Note not found: {}", id), "Run `list` to see notes.")
        }
        NoteLockError::InvalidInput(message) => CliError::invalid_input(message),
        other => return other.into(),
    };
    cli.into()
}

/// Exit code and hint for a top-level error.
pub fn exit_status(err: &anyhow::Error) -> (i32, Option<&str>) {
    match err.downcast_ref::<CliError>() {
        Some(cli) => (cli.exit_code(), cli.hint()),
        None => (1, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::exit_codes;

    #[test]
    fn test_auth_errors_map_to_auth_exit_code() {
        let err = describe(NoteLockError::IncorrectPin);
        assert_eq!(exit_status(&err).0, exit_codes::AUTH_FAILED);

        let err = describe(NoteLockError::PinNotProvisioned);
        let (code, hint) = exit_status(&err);
        assert_eq!(code, exit_codes::AUTH_FAILED);
        assert!(hint.unwrap().contains("pin set"));
    }

    #[test]
    fn test_not_found_carries_hint() {
        let err = describe(NoteLockError::NoteNotFound(uuid::Uuid::nil()));
        let (code, hint) = exit_status(&err);
        assert_eq!(code, exit_codes::NOT_FOUND);
        assert!(hint.is_some());
    }

    #[test]
    fn test_other_errors_are_general() {
        let err = describe(NoteLockError::Storage("disk full".into()));
        assert_eq!(exit_status(&err).0, 1);
    }
}
