//! Error types for notelock core operations.
//!
//! Cryptographic and session failures are resolved at the session manager
//! boundary; the CLI layer maps these to user-facing messages.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for notelock operations.
pub type Result<T> = std::result::Result<T, NoteLockError>;

/// Core error type for notelock operations.
#[derive(Debug, Error)]
pub enum NoteLockError {
    /// Wrong PIN or corrupt blob; callers cannot tell which
    #[error("Incorrect PIN")]
    IncorrectPin,

    /// A PIN or biometric response arrived with no pending request
    #[error("No authentication request is pending")]
    NoActiveRequest,

    /// The biometric capability is not present on this device
    #[error("Biometric authentication is unavailable")]
    BiometricUnavailable,

    /// The biometric capability refused verification
    #[error("Biometric authentication was denied")]
    BiometricDenied,

    /// Biometric approval cannot open a note whose PIN is not cached
    #[error("PIN required to open this note")]
    PinRequired,

    /// No master PIN has been provisioned and implicit adoption is disabled
    #[error("No master PIN has been set")]
    PinNotProvisioned,

    /// Note not found by ID
    #[error("Note not found: {0}")]
    NoteNotFound(Uuid),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Encryption failure or malformed blob
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Storage collaborator error
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl NoteLockError {
    /// Whether the user can recover by re-prompting or switching auth method.
    ///
    /// `NoActiveRequest` is a sequencing bug in the caller and is fatal to the
    /// operation that hit it.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            NoteLockError::IncorrectPin
                | NoteLockError::BiometricUnavailable
                | NoteLockError::BiometricDenied
                | NoteLockError::PinRequired
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(NoteLockError::IncorrectPin.is_recoverable());
        assert!(NoteLockError::BiometricDenied.is_recoverable());
        assert!(NoteLockError::PinRequired.is_recoverable());
        assert!(!NoteLockError::NoActiveRequest.is_recoverable());
        assert!(!NoteLockError::Storage("disk".into()).is_recoverable());
    }

    #[test]
    fn test_incorrect_pin_message_is_generic() {
        assert_eq!(NoteLockError::IncorrectPin.to_string(), "Incorrect PIN");
    }
}
