//! PIN validation.

use crate::error::{NoteLockError, Result};

/// Minimum PIN length in characters.
pub const MIN_PIN_LENGTH: usize = 4;

/// Validate a PIN chosen for locking a note or as the master PIN.
///
/// Only applies when a PIN is being set. PINs typed to unlock are never
/// validated, so an invalid guess fails the same way a wrong one does.
///
/// ```
/// use notelock_core::crypto::validate_pin;
///
/// assert!(validate_pin("4444").is_ok());
/// assert!(validate_pin("12").is_err());
/// ```
pub fn validate_pin(pin: &str) -> Result<()> {
    if pin.trim().is_empty() {
        return Err(NoteLockError::InvalidInput("PIN cannot be empty".to_string()));
    }

    let length = pin.chars().count();
    if length < MIN_PIN_LENGTH {
        return Err(NoteLockError::InvalidInput(format!(
            "PIN must be at least {} characters (got {})",
            MIN_PIN_LENGTH, length
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_pins() {
        assert!(validate_pin("1234").is_ok());
        assert!(validate_pin("correct horse").is_ok());
    }

    #[test]
    fn test_pin_too_short() {
        let result = validate_pin("123");
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("at least 4 characters"));
    }

    #[test]
    fn test_pin_blank() {
        assert!(validate_pin("").is_err());
        assert!(validate_pin("    ").is_err());
    }
}
