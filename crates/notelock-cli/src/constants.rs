//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// 0 is success and 1 a general error; 2 is reserved by shells.
pub mod exit_codes {
    /// Config, notes file or note not found.
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Authentication failed (wrong PIN, biometric refused, too many attempts).
    pub const AUTH_FAILED: i32 = 5;
}

/// PIN attempts allowed per prompt before the request is cancelled.
pub const MAX_PIN_ATTEMPTS: usize = 3;

/// Environment variable holding the tracing filter.
pub const LOG_ENV: &str = "NOTELOCK_LOG";
