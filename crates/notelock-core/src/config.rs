//! Runtime configuration for the session manager and cipher engine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::crypto::{Pbkdf2AesGcm, DEFAULT_ITERATIONS};
use crate::error::Result;

/// Default session window and auto-lock delay.
pub const DEFAULT_SESSION_DURATION: Duration = Duration::from_secs(2 * 60);

/// Longest session window a front end should offer.
pub const MAX_SESSION_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

/// How the master PIN for generic actions comes into existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MasterPinPolicy {
    /// The first PIN submitted for a generic action becomes the master.
    #[default]
    AdoptFirst,
    /// A master PIN must be provisioned explicitly before any generic action.
    RequireProvisioned,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long a successful authentication stays valid; also the auto-lock delay.
    pub session_duration: Duration,
    pub master_pin_policy: MasterPinPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_duration: DEFAULT_SESSION_DURATION,
            master_pin_policy: MasterPinPolicy::default(),
        }
    }
}

impl SessionConfig {
    pub fn with_session_duration(mut self, duration: Duration) -> Self {
        self.session_duration = duration;
        self
    }

    pub fn with_master_pin_policy(mut self, policy: MasterPinPolicy) -> Self {
        self.master_pin_policy = policy;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherConfig {
    pub iterations: u32,
}

impl Default for CipherConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl CipherConfig {
    /// Build the production engine for this configuration.
    pub fn build(&self) -> Result<Pbkdf2AesGcm> {
        Pbkdf2AesGcm::new(self.iterations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let session = SessionConfig::default();
        assert_eq!(session.session_duration, Duration::from_secs(120));
        assert_eq!(session.master_pin_policy, MasterPinPolicy::AdoptFirst);
        assert_eq!(CipherConfig::default().build().unwrap().iterations(), 100_000);
    }

    #[test]
    fn test_policy_serde_names() {
        let policy: MasterPinPolicy = serde_json::from_str("\"require_provisioned\"").unwrap();
        assert_eq!(policy, MasterPinPolicy::RequireProvisioned);
    }

    #[test]
    fn test_low_iteration_config_rejected() {
        assert!(CipherConfig { iterations: 5 }.build().is_err());
    }
}
