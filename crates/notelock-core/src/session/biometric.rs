//! Biometric capability collaborator.
//!
//! The platform integration is out of scope; the session manager only sees a
//! yes/no oracle that carries no key material.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

#[async_trait]
pub trait BiometricCapability: Send + Sync {
    async fn is_available(&self) -> bool;

    /// Ask the platform to verify the user. `true` means approved.
    async fn verify(&self) -> bool;
}

/// No biometric hardware.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBiometrics;

#[async_trait]
impl BiometricCapability for NoBiometrics {
    async fn is_available(&self) -> bool {
        false
    }

    async fn verify(&self) -> bool {
        false
    }
}

/// Scripted biometric oracle.
#[derive(Debug)]
pub struct StaticBiometric {
    available: bool,
    approve: AtomicBool,
    verifications: AtomicUsize,
}

impl StaticBiometric {
    pub fn approving() -> Self {
        Self::new(true, true)
    }

    pub fn denying() -> Self {
        Self::new(true, false)
    }

    pub fn unavailable() -> Self {
        Self::new(false, false)
    }

    fn new(available: bool, approve: bool) -> Self {
        Self {
            available,
            approve: AtomicBool::new(approve),
            verifications: AtomicUsize::new(0),
        }
    }

    pub fn set_approve(&self, approve: bool) {
        self.approve.store(approve, Ordering::SeqCst);
    }

    /// Number of `verify` calls seen.
    pub fn verifications(&self) -> usize {
        self.verifications.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BiometricCapability for StaticBiometric {
    async fn is_available(&self) -> bool {
        self.available
    }

    async fn verify(&self) -> bool {
        self.verifications.fetch_add(1, Ordering::SeqCst);
        self.available && self.approve.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_biometric_answers() {
        let bio = StaticBiometric::approving();
        assert!(bio.is_available().await);
        assert!(bio.verify().await);

        bio.set_approve(false);
        assert!(!bio.verify().await);
        assert_eq!(bio.verifications(), 2);

        assert!(!NoBiometrics.is_available().await);
        assert!(!StaticBiometric::unavailable().verify().await);
    }
}
