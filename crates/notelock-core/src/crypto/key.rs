//! Key derivation using PBKDF2-HMAC-SHA256.
//!
//! Derives the 256-bit AEAD key that seals a note from the note's PIN and a
//! per-blob random salt. The iteration count travels with each blob so it
//! can be raised later without breaking older notes.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::ZeroizeOnDrop;

use crate::error::{NoteLockError, Result};

/// Default PBKDF2 iteration count for new blobs.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Lowest iteration count accepted when deriving a key.
pub const MIN_ITERATIONS: u32 = 100_000;

/// Highest iteration count accepted when deriving a key.
pub const MAX_ITERATIONS: u32 = 10_000_000;

/// Salt length in bytes.
pub const SALT_LENGTH: usize = 16;

/// Length of derived key in bytes (32 bytes = 256 bits for AES-256-GCM).
pub const KEY_LENGTH: usize = 32;

/// A cryptographic key derived from a PIN.
///
/// Key material is zeroized from memory when dropped.
#[derive(Clone, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LENGTH],
}

impl DerivedKey {
    pub(crate) fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self { key: bytes }
    }

    /// Get a reference to the raw key bytes.
    ///
    /// # Security
    ///
    /// Avoid storing or logging this value. Use only for immediate encryption operations.
    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Derive an encryption key from a PIN.
///
/// Same PIN, salt and iteration count always produce the same key.
///
/// # Errors
///
/// Returns `NoteLockError::InvalidInput` if the PIN is empty or the
/// iteration count is outside [`MIN_ITERATIONS`]..=[`MAX_ITERATIONS`].
pub fn derive_key(pin: &str, salt: &[u8; SALT_LENGTH], iterations: u32) -> Result<DerivedKey> {
    if pin.is_empty() {
        return Err(NoteLockError::InvalidInput("PIN cannot be empty".to_string()));
    }

    if iterations < MIN_ITERATIONS {
        return Err(NoteLockError::InvalidInput(format!(
            "Iteration count must be at least {} (got {})",
            MIN_ITERATIONS, iterations
        )));
    }
    if iterations > MAX_ITERATIONS {
        return Err(NoteLockError::InvalidInput(format!(
            "Iteration count must be at most {} (got {})",
            MAX_ITERATIONS, iterations
        )));
    }

    let mut key_bytes = [0u8; KEY_LENGTH];
    pbkdf2_hmac::<Sha256>(pin.as_bytes(), salt, iterations, &mut key_bytes);

    Ok(DerivedKey::from_bytes(key_bytes))
}
