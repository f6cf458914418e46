//! AES-256-GCM sealing of note content.
//!
//! Content is serialized with `serde_json`, a key is derived from the PIN with
//! PBKDF2 over a fresh salt, and the bytes are sealed under a fresh nonce.
//! A failed tag check is reported as `IncorrectPin` whatever the cause.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use serde::de::DeserializeOwned;
use serde::Serialize;
use zeroize::Zeroizing;

use super::blob::{EncryptedBlob, NONCE_LENGTH};
use super::key::{derive_key, DEFAULT_ITERATIONS, MAX_ITERATIONS, MIN_ITERATIONS, SALT_LENGTH};
use crate::error::{NoteLockError, Result};

/// Seals and opens byte payloads under a PIN.
///
/// Implementations must draw a fresh salt and nonce for every seal and must
/// map any authentication failure to `NoteLockError::IncorrectPin`.
pub trait CipherEngine: Send + Sync {
    fn seal_bytes(&self, plaintext: &[u8], pin: &str) -> Result<EncryptedBlob>;

    fn open_bytes(&self, blob: &EncryptedBlob, pin: &str) -> Result<Zeroizing<Vec<u8>>>;
}

/// Typed helpers over any [`CipherEngine`], including trait objects.
pub trait CipherEngineExt: CipherEngine {
    /// Serialize `content` and seal it.
    fn seal<T: Serialize + ?Sized>(&self, content: &T, pin: &str) -> Result<EncryptedBlob> {
        let plaintext = Zeroizing::new(serde_json::to_vec(content)?);
        self.seal_bytes(&plaintext, pin)
    }

    /// Open a blob and deserialize its content.
    fn open<T: DeserializeOwned>(&self, blob: &EncryptedBlob, pin: &str) -> Result<T> {
        let plaintext = self.open_bytes(blob, pin)?;
        Ok(serde_json::from_slice(&plaintext)?)
    }
}

impl<E: CipherEngine + ?Sized> CipherEngineExt for E {}

/// Production engine: PBKDF2-HMAC-SHA256 key stretching + AES-256-GCM.
#[derive(Debug, Clone)]
pub struct Pbkdf2AesGcm {
    iterations: u32,
}

impl Pbkdf2AesGcm {
    /// Create an engine that seals new blobs with `iterations` rounds.
    pub fn new(iterations: u32) -> Result<Self> {
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
        Ok(Self { iterations })
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

impl Default for Pbkdf2AesGcm {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl CipherEngine for Pbkdf2AesGcm {
    fn seal_bytes(&self, plaintext: &[u8], pin: &str) -> Result<EncryptedBlob> {
        let salt: [u8; SALT_LENGTH] = random_bytes()?;
        let iv: [u8; NONCE_LENGTH] = random_bytes()?;
        let key = derive_key(pin, &salt, self.iterations)?;

        let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
            .map_err(|e| NoteLockError::Crypto(format!("Failed to create cipher: {}", e)))?;
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&iv), plaintext)
            .map_err(|e| NoteLockError::Crypto(format!("Encryption failed: {}", e)))?;

        Ok(EncryptedBlob {
            ciphertext,
            iv,
            salt,
            iterations: self.iterations,
        })
    }

    fn open_bytes(&self, blob: &EncryptedBlob, pin: &str) -> Result<Zeroizing<Vec<u8>>> {
        // An empty PIN can never have sealed anything.
        if pin.is_empty() {
            return Err(NoteLockError::IncorrectPin);
        }
        if !(MIN_ITERATIONS..=MAX_ITERATIONS).contains(&blob.iterations) {
            return Err(NoteLockError::Crypto(format!(
                "Stored iteration count {} is out of range",
                blob.iterations
            )));
        }
        let key = derive_key(pin, &blob.salt, blob.iterations)?;

        let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
            .map_err(|e| NoteLockError::Crypto(format!("Failed to create cipher: {}", e)))?;
        let plaintext = cipher
            .decrypt(Nonce::from_slice(&blob.iv), blob.ciphertext.as_slice())
            .map_err(|_| NoteLockError::IncorrectPin)?;

        Ok(Zeroizing::new(plaintext))
    }
}

/// Seal `content` under `pin` with the default engine.
///
/// ```
/// use notelock_core::crypto::{decrypt, encrypt};
///
/// let blob = encrypt(&vec!["hello"], "1234").unwrap();
/// let opened: Vec<String> = decrypt(&blob, "1234").unwrap();
/// assert_eq!(opened, vec!["hello"]);
/// ```
pub fn encrypt<T: Serialize + ?Sized>(content: &T, pin: &str) -> Result<EncryptedBlob> {
    Pbkdf2AesGcm::default().seal(content, pin)
}

/// Open a blob sealed by [`encrypt`] (or any [`Pbkdf2AesGcm`]).
///
/// # Errors
///
/// Returns `NoteLockError::IncorrectPin` on a wrong PIN or tampered blob.
pub fn decrypt<T: DeserializeOwned>(blob: &EncryptedBlob, pin: &str) -> Result<T> {
    Pbkdf2AesGcm::default().open(blob, pin)
}

fn random_bytes<const N: usize>() -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| NoteLockError::Crypto(format!("Failed to gather randomness: {}", e)))?;
    Ok(bytes)
}
