//! Cryptographic operations for notelock.
//!
//! - **PBKDF2-HMAC-SHA256**: PIN key stretching, iteration count stored per blob
//! - **AES-256-GCM**: authenticated encryption of note content
//!
//! ## Security Model
//!
//! - Every seal draws a fresh 16-byte salt and 12-byte nonce from the OS
//! - A wrong PIN and a corrupted blob fail identically (`IncorrectPin`)
//! - Derived keys are zeroized on drop and never leave this module
//! - PINs and keys are never logged
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft of the persisted note records
//! - Offline brute-force of a note PIN (slowed by key stretching)
//!
//! We do NOT defend against:
//! - Compromised OS / keylogger
//! - Access to an unlocked session / memory

pub mod blob;
pub mod cipher;
#[cfg(any(test, feature = "test-support"))]
pub mod fake;
pub mod key;
pub mod pin;

pub use blob::{EncryptedBlob, NONCE_LENGTH};
pub use cipher::{decrypt, encrypt, CipherEngine, CipherEngineExt, Pbkdf2AesGcm};
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeCipher;
pub use key::{
    derive_key, DerivedKey, DEFAULT_ITERATIONS, MAX_ITERATIONS, MIN_ITERATIONS, SALT_LENGTH,
};
pub use pin::{validate_pin, MIN_PIN_LENGTH};
