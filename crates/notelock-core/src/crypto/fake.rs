//! Deterministic in-memory cipher for tests.
//!
//! Salts and nonces come from a counter, so output is reproducible while
//! still never repeating within one engine. The "ciphertext" is a keyed XOR
//! stream with a SHA-256 tag: enough to make wrong PINs fail, useless as
//! real encryption.

use std::sync::atomic::{AtomicU64, Ordering};

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::blob::{EncryptedBlob, NONCE_LENGTH};
use super::cipher::CipherEngine;
use super::key::SALT_LENGTH;
use crate::error::{NoteLockError, Result};

/// Iteration count recorded in fake blobs.
pub const FAKE_ITERATIONS: u32 = 1;

const TAG_LENGTH: usize = 32;

#[derive(Debug, Default)]
pub struct FakeCipher {
    counter: AtomicU64,
}

impl FakeCipher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of seals performed so far.
    pub fn seal_count(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }
}

impl CipherEngine for FakeCipher {
    fn seal_bytes(&self, plaintext: &[u8], pin: &str) -> Result<EncryptedBlob> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let mut salt = [0u8; SALT_LENGTH];
        salt[..8].copy_from_slice(&n.to_le_bytes());
        salt[8..].copy_from_slice(b"fakesalt");
        let mut iv = [0u8; NONCE_LENGTH];
        iv[..8].copy_from_slice(&n.to_be_bytes());

        let mut ciphertext = keystream_xor(pin, &salt, plaintext);
        let tag = tag(pin, &salt, &iv, &ciphertext);
        ciphertext.extend_from_slice(&tag);

        Ok(EncryptedBlob {
            ciphertext,
            iv,
            salt,
            iterations: FAKE_ITERATIONS,
        })
    }

    fn open_bytes(&self, blob: &EncryptedBlob, pin: &str) -> Result<Zeroizing<Vec<u8>>> {
        if blob.ciphertext.len() < TAG_LENGTH {
            return Err(NoteLockError::IncorrectPin);
        }
        let (body, stored_tag) = blob.ciphertext.split_at(blob.ciphertext.len() - TAG_LENGTH);
        if tag(pin, &blob.salt, &blob.iv, body).as_slice() != stored_tag {
            return Err(NoteLockError::IncorrectPin);
        }
        Ok(Zeroizing::new(keystream_xor(pin, &blob.salt, body)))
    }
}

fn keystream_xor(pin: &str, salt: &[u8], data: &[u8]) -> Vec<u8> {
    let pad = Sha256::new()
        .chain_update(pin.as_bytes())
        .chain_update(salt)
        .finalize();
    data.iter()
        .zip(pad.iter().cycle())
        .map(|(byte, key)| byte ^ key)
        .collect()
}

fn tag(pin: &str, salt: &[u8], iv: &[u8], body: &[u8]) -> [u8; TAG_LENGTH] {
    Sha256::new()
        .chain_update(b"tag")
        .chain_update(pin.as_bytes())
        .chain_update(salt)
        .chain_update(iv)
        .chain_update(body)
        .finalize()
        .into()
}
