//! The persisted form of sealed note content.
//!
//! Wire shape: `{ "ciphertext": b64, "iv": b64, "salt": b64, "iterations": n }`.
//! Storage collaborators carry this verbatim.

use serde::{Deserialize, Serialize};

use super::key::SALT_LENGTH;

/// AES-GCM nonce length in bytes.
pub const NONCE_LENGTH: usize = 12;

/// Sealed note content. Opaque outside the cipher engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedBlob {
    #[serde(with = "base64_bytes")]
    pub ciphertext: Vec<u8>,
    #[serde(with = "base64_array")]
    pub iv: [u8; NONCE_LENGTH],
    #[serde(with = "base64_array")]
    pub salt: [u8; SALT_LENGTH],
    pub iterations: u32,
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

mod base64_array {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer, const N: usize>(
        bytes: &[u8; N],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>, const N: usize>(
        deserializer: D,
    ) -> Result<[u8; N], D::Error> {
        let encoded = String::deserialize(deserializer)?;
        let decoded = STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)?;
        let len = decoded.len();
        decoded.try_into().map_err(|_| {
            serde::de::Error::custom(format!("expected {} bytes, got {}", N, len))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EncryptedBlob {
        EncryptedBlob {
            ciphertext: vec![0xde, 0xad, 0xbe, 0xef],
            iv: [7u8; NONCE_LENGTH],
            salt: [9u8; SALT_LENGTH],
            iterations: 100_000,
        }
    }

    #[test]
    fn test_wire_shape_is_base64_text() {
        let value = serde_json::to_value(sample()).unwrap();

        assert_eq!(value["ciphertext"], "3q2+7w==");
        assert_eq!(value["iv"], "BwcHBwcHBwcHBwcH");
        assert_eq!(value["iterations"], 100_000);
        assert!(value["salt"].is_string());
    }

    #[test]
    fn test_deserialize_matches_serialized() {
        let json = serde_json::to_string(&sample()).unwrap();
        let parsed: EncryptedBlob = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn test_wrong_iv_length_rejected() {
        let json = r#"{"ciphertext":"AA==","iv":"AAAA","salt":"AAAAAAAAAAAAAAAAAAAAAA==","iterations":100000}"#;
        let err = serde_json::from_str::<EncryptedBlob>(json).unwrap_err();
        assert!(err.to_string().contains("expected 12 bytes"));
    }

    #[test]
    fn test_invalid_base64_rejected() {
        let json = r#"{"ciphertext":"not base64!","iv":"BwcHBwcHBwcHBwcH","salt":"AAAAAAAAAAAAAAAAAAAAAA==","iterations":100000}"#;
        assert!(serde_json::from_str::<EncryptedBlob>(json).is_err());
    }
}
