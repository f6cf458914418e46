use notelock_core::crypto::{decrypt, encrypt, DEFAULT_ITERATIONS};
use notelock_core::{Block, CipherEngine, CipherEngineExt, EncryptedBlob, NoteLockError, Pbkdf2AesGcm};

#[test]
fn test_seal_and_open_with_default_engine() {
    let content = vec![Block::text("groceries"), Block::todo("milk", false)];

    let blob = encrypt(&content, "1234").expect("encryption should succeed");
    assert_eq!(blob.iterations, DEFAULT_ITERATIONS);
    assert!(blob.iterations >= 100_000);

    let opened: Vec<Block> = decrypt(&blob, "1234").expect("decryption should succeed");
    assert_eq!(opened, content);
}

#[test]
fn test_wrong_pin_is_rejected() {
    let blob = encrypt(&vec![Block::text("secret")], "1234").expect("encryption should succeed");

    let result = decrypt::<Vec<Block>>(&blob, "9999");
    assert!(matches!(result, Err(NoteLockError::IncorrectPin)));
}

#[test]
fn test_blob_survives_json_round_trip() {
    let engine = Pbkdf2AesGcm::default();
    let blob = engine
        .seal(&vec![Block::text("persisted")], "4444")
        .expect("encryption should succeed");

    let json = serde_json::to_string(&blob).expect("serialize blob");
    let value: serde_json::Value = serde_json::from_str(&json).expect("parse blob json");
    for field in ["ciphertext", "iv", "salt"] {
        assert!(value[field].is_string(), "{} should be base64 text", field);
    }
    assert_eq!(value["iterations"], 100_000);

    let restored: EncryptedBlob = serde_json::from_str(&json).expect("deserialize blob");
    assert_eq!(restored, blob);
    let opened: Vec<Block> = engine.open(&restored, "4444").expect("decryption should succeed");
    assert_eq!(opened[0].text, "persisted");
}

#[test]
fn test_flipped_ciphertext_byte_is_rejected() {
    let engine = Pbkdf2AesGcm::default();
    let mut blob = engine
        .seal_bytes(b"journal entry", "4444")
        .expect("encryption should succeed");
    let last = blob.ciphertext.len() - 1;
    blob.ciphertext[last] ^= 0x01;

    assert!(matches!(
        engine.open_bytes(&blob, "4444"),
        Err(NoteLockError::IncorrectPin)
    ));
}
