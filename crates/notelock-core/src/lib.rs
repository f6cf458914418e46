//! # Notelock Core
//!
//! Local access control for a personal notes app: PIN-sealed notes, a
//! short-lived unlock session and bounded undo history.
//!
//! This crate holds the domain logic and stays independent of any user
//! interface. The CLI drives it through [`LockSessionManager`] and reacts to
//! [`SessionEvent`]s.
//!
//! ## Architecture
//!
//! - **crypto**: PBKDF2-SHA256 key derivation and AES-256-GCM sealing
//! - **session**: lock state machine, auth requests and the auto-lock timer
//! - **history**: bounded most-recent-first snapshot buffer
//! - **notebook**: note list and single-note editor, each with undo
//! - **storage**: persistence trait with memory and JSON file stores
//! - **model**: notes, blocks and their persisted shape

pub mod config;
pub mod crypto;
pub mod error;
mod fs;
pub mod history;
pub mod model;
pub mod notebook;
pub mod session;
pub mod storage;

pub use config::{CipherConfig, MasterPinPolicy, SessionConfig};
pub use crypto::{CipherEngine, CipherEngineExt, EncryptedBlob, Pbkdf2AesGcm};
pub use error::{NoteLockError, Result};
pub use history::HistoryBuffer;
pub use model::{Block, BlockKind, Note, NoteBody, NoteId, NoteKind};
pub use notebook::{NoteEditor, Notebook};
pub use session::{
    Approval, ApprovalMethod, AuthKind, AuthStatus, BiometricCapability, LockReason,
    LockSessionManager, LockState, NoBiometrics, Prompt, SessionEvent, StaticBiometric,
};
pub use storage::{JsonFileStore, MemoryStore, NoteStore};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
