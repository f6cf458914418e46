use tokio::time::Instant;

use super::request::{AuthKind, RequestId};
use crate::model::NoteId;

/// Why the session went back to `Locked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockReason {
    Manual,
    Logout,
}

/// Notifications for the UI collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    PromptRequested {
        request_id: RequestId,
        kind: AuthKind,
    },
    Unlocked {
        until: Instant,
    },
    Locked {
        reason: LockReason,
        /// Decrypted working copy the UI must drop, if any.
        discard: Option<NoteId>,
    },
    AutoLocked {
        discard: Option<NoteId>,
    },
}
