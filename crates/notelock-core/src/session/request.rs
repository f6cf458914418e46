//! Authentication requests and their outcomes.

use std::fmt;

use crate::model::{Block, Note, NoteId};

/// What the user is trying to do when authentication is demanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthKind {
    Edit,
    Delete,
    Save,
    Unlock,
}

impl fmt::Display for AuthKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AuthKind::Edit => "edit",
            AuthKind::Delete => "delete",
            AuthKind::Save => "save",
            AuthKind::Unlock => "unlock",
        };
        f.write_str(label)
    }
}

/// Identifies one pending request so a late answer cannot resolve a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(pub(crate) u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How an approval was granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalMethod {
    /// The session window was still open.
    Session,
    Pin,
    Biometric,
}

/// Handed to the continuation once an action is allowed to proceed.
#[derive(Clone)]
pub struct Approval {
    pub kind: AuthKind,
    pub note_id: Option<NoteId>,
    /// Decrypted blocks, present only for `Unlock` of a sealed note.
    pub content: Option<Vec<Block>>,
    pub method: ApprovalMethod,
}

impl fmt::Debug for Approval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Approval")
            .field("kind", &self.kind)
            .field("note_id", &self.note_id)
            .field("content", &self.content.as_ref().map(|blocks| blocks.len()))
            .field("method", &self.method)
            .finish()
    }
}

/// Continuation invoked when a request is approved.
pub type OnApproved = Box<dyn FnOnce(Approval) + Send + 'static>;

/// A pending action waiting on the user.
pub struct AuthRequest {
    pub(crate) id: RequestId,
    pub(crate) kind: AuthKind,
    pub(crate) target: Option<Note>,
    pub(crate) on_approved: OnApproved,
}

impl AuthRequest {
    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn kind(&self) -> AuthKind {
        self.kind
    }

    pub fn target(&self) -> Option<&Note> {
        self.target.as_ref()
    }

    pub(crate) fn ticket(&self) -> Ticket {
        Ticket {
            id: self.id,
            kind: self.kind,
            note_id: self.target.as_ref().map(|note| note.id),
            blob: self
                .target
                .as_ref()
                .filter(|_| self.kind == AuthKind::Unlock)
                .and_then(|note| note.blob().cloned()),
        }
    }
}

impl fmt::Debug for AuthRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthRequest")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("target", &self.target.as_ref().map(|note| note.id))
            .finish_non_exhaustive()
    }
}

/// Copy of what is needed to work on a request without holding the state lock.
#[derive(Debug, Clone)]
pub(crate) struct Ticket {
    pub id: RequestId,
    pub kind: AuthKind,
    pub note_id: Option<NoteId>,
    pub blob: Option<crate::crypto::EncryptedBlob>,
}

/// What the prompt surface needs to render a PIN entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub request_id: RequestId,
    pub kind: AuthKind,
    pub note_title: Option<String>,
    pub biometric_available: bool,
}

/// Result of [`require_auth`](super::LockSessionManager::require_auth).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStatus {
    /// The continuation has already run.
    Approved,
    /// The user must answer through `submit_pin` or `submit_biometric`.
    PromptRequired(Prompt),
}

impl AuthStatus {
    pub fn is_approved(&self) -> bool {
        matches!(self, AuthStatus::Approved)
    }
}
