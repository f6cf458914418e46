use secrecy::{ExposeSecret, SecretString};
use tokio::time::Instant;
use zeroize::Zeroizing;

use super::request::{AuthKind, AuthRequest, RequestId};
use super::timer::AutoLock;
use crate::model::NoteId;

/// Externally visible lock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Locked,
    AwaitingAuth { request_id: RequestId, kind: AuthKind },
    Unlocked { until: Instant },
}

/// Process-wide session state, owned by one `LockSessionManager`.
///
/// Nothing here is ever persisted.
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub unlocked_until: Option<Instant>,
    pub cached_pin: Option<SecretString>,
    pub master_pin: Option<SecretString>,
    pub pending: Option<AuthRequest>,
    /// Locked note whose decrypted working copy is open in an editor.
    pub editing: Option<NoteId>,
    pub auto_lock: AutoLock,
    next_request: u64,
}

impl SessionState {
    pub fn is_unlocked(&self, now: Instant) -> bool {
        self.unlocked_until.is_some_and(|until| now < until)
    }

    pub fn lock_state(&self, now: Instant) -> LockState {
        if let Some(request) = &self.pending {
            return LockState::AwaitingAuth {
                request_id: request.id(),
                kind: request.kind(),
            };
        }
        match self.unlocked_until {
            Some(until) if now < until => LockState::Unlocked { until },
            _ => LockState::Locked,
        }
    }

    pub fn next_request_id(&mut self) -> RequestId {
        self.next_request += 1;
        RequestId(self.next_request)
    }

    pub fn pending_id(&self) -> Option<RequestId> {
        self.pending.as_ref().map(AuthRequest::id)
    }

    /// Take the pending request if it is still the one identified by `id`.
    pub fn take_pending(&mut self, id: RequestId) -> Option<AuthRequest> {
        if self.pending_id() == Some(id) {
            self.pending.take()
        } else {
            None
        }
    }

    /// The cached PIN, only while the session window is still open.
    pub fn session_pin(&self, now: Instant) -> Option<Zeroizing<String>> {
        if !self.is_unlocked(now) {
            return None;
        }
        self.cached_pin
            .as_ref()
            .map(|pin| Zeroizing::new(pin.expose_secret().to_string()))
    }

    pub fn master_matches(&self, pin: &str) -> Option<bool> {
        self.master_pin
            .as_ref()
            .map(|master| master.expose_secret() == pin)
    }

    /// Drop authentication: expiry, cached PIN and editing context.
    ///
    /// Returns the note whose working copy must be discarded.
    pub fn expire(&mut self) -> Option<NoteId> {
        self.unlocked_until = None;
        self.cached_pin = None;
        self.editing.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_lock_state_follows_expiry() {
        let mut state = SessionState::default();
        let now = Instant::now();
        assert_eq!(state.lock_state(now), LockState::Locked);

        state.unlocked_until = Some(now + Duration::from_secs(10));
        assert!(matches!(state.lock_state(now), LockState::Unlocked { .. }));
        assert_eq!(
            state.lock_state(now + Duration::from_secs(10)),
            LockState::Locked
        );
    }

    #[test]
    fn test_expire_clears_pin_and_editing() {
        let mut state = SessionState {
            cached_pin: Some(SecretString::from("4444".to_string())),
            editing: Some(uuid::Uuid::new_v4()),
            ..Default::default()
        };

        assert!(state.expire().is_some());
        assert!(state.cached_pin.is_none());
        assert!(state.editing.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_pin_hidden_once_window_passes() {
        let now = Instant::now();
        let state = SessionState {
            unlocked_until: Some(now + Duration::from_secs(10)),
            cached_pin: Some(SecretString::from("4444".to_string())),
            ..Default::default()
        };

        assert_eq!(state.session_pin(now).as_deref().map(String::as_str), Some("4444"));
        assert!(state.session_pin(now + Duration::from_secs(10)).is_none());
    }

    #[test]
    fn test_request_ids_increase() {
        let mut state = SessionState::default();
        let a = state.next_request_id();
        let b = state.next_request_id();
        assert_ne!(a, b);
    }
}
