use std::sync::Arc;

use parking_lot::Mutex;
use secrecy::SecretString;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use super::biometric::BiometricCapability;
use super::events::{LockReason, SessionEvent};
use super::request::{
    Approval, ApprovalMethod, AuthKind, AuthRequest, AuthStatus, Prompt, RequestId, Ticket,
};
use super::state::{LockState, SessionState};
use crate::config::{MasterPinPolicy, SessionConfig};
use crate::crypto::{validate_pin, CipherEngine, CipherEngineExt, EncryptedBlob};
use crate::error::{NoteLockError, Result};
use crate::model::{Block, Note, NoteId};
use crate::notebook::NoteEditor;

const EVENT_CAPACITY: usize = 32;

/// Mediates every action that needs the user to authenticate.
///
/// State lives behind a mutex shared with the auto-lock task; the lock is
/// never held across an `.await`, and key derivation runs on the blocking
/// pool. Continuations run after the lock is released.
pub struct LockSessionManager {
    inner: Arc<Mutex<SessionState>>,
    cipher: Arc<dyn CipherEngine>,
    biometric: Arc<dyn BiometricCapability>,
    config: SessionConfig,
    events: broadcast::Sender<SessionEvent>,
}

impl LockSessionManager {
    pub fn new(
        config: SessionConfig,
        cipher: Arc<dyn CipherEngine>,
        biometric: Arc<dyn BiometricCapability>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Mutex::new(SessionState::default())),
            cipher,
            biometric,
            config,
            events,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn state(&self) -> LockState {
        self.inner.lock().lock_state(Instant::now())
    }

    pub fn is_unlocked(&self) -> bool {
        self.inner.lock().is_unlocked(Instant::now())
    }

    pub fn has_cached_pin(&self) -> bool {
        self.inner.lock().cached_pin.is_some()
    }

    pub fn has_master_pin(&self) -> bool {
        self.inner.lock().master_pin.is_some()
    }

    /// Locked note whose decrypted copy is currently open, if any.
    pub fn editing(&self) -> Option<NoteId> {
        self.inner.lock().editing
    }

    pub fn pending_request(&self) -> Option<(RequestId, AuthKind)> {
        let state = self.inner.lock();
        state
            .pending
            .as_ref()
            .map(|request| (request.id(), request.kind()))
    }

    /// Gate an action behind authentication.
    ///
    /// Runs `on_approved` immediately while the session window is open.
    /// Unlocking a sealed note inside the window also needs the cached PIN to
    /// open that note; otherwise the request is parked and a prompt returned.
    pub async fn require_auth<F>(
        &self,
        kind: AuthKind,
        note: Option<&Note>,
        on_approved: F,
    ) -> Result<AuthStatus>
    where
        F: FnOnce(Approval) + Send + 'static,
    {
        let note_id = note.map(|n| n.id);
        let sealed = note
            .filter(|_| kind == AuthKind::Unlock)
            .and_then(Note::blob)
            .cloned();

        let (unlocked, cached_pin) = {
            let state = self.inner.lock();
            let now = Instant::now();
            (state.is_unlocked(now), state.session_pin(now))
        };

        if unlocked {
            match (sealed, cached_pin) {
                (None, _) => {
                    debug!(%kind, "session window open; proceeding");
                    on_approved(Approval {
                        kind,
                        note_id,
                        content: None,
                        method: ApprovalMethod::Session,
                    });
                    return Ok(AuthStatus::Approved);
                }
                (Some(blob), Some(pin)) => match self.open_blocks(blob, pin).await {
                    Ok(blocks) => {
                        let still_open = {
                            let mut state = self.inner.lock();
                            let open = state.is_unlocked(Instant::now());
                            if open {
                                state.editing = note_id;
                            }
                            open
                        };
                        if still_open {
                            debug!(note = ?note_id, "cached PIN opened note");
                            on_approved(Approval {
                                kind,
                                note_id,
                                content: Some(blocks),
                                method: ApprovalMethod::Session,
                            });
                            return Ok(AuthStatus::Approved);
                        }
                    }
                    Err(NoteLockError::IncorrectPin) => {
                        debug!(note = ?note_id, "cached PIN does not open note; prompting");
                    }
                    Err(err) => return Err(err),
                },
                (Some(_), None) => {}
            }
        }

        let biometric_available = self.biometric.is_available().await;
        let request_id = {
            let mut state = self.inner.lock();
            let id = state.next_request_id();
            let previous = state.pending.replace(AuthRequest {
                id,
                kind,
                target: note.cloned(),
                on_approved: Box::new(on_approved),
            });
            if let Some(previous) = previous {
                debug!(replaced = %previous.id(), "dropping superseded request");
            }
            id
        };

        info!(request = %request_id, %kind, "authentication required");
        self.emit(SessionEvent::PromptRequested { request_id, kind });
        Ok(AuthStatus::PromptRequired(Prompt {
            request_id,
            kind,
            note_title: note.map(|n| n.display_title().to_string()),
            biometric_available,
        }))
    }

    /// Answer the pending request with a PIN.
    ///
    /// On any failure the request stays pending and nothing else changes.
    pub async fn submit_pin(&self, pin: &str) -> Result<()> {
        let ticket = self.ticket()?;

        let content = match ticket.blob.clone() {
            Some(blob) => match self.open_blocks(blob, Zeroizing::new(pin.to_string())).await {
                Ok(blocks) => Some(blocks),
                Err(err) => {
                    if matches!(err, NoteLockError::IncorrectPin) {
                        warn!(request = %ticket.id, "incorrect PIN for note unlock");
                    }
                    return Err(err);
                }
            },
            None => None,
        };

        let (request, until) = {
            let mut state = self.inner.lock();
            if state.pending_id() != Some(ticket.id) {
                return Err(NoteLockError::NoActiveRequest);
            }
            let until = self.deadline()?;
            if content.is_none() {
                self.verify_master(&mut state, pin)?;
            }
            let request = state
                .take_pending(ticket.id)
                .ok_or(NoteLockError::NoActiveRequest)?;
            state.cached_pin = Some(SecretString::from(pin.to_string()));
            let editing = content.as_ref().and(ticket.note_id);
            self.start_session(&mut state, until, editing);
            (request, until)
        };

        self.approve(request, &ticket, content, ApprovalMethod::Pin, until);
        Ok(())
    }

    /// Answer the pending request with the biometric capability.
    ///
    /// Biometric approval carries no key material: a sealed note opens only
    /// if the still-open session caches a PIN that fits it.
    pub async fn submit_biometric(&self) -> Result<()> {
        let ticket = self.ticket()?;

        if !self.biometric.is_available().await {
            return Err(NoteLockError::BiometricUnavailable);
        }
        if !self.biometric.verify().await {
            warn!(request = %ticket.id, "biometric verification denied");
            return Err(NoteLockError::BiometricDenied);
        }

        let content = match ticket.blob.clone() {
            Some(blob) => {
                let pin = self
                    .inner
                    .lock()
                    .session_pin(Instant::now())
                    .ok_or(NoteLockError::PinRequired)?;
                match self.open_blocks(blob, pin).await {
                    Ok(blocks) => Some(blocks),
                    Err(NoteLockError::IncorrectPin) => return Err(NoteLockError::PinRequired),
                    Err(err) => return Err(err),
                }
            }
            None => None,
        };

        let (request, until) = {
            let mut state = self.inner.lock();
            let until = self.deadline()?;
            let request = state
                .take_pending(ticket.id)
                .ok_or(NoteLockError::NoActiveRequest)?;
            let editing = content.as_ref().and(ticket.note_id);
            self.start_session(&mut state, until, editing);
            (request, until)
        };

        self.approve(request, &ticket, content, ApprovalMethod::Biometric, until);
        Ok(())
    }

    /// Abandon the pending request without side effects.
    pub fn cancel(&self) -> Option<RequestId> {
        let request = self.inner.lock().pending.take();
        request.map(|request| {
            debug!(request = %request.id(), "authentication request cancelled");
            request.id()
        })
    }

    /// Explicit user lock: reset immediately, bypassing the timer.
    pub fn lock_now(&self) {
        let discard = self.reset();
        info!("session locked manually");
        self.emit(SessionEvent::Locked {
            reason: LockReason::Manual,
            discard,
        });
    }

    /// Identity change: reset to `Locked` and drop any pending request.
    pub fn logout(&self) {
        let discard = self.reset();
        info!("session reset on logout");
        self.emit(SessionEvent::Locked {
            reason: LockReason::Logout,
            discard,
        });
    }

    /// The editor for `note_id` closed; its working copy is gone.
    pub fn end_editing(&self, note_id: NoteId) {
        let mut state = self.inner.lock();
        if state.editing == Some(note_id) {
            state.editing = None;
        }
    }

    /// Set the master PIN explicitly.
    pub fn provision_master_pin(&self, pin: &str) -> Result<()> {
        validate_pin(pin)?;
        let mut state = self.inner.lock();
        if state.master_pin.is_some() {
            return Err(NoteLockError::InvalidInput(
                "A master PIN is already set; change it instead".to_string(),
            ));
        }
        state.master_pin = Some(SecretString::from(pin.to_string()));
        info!("master PIN provisioned");
        Ok(())
    }

    /// Replace the master PIN after checking the current one.
    pub fn change_master_pin(&self, current: &str, new_pin: &str) -> Result<()> {
        let mut state = self.inner.lock();
        match state.master_matches(current) {
            None => return Err(NoteLockError::PinNotProvisioned),
            Some(false) => {
                warn!("incorrect PIN for master PIN change");
                return Err(NoteLockError::IncorrectPin);
            }
            Some(true) => {}
        }
        validate_pin(new_pin)?;
        state.master_pin = Some(SecretString::from(new_pin.to_string()));
        info!("master PIN changed");
        Ok(())
    }

    /// Close an editor, re-sealing a locked note before it is persisted.
    ///
    /// A note locked in this editor uses its new PIN; otherwise the PIN
    /// cached by the open session seals it.
    pub async fn close_editor(&self, editor: NoteEditor) -> Result<Note> {
        let note_id = editor.note_id();
        let session_pin = if editor.is_locked() && !editor.has_lock_pin() {
            let pin = self.inner.lock().session_pin(Instant::now());
            Some(pin.ok_or(NoteLockError::PinRequired)?)
        } else {
            None
        };

        let cipher = Arc::clone(&self.cipher);
        let note = tokio::task::spawn_blocking(move || {
            editor.finish(cipher.as_ref(), session_pin.as_deref().map(String::as_str))
        })
        .await
        .map_err(|e| NoteLockError::Crypto(format!("Cipher task failed: {}", e)))??;

        self.end_editing(note_id);
        debug!(note = %note_id, locked = note.is_locked(), "editor closed");
        Ok(note)
    }

    fn ticket(&self) -> Result<Ticket> {
        self.inner
            .lock()
            .pending
            .as_ref()
            .map(AuthRequest::ticket)
            .ok_or(NoteLockError::NoActiveRequest)
    }

    fn verify_master(&self, state: &mut SessionState, pin: &str) -> Result<()> {
        match state.master_matches(pin) {
            Some(true) => Ok(()),
            Some(false) => {
                warn!("incorrect master PIN");
                Err(NoteLockError::IncorrectPin)
            }
            None => match self.config.master_pin_policy {
                MasterPinPolicy::AdoptFirst => {
                    validate_pin(pin)?;
                    state.master_pin = Some(SecretString::from(pin.to_string()));
                    info!("first PIN adopted as master PIN");
                    Ok(())
                }
                MasterPinPolicy::RequireProvisioned => Err(NoteLockError::PinNotProvisioned),
            },
        }
    }

    /// End of a session window starting now.
    fn deadline(&self) -> Result<Instant> {
        Instant::now()
            .checked_add(self.config.session_duration)
            .ok_or_else(|| {
                NoteLockError::InvalidInput(format!(
                    "Session duration {:?} is out of range",
                    self.config.session_duration
                ))
            })
    }

    fn start_session(&self, state: &mut SessionState, until: Instant, editing: Option<NoteId>) {
        state.unlocked_until = Some(until);
        if editing.is_some() {
            state.editing = editing;
        }
        self.arm_auto_lock(state, until);
    }

    fn approve(
        &self,
        request: AuthRequest,
        ticket: &Ticket,
        content: Option<Vec<Block>>,
        method: ApprovalMethod,
        until: Instant,
    ) {
        info!(request = %ticket.id, kind = %ticket.kind, ?method, "authenticated");
        self.emit(SessionEvent::Unlocked { until });
        (request.on_approved)(Approval {
            kind: ticket.kind,
            note_id: ticket.note_id,
            content,
            method,
        });
    }

    fn reset(&self) -> Option<NoteId> {
        let mut state = self.inner.lock();
        state.auto_lock.cancel();
        state.pending = None;
        state.expire()
    }

    /// Replace any armed auto-lock with a fresh one firing at `until`.
    fn arm_auto_lock(&self, state: &mut SessionState, until: Instant) {
        let generation = state.auto_lock.rearm();
        let inner = Arc::downgrade(&self.inner);
        let events = self.events.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(until).await;
            let Some(inner) = inner.upgrade() else {
                return;
            };
            let discard = {
                let mut state = inner.lock();
                if !state.auto_lock.is_current(generation) {
                    return;
                }
                state.auto_lock.fired();
                state.expire()
            };
            info!(discard = ?discard, "session auto-locked");
            let _ = events.send(SessionEvent::AutoLocked { discard });
        });
        state.auto_lock.attach(handle);
        debug!(delay = ?self.config.session_duration, "auto-lock armed");
    }

    async fn open_blocks(&self, blob: EncryptedBlob, pin: Zeroizing<String>) -> Result<Vec<Block>> {
        let cipher = Arc::clone(&self.cipher);
        tokio::task::spawn_blocking(move || cipher.open::<Vec<Block>>(&blob, &pin))
            .await
            .map_err(|e| NoteLockError::Crypto(format!("Cipher task failed: {}", e)))?
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

impl std::fmt::Debug for LockSessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockSessionManager")
            .field("state", &self.state())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
