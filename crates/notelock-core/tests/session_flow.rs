use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use notelock_core::{
    Approval, AuthKind, AuthStatus, Block, CipherEngineExt, LockSessionManager, LockState,
    NoBiometrics, Note, NoteBody, NoteEditor, NoteKind, Notebook, Pbkdf2AesGcm, SessionConfig,
    SessionEvent,
};

const WINDOW: Duration = Duration::from_secs(120);

fn manager() -> LockSessionManager {
    LockSessionManager::new(
        SessionConfig::default().with_session_duration(WINDOW),
        Arc::new(Pbkdf2AesGcm::default()),
        Arc::new(NoBiometrics),
    )
}

fn sealed(title: &str, pin: &str) -> Note {
    let mut note = Note::new(NoteKind::Text);
    note.title = title.to_string();
    note.body = NoteBody::Sealed(
        Pbkdf2AesGcm::default()
            .seal(&vec![Block::text(title)], pin)
            .expect("seal note"),
    );
    note
}

fn capture() -> (Arc<Mutex<Option<Approval>>>, impl FnOnce(Approval) + Send + 'static) {
    let slot = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&slot);
    (slot, move |approval| *sink.lock() = Some(approval))
}

async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_session_reuses_pin_for_second_note() {
    let manager = manager();
    let a = sealed("A", "4444");
    let b = sealed("B", "4444");

    let (first, on_approved) = capture();
    let status = manager
        .require_auth(AuthKind::Unlock, Some(&a), on_approved)
        .await
        .expect("require auth");
    assert!(matches!(status, AuthStatus::PromptRequired(_)));
    manager.submit_pin("4444").await.expect("unlock A");
    assert!(first.lock().is_some());

    let (second, on_approved) = capture();
    let status = manager
        .require_auth(AuthKind::Unlock, Some(&b), on_approved)
        .await
        .expect("require auth");
    assert!(status.is_approved());
    let content = second.lock().take().and_then(|approval| approval.content);
    assert_eq!(content.expect("content")[0].text, "B");
}

#[tokio::test(start_paused = true)]
async fn test_session_expires_after_window() {
    let manager = manager();
    let a = sealed("A", "4444");
    let b = sealed("B", "4444");

    let (_, on_approved) = capture();
    manager
        .require_auth(AuthKind::Unlock, Some(&a), on_approved)
        .await
        .expect("require auth");
    manager.submit_pin("4444").await.expect("unlock A");

    tokio::time::advance(WINDOW + Duration::from_millis(1)).await;
    settle().await;

    let (_, on_approved) = capture();
    let status = manager
        .require_auth(AuthKind::Unlock, Some(&b), on_approved)
        .await
        .expect("require auth");
    assert!(!status.is_approved());
}

#[tokio::test(start_paused = true)]
async fn test_manual_lock_discards_working_copy() {
    let manager = manager();
    let mut events = manager.subscribe();
    let note = sealed("diary", "4444");

    let (slot, on_approved) = capture();
    manager
        .require_auth(AuthKind::Unlock, Some(&note), on_approved)
        .await
        .expect("require auth");
    manager.submit_pin("4444").await.expect("unlock");

    let approval = slot.lock().take().expect("approval");
    let editor = NoteEditor::open(note.clone(), Some(approval)).expect("open editor");
    assert_eq!(editor.blocks()[0].text, "diary");

    manager.lock_now();
    assert_eq!(manager.state(), LockState::Locked);

    let discard = std::iter::from_fn(|| events.try_recv().ok()).find_map(|event| match event {
        SessionEvent::Locked { discard, .. } => discard,
        _ => None,
    });
    assert_eq!(discard, Some(note.id));
}

#[tokio::test(start_paused = true)]
async fn test_edit_locked_note_and_save_back_to_notebook() {
    let manager = manager();
    let note = sealed("diary", "4444");
    let mut book = Notebook::new(vec![note.clone()]);

    let (slot, on_approved) = capture();
    manager
        .require_auth(AuthKind::Unlock, Some(&note), on_approved)
        .await
        .expect("require auth");
    manager.submit_pin("4444").await.expect("unlock");

    let approval = slot.lock().take().expect("approval");
    let mut editor = NoteEditor::open(note.clone(), Some(approval)).expect("open editor");
    editor.add_block(Block::text("second line"));

    let saved = manager.close_editor(editor).await.expect("close editor");
    book.save(saved);

    let stored = book.get(note.id).expect("note kept");
    assert!(stored.is_locked());
    assert!(stored.blocks().is_none());
    let blocks: Vec<Block> = Pbkdf2AesGcm::default()
        .open(stored.blob().expect("sealed"), "4444")
        .expect("open saved note");
    assert_eq!(blocks.len(), 2);
}
