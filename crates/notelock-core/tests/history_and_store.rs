use notelock_core::history::{HistoryBuffer, DEFAULT_HISTORY_CAPACITY};
use notelock_core::{
    Block, CipherEngineExt, JsonFileStore, Note, NoteBody, NoteKind, NoteStore, Notebook,
    Pbkdf2AesGcm,
};
use tempfile::tempdir;

#[test]
fn test_history_keeps_fifty_most_recent() {
    let mut history = HistoryBuffer::new();
    for i in 0..60 {
        history.push(&i);
    }

    assert_eq!(history.len(), DEFAULT_HISTORY_CAPACITY);
    assert_eq!(history.pop(), Some(59));
    assert_eq!(history.iter().last(), Some(&10));
}

#[test]
fn test_history_snapshots_are_copies() {
    let mut history = HistoryBuffer::new();
    let mut notes = vec![Note::new(NoteKind::Text)];
    history.push(&notes);

    notes[0].title = "changed".to_string();
    let snapshot = history.pop().expect("snapshot");
    assert_eq!(snapshot[0].title, "");
}

#[test]
fn test_notebook_persists_sealed_notes_verbatim() {
    let dir = tempdir().expect("tempdir");
    let store = JsonFileStore::new(dir.path().join("notes.json"));

    let mut book = Notebook::default();
    book.create(NoteKind::Checklist);
    let mut locked = Note::new(NoteKind::Text);
    locked.body = NoteBody::Sealed(
        Pbkdf2AesGcm::default()
            .seal(&vec![Block::text("secret")], "1234")
            .expect("seal"),
    );
    book.save(locked.clone());

    store.save_all(book.notes()).expect("save notes");
    let loaded = Notebook::new(store.load().expect("load notes"));

    assert_eq!(loaded.len(), 2);
    let restored = loaded.get(locked.id).expect("locked note");
    assert_eq!(restored.blob(), locked.blob());
}
