//! Note collection and single-note editor.
//!
//! Both keep their own undo history. Locked notes stay sealed inside the
//! collection; plaintext of a locked note only lives in an open
//! [`NoteEditor`], which the UI drops when the session locks.

use chrono::Utc;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::crypto::{validate_pin, CipherEngine, CipherEngineExt};
use crate::error::{NoteLockError, Result};
use crate::history::HistoryBuffer;
use crate::model::{palette_color, Block, BlockKind, Note, NoteBody, NoteId, NoteKind, NOTE_COLORS};
use crate::session::Approval;

/// Ordered note collection with list-level undo.
#[derive(Debug, Clone, Default)]
pub struct Notebook {
    notes: Vec<Note>,
    history: HistoryBuffer<Vec<Note>>,
}

impl Notebook {
    pub fn new(notes: Vec<Note>) -> Self {
        Self {
            notes,
            history: HistoryBuffer::new(),
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Add an empty note at the top of the list.
    pub fn create(&mut self, kind: NoteKind) -> NoteId {
        self.checkpoint();
        let note = Note::new(kind);
        let id = note.id;
        self.notes.insert(0, note);
        id
    }

    /// Insert or replace a note. New notes go first.
    pub fn save(&mut self, note: Note) {
        self.checkpoint();
        match self.position(note.id) {
            Some(index) => self.notes[index] = note,
            None => self.notes.insert(0, note),
        }
    }

    pub fn delete(&mut self, id: NoteId) -> Result<Note> {
        let index = self.position(id).ok_or(NoteLockError::NoteNotFound(id))?;
        self.checkpoint();
        Ok(self.notes.remove(index))
    }

    /// Reorder the list. `order` must name every note exactly once.
    pub fn reorder(&mut self, order: &[NoteId]) -> Result<()> {
        if order.len() != self.notes.len() {
            return Err(NoteLockError::InvalidInput(format!(
                "Reorder names {} notes, notebook has {}",
                order.len(),
                self.notes.len()
            )));
        }

        let mut remaining = self.notes.clone();
        let mut reordered = Vec::with_capacity(order.len());
        for id in order {
            let index = remaining
                .iter()
                .position(|note| note.id == *id)
                .ok_or(NoteLockError::NoteNotFound(*id))?;
            reordered.push(remaining.swap_remove(index));
        }

        self.checkpoint();
        self.notes = reordered;
        Ok(())
    }

    /// Restore the collection to before the last structural change.
    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.notes = previous;
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn into_notes(self) -> Vec<Note> {
        self.notes
    }

    fn position(&self, id: NoteId) -> Option<usize> {
        self.notes.iter().position(|note| note.id == id)
    }

    fn checkpoint(&mut self) {
        self.history.push(&self.notes);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Subtitle,
}

/// Editable part of a note, snapshotted into the editor history.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Draft {
    title: String,
    subtitle: String,
    color: Option<String>,
    blocks: Vec<Block>,
}

/// Working copy of one note.
pub struct NoteEditor {
    note: Note,
    draft: Draft,
    locked: bool,
    lock_pin: Option<Zeroizing<String>>,
    history: HistoryBuffer<Draft>,
    burst: Option<Field>,
}

impl NoteEditor {
    /// Open a note for editing.
    ///
    /// A locked note needs the approval that decrypted it.
    pub fn open(note: Note, approval: Option<Approval>) -> Result<Self> {
        let blocks = match &note.body {
            NoteBody::Plain(blocks) => blocks.clone(),
            NoteBody::Sealed(_) => approval
                .filter(|approval| approval.note_id == Some(note.id))
                .and_then(|approval| approval.content)
                .ok_or(NoteLockError::PinRequired)?,
        };

        Ok(Self {
            draft: Draft {
                title: note.title.clone(),
                subtitle: note.subtitle.clone(),
                color: note.color.clone(),
                blocks,
            },
            locked: note.is_locked(),
            lock_pin: None,
            history: HistoryBuffer::new(),
            burst: None,
            note,
        })
    }

    pub fn note_id(&self) -> NoteId {
        self.note.id
    }

    pub fn kind(&self) -> NoteKind {
        self.note.kind
    }

    pub fn title(&self) -> &str {
        &self.draft.title
    }

    pub fn subtitle(&self) -> &str {
        &self.draft.subtitle
    }

    pub fn color(&self) -> Option<&str> {
        self.draft.color.as_deref()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.draft.blocks
    }

    /// Whether the note will be sealed when the editor finishes.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn has_lock_pin(&self) -> bool {
        self.lock_pin.is_some()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.commit_field(Field::Title);
        self.draft.title = title.into();
    }

    pub fn set_subtitle(&mut self, subtitle: impl Into<String>) {
        self.commit_field(Field::Subtitle);
        self.draft.subtitle = subtitle.into();
    }

    /// Pick a palette color by name or value. Returns the stored value.
    pub fn set_color(&mut self, choice: &str) -> Result<&'static str> {
        let value = palette_color(choice).ok_or_else(|| {
            let names: Vec<&str> = NOTE_COLORS.iter().map(|(name, _)| *name).collect();
            NoteLockError::InvalidInput(format!(
                "Unknown color '{}'; choose one of {}",
                choice.trim(),
                names.join(", ")
            ))
        })?;
        self.commit();
        self.draft.color = Some(value.to_string());
        Ok(value)
    }

    pub fn add_block(&mut self, block: Block) -> Uuid {
        self.commit();
        let id = block.id;
        self.draft.blocks.push(block);
        id
    }

    pub fn remove_block(&mut self, id: Uuid) -> Result<Block> {
        let index = self.block_index(id)?;
        self.commit();
        Ok(self.draft.blocks.remove(index))
    }

    /// Flip a todo block. Returns the new checked state.
    pub fn toggle_block(&mut self, id: Uuid) -> Result<bool> {
        let index = self.block_index(id)?;
        if self.draft.blocks[index].kind != BlockKind::Todo {
            return Err(NoteLockError::InvalidInput(format!(
                "Block {} is not a todo",
                id
            )));
        }
        self.commit();
        let block = &mut self.draft.blocks[index];
        let checked = !block.checked.unwrap_or(false);
        block.checked = Some(checked);
        Ok(checked)
    }

    pub fn replace_blocks(&mut self, blocks: Vec<Block>) {
        self.commit();
        self.draft.blocks = blocks;
    }

    pub fn undo(&mut self) -> bool {
        self.burst = None;
        match self.history.pop() {
            Some(previous) => {
                self.draft = previous;
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    /// Protect the note with a new PIN. Takes effect when the editor finishes.
    pub fn lock_with_pin(&mut self, pin: &str) -> Result<()> {
        validate_pin(pin)?;
        self.locked = true;
        self.lock_pin = Some(Zeroizing::new(pin.to_string()));
        Ok(())
    }

    /// Remove protection; the note is saved as plaintext.
    pub fn unlock_in_place(&mut self) {
        self.locked = false;
        self.lock_pin = None;
    }

    /// Produce the note to persist.
    ///
    /// A locked note is sealed with the PIN given to [`lock_with_pin`], or
    /// `session_pin` when it was already locked on open.
    ///
    /// [`lock_with_pin`]: NoteEditor::lock_with_pin
    pub fn finish(self, cipher: &dyn CipherEngine, session_pin: Option<&str>) -> Result<Note> {
        let NoteEditor {
            mut note,
            draft,
            locked,
            lock_pin,
            ..
        } = self;

        note.body = if locked {
            let pin = match lock_pin.as_deref() {
                Some(pin) => pin.as_str(),
                None => {
                    let pin = session_pin.ok_or(NoteLockError::PinRequired)?;
                    // The session PIN may belong to another note.
                    if let Some(original) = note.blob() {
                        cipher
                            .open_bytes(original, pin)
                            .map_err(|_| NoteLockError::PinRequired)?;
                    }
                    pin
                }
            };
            NoteBody::Sealed(cipher.seal(&draft.blocks, pin)?)
        } else {
            NoteBody::Plain(draft.blocks)
        };
        note.title = draft.title;
        note.subtitle = draft.subtitle;
        note.color = draft.color;
        note.updated_at = Utc::now();
        Ok(note)
    }

    /// Snapshot once at the start of a run of edits to the same field.
    fn commit_field(&mut self, field: Field) {
        if self.burst != Some(field) {
            self.history.push(&self.draft);
            self.burst = Some(field);
        }
    }

    fn commit(&mut self) {
        self.history.push(&self.draft);
        self.burst = None;
    }

    fn block_index(&self, id: Uuid) -> Result<usize> {
        self.draft
            .blocks
            .iter()
            .position(|block| block.id == id)
            .ok_or_else(|| NoteLockError::InvalidInput(format!("No block {}", id)))
    }
}

impl std::fmt::Debug for NoteEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteEditor")
            .field("note_id", &self.note.id)
            .field("locked", &self.locked)
            .field("blocks", &self.draft.blocks.len())
            .finish_non_exhaustive()
    }
}
