//! Note data model.

pub mod block;
pub mod note;

pub use block::{Block, BlockKind};
pub use note::{palette_color, Note, NoteBody, NoteId, NoteKind, NoteRecord, NOTE_COLORS};
