//! Note records.
//!
//! A note's content is either plaintext blocks or a sealed blob, never both.
//! The persisted record keeps the `isLocked` / `content` / `encryptedContent`
//! field layout; conversion through [`NoteRecord`] enforces the invariant on
//! the way in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::block::Block;
use crate::crypto::EncryptedBlob;

pub type NoteId = Uuid;

/// Colors a note can be given, as `(name, stored value)`.
pub const NOTE_COLORS: [(&str, &str); 7] = [
    ("default", "#1e1e1e"),
    ("blue", "#1e3a8a"),
    ("green", "#064e3b"),
    ("purple", "#4c1d95"),
    ("orange", "#7c2d12"),
    ("red", "#7f1d1d"),
    ("teal", "#134e4a"),
];

/// Resolve a palette name or stored value, ignoring case.
pub fn palette_color(choice: &str) -> Option<&'static str> {
    let choice = choice.trim();
    NOTE_COLORS
        .iter()
        .find(|(name, value)| {
            name.eq_ignore_ascii_case(choice) || value.eq_ignore_ascii_case(choice)
        })
        .map(|(_, value)| *value)
}

/// Note layout chosen when the note is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
    Text,
    Checklist,
    Links,
    Workout,
    Tasks,
}

impl std::str::FromStr for NoteKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(NoteKind::Text),
            "checklist" => Ok(NoteKind::Checklist),
            "links" => Ok(NoteKind::Links),
            "workout" => Ok(NoteKind::Workout),
            "tasks" => Ok(NoteKind::Tasks),
            other => Err(format!("unknown note type: {}", other)),
        }
    }
}

/// Note content: plaintext at rest only while unlocked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteBody {
    Plain(Vec<Block>),
    Sealed(EncryptedBlob),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NoteRecord", into = "NoteRecord")]
pub struct Note {
    pub id: NoteId,
    pub kind: NoteKind,
    pub title: String,
    pub subtitle: String,
    pub color: Option<String>,
    pub body: NoteBody,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// A fresh, unlocked, empty note.
    pub fn new(kind: NoteKind) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            kind,
            title: String::new(),
            subtitle: String::new(),
            color: None,
            body: NoteBody::Plain(Vec::new()),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self.body, NoteBody::Sealed(_))
    }

    /// Plaintext blocks, or `None` for a locked note.
    pub fn blocks(&self) -> Option<&[Block]> {
        match &self.body {
            NoteBody::Plain(blocks) => Some(blocks),
            NoteBody::Sealed(_) => None,
        }
    }

    pub fn blob(&self) -> Option<&EncryptedBlob> {
        match &self.body {
            NoteBody::Sealed(blob) => Some(blob),
            NoteBody::Plain(_) => None,
        }
    }

    /// Display title, falling back for untitled notes.
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "(untitled)"
        } else {
            &self.title
        }
    }
}

/// Persisted shape of a [`Note`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    pub id: NoteId,
    #[serde(rename = "type")]
    pub kind: NoteKind,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<Block>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_content: Option<EncryptedBlob>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<NoteRecord> for Note {
    type Error = String;

    fn try_from(record: NoteRecord) -> Result<Self, Self::Error> {
        let body = match (record.is_locked, record.content, record.encrypted_content) {
            (true, None, Some(blob)) => NoteBody::Sealed(blob),
            (true, Some(_), _) => {
                return Err(format!("locked note {} carries plaintext content", record.id))
            }
            (true, None, None) => {
                return Err(format!("locked note {} has no encrypted content", record.id))
            }
            (false, content, None) => NoteBody::Plain(content.unwrap_or_default()),
            (false, _, Some(_)) => {
                return Err(format!(
                    "unlocked note {} carries encrypted content",
                    record.id
                ))
            }
        };

        Ok(Note {
            id: record.id,
            kind: record.kind,
            title: record.title,
            subtitle: record.subtitle,
            color: record.color,
            body,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

impl From<Note> for NoteRecord {
    fn from(note: Note) -> Self {
        let (is_locked, content, encrypted_content) = match note.body {
            NoteBody::Plain(blocks) => (false, Some(blocks), None),
            NoteBody::Sealed(blob) => (true, None, Some(blob)),
        };
        NoteRecord {
            id: note.id,
            kind: note.kind,
            title: note.title,
            subtitle: note.subtitle,
            color: note.color,
            is_locked,
            content,
            encrypted_content,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}
