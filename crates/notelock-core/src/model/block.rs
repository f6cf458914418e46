use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of a content block inside a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Text,
    Subtitle,
    Bullet,
    Number,
    Letter,
    Todo,
}

/// One unit of note content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
}

impl Block {
    pub fn new(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            text: text.into(),
            checked: matches!(kind, BlockKind::Todo).then_some(false),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(BlockKind::Text, text)
    }

    pub fn todo(text: impl Into<String>, checked: bool) -> Self {
        Self {
            checked: Some(checked),
            ..Self::new(BlockKind::Todo, text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_block_deserializes() {
        let block: Block = serde_json::from_str(r#"{"type":"text","text":"hello"}"#).unwrap();
        assert_eq!(block.kind, BlockKind::Text);
        assert_eq!(block.text, "hello");
        assert_eq!(block.checked, None);
    }

    #[test]
    fn test_todo_carries_checked_state() {
        let block = Block::todo("milk", true);
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value["type"], "todo");
        assert_eq!(value["checked"], true);
        assert_eq!(Block::new(BlockKind::Todo, "eggs").checked, Some(false));
    }
}
