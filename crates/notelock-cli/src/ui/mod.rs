//! UI primitives for the notelock CLI.
//!
//! - **Context**: environment detection (TTY, color, unicode)
//! - **Theme**: badges and styling
//! - **Render**: tables, hints and error lines
//! - **Prompt**: command lines, PINs and confirmations

mod context;
pub mod prompt;
pub mod render;
pub mod theme;

pub use context::UiContext;
pub use prompt::{PendingLine, Prompter};
pub use render::{badge, hint, kv, note_table, print, print_error};
pub use theme::Badge;
