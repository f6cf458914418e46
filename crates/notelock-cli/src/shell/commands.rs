//! Grammar of the interactive shell, parsed with clap.

use clap::{Parser, Subcommand};

use notelock_core::NoteKind;

#[derive(Debug, Parser)]
#[command(
    name = "",
    no_binary_name = true,
    disable_version_flag = true,
    help_template = "{subcommands}"
)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum ShellCommand {
    /// List notes
    #[command(visible_alias = "ls")]
    List,

    /// Create a note and open it
    New {
        /// text, checklist, links, workout or tasks
        #[arg(default_value = "text")]
        kind: NoteKind,
    },

    /// Open note <n> from the list
    Open { number: usize },

    /// Print the open note
    Show,

    /// Set the title of the open note
    Title {
        #[arg(trailing_var_arg = true, num_args = 0..)]
        text: Vec<String>,
    },

    /// Set the subtitle of the open note
    Subtitle {
        #[arg(trailing_var_arg = true, num_args = 0..)]
        text: Vec<String>,
    },

    /// Color the open note: default, blue, green, purple, orange, red or teal
    Color { name: String },

    /// Append a text block
    Add {
        #[arg(trailing_var_arg = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Append a todo block
    Todo {
        #[arg(trailing_var_arg = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Toggle todo block <n>
    Check { block: usize },

    /// Remove block <n>
    RmBlock { block: usize },

    /// Protect the open note with a PIN
    Lock,

    /// Remove PIN protection from the open note
    Unprotect,

    /// Save and close the open note
    Close,

    /// Close the open note without saving
    Discard,

    /// Delete note <n>
    Delete { number: usize },

    /// Move note <from> to position <to>
    Move { from: usize, to: usize },

    /// Undo the last change
    Undo,

    /// Lock the session now
    LockApp,

    /// End the session and forget the cached PIN
    Logout,

    /// Show session state
    Status,

    /// Manage the master PIN
    Pin {
        #[command(subcommand)]
        action: PinCommand,
    },

    /// Leave the shell
    #[command(visible_alias = "exit")]
    Quit,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum PinCommand {
    /// Set the master PIN
    Set,
    /// Change the master PIN
    Change,
}

impl ShellLine {
    pub fn parse_line(line: &str) -> Result<ShellCommand, clap::Error> {
        ShellLine::try_parse_from(line.split_whitespace()).map(|parsed| parsed.command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(ShellLine::parse_line("ls").unwrap(), ShellCommand::List);
        assert_eq!(
            ShellLine::parse_line("open 2").unwrap(),
            ShellCommand::Open { number: 2 }
        );
        assert_eq!(
            ShellLine::parse_line("move 3 1").unwrap(),
            ShellCommand::Move { from: 3, to: 1 }
        );
        assert_eq!(
            ShellLine::parse_line("pin change").unwrap(),
            ShellCommand::Pin {
                action: PinCommand::Change
            }
        );
    }

    #[test]
    fn test_text_arguments_are_collected() {
        assert_eq!(
            ShellLine::parse_line("add buy milk --today").unwrap(),
            ShellCommand::Add {
                text: vec!["buy".into(), "milk".into(), "--today".into()]
            }
        );
    }

    #[test]
    fn test_note_kind_defaults_to_text() {
        assert_eq!(
            ShellLine::parse_line("new").unwrap(),
            ShellCommand::New {
                kind: NoteKind::Text
            }
        );
        assert!(ShellLine::parse_line("new diary").is_err());
    }

    #[test]
    fn test_color_takes_one_name() {
        assert_eq!(
            ShellLine::parse_line("color teal").unwrap(),
            ShellCommand::Color {
                name: "teal".to_string()
            }
        );
        assert!(ShellLine::parse_line("color").is_err());
    }

    #[test]
    fn test_unknown_command_is_error() {
        assert!(ShellLine::parse_line("frobnicate").is_err());
    }
}
