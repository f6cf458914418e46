use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use notelock_core::VERSION;

/// Notelock - PIN-protected notes with an auto-locking session
#[derive(Debug, Parser)]
#[command(name = "notelock")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the notes file
    #[arg(short, long, global = true, env = "NOTELOCK_NOTES")]
    pub notes: Option<PathBuf>,

    /// Path to config.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Act as if biometric hardware is present and approves every check
    #[arg(long, global = true)]
    pub fake_biometric: bool,

    /// Increase log verbosity (logs go to stderr)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Use ASCII symbols only
    #[arg(long, global = true)]
    pub ascii: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the interactive shell (default)
    Shell,

    /// List notes without unlocking anything
    List,

    /// Write a config file with default settings
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_shell_is_default() {
        let cli = Cli::try_parse_from(["notelock", "-vv", "--fake-biometric"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 2);
        assert!(cli.fake_biometric);
    }

    #[test]
    fn test_global_notes_flag() {
        let cli = Cli::try_parse_from(["notelock", "list", "--notes", "/tmp/n.json"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::List)));
        assert_eq!(cli.notes, Some(PathBuf::from("/tmp/n.json")));
    }
}
