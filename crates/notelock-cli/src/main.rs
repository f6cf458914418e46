//! Notelock CLI - PIN-protected notes with an auto-locking session
//!
//! Thin interactive front end over `notelock-core`: the shell renders
//! prompts for the session manager and persists notes to a JSON file.

mod cli;
mod config;
mod constants;
mod errors;
mod shell;
mod ui;

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use notelock_core::{
    BiometricCapability, JsonFileStore, LockSessionManager, NoBiometrics, NoteStore,
    StaticBiometric,
};

use crate::cli::{Cli, Commands};
use crate::config::{default_config_path, load_config, write_config, NotelockConfig};
use crate::constants::LOG_ENV;
use crate::errors::{describe, exit_status};
use crate::shell::Shell;
use crate::ui::{badge, hint, note_table, print, print_error, Badge, Prompter, UiContext};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let ui = UiContext::from_env(cli.no_color, cli.ascii);

    if let Err(e) = run(&cli, &ui).await {
        let (code, error_hint) = exit_status(&e);
        print_error(&ui, &format!("{:#}", e), error_hint);
        std::process::exit(code);
    }
}

/// Logs go to stderr, filtered by `NOTELOCK_LOG` or the `-v` count.
fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: &Cli, ui: &UiContext) -> anyhow::Result<()> {
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };

    match cli.command.as_ref().unwrap_or(&Commands::Shell) {
        Commands::Init { force } => init(ui, &config_path, cli, *force),
        Commands::List => {
            let config = load_config(&config_path)?;
            let store = JsonFileStore::new(config.notes_path(cli.notes.as_deref())?);
            let notes = store.load().map_err(describe)?;
            if notes.is_empty() {
                print("No notes.");
            } else {
                print(&note_table(ui, &notes));
            }
            Ok(())
        }
        Commands::Shell => {
            let config = load_config(&config_path)?;
            let notes_path = config.notes_path(cli.notes.as_deref())?;
            tracing::info!(path = %notes_path.display(), "using notes file");

            let cipher = config.cipher_config().build().map_err(describe)?;
            let biometric: Arc<dyn BiometricCapability> = if cli.fake_biometric {
                Arc::new(StaticBiometric::approving())
            } else {
                Arc::new(NoBiometrics)
            };
            let manager =
                LockSessionManager::new(config.session_config()?, Arc::new(cipher), biometric);
            let store = JsonFileStore::new(notes_path);

            let mut shell = Shell::new(
                ui.clone(),
                Prompter::new(ui.is_interactive()),
                manager,
                Box::new(store),
            )?;
            shell.run().await
        }
    }
}

fn init(ui: &UiContext, config_path: &Path, cli: &Cli, force: bool) -> anyhow::Result<()> {
    if config_path.exists() && !force {
        return Err(errors::CliError::invalid_input(format!(
            "Config already exists at {}",
            config_path.display()
        ))
        .into());
    }
    let config = NotelockConfig::default();
    let notes_path = config.notes_path(cli.notes.as_deref())?;
    write_config(config_path, &NotelockConfig::new(&notes_path))?;

    print(&badge(
        ui,
        Badge::Ok,
        &format!("Wrote {}", config_path.display()),
    ));
    print(&hint(ui, "Run `notelock` to open the shell."));
    Ok(())
}
