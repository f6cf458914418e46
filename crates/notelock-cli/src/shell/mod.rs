//! Interactive note shell.
//!
//! Actions that need authentication hand the session manager a continuation
//! that forwards the approval into a channel; the shell applies whatever
//! arrived once the prompt is answered. Session events are handled while the
//! shell waits for input, so an auto-lock drops the decrypted working copy
//! as soon as it fires.

mod commands;

use std::time::Duration;

use anyhow::Context;
use clap::error::ErrorKind;
use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;
use tracing::{debug, info};

use notelock_core::{
    Approval, AuthKind, AuthStatus, Block, LockSessionManager, LockState, Note, NoteEditor,
    NoteId, NoteLockError, NoteStore, Notebook, Prompt, SessionEvent,
};

use crate::constants::MAX_PIN_ATTEMPTS;
use crate::errors::{describe, CliError};
use crate::ui::{
    badge, kv, note_table, print, print_error, Badge, PendingLine, Prompter, UiContext,
};

pub use commands::{PinCommand, ShellCommand, ShellLine};

/// Typed at a PIN prompt to use the biometric capability instead.
const BIOMETRIC_ANSWER: &str = "bio";

/// What to do once a request is approved.
#[derive(Debug)]
enum Action {
    Open(NoteId),
    Delete(NoteId),
    Unprotect,
}

struct Grant {
    action: Action,
    approval: Approval,
}

pub struct Shell {
    ui: UiContext,
    prompter: Prompter,
    manager: LockSessionManager,
    store: Box<dyn NoteStore>,
    book: Notebook,
    editor: Option<NoteEditor>,
    grants_tx: mpsc::UnboundedSender<Grant>,
    grants: mpsc::UnboundedReceiver<Grant>,
    events: broadcast::Receiver<SessionEvent>,
}

impl Shell {
    pub fn new(
        ui: UiContext,
        prompter: Prompter,
        manager: LockSessionManager,
        store: Box<dyn NoteStore>,
    ) -> anyhow::Result<Self> {
        let notes = store.load().map_err(describe).context("Failed to load notes")?;
        info!(count = notes.len(), "notes loaded");
        let (grants_tx, grants) = mpsc::unbounded_channel();
        let events = manager.subscribe();
        Ok(Self {
            ui,
            prompter,
            manager,
            store,
            book: Notebook::new(notes),
            editor: None,
            grants_tx,
            grants,
            events,
        })
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        if self.ui.is_interactive() {
            print("Type `help` for commands.");
        }

        loop {
            self.drain_events();
            let prompt = match &self.editor {
                Some(editor) => format!("notelock [{}]>", display_title(editor.title())),
                None => "notelock>".to_string(),
            };
            let read = self.prompter.spawn_line(&prompt);
            let Some(line) = self.next_line(read).await? else {
                break;
            };
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let command = match ShellLine::parse_line(line) {
                Ok(command) => command,
                Err(e) => {
                    self.report_parse_error(e);
                    continue;
                }
            };
            if command == ShellCommand::Quit {
                break;
            }
            if let Err(e) = self.execute(command).await {
                let hint = crate::errors::exit_status(&e).1;
                print_error(&self.ui, &format!("{:#}", e), hint);
            }
        }

        self.drain_events();
        if self.editor.is_some() {
            if let Err(e) = self.close_editor().await {
                print_error(&self.ui, &format!("{:#}", e), Some("Changes were not saved."));
            }
        }
        Ok(())
    }

    /// Wait for `read`, reacting to session events that arrive meanwhile.
    async fn next_line(&mut self, mut read: PendingLine) -> anyhow::Result<Option<String>> {
        loop {
            let received = tokio::select! {
                joined = &mut read => return joined?,
                received = self.events.recv() => received,
            };
            match received {
                Ok(event) => self.on_event(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "session events lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return read.await?,
            }
        }
    }

    async fn execute(&mut self, command: ShellCommand) -> anyhow::Result<()> {
        debug!(?command, "shell command");
        match command {
            ShellCommand::List => self.list(),
            ShellCommand::New { kind } => {
                self.require_no_editor()?;
                let id = self.book.create(kind);
                self.persist()?;
                let note = self.note(id)?.clone();
                self.editor = Some(NoteEditor::open(note, None).map_err(describe)?);
                print(&badge(&self.ui, Badge::Ok, "Created note"));
                Ok(())
            }
            ShellCommand::Open { number } => {
                self.require_no_editor()?;
                let note = self.note_at(number)?.clone();
                if note.is_locked() {
                    let id = note.id;
                    self.authorize(AuthKind::Unlock, Some(note), Action::Open(id))
                        .await
                } else {
                    self.editor = Some(NoteEditor::open(note, None).map_err(describe)?);
                    self.show()
                }
            }
            ShellCommand::Show => self.show(),
            ShellCommand::Title { text } => {
                self.editor_mut()?.set_title(text.join(" "));
                Ok(())
            }
            ShellCommand::Subtitle { text } => {
                self.editor_mut()?.set_subtitle(text.join(" "));
                Ok(())
            }
            ShellCommand::Color { name } => {
                let value = self.editor_mut()?.set_color(&name).map_err(describe)?;
                print(&kv(&self.ui, "Color", value));
                Ok(())
            }
            ShellCommand::Add { text } => {
                self.editor_mut()?.add_block(Block::text(text.join(" ")));
                Ok(())
            }
            ShellCommand::Todo { text } => {
                self.editor_mut()?.add_block(Block::todo(text.join(" "), false));
                Ok(())
            }
            ShellCommand::Check { block } => {
                let id = self.block_id(block)?;
                let checked = self.editor_mut()?.toggle_block(id).map_err(describe)?;
                print(if checked { "[x]" } else { "[ ]" });
                Ok(())
            }
            ShellCommand::RmBlock { block } => {
                let id = self.block_id(block)?;
                self.editor_mut()?.remove_block(id).map_err(describe)?;
                Ok(())
            }
            ShellCommand::Lock => {
                self.editor_mut()?;
                let pin = self.prompter.new_pin("New note PIN").await?;
                self.editor_mut()?.lock_with_pin(&pin).map_err(describe)?;
                print(&badge(
                    &self.ui,
                    Badge::Locked,
                    "Note will be sealed when it is closed",
                ));
                Ok(())
            }
            ShellCommand::Unprotect => {
                let (locked, id) = {
                    let editor = self.editor_mut()?;
                    (editor.is_locked(), editor.note_id())
                };
                if !locked {
                    return Err(CliError::invalid_input("The open note is not locked").into());
                }
                let note = self.note(id).ok().cloned();
                self.authorize(AuthKind::Edit, note, Action::Unprotect).await
            }
            ShellCommand::Close => self.close_editor().await,
            ShellCommand::Discard => {
                let editor = self.editor.take().ok_or_else(no_open_note)?;
                self.manager.end_editing(editor.note_id());
                print(&badge(&self.ui, Badge::Info, "Changes discarded"));
                Ok(())
            }
            ShellCommand::Delete { number } => {
                let note = self.note_at(number)?.clone();
                if self
                    .editor
                    .as_ref()
                    .is_some_and(|editor| editor.note_id() == note.id)
                {
                    return Err(CliError::invalid_input("Close the note before deleting it").into());
                }
                let question = format!("Delete \"{}\"?", note.display_title());
                if !self.prompter.confirm(&question).await? {
                    return Ok(());
                }
                let id = note.id;
                self.authorize(AuthKind::Delete, Some(note), Action::Delete(id))
                    .await
            }
            ShellCommand::Move { from, to } => {
                let mut order: Vec<NoteId> = self.book.notes().iter().map(|n| n.id).collect();
                let id = self.note_at(from)?.id;
                let target = position(to, order.len())?;
                order.remove(from - 1);
                order.insert(target, id);
                self.book.reorder(&order).map_err(describe)?;
                self.persist()
            }
            ShellCommand::Undo => {
                let undone = match self.editor.as_mut() {
                    Some(editor) => editor.undo(),
                    None => {
                        let undone = self.book.undo();
                        if undone {
                            self.persist()?;
                        }
                        undone
                    }
                };
                if !undone {
                    print(&badge(&self.ui, Badge::Info, "Nothing to undo"));
                }
                Ok(())
            }
            ShellCommand::LockApp => {
                self.manager.lock_now();
                self.drain_events();
                Ok(())
            }
            ShellCommand::Logout => {
                self.manager.logout();
                self.drain_events();
                Ok(())
            }
            ShellCommand::Status => self.status(),
            ShellCommand::Pin { action } => self.pin(action).await,
            ShellCommand::Quit => Ok(()),
        }
    }

    /// Run an action behind authentication, prompting if the session is closed.
    async fn authorize(
        &mut self,
        kind: AuthKind,
        note: Option<Note>,
        action: Action,
    ) -> anyhow::Result<()> {
        let tx = self.grants_tx.clone();
        let status = self
            .manager
            .require_auth(kind, note.as_ref(), move |approval| {
                let _ = tx.send(Grant { action, approval });
            })
            .await
            .map_err(describe)?;

        if let AuthStatus::PromptRequired(prompt) = status {
            self.answer(prompt).await?;
        }
        self.apply_grants().await
    }

    async fn answer(&mut self, prompt: Prompt) -> anyhow::Result<()> {
        let label = match &prompt.note_title {
            Some(title) => format!("PIN to {} \"{}\"", prompt.kind, title),
            None => format!("PIN to {}", prompt.kind),
        };
        if prompt.biometric_available && self.ui.is_interactive() {
            print(&crate::ui::hint(
                &self.ui,
                &format!("Type `{}` to use biometrics.", BIOMETRIC_ANSWER),
            ));
        }

        let mut attempts = 0;
        loop {
            attempts += 1;
            let pin = match self.prompter.pin(&label).await? {
                Some(pin) if !pin.trim().is_empty() => pin,
                _ => {
                    self.manager.cancel();
                    return Err(CliError::auth_failed("Authentication cancelled").into());
                }
            };

            let result = if prompt.biometric_available && pin.trim() == BIOMETRIC_ANSWER {
                self.manager.submit_biometric().await
            } else {
                self.manager.submit_pin(pin.trim()).await
            };

            match result {
                Ok(()) => return Ok(()),
                Err(err) if retryable(&err) && attempts < MAX_PIN_ATTEMPTS => {
                    print_error(&self.ui, &err.to_string(), None);
                }
                Err(err) => {
                    self.manager.cancel();
                    if attempts >= MAX_PIN_ATTEMPTS && retryable(&err) {
                        return Err(CliError::auth_failed_with_hint(
                            format!("{} (too many attempts)", err),
                            "The request was cancelled; run the command again.",
                        )
                        .into());
                    }
                    return Err(describe(err));
                }
            }
        }
    }

    async fn apply_grants(&mut self) -> anyhow::Result<()> {
        while let Ok(grant) = self.grants.try_recv() {
            self.apply(grant).await?;
        }
        Ok(())
    }

    async fn apply(&mut self, grant: Grant) -> anyhow::Result<()> {
        debug!(action = ?grant.action, method = ?grant.approval.method, "approved");
        match grant.action {
            Action::Open(id) => {
                let note = self.note(id)?.clone();
                let editor = NoteEditor::open(note, Some(grant.approval)).map_err(describe)?;
                self.editor = Some(editor);
                self.show()
            }
            Action::Delete(id) => {
                let note = self.book.delete(id).map_err(describe)?;
                self.persist()?;
                print(&badge(
                    &self.ui,
                    Badge::Ok,
                    &format!("Deleted \"{}\"", note.display_title()),
                ));
                Ok(())
            }
            Action::Unprotect => {
                let editor = self.editor_mut()?;
                editor.unlock_in_place();
                print(&badge(
                    &self.ui,
                    Badge::Ok,
                    "Protection removed; the note is saved as plain text",
                ));
                Ok(())
            }
        }
    }

    async fn close_editor(&mut self) -> anyhow::Result<()> {
        let editor = self.editor.take().ok_or_else(no_open_note)?;
        let note = self
            .manager
            .close_editor(editor)
            .await
            .map_err(describe)
            .context("Could not seal the note; changes were discarded")?;
        let locked = note.is_locked();
        let title = note.display_title().to_string();
        self.book.save(note);
        self.persist()?;

        let kind = if locked { Badge::Locked } else { Badge::Ok };
        print(&badge(&self.ui, kind, &format!("Saved \"{}\"", title)));
        Ok(())
    }

    async fn pin(&mut self, action: PinCommand) -> anyhow::Result<()> {
        match action {
            PinCommand::Set => {
                let pin = self.prompter.new_pin("Master PIN").await?;
                self.manager
                    .provision_master_pin(&pin)
                    .map_err(describe)?;
                print(&badge(&self.ui, Badge::Ok, "Master PIN set"));
            }
            PinCommand::Change => {
                let current = self
                    .prompter
                    .pin("Current master PIN")
                    .await?
                    .ok_or_else(|| anyhow::anyhow!("No PIN provided"))?;
                let new_pin = self.prompter.new_pin("New master PIN").await?;
                self.manager
                    .change_master_pin(&current, &new_pin)
                    .map_err(describe)?;
                print(&badge(&self.ui, Badge::Ok, "Master PIN changed"));
            }
        }
        Ok(())
    }

    fn drain_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(event) => self.on_event(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    debug!(skipped, "session events lagged");
                }
                Err(_) => break,
            }
        }
    }

    fn on_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::AutoLocked { discard } => self.on_locked("Session auto-locked", discard),
            SessionEvent::Locked { discard, .. } => self.on_locked("Session locked", discard),
            _ => {}
        }
    }

    fn on_locked(&mut self, message: &str, discard: Option<NoteId>) {
        let drop_editor = discard.is_some_and(|id| {
            self.editor
                .as_ref()
                .is_some_and(|editor| editor.note_id() == id)
        });
        if drop_editor {
            self.editor = None;
            print(&badge(
                &self.ui,
                Badge::Warn,
                &format!("{}; unsaved changes to the locked note were discarded", message),
            ));
        } else {
            print(&badge(&self.ui, Badge::Info, message));
        }
    }

    fn list(&self) -> anyhow::Result<()> {
        if self.book.is_empty() {
            print("No notes.");
        } else {
            print(&note_table(&self.ui, self.book.notes()));
        }
        Ok(())
    }

    fn show(&self) -> anyhow::Result<()> {
        let editor = self.editor.as_ref().ok_or_else(no_open_note)?;
        print(&display_title(editor.title()));
        if !editor.subtitle().is_empty() {
            print(editor.subtitle());
        }
        if let Some(color) = editor.color() {
            print(&kv(&self.ui, "Color", color));
        }
        for (index, block) in editor.blocks().iter().enumerate() {
            let marker = match block.checked {
                Some(true) => "[x] ",
                Some(false) => "[ ] ",
                None => "",
            };
            print(&format!("{}. {}{}", index + 1, marker, block.text));
        }
        Ok(())
    }

    fn status(&self) -> anyhow::Result<()> {
        let session = match self.manager.state() {
            LockState::Locked => "locked".to_string(),
            LockState::AwaitingAuth { kind, .. } => format!("awaiting PIN to {}", kind),
            LockState::Unlocked { until } => {
                let left = until.saturating_duration_since(Instant::now());
                format!("unlocked ({} left)", format_remaining(left))
            }
        };
        print(&kv(&self.ui, "Session", &session));
        let master = if self.manager.has_master_pin() {
            "set"
        } else {
            "not set"
        };
        print(&kv(&self.ui, "Master PIN", master));
        print(&kv(&self.ui, "Notes", &self.book.len().to_string()));
        if let Some(editor) = &self.editor {
            print(&kv(&self.ui, "Open note", &display_title(editor.title())));
        }
        Ok(())
    }

    fn report_parse_error(&self, e: clap::Error) {
        match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                print(e.to_string().trim_end());
            }
            _ => {
                let rendered = e.to_string();
                let message = rendered
                    .lines()
                    .next()
                    .unwrap_or("invalid command")
                    .trim_start_matches("error: ");
                print_error(&self.ui, message, Some("Type `help` for commands."));
            }
        }
    }

    fn persist(&self) -> anyhow::Result<()> {
        self.store
            .save_all(self.book.notes())
            .map_err(describe)
            .context("Failed to save notes")
    }

    fn note(&self, id: NoteId) -> anyhow::Result<&Note> {
        self.book
            .get(id)
            .ok_or_else(|| describe(NoteLockError::NoteNotFound(id)))
    }

    fn note_at(&self, number: usize) -> anyhow::Result<&Note> {
        let index = position(number, self.book.len())?;
        Ok(&self.book.notes()[index])
    }

    fn editor_mut(&mut self) -> anyhow::Result<&mut NoteEditor> {
        self.editor.as_mut().ok_or_else(no_open_note)
    }

    fn require_no_editor(&self) -> anyhow::Result<()> {
        match &self.editor {
            Some(_) => Err(CliError::invalid_input(
                "A note is already open; `close` or `discard` it first",
            )
            .into()),
            None => Ok(()),
        }
    }

    fn block_id(&self, number: usize) -> anyhow::Result<uuid::Uuid> {
        let editor = self.editor.as_ref().ok_or_else(no_open_note)?;
        let index = position(number, editor.blocks().len())?;
        Ok(editor.blocks()[index].id)
    }
}

fn no_open_note() -> anyhow::Error {
    CliError::invalid_input("No note is open; use `open <n>` or `new`").into()
}

/// 1-based list position to index.
fn position(number: usize, len: usize) -> anyhow::Result<usize> {
    if number == 0 || number > len {
        return Err(CliError::not_found(
            format!("No item {}", number),
            format!("Choose a number between 1 and {}.", len),
        )
        .into());
    }
    Ok(number - 1)
}

fn retryable(err: &NoteLockError) -> bool {
    err.is_recoverable() || matches!(err, NoteLockError::InvalidInput(_))
}

fn display_title(title: &str) -> String {
    if title.trim().is_empty() {
        "(untitled)".to_string()
    } else {
        title.to_string()
    }
}

fn format_remaining(left: Duration) -> String {
    let secs = left.as_secs();
    format!("{}m{:02}s", secs / 60, secs % 60)
}
