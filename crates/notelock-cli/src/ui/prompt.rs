//! Line and PIN input.
//!
//! On a terminal PINs are read without echo through dialoguer. Piped input
//! is read line by line, so scripted sessions can answer PIN prompts.

use std::io::{self, BufRead, Write};

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Password};
use tokio::task::JoinHandle;
use zeroize::Zeroizing;

/// A line read in flight; `None` at end of input.
pub type PendingLine = JoinHandle<anyhow::Result<Option<String>>>;

#[derive(Debug, Clone, Copy)]
pub struct Prompter {
    interactive: bool,
}

impl Prompter {
    pub fn new(interactive: bool) -> Self {
        Self { interactive }
    }

    /// Next input line, or `None` at end of input.
    pub async fn line(&self, prompt: &str) -> anyhow::Result<Option<String>> {
        self.spawn_line(prompt).await?
    }

    /// Start reading the next line; the caller may do other work meanwhile.
    pub fn spawn_line(&self, prompt: &str) -> PendingLine {
        let prompt = self.interactive.then(|| prompt.to_string());
        tokio::task::spawn_blocking(move || read_line(prompt.as_deref()))
    }

    /// Read a PIN. `None` at end of input.
    pub async fn pin(&self, prompt: &str) -> anyhow::Result<Option<Zeroizing<String>>> {
        if !self.interactive {
            return Ok(self.line(prompt).await?.map(Zeroizing::new));
        }
        let prompt = prompt.to_string();
        tokio::task::spawn_blocking(move || {
            Password::with_theme(&ColorfulTheme::default())
                .with_prompt(prompt)
                .allow_empty_password(true)
                .interact()
                .map(|pin| Some(Zeroizing::new(pin)))
                .map_err(|e| anyhow::anyhow!("Failed to read PIN: {}", e))
        })
        .await?
    }

    /// Read a new PIN twice and require both entries to match.
    pub async fn new_pin(&self, prompt: &str) -> anyhow::Result<Zeroizing<String>> {
        let first = self
            .pin(prompt)
            .await?
            .ok_or_else(|| anyhow::anyhow!("No PIN provided"))?;
        let second = self
            .pin("Confirm PIN")
            .await?
            .ok_or_else(|| anyhow::anyhow!("No PIN provided"))?;
        if *first != *second {
            return Err(crate::errors::CliError::invalid_input("PINs do not match").into());
        }
        Ok(first)
    }

    /// Yes/no question. Piped input answers with `y` or `yes`.
    pub async fn confirm(&self, prompt: &str) -> anyhow::Result<bool> {
        if !self.interactive {
            let answer = self.line(prompt).await?.unwrap_or_default();
            return Ok(matches!(
                answer.trim().to_ascii_lowercase().as_str(),
                "y" | "yes"
            ));
        }
        let prompt = prompt.to_string();
        tokio::task::spawn_blocking(move || {
            Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt(prompt)
                .default(false)
                .interact()
                .map_err(|e| anyhow::anyhow!("Failed to read answer: {}", e))
        })
        .await?
    }
}

fn read_line(prompt: Option<&str>) -> anyhow::Result<Option<String>> {
    if let Some(prompt) = prompt {
        print!("{} ", prompt);
        io::stdout().flush()?;
    }
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let trimmed = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(trimmed);
    Ok(Some(line))
}
