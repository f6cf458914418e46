//! UI context for environment detection.

use std::io::IsTerminal;

/// Terminal and environment context for UI decisions.
#[derive(Debug, Clone)]
pub struct UiContext {
    /// Whether stdout is a TTY
    pub is_tty: bool,
    /// Whether color output is enabled
    pub color: bool,
    /// Whether unicode symbols are enabled
    pub unicode: bool,
}

impl UiContext {
    pub fn from_env(no_color_flag: bool, ascii_flag: bool) -> Self {
        let is_tty = std::io::stdout().is_terminal();
        let term_is_dumb = std::env::var("TERM").map(|v| v == "dumb").unwrap_or(false);
        let no_color_env = std::env::var("NO_COLOR").is_ok();

        Self {
            is_tty,
            color: is_tty && !no_color_flag && !no_color_env && !term_is_dumb,
            unicode: !ascii_flag,
        }
    }

    /// Human-oriented output: tables and badges instead of `key=value` lines.
    pub fn is_pretty(&self) -> bool {
        self.is_tty
    }

    /// Whether prompts can use the terminal directly.
    pub fn is_interactive(&self) -> bool {
        self.is_tty && std::io::stdin().is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_disables_unicode() {
        let ctx = UiContext::from_env(false, true);
        assert!(!ctx.unicode);
    }

    #[test]
    fn test_no_color_disables_color() {
        let ctx = UiContext::from_env(true, false);
        assert!(!ctx.color);
    }
}
