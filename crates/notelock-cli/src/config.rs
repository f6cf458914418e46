//! `config.toml` loading and default paths.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use notelock_core::config::{DEFAULT_SESSION_DURATION, MAX_SESSION_DURATION};
use notelock_core::crypto::DEFAULT_ITERATIONS;
use notelock_core::{CipherConfig, MasterPinPolicy, SessionConfig};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct NotelockConfig {
    #[serde(default)]
    pub notes: NotesSection,
    #[serde(default)]
    pub security: SecuritySection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct NotesSection {
    pub path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySection {
    pub auto_lock_minutes: u64,
    pub kdf_iterations: u32,
    pub master_pin_policy: MasterPinPolicy,
}

impl Default for SecuritySection {
    fn default() -> Self {
        Self {
            auto_lock_minutes: DEFAULT_SESSION_DURATION.as_secs() / 60,
            kdf_iterations: DEFAULT_ITERATIONS,
            master_pin_policy: MasterPinPolicy::default(),
        }
    }
}

impl NotelockConfig {
    pub fn new(notes_path: &Path) -> Self {
        Self {
            notes: NotesSection {
                path: Some(notes_path.to_string_lossy().to_string()),
            },
            security: SecuritySection::default(),
        }
    }

    pub fn session_config(&self) -> anyhow::Result<SessionConfig> {
        let minutes = self.security.auto_lock_minutes;
        let max_minutes = MAX_SESSION_DURATION.as_secs() / 60;
        let window = Some(minutes)
            .filter(|minutes| (1..=max_minutes).contains(minutes))
            .and_then(|minutes| minutes.checked_mul(60))
            .map(Duration::from_secs)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "security.auto_lock_minutes must be between 1 and {} (got {})",
                    max_minutes,
                    minutes
                )
            })?;
        Ok(SessionConfig::default()
            .with_session_duration(window)
            .with_master_pin_policy(self.security.master_pin_policy))
    }

    pub fn cipher_config(&self) -> CipherConfig {
        CipherConfig {
            iterations: self.security.kdf_iterations,
        }
    }

    /// Notes file: explicit override, then config, then the XDG default.
    pub fn notes_path(&self, explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        match &self.notes.path {
            Some(path) if !path.trim().is_empty() => Ok(PathBuf::from(path)),
            _ => default_notes_path(),
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_notes_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("notes.json"))
}

/// Read the config, or defaults when the file does not exist.
pub fn load_config(path: &Path) -> anyhow::Result<NotelockConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file; using defaults");
        return Ok(NotelockConfig::default());
    }
    read_config(path)
}

pub fn read_config(path: &Path) -> anyhow::Result<NotelockConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(path: &Path, config: &NotelockConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", &[".config"])
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    xdg_dir("XDG_DATA_HOME", &[".local", "share"])
}

fn xdg_dir(var: &str, fallback: &[&str]) -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var(var) {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("notelock"));
        }
    }
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    let mut dir = PathBuf::from(home);
    dir.extend(fallback);
    Ok(dir.join("notelock"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: NotelockConfig = toml::from_str("").unwrap();
        assert_eq!(config.security.auto_lock_minutes, 2);
        assert_eq!(config.security.kdf_iterations, 100_000);
        assert_eq!(config.security.master_pin_policy, MasterPinPolicy::AdoptFirst);
        assert!(config.notes.path.is_none());
    }

    #[test]
    fn test_full_config_parses() {
        let config: NotelockConfig = toml::from_str(
            r#"
[notes]
path = "/tmp/notes.json"

[security]
auto_lock_minutes = 5
kdf_iterations = 200000
master_pin_policy = "require_provisioned"
"#,
        )
        .unwrap();

        let session = config.session_config().unwrap();
        assert_eq!(session.session_duration, Duration::from_secs(300));
        assert_eq!(
            session.master_pin_policy,
            MasterPinPolicy::RequireProvisioned
        );
        assert_eq!(config.cipher_config().iterations, 200_000);
        assert_eq!(
            config.notes_path(None).unwrap(),
            PathBuf::from("/tmp/notes.json")
        );
    }

    #[test]
    fn test_zero_auto_lock_is_rejected() {
        let config: NotelockConfig =
            toml::from_str("[security]\nauto_lock_minutes = 0\n").unwrap();
        assert!(config.session_config().is_err());
    }

    #[test]
    fn test_oversized_auto_lock_is_rejected() {
        let config: NotelockConfig =
            toml::from_str("[security]\nauto_lock_minutes = 9223372036854775807\n").unwrap();
        assert!(config.session_config().is_err());

        let config: NotelockConfig =
            toml::from_str("[security]\nauto_lock_minutes = 1440\n").unwrap();
        assert_eq!(
            config.session_config().unwrap().session_duration,
            MAX_SESSION_DURATION
        );
    }

    #[test]
    fn test_explicit_notes_path_wins() {
        let config = NotelockConfig::new(Path::new("/from/config.json"));
        let explicit = PathBuf::from("/from/flag.json");
        assert_eq!(config.notes_path(Some(&explicit)).unwrap(), explicit);
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notelock").join("config.toml");
        write_config(&path, &NotelockConfig::new(Path::new("/n.json"))).unwrap();

        let config = read_config(&path).unwrap();
        assert_eq!(config.notes.path.as_deref(), Some("/n.json"));
    }
}
