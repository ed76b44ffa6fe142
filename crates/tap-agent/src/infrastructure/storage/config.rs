//! TOML-based configuration persistence for the agent.
//!
//! Reads and writes [`AgentConfig`] at the platform-appropriate location:
//! - Windows:  `%APPDATA%\InputTap\config.toml`
//! - Linux:    `~/.config/inputtap/config.toml`
//! - macOS:    `~/Library/Application Support/InputTap/config.toml`
//!
//! Every field carries a serde default so the agent works on first run
//! (before a config file exists) and keeps working when an older file is
//! missing newer fields.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tap_core::domain::translator::DEFAULT_MULTI_CLICK_INTERVAL_MS;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level agent configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AgentConfig {
    #[serde(default)]
    pub agent: GeneralSettings,
    #[serde(default)]
    pub wheel: WheelFallback,
}

/// General agent behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralSettings {
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Multi-click window in milliseconds.
    #[serde(default = "default_multi_click_interval_ms")]
    pub multi_click_interval_ms: u64,
}

/// Wheel configuration used when the OS setting cannot be queried (headless
/// runs, platforms without a native backend).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WheelFallback {
    /// Lines scrolled per wheel notch.
    #[serde(default = "default_scroll_lines")]
    pub scroll_lines: u16,
    /// `true` treats each notch as a whole page instead of lines.
    #[serde(default)]
    pub page_scroll: bool,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_multi_click_interval_ms() -> u64 {
    DEFAULT_MULTI_CLICK_INTERVAL_MS
}
fn default_scroll_lines() -> u16 {
    3
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            multi_click_interval_ms: default_multi_click_interval_ms(),
        }
    }
}

impl Default for WheelFallback {
    fn default() -> Self {
        Self {
            scroll_lines: default_scroll_lines(),
            page_scroll: false,
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot
/// be determined from the environment.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    let dir = platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)?;
    Ok(dir.join("config.toml"))
}

/// Loads [`AgentConfig`] from disk, returning the defaults if the file does
/// not yet exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config() -> Result<AgentConfig, ConfigError> {
    let path = config_file_path()?;

    match std::fs::read_to_string(&path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AgentConfig::default()),
        Err(e) => Err(ConfigError::Io { path, source: e }),
    }
}

/// Persists `config` to disk, creating the directory if needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(config: &AgentConfig) -> Result<(), ConfigError> {
    let path = config_file_path()?;

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(&path, content).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(())
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("InputTap"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME")
            .map(|h| PathBuf::from(h).join("Library/Application Support/InputTap"))
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("inputtap"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        // Arrange / Act
        let config: AgentConfig = toml::from_str("").expect("empty config should parse");

        // Assert
        assert_eq!(config, AgentConfig::default());
        assert_eq!(
            config.agent.multi_click_interval_ms,
            DEFAULT_MULTI_CLICK_INTERVAL_MS
        );
    }

    #[test]
    fn test_partial_toml_fills_missing_fields() {
        // Arrange
        let toml_text = r#"
            [agent]
            multi_click_interval_ms = 250
        "#;

        // Act
        let config: AgentConfig = toml::from_str(toml_text).expect("config should parse");

        // Assert
        assert_eq!(config.agent.multi_click_interval_ms, 250);
        assert_eq!(config.agent.log_level, "info");
        assert_eq!(config.wheel.scroll_lines, 3);
        assert!(!config.wheel.page_scroll);
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        // Arrange
        let mut config = AgentConfig::default();
        config.agent.log_level = "debug".to_string();
        config.wheel.page_scroll = true;

        // Act
        let text = toml::to_string_pretty(&config).expect("serialize should succeed");
        let back: AgentConfig = toml::from_str(&text).expect("reparse should succeed");

        // Assert
        assert_eq!(back, config);
    }

    #[test]
    fn test_malformed_toml_is_a_parse_error() {
        let result: Result<AgentConfig, _> = toml::from_str("[agent\nlog_level = 3");
        assert!(result.is_err());
    }
}
