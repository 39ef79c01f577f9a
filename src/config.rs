//! Configuration for detection, the completion provider, and partitioning.
//!
//! Persisted as TOML in `$XDG_CONFIG_HOME/fihris/config.toml`. Every field
//! has a default, so a partial file (or no file at all) is valid.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading or saving configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("cannot determine home directory")]
    #[diagnostic(
        code(fihris::config::no_home),
        help("Set HOME or XDG_CONFIG_HOME, or pass --config explicitly.")
    )]
    NoHome,

    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(fihris::config::read),
        help("Check that the file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {message}")]
    #[diagnostic(
        code(fihris::config::parse),
        help("The file must be valid TOML with [detector], [provider] and [content] tables.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(fihris::config::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FihrisConfig {
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub content: ContentConfig,
}

/// Thresholds and windows used by the detection strategies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Minimum entries for an embedded or pattern TOC to be accepted.
    #[serde(default = "default_min_entries")]
    pub min_entries: usize,
    /// Lines scanned after a TOC header.
    #[serde(default = "default_toc_window_lines")]
    pub toc_window_lines: usize,
    /// Leading characters searched for title and author.
    #[serde(default = "default_book_info_chars")]
    pub book_info_chars: usize,
    /// Leading characters sent to the provider when no TOC section is found.
    #[serde(default = "default_semantic_fallback_chars")]
    pub semantic_fallback_chars: usize,
    /// Lines per page inspected by the layout heuristic.
    #[serde(default = "default_heuristic_lines_per_page")]
    pub heuristic_lines_per_page: usize,
}

fn default_min_entries() -> usize {
    3
}
fn default_toc_window_lines() -> usize {
    100
}
fn default_book_info_chars() -> usize {
    5000
}
fn default_semantic_fallback_chars() -> usize {
    20_000
}
fn default_heuristic_lines_per_page() -> usize {
    5
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_entries: default_min_entries(),
            toc_window_lines: default_toc_window_lines(),
            book_info_chars: default_book_info_chars(),
            semantic_fallback_chars: default_semantic_fallback_chars(),
            heuristic_lines_per_page: default_heuristic_lines_per_page(),
        }
    }
}

/// Which completion provider backs semantic parsing.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Semantic parsing disabled.
    #[default]
    None,
    Ollama,
    Anthropic,
    #[value(name = "openai")]
    OpenAi,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Ollama => "ollama",
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
        })
    }
}

/// Provider selection; unset fields fall back to each client's defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub kind: ProviderKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Environment variable holding the API key for hosted providers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::None,
            model: None,
            base_url: None,
            timeout_secs: default_timeout_secs(),
            api_key_env: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Run display cleanup over partitioned bodies.
    #[serde(default)]
    pub clean_content: bool,
}

impl FihrisConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Save to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Load `path` if given, else the default config file if it exists,
    /// else defaults.
    pub fn load_or_default(path: Option<&Path>) -> ConfigResult<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let default_path = match config_file() {
            Ok(p) => p,
            Err(ConfigError::NoHome) => return Ok(Self::default()),
            Err(e) => return Err(e),
        };
        if default_path.exists() {
            Self::load(&default_path)
        } else {
            tracing::debug!(path = %default_path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }
}

/// `$XDG_CONFIG_HOME/fihris/config.toml`, falling back to `~/.config`.
pub fn config_file() -> ConfigResult<PathBuf> {
    let config_home = match std::env::var("XDG_CONFIG_HOME") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => std::env::var("HOME")
            .map(|home| PathBuf::from(home).join(".config"))
            .map_err(|_| ConfigError::NoHome)?,
    };
    Ok(config_home.join("fihris").join("config.toml"))
}
