use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::link::OperatingSystem;

const VALID_OS_SETTINGS: &[&str] = &["auto", "posix", "windows"];

/// Default configuration, as printed by `--print-default-config`.
const DEFAULT_CONFIG_TOML: &str = r#"[links]
# Cache resolver results between detection passes.
enable_caching = true
# Quiet period (ms) after the last detection pass before the cache is cleared.
cache_ttl_ms = 10000
# Wrapped lines longer than this many characters are not scanned.
max_line_length = 2000
# Path grammar: "auto", "posix" or "windows".
os = "auto"

[terminal]
columns = 80

[workspace]
# Absolute paths of workspace root folders.
folders = []
ignore_path_casing = false
"#;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    pub links: LinksConfig,
    pub terminal: TerminalConfig,
    pub workspace: WorkspaceConfig,
}

/// Link detection configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LinksConfig {
    pub enable_caching: bool,
    pub cache_ttl_ms: u64,
    pub max_line_length: usize,
    pub os: OsSetting,
}

/// Which path grammar to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsSetting {
    Auto,
    Posix,
    Windows,
}

impl OsSetting {
    /// The concrete platform, with `Auto` meaning the compile target.
    pub fn resolve(self) -> OperatingSystem {
        match self {
            OsSetting::Auto => OperatingSystem::current(),
            OsSetting::Posix => OperatingSystem::Posix,
            OsSetting::Windows => OperatingSystem::Windows,
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "auto" => Some(OsSetting::Auto),
            "posix" => Some(OsSetting::Posix),
            "windows" => Some(OsSetting::Windows),
            _ => None,
        }
    }
}

/// Terminal geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalConfig {
    pub columns: usize,
}

/// Workspace folders used to classify directory links.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorkspaceConfig {
    pub folders: Vec<PathBuf>,
    pub ignore_path_casing: bool,
}

/// Errors that can occur during config loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("validation error: {0}")]
    Validation(String),
}

// ── Serde intermediate structs ──────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawConfig {
    links: RawLinksConfig,
    terminal: RawTerminalConfig,
    workspace: RawWorkspaceConfig,
}

#[derive(Deserialize)]
#[serde(default)]
struct RawLinksConfig {
    enable_caching: bool,
    cache_ttl_ms: u64,
    max_line_length: usize,
    os: String,
}

impl Default for RawLinksConfig {
    fn default() -> Self {
        Self {
            enable_caching: true,
            cache_ttl_ms: 10_000,
            max_line_length: 2000,
            os: "auto".to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct RawTerminalConfig {
    columns: usize,
}

impl Default for RawTerminalConfig {
    fn default() -> Self {
        Self { columns: 80 }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawWorkspaceConfig {
    folders: Vec<PathBuf>,
    ignore_path_casing: bool,
}

// ── Default impls ───────────────────────────────────────────────────────

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            enable_caching: true,
            cache_ttl_ms: 10_000,
            max_line_length: 2000,
            os: OsSetting::Auto,
        }
    }
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self { columns: 80 }
    }
}

// ── Config implementation ───────────────────────────────────────────────

impl Config {
    /// Load config from a TOML file path. Returns defaults if file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config file at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(ConfigError::Io(e)),
        }
    }

    /// Parse a TOML string into a Config.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let os = OsSetting::parse(&raw.links.os).ok_or_else(|| {
            ConfigError::Validation(format!(
                "unknown os '{}', valid values: {}",
                raw.links.os,
                VALID_OS_SETTINGS.join(", ")
            ))
        })?;

        let config = Self {
            links: LinksConfig {
                enable_caching: raw.links.enable_caching,
                cache_ttl_ms: raw.links.cache_ttl_ms,
                max_line_length: raw.links.max_line_length,
                os,
            },
            terminal: TerminalConfig {
                columns: raw.terminal.columns,
            },
            workspace: WorkspaceConfig {
                folders: raw.workspace.folders,
                ignore_path_casing: raw.workspace.ignore_path_casing,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the config, returning an error if any values are out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.links.cache_ttl_ms == 0 {
            return Err(ConfigError::Validation(
                "cache_ttl_ms must be > 0".to_string(),
            ));
        }

        if self.links.max_line_length == 0 {
            return Err(ConfigError::Validation(
                "max_line_length must be > 0".to_string(),
            ));
        }

        if self.terminal.columns == 0 {
            return Err(ConfigError::Validation("columns must be > 0".to_string()));
        }

        if let Some(folder) = self.workspace.folders.iter().find(|f| !f.is_absolute()) {
            return Err(ConfigError::Validation(format!(
                "workspace folder '{}' must be an absolute path",
                folder.display()
            )));
        }

        Ok(())
    }

    /// The default configuration as commented TOML.
    pub fn print_default() -> &'static str {
        DEFAULT_CONFIG_TOML
    }
}
