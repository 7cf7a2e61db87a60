//! Configuration loading and setting resolution
//!
//! Settings sources, highest priority first:
//! 1. Command-line arguments
//! 2. Environment variables (`YUBIN_*`)
//! 3. TOML configuration file
//! 4. Compiled defaults
//!
//! A missing config file is not an error: defaults apply and a warning is
//! logged.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "YUBIN_CONFIG";
pub const DATA_DIR_ENV: &str = "YUBIN_DATA_DIR";
pub const OUTPUT_DIR_ENV: &str = "YUBIN_OUTPUT_DIR";
pub const JSON_INDENT_ENV: &str = "YUBIN_JSON_INDENT";

/// Configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Directory holding registry CSV files
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Output root; shards go to `json/` and `js/` below it
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Indent width for map-mode shard files (compact when unset)
    #[serde(default)]
    pub json_indent: Option<usize>,

    /// Callback name used when wrapping lookup results
    #[serde(default)]
    pub callback: Option<String>,

    /// Extra supplementary kana entries (TOML with an `[entries]` table)
    #[serde(default)]
    pub kana_table: Option<PathBuf>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Built-in defaults used when no other source provides a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledDefaults {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub callback: String,
}

impl Default for CompiledDefaults {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            output_dir: PathBuf::from("./data/output"),
            callback: crate::serializer::CALLBACK.to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Load from an explicit path, `YUBIN_CONFIG`, or the user config dir
    ///
    /// An explicitly named file must exist and parse. The implicit user
    /// config falls back to defaults when absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }
        match default_config_path() {
            Some(path) if path.exists() => {
                info!(path = %path.display(), "Loading config file");
                Self::from_file(&path)
            }
            _ => {
                warn!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }
}

/// `~/.config/yubin/config.toml` (platform equivalent elsewhere)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("yubin").join("config.toml"))
}

/// Resolve a path setting: CLI → environment → TOML → default
pub fn resolve_path(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    toml_value: Option<&Path>,
    default: &Path,
) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    if let Some(path) = toml_value {
        return path.to_path_buf();
    }
    default.to_path_buf()
}

/// Resolve the JSON indent width: CLI → environment → TOML
///
/// An unparsable environment value is a configuration error.
pub fn resolve_indent(cli_arg: Option<usize>, toml_value: Option<usize>) -> Result<Option<usize>> {
    if cli_arg.is_some() {
        return Ok(cli_arg);
    }
    if let Ok(value) = std::env::var(JSON_INDENT_ENV) {
        let value = value.trim();
        if !value.is_empty() {
            return value
                .parse()
                .map(Some)
                .map_err(|e| Error::Config(format!("Invalid {JSON_INDENT_ENV} '{value}': {e}")));
        }
    }
    Ok(toml_value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_defaults() {
        let config: TomlConfig = toml::from_str("").unwrap();
        assert!(config.output_dir.is_none());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_toml_full() {
        let config: TomlConfig = toml::from_str(
            r#"
            data_dir = "/srv/ken_all"
            output_dir = "/srv/out"
            json_indent = 2
            callback = "cb"
            kana_table = "/etc/yubin/kana.toml"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.data_dir, Some(PathBuf::from("/srv/ken_all")));
        assert_eq!(config.json_indent, Some(2));
        assert_eq!(config.callback.as_deref(), Some("cb"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_cli_wins() {
        let resolved = resolve_path(
            Some(Path::new("/cli")),
            "YUBIN_TEST_UNSET_VARIABLE",
            Some(Path::new("/toml")),
            Path::new("/default"),
        );
        assert_eq!(resolved, PathBuf::from("/cli"));
    }

    #[test]
    fn test_toml_then_default() {
        let from_toml = resolve_path(
            None,
            "YUBIN_TEST_UNSET_VARIABLE",
            Some(Path::new("/toml")),
            Path::new("/default"),
        );
        assert_eq!(from_toml, PathBuf::from("/toml"));

        let fallback = resolve_path(None, "YUBIN_TEST_UNSET_VARIABLE", None, Path::new("/default"));
        assert_eq!(fallback, PathBuf::from("/default"));
    }
}
