//! Configuration types for subsheet.
//!
//! [`Config::load`] reads `~/.config/subsheet/config.toml`, creating it with
//! hardcoded defaults if it does not yet exist. [`Config::load_from`] layers
//! an explicit file instead. [`Config::defaults`] returns the same defaults
//! without touching the filesystem (useful in tests).
//!
//! The date precedence list lives here rather than in code so that an import
//! resolves ambiguous dates the same way every run, and a lab that writes
//! day-first dates can say so once.

use serde::Deserialize;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[dates]
precedence = [
    "MM/dd/yyyy",
    "yyyy-MM-dd",
    "dd/MM/yyyy",
    "MM-dd-yyyy",
    "dd-MM-yyyy",
    "M/d/yy",
    "yyyy/MM/dd",
    "dd.MM.yyyy",
    "MM.dd.yyyy",
    "d MMM yyyy",
    "MMM d, yyyy",
    "MMM d yyyy",
    "d-MMM-yyyy",
    "d-MMM-yy",
]
fallback = true

[policy]
missing_done_by           = "placeholder"
done_by_placeholder       = "N/A"
invalid_optional          = "drop_field"
count_parsing             = "leading_integer"
contamination_within_jars = false
parallel                  = false
"#;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown date pattern {0:?} in [dates] precedence")]
    UnknownDatePattern(String),

    #[error("date pattern {0:?} listed more than once in [dates] precedence")]
    DuplicateDatePattern(String),

    #[error("[dates] precedence is empty and fallback is disabled; no date could ever parse")]
    NoDatePatterns,
}

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level configuration, loaded from `~/.config/subsheet/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dates: DateConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// `[dates]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct DateConfig {
    /// Pattern names tried top to bottom. See [`crate::date::catalog_names`].
    #[serde(default = "default_precedence")]
    pub precedence: Vec<String>,
    /// Whether to fall back to the permissive generic parser.
    #[serde(default = "default_fallback")]
    pub fallback: bool,
}

fn default_precedence() -> Vec<String> {
    crate::date::DEFAULT_PRECEDENCE
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_fallback() -> bool { true }

impl Default for DateConfig {
    fn default() -> Self {
        Self {
            precedence: default_precedence(),
            fallback: default_fallback(),
        }
    }
}

/// What to do with a row whose `doneBy` is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoneByPolicy {
    /// Accept the row with [`PolicyConfig::done_by_placeholder`].
    Placeholder,
    /// Reject the row.
    Reject,
}

/// What to do with an optional count that does not coerce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionalFieldPolicy {
    /// Omit the field and keep the row.
    DropField,
    /// Reject the whole row.
    RejectRow,
}

/// How count cells are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountParsing {
    /// Read the leading integer and ignore the rest: `"10 jars"` is 10,
    /// `"5.7"` is 5.
    LeadingInteger,
    /// The whole cell must be an integer, optionally with a zero fraction.
    Strict,
}

/// `[policy]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    #[serde(default = "default_missing_done_by")]
    pub missing_done_by: DoneByPolicy,
    #[serde(default = "default_done_by_placeholder")]
    pub done_by_placeholder: String,
    #[serde(default = "default_invalid_optional")]
    pub invalid_optional: OptionalFieldPolicy,
    #[serde(default = "default_count_parsing")]
    pub count_parsing: CountParsing,
    /// Reject rows whose `contaminatedJars` exceeds `jarsUsed`.
    #[serde(default)]
    pub contamination_within_jars: bool,
    /// Validate rows on the rayon pool. Output order is unaffected.
    #[serde(default)]
    pub parallel: bool,
}

fn default_missing_done_by() -> DoneByPolicy { DoneByPolicy::Placeholder }
fn default_done_by_placeholder() -> String { "N/A".to_string() }
fn default_invalid_optional() -> OptionalFieldPolicy { OptionalFieldPolicy::DropField }
fn default_count_parsing() -> CountParsing { CountParsing::LeadingInteger }

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            missing_done_by: default_missing_done_by(),
            done_by_placeholder: default_done_by_placeholder(),
            invalid_optional: default_invalid_optional(),
            count_parsing: default_count_parsing(),
            contamination_within_jars: false,
            parallel: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/subsheet/config.toml`, layered on top of the
    /// built-in defaults. Creates the file with defaults if it does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG.trim_start())?;
        }

        Self::layered(&path, false)
    }

    /// Load an explicit config file layered on top of the built-in defaults.
    /// The file must exist.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        Self::layered(path, true)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }

    fn layered(path: &Path, required: bool) -> anyhow::Result<Self> {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path).required(required))
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("subsheet")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
