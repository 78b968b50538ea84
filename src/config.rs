use crate::defaults;
use crate::error::{ReadAlongError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub alignment: AlignmentConfig,
    pub focus: FocusConfig,
    pub homophones: HomophoneConfig,
    pub session: SessionConfig,
}

/// Token matching configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AlignmentConfig {
    /// Shortest token/target length considered for merged-token prefix matches.
    pub prefix_min_length: usize,
}

/// Focus phrase (recognizer biasing) configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FocusConfig {
    pub window_width: usize,
    pub phrase_mode: PhraseMode,
}

/// Homophone table configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct HomophoneConfig {
    /// Skip the built-in English homophone classes.
    pub disable_defaults: bool,
    /// Extra classes, e.g. `[["grey", "gray"]]`.
    pub classes: Vec<Vec<String>>,
}

/// Reading session behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct SessionConfig {
    /// Turn the page automatically once it is read to the end.
    pub auto_turn_pages: bool,
    /// Add front and back cover pages when loading a story document.
    pub include_covers: bool,
}

/// How focus words are turned into recognizer phrase entries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PhraseMode {
    /// Only the joined phrase.
    Single,
    /// Words, bigrams and the joined phrase with increasing boosts.
    #[default]
    Weighted,
}

impl FromStr for PhraseMode {
    type Err = ReadAlongError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "single" => Ok(PhraseMode::Single),
            "weighted" => Ok(PhraseMode::Weighted),
            other => Err(ReadAlongError::ConfigInvalidValue {
                key: "focus.phrase_mode".to_string(),
                message: format!("unknown mode '{}' (expected single or weighted)", other),
            }),
        }
    }
}

impl fmt::Display for PhraseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhraseMode::Single => write!(f, "single"),
            PhraseMode::Weighted => write!(f, "weighted"),
        }
    }
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            prefix_min_length: defaults::PREFIX_MIN_LENGTH,
        }
    }
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            window_width: defaults::FOCUS_WINDOW_WIDTH,
            phrase_mode: PhraseMode::Weighted,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Missing fields use default values. The loaded values are validated.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if the file doesn't exist
    ///
    /// Invalid TOML or invalid values are still errors.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(ReadAlongError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.focus.window_width == 0 {
            return Err(ReadAlongError::ConfigInvalidValue {
                key: "focus.window_width".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.alignment.prefix_min_length == 0 {
            return Err(ReadAlongError::ConfigInvalidValue {
                key: "alignment.prefix_min_length".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - READALONG_FOCUS_WIDTH → focus.window_width
    /// - READALONG_PHRASE_MODE → focus.phrase_mode
    /// - READALONG_PREFIX_MIN_LENGTH → alignment.prefix_min_length
    ///
    /// Unparseable values are ignored with a warning.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(width) = std::env::var("READALONG_FOCUS_WIDTH")
            && !width.is_empty()
        {
            match width.parse::<usize>() {
                Ok(w) if w > 0 => self.focus.window_width = w,
                _ => log::warn!("Ignoring READALONG_FOCUS_WIDTH={}", width),
            }
        }

        if let Ok(mode) = std::env::var("READALONG_PHRASE_MODE")
            && !mode.is_empty()
        {
            match mode.parse::<PhraseMode>() {
                Ok(m) => self.focus.phrase_mode = m,
                Err(e) => log::warn!("Ignoring READALONG_PHRASE_MODE: {}", e),
            }
        }

        if let Ok(len) = std::env::var("READALONG_PREFIX_MIN_LENGTH")
            && !len.is_empty()
        {
            match len.parse::<usize>() {
                Ok(l) if l > 0 => self.alignment.prefix_min_length = l,
                _ => log::warn!("Ignoring READALONG_PREFIX_MIN_LENGTH={}", len),
            }
        }

        self
    }

    /// Look up a value by dotted key, e.g. `focus.window_width`.
    pub fn get_value_by_path(&self, key: &str) -> Result<String> {
        let root = toml::Value::try_from(self).map_err(|e| ReadAlongError::ConfigParse {
            message: e.to_string(),
        })?;

        let mut value = &root;
        for part in key.split('.') {
            value = value
                .get(part)
                .ok_or_else(|| ReadAlongError::ConfigInvalidValue {
                    key: key.to_string(),
                    message: "unknown key".to_string(),
                })?;
        }

        Ok(match value {
            toml::Value::String(s) => s.clone(),
            toml::Value::Table(t) => toml::to_string(t).map_err(|e| ReadAlongError::ConfigParse {
                message: e.to_string(),
            })?,
            other => other.to_string(),
        })
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/readalong/config.toml on Linux, or a relative
    /// `readalong/config.toml` when no config directory is known.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("readalong")
            .join("config.toml")
    }
}
