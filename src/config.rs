use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_KEY_ENV: &str = "GROQ_API_KEY";
pub const MODEL_ENV: &str = "PORTFOLIO_MODEL";
pub const LOG_ENV: &str = "PORTFOLIO_LOG";

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 500;
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 33;
pub const DEFAULT_REVEAL_INTERVAL_MS: u64 = 20;
/// Katakana glyphs occupy two terminal cells
pub const DEFAULT_GLYPH_WIDTH: u16 = 2;
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// On-disk settings. Every field is optional; accessors apply defaults.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub frame_interval_ms: Option<u64>,
    pub reveal_interval_ms: Option<u64>,
    pub glyph_width: Option<u16>,
    pub log_level: Option<String>,
    #[serde(skip)]
    key_from_env: bool,
}

/// Everything the completion client needs, resolved at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the user config, or defaults when no file exists.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::get_config_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn get_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("enzo-portfolio").join("config.json"))
    }

    /// Apply environment overrides. Empty values are ignored.
    pub fn with_env(mut self) -> Self {
        self.apply_env(|key| std::env::var(key).ok());
        self
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(API_KEY_ENV) {
            self.api_key = Some(key);
            self.key_from_env = true;
        }
        if let Some(model) = non_empty(MODEL_ENV) {
            self.model = Some(model);
        }
        if let Some(level) = non_empty(LOG_ENV) {
            self.log_level = Some(level);
        }
    }

    /// Where the API key came from, for display.
    pub fn key_source(&self) -> Option<&'static str> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => {
                Some(if self.key_from_env { "env" } else { "config" })
            }
            _ => None,
        }
    }

    /// Resolve chat settings, or `None` when no API key is configured.
    pub fn chat(&self) -> Option<ChatConfig> {
        let api_key = self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())?;
        Some(ChatConfig {
            api_key: api_key.to_string(),
            base_url: self.base_url.clone().unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: self.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        })
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.unwrap_or(DEFAULT_FRAME_INTERVAL_MS).max(1))
    }

    pub fn reveal_interval(&self) -> Duration {
        Duration::from_millis(self.reveal_interval_ms.unwrap_or(DEFAULT_REVEAL_INTERVAL_MS).max(1))
    }

    pub fn glyph_width(&self) -> u16 {
        self.glyph_width.unwrap_or(DEFAULT_GLYPH_WIDTH).max(1)
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}
