//! Layered configuration system
//!
//! Config is loaded with three layers of precedence (highest wins):
//! 1. Environment variables: `SHORTSMITH_API_KEY`, falling back to `GEMINI_API_KEY`
//! 2. Project-local: `.shortsmith/config.toml`
//! 3. Global: `~/.shortsmith/config.toml`

use serde::{Deserialize, Serialize};
use shortsmith_core::{Result, ShortsError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::job::PollPolicy;

const API_KEY_VARS: [&str; 2] = ["SHORTSMITH_API_KEY", "GEMINI_API_KEY"];

/// Provider-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: None,
            enabled: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Model names per operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_script_model")]
    pub script: String,
    #[serde(default = "default_image_model")]
    pub image: String,
    #[serde(default = "default_speech_model")]
    pub speech: String,
    #[serde(default = "default_video_model")]
    pub video: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            script: default_script_model(),
            image: default_image_model(),
            speech: default_speech_model(),
            video: default_video_model(),
        }
    }
}

fn default_script_model() -> String {
    "gemini-3-flash-preview".to_string()
}
fn default_image_model() -> String {
    "gemini-2.5-flash-image".to_string()
}
fn default_speech_model() -> String {
    "gemini-2.5-flash-preview-tts".to_string()
}
fn default_video_model() -> String {
    "veo-3.1-fast-generate-preview".to_string()
}

/// Generation defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_voice")]
    pub voice: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub aspect_ratio: Option<String>,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            voice: default_voice(),
            language: default_language(),
            style: None,
            aspect_ratio: None,
            poll_interval_secs: default_poll_interval_secs(),
            max_poll_attempts: default_max_poll_attempts(),
        }
    }
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_voice() -> String {
    "Kore".to_string()
}
fn default_language() -> String {
    "Korean".to_string()
}
fn default_poll_interval_secs() -> u64 {
    10
}
fn default_max_poll_attempts() -> u32 {
    60
}

/// Top-level config file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShortsConfigFile {
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    #[serde(default)]
    pub models: ModelConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

/// Resolved configuration with environment variable overrides applied
#[derive(Debug, Clone, Default)]
pub struct ShortsConfig {
    pub providers: HashMap<String, ProviderConfig>,
    pub models: ModelConfig,
    pub generation: GenerationConfig,
}

impl ShortsConfig {
    /// Load config with layered precedence: global < project < env vars
    pub fn load() -> Result<Self> {
        let mut layers = toml::Table::new();

        let local_path = PathBuf::from(".shortsmith/config.toml");
        for path in Self::global_config_path().into_iter().chain([local_path]) {
            if path.exists() {
                Self::merge_tables(&mut layers, Self::load_table(&path)?);
            }
        }

        let mut config = Self::resolve(layers)?;
        Self::apply_env_overrides(&mut config, |name| std::env::var(name).ok());

        Ok(config.into())
    }

    /// Get API key for a provider
    pub fn api_key(&self, provider_name: &str) -> Option<&str> {
        self.providers
            .get(provider_name)
            .and_then(|p| p.api_key.as_deref())
    }

    /// Get API URL override for a provider
    pub fn api_url(&self, provider_name: &str) -> Option<&str> {
        self.providers
            .get(provider_name)
            .and_then(|p| p.api_url.as_deref())
    }

    /// Check if a provider is enabled
    pub fn is_enabled(&self, provider_name: &str) -> bool {
        self.providers
            .get(provider_name)
            .map(|p| p.enabled)
            .unwrap_or(true)
    }

    pub fn default_provider(&self) -> &str {
        &self.generation.provider
    }

    pub fn default_style(&self) -> Option<&str> {
        self.generation.style.as_deref()
    }

    pub fn default_aspect_ratio(&self) -> Option<&str> {
        self.generation.aspect_ratio.as_deref()
    }

    /// Poll policy for long-running video jobs
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_secs(self.generation.poll_interval_secs),
            max_attempts: self.generation.max_poll_attempts.max(1),
        }
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".shortsmith").join("config.toml"))
    }

    fn load_table(path: &Path) -> Result<toml::Table> {
        let content = std::fs::read_to_string(path)?;
        content.parse::<toml::Table>().map_err(|e| {
            ShortsError::TomlParse(format!("Failed to parse config {}: {}", path.display(), e))
        })
    }

    /// Overlay keys replace base keys; nested tables merge key by key.
    ///
    /// Only keys written in the overlay file take effect, so a project file
    /// can set a value back to its default over the global one.
    fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
        for (key, value) in overlay {
            if let (Some(toml::Value::Table(base_table)), toml::Value::Table(overlay_table)) =
                (base.get_mut(&key), &value)
            {
                Self::merge_tables(base_table, overlay_table.clone());
            } else {
                base.insert(key, value);
            }
        }
    }

    fn resolve(layers: toml::Table) -> Result<ShortsConfigFile> {
        toml::Value::Table(layers)
            .try_into()
            .map_err(|e: toml::de::Error| ShortsError::TomlParse(format!("Invalid config: {}", e)))
    }

    fn apply_env_overrides<F>(config: &mut ShortsConfigFile, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let key = API_KEY_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty());

        if let Some(key) = key {
            let entry = config.providers.entry("gemini".to_string()).or_default();
            entry.api_key = Some(key);
        }
    }
}

impl From<ShortsConfigFile> for ShortsConfig {
    fn from(file: ShortsConfigFile) -> Self {
        Self {
            providers: file.providers,
            models: file.models,
            generation: file.generation,
        }
    }
}
