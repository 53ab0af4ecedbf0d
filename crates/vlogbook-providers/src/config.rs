//! Configuration loading and collaborator factories.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use vlogbook_core::traits::{ContentGenerator, SpeechSynthesizer};

use crate::gemini::{GeminiProvider, DEFAULT_MODEL, DEFAULT_TTS_MODEL, DEFAULT_VOICE};
use crate::mock::{MockGenerator, MockSpeech};
use crate::retry::RetryPolicy;

/// Environment variable that overrides `[gemini] api_key`.
pub const API_KEY_ENV: &str = "VLOGBOOK_GEMINI_KEY";

/// Which implementation backs generation and speech.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Gemini,
    /// Canned offline responses.
    Mock,
}

/// Gemini connection settings.
///
/// Debug output masks the API key.
#[derive(Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_tts_model")]
    pub tts_model: String,
    #[serde(default = "default_voice")]
    pub voice: String,
    #[serde(default)]
    pub temperature: Option<f64>,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("tts_model", &self.tts_model)
            .field("voice", &self.voice)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: None,
            model: default_model(),
            tts_model: default_tts_model(),
            voice: default_voice(),
            temperature: None,
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_tts_model() -> String {
    DEFAULT_TTS_MODEL.to_string()
}
fn default_voice() -> String {
    DEFAULT_VOICE.to_string()
}

/// Top-level vlogbook configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VlogbookConfig {
    #[serde(default)]
    pub backend: Backend,
    #[serde(default)]
    pub gemini: GeminiConfig,
    /// JSON file holding saved entries.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    /// Upper bound on questions per quiz session.
    #[serde(default = "default_max_questions")]
    pub max_questions: usize,
    /// Max retries on provider errors.
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./vlogbook-data/entries.json")
}
fn default_max_questions() -> usize {
    vlogbook_core::quiz::DEFAULT_MAX_QUESTIONS
}
fn default_retries() -> u32 {
    3
}
fn default_retry_delay() -> u64 {
    1000
}

impl Default for VlogbookConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            gemini: GeminiConfig::default(),
            store_path: default_store_path(),
            max_questions: default_max_questions(),
            max_retries: default_retries(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}

impl VlogbookConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.retry_delay_ms))
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Unset variables expand to the empty string.
pub fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!(
            "{}{}{}",
            &result[..start],
            value,
            &result[start + end + 1..]
        );
    }
    result
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `vlogbook.toml` in the current directory
/// 2. `~/.config/vlogbook/config.toml`
///
/// `VLOGBOOK_GEMINI_KEY` overrides the configured API key.
pub fn load_config_from(path: Option<&Path>) -> Result<VlogbookConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("vlogbook.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<VlogbookConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            config
        }
        None => VlogbookConfig::default(),
    };

    if let Ok(key) = std::env::var(API_KEY_ENV) {
        config.gemini.api_key = key;
    }

    config.gemini.api_key = resolve_env_vars(&config.gemini.api_key);
    config.gemini.base_url = config.gemini.base_url.as_deref().map(resolve_env_vars);
    config.store_path = PathBuf::from(resolve_env_vars(&config.store_path.to_string_lossy()));

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("vlogbook"))
}

fn gemini_provider(config: &GeminiConfig) -> Result<GeminiProvider> {
    if config.api_key.trim().is_empty() {
        anyhow::bail!(
            "no Gemini API key configured; set [gemini] api_key or {API_KEY_ENV}"
        );
    }
    let mut provider = GeminiProvider::new(&config.api_key, config.base_url.clone())?
        .with_model(&config.model)
        .with_tts_model(&config.tts_model)
        .with_voice(&config.voice);
    if let Some(temperature) = config.temperature {
        provider = provider.with_temperature(temperature);
    }
    Ok(provider)
}

/// Create the content generator selected by `config.backend`.
pub fn create_generator(config: &VlogbookConfig) -> Result<Arc<dyn ContentGenerator>> {
    match config.backend {
        Backend::Gemini => Ok(Arc::new(gemini_provider(&config.gemini)?)),
        Backend::Mock => Ok(Arc::new(MockGenerator::new())),
    }
}

/// Create the speech synthesizer selected by `config.backend`.
pub fn create_synthesizer(config: &VlogbookConfig) -> Result<Arc<dyn SpeechSynthesizer>> {
    match config.backend {
        Backend::Gemini => Ok(Arc::new(gemini_provider(&config.gemini)?)),
        Backend::Mock => Ok(Arc::new(MockSpeech::new())),
    }
}
