//! Application settings structs, defaults, TOML persistence and environment
//! overrides.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//! Both binaries (chat client and gateway) read the same file; each only
//! looks at the sections it needs.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

/// Groq's OpenAI-compatible API root.
const DEFAULT_PROVIDER_URL: &str = "https://api.groq.com/openai";

// ---------------------------------------------------------------------------
// GatewayConfig
// ---------------------------------------------------------------------------

/// Where the gateway listens and how the chat client reaches it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Base URL the chat client posts to (`{url}/chain/invoke`).
    pub url: String,
    /// Socket address the gateway server binds.
    pub bind_address: String,
    /// Upper bound on one client → gateway round trip.
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8000".into(),
            bind_address: "127.0.0.1:8000".into(),
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// LlmConfig
// ---------------------------------------------------------------------------

/// Settings for the hosted chat-completion model behind the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API (`/v1/chat/completions` is
    /// appended).
    ///
    /// - Groq: `https://api.groq.com/openai`
    /// - OpenAI: `https://api.openai.com`
    /// - Ollama: `http://localhost:11434`
    pub base_url: String,
    /// API key; `None` for local providers.
    pub api_key: Option<String>,
    /// Model identifier sent to the API.
    pub model: String,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f32,
    /// Maximum seconds to wait for the model before giving up.
    pub timeout_secs: u64,
    /// Optional file whose contents replace the built-in tutor persona.
    pub persona_file: Option<PathBuf>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PROVIDER_URL.into(),
            api_key: None,
            model: "openai/gpt-oss-120b".into(),
            temperature: 0.7,
            timeout_secs: 30,
            persona_file: None,
        }
    }
}

// ---------------------------------------------------------------------------
// SttConfig
// ---------------------------------------------------------------------------

/// Settings for the hosted speech-to-text endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SttConfig {
    /// Base URL of an OpenAI-compatible API (`/v1/audio/transcriptions` is
    /// appended).
    pub base_url: String,
    /// API key; `None` for local providers.
    pub api_key: Option<String>,
    /// Transcription model identifier.
    pub model: String,
    /// Spoken language as an ISO-639-1 code.
    pub language: String,
    /// Recordings estimated shorter than this are rejected before upload.
    pub min_duration_secs: f64,
    /// Maximum seconds to wait for a transcript.
    pub timeout_secs: u64,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PROVIDER_URL.into(),
            api_key: None,
            model: "whisper-large-v3".into(),
            language: "en".into(),
            min_duration_secs: 1.0,
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// AudioConfig
// ---------------------------------------------------------------------------

/// Settings for microphone capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Recordings are cut off after this many seconds.
    pub max_recording_secs: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            max_recording_secs: 120.0,
        }
    }
}

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// Chat window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Initial window size `(width, height)` in logical pixels.
    pub window_size: (f32, f32),
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            window_size: (720.0, 640.0),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use english_buddy::config::AppConfig;
///
/// // Load (returns Default when file is missing), then apply env overrides.
/// let config = AppConfig::load().unwrap();
/// println!("gateway at {}", config.gateway.url);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Gateway address / bind settings.
    pub gateway: GatewayConfig,
    /// Chat-completion model settings (gateway only).
    pub llm: LlmConfig,
    /// Speech-to-text settings (chat client only).
    pub stt: SttConfig,
    /// Microphone capture settings.
    pub audio: AudioConfig,
    /// Window settings.
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load `settings.toml` from the platform config dir and apply
    /// environment overrides.
    ///
    /// A missing file is not an error (first run).
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&AppPaths::new().settings_file)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from an explicit path without touching the environment.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Overlay environment variables on top of the file settings.
    ///
    /// | Variable       | Field                                  |
    /// |----------------|----------------------------------------|
    /// | `API_URL`      | `gateway.url`                          |
    /// | `GATEWAY_BIND` | `gateway.bind_address`                 |
    /// | `GROQ_API_KEY` | `llm.api_key` and `stt.api_key`        |
    /// | `PERSONA_FILE` | `llm.persona_file`                     |
    ///
    /// Empty values are ignored. `lookup` is injected so tests don't have to
    /// mutate the process environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = var("API_URL") {
            self.gateway.url = url.trim_end_matches('/').to_string();
        }
        if let Some(bind) = var("GATEWAY_BIND") {
            self.gateway.bind_address = bind;
        }
        if let Some(key) = var("GROQ_API_KEY") {
            self.llm.api_key = Some(key.clone());
            self.stt.api_key = Some(key);
        }
        if let Some(path) = var("PERSONA_FILE") {
            self.llm.persona_file = Some(PathBuf::from(path));
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
