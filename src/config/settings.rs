//! Configuration settings for Svar.

use crate::agent::Capability;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default scoring service for the benchmark questions.
pub const DEFAULT_API_URL: &str = "https://agents-course-unit4-scoring.hf.space";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub api: ApiSettings,
    pub agent: AgentSettings,
    pub tools: ToolSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for temporary files (downloaded media, sampled frames).
    pub temp_dir: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            temp_dir: "/tmp/svar".to_string(),
        }
    }
}

/// Scoring service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL of the scoring service.
    pub base_url: String,
    /// Timeout for the question fetch, in seconds.
    pub fetch_timeout_secs: u64,
    /// Timeout for answer submission, in seconds.
    pub submit_timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            fetch_timeout_secs: 15,
            submit_timeout_secs: 60,
        }
    }
}

/// Agent settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Chat model driving the agent.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum model calls per question.
    pub max_steps: usize,
    /// Capabilities advertised to the model.
    pub capabilities: Vec<Capability>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4.1".to_string(),
            temperature: 0.1,
            max_steps: 20,
            capabilities: Capability::ALL.to_vec(),
        }
    }
}

/// Settings for the individual tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// Vision model for image and video frame descriptions.
    pub vision_model: String,
    /// Speech-to-text model.
    pub transcription_model: String,
    /// Number of frames sampled from a video.
    pub video_frames: u32,
    /// Also transcribe the audio track of videos.
    pub video_transcript: bool,
    /// Character cap for text returned by `read_code`.
    pub max_read_chars: usize,
    /// Number of results returned by search tools.
    pub search_results: usize,
    /// Wikipedia language edition (e.g. "en").
    pub wikipedia_language: String,
    /// Timeout for tool HTTP requests, in seconds.
    pub http_timeout_secs: u64,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            vision_model: "gpt-4.1".to_string(),
            transcription_model: "whisper-1".to_string(),
            video_frames: 8,
            video_transcript: true,
            max_read_chars: 50_000,
            search_results: 5,
            wikipedia_language: "en".to_string(),
            http_timeout_secs: 60,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::SvarError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("svar")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }

    /// Scoring service base URL without a trailing slash.
    pub fn api_url(&self) -> &str {
        self.api.base_url.trim_end_matches('/')
    }
}
