//! Application configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! environment variables. The CLI applies its own flags last. Every component
//! receives its section explicitly; nothing below this module reads the
//! environment.

use crate::error::{AppError, Result};
use crate::models::classify_types::{Normalization, OutputActivation};
use crate::services::classifier::decision::DecisionConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL_PATH: &str = "Models/paw_detector.onnx";
pub const DEFAULT_LABELS_PATH: &str = "Dataset/labels.csv";
pub const DEFAULT_LLM_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_LLM_MODEL: &str = "llama3-70b-8192";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

const ENV_API_KEY: &str = "GROQ_API_KEY";
const ENV_MODEL_PATH: &str = "PAW_MODEL_PATH";
const ENV_LABELS_PATH: &str = "PAW_LABELS_PATH";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    pub model_path: PathBuf,
    pub labels_path: PathBuf,
    pub normalization: Normalization,
    pub output: OutputActivation,
    pub use_gpu: bool,
    pub intra_threads: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            labels_path: PathBuf::from(DEFAULT_LABELS_PATH),
            normalization: Normalization::default(),
            output: OutputActivation::default(),
            use_gpu: false,
            intra_threads: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrieverConfig {
    pub timeout_secs: u64,
    /// Pause after each source request.
    pub request_delay_ms: u64,
    pub user_agent: String,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            request_delay_ms: 1000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmConfig {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_LLM_ENDPOINT.to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            temperature: 0.2,
            timeout_secs: 60,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub decision: DecisionConfig,
    pub retriever: RetrieverConfig,
    pub llm: LlmConfig,
}

impl AppConfig {
    /// Defaults, overlaid with `path` when given, overlaid with the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AppError::not_found("config file", path));
        }
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Applies overrides from a variable lookup. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(key) = get(ENV_API_KEY) {
            self.llm.api_key = Some(key);
        }
        if let Some(path) = get(ENV_MODEL_PATH) {
            self.model.model_path = PathBuf::from(path);
        }
        if let Some(path) = get(ENV_LABELS_PATH) {
            self.model.labels_path = PathBuf::from(path);
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.decision.validate()?;
        if self.model.intra_threads == 0 {
            return Err(AppError::Configuration("intra_threads must be at least 1".into()));
        }
        if self.retriever.timeout_secs == 0 {
            return Err(AppError::Configuration("retriever timeout must be positive".into()));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(AppError::Configuration(format!(
                "llm temperature {} outside [0, 2]",
                self.llm.temperature
            )));
        }
        Ok(())
    }

    /// The LLM key is only required by components that talk to the LLM.
    pub fn require_api_key(&self) -> Result<&str> {
        self.llm.api_key.as_deref().ok_or_else(|| {
            AppError::Configuration(format!(
                "an LLM API key must be provided in the config file or the {} environment variable",
                ENV_API_KEY
            ))
        })
    }
}
