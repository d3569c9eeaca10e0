//! Command-line surface over the pipeline.

pub mod chat;
pub mod info;
pub mod predict;

use crate::config::AppConfig;
use crate::error::Result;
use crate::services::llm::{ChatCompletionsClient, LlmClient};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "paw-detector")]
#[command(about = "Identify dog breeds from photos and chat about them")]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// ONNX model file (overrides config and PAW_MODEL_PATH)
    #[arg(long, global = true)]
    pub model: Option<PathBuf>,

    /// Labels CSV with a `breed` column (overrides config and PAW_LABELS_PATH)
    #[arg(long, global = true)]
    pub labels: Option<PathBuf>,

    /// Use GPU execution providers when available
    #[arg(long, global = true)]
    pub gpu: bool,

    /// Debug logging (overridden by PAW_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Predict the breed shown in an image
    Predict {
        image: PathBuf,

        /// Minimum confidence for a reliable prediction
        #[arg(short, long)]
        threshold: Option<f32>,

        /// Print the prediction as JSON
        #[arg(long)]
        json: bool,
    },
    /// Look up information about a breed
    Info {
        /// Breed name, e.g. "golden retriever"
        #[arg(required = true, num_args = 1..)]
        breed: Vec<String>,
    },
    /// Interactive chat session
    Chat,
}

impl Cli {
    /// File and environment configuration with this invocation's flags applied.
    pub fn resolve_config(&self) -> Result<AppConfig> {
        let mut config = AppConfig::load(self.config.as_deref())?;
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(model) = &self.model {
            config.model.model_path = model.clone();
        }
        if let Some(labels) = &self.labels {
            config.model.labels_path = labels.clone();
        }
        if self.gpu {
            config.model.use_gpu = true;
        }
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = cli.resolve_config()?;

    match cli.command {
        Command::Predict { image, threshold, json } => predict::run(&config, &image, threshold, json).await,
        Command::Info { breed } => info::run(&config, &breed.join(" ")).await,
        Command::Chat => chat::run(&config).await,
    }
}

/// The LLM is optional wherever a plain rendering is acceptable.
pub(crate) fn optional_llm(config: &AppConfig) -> Result<Option<Arc<dyn LlmClient>>> {
    match config.llm.api_key.as_deref() {
        Some(key) => {
            let client: Arc<dyn LlmClient> = Arc::new(ChatCompletionsClient::new(&config.llm, key)?);
            Ok(Some(client))
        }
        None => {
            info!("no LLM API key configured, breed info will be shown unsummarised");
            Ok(None)
        }
    }
}
