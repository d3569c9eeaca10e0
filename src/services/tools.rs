//! Named capabilities the agents dispatch to.
//!
//! Tools return typed [`ToolOutput`] values; nothing here is rendered to text.

use crate::error::{AppError, Result};
use crate::models::breed_info_types::BreedInfo;
use crate::models::classify_types::Prediction;
use crate::services::classifier::predictor::BreedPredictor;
use crate::services::retriever::BreedInfoRetriever;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

pub const PAW_PREDICTOR: &str = "PawPredictor";
pub const PAW_RETRIEVER: &str = "PawRetriever";

#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    Prediction(Prediction),
    BreedInfo(BreedInfo),
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    async fn invoke(&self, input: &str) -> Result<ToolOutput>;
}

pub struct PawPredictorTool {
    predictor: BreedPredictor,
}

impl PawPredictorTool {
    pub fn new(predictor: BreedPredictor) -> Self {
        Self { predictor }
    }
}

#[async_trait]
impl Tool for PawPredictorTool {
    fn name(&self) -> &'static str {
        PAW_PREDICTOR
    }

    fn description(&self) -> &'static str {
        "Predicts the breed of a dog from an image file path. Input should be a valid path to an image file."
    }

    async fn invoke(&self, input: &str) -> Result<ToolOutput> {
        let path = Path::new(input.trim());
        self.predictor
            .predict_blocking(path)
            .await
            .map(ToolOutput::Prediction)
    }
}

pub struct PawRetrieverTool {
    retriever: Arc<dyn BreedInfoRetriever>,
}

impl PawRetrieverTool {
    pub fn new(retriever: Arc<dyn BreedInfoRetriever>) -> Self {
        Self { retriever }
    }
}

#[async_trait]
impl Tool for PawRetrieverTool {
    fn name(&self) -> &'static str {
        PAW_RETRIEVER
    }

    fn description(&self) -> &'static str {
        "Retrieves detailed information about a specific dog breed. Input should be the name of the dog breed."
    }

    async fn invoke(&self, input: &str) -> Result<ToolOutput> {
        self.retriever
            .scrape_breed_info(input)
            .await
            .map(ToolOutput::BreedInfo)
    }
}

/// Fixed set of tools, assembled once at startup.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<&'static str, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.insert(tool.name(), tool);
        self
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Tool>> {
        self.tools
            .get(name)
            .cloned()
            .ok_or_else(|| AppError::Configuration(format!("no tool named '{}' is registered", name)))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tools.keys().copied()
    }

    /// `name: description` lines for prompts.
    pub fn describe(&self) -> String {
        self.tools
            .values()
            .map(|tool| format!("{}: {}", tool.name(), tool.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
