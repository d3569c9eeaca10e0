//! The predictor and retriever agents.
//!
//! The predictor hands back the typed [`Prediction`]; only the final message is
//! rendered as text. The retriever asks the LLM to organise scraped content and
//! falls back to a plain rendering when the LLM is unavailable.

use crate::error::{AppError, Result};
use crate::models::breed_info_types::{BreedInfo, SourceContent};
use crate::models::classify_types::Prediction;
use crate::services::llm::{extract_final_answer, LlmClient};
use crate::services::tools::{Tool, ToolOutput, ToolRegistry, PAW_PREDICTOR, PAW_RETRIEVER};
use std::sync::Arc;
use tracing::{debug, warn};

const RETRIEVER_PROMPT: &str = "You are a dog breed information specialist. \
Your task is to format detailed information about dog breeds from web data.

Synthesize the provided data into ONLY a clean, formatted markdown response with the following sections:

**General Characteristics**
[Information about size, weight, appearance, etc.]

**Temperament & Personality Traits**
[Information about behavior, intelligence, etc.]

**Care Requirements**
[Information about exercise, grooming needs, etc.]

**Health Considerations**
[Information about common health issues]

**History & Background**
[Information about origin and development]

Mention when sources disagree about particular characteristics. \
Do NOT include any extra text like \"Here's information about...\" or \"I hope this helps...\" - ONLY the formatted sections.";

const NO_INFORMATION: &str = "No information available.";

pub struct PredictorAgent {
    tool: Arc<dyn Tool>,
}

impl PredictorAgent {
    pub fn from_registry(registry: &ToolRegistry) -> Result<Self> {
        Ok(Self {
            tool: registry.get(PAW_PREDICTOR)?,
        })
    }

    pub async fn identify(&self, image_path: &str) -> Result<Prediction> {
        match self.tool.invoke(image_path).await? {
            ToolOutput::Prediction(prediction) => Ok(prediction),
            other => Err(unexpected_output(self.tool.name(), &other)),
        }
    }
}

/// `Breed: …` / `Confidence: …` block, with alternatives for unreliable picks.
pub fn render_prediction(prediction: &Prediction) -> String {
    let mut response = format!(
        "Breed: {}\nConfidence: {}\n",
        prediction.breed,
        percent(prediction.confidence)
    );
    if !prediction.is_reliable {
        response.push_str("Note: This prediction has low confidence.");
        if prediction.alternatives.is_empty() {
            response.push('\n');
        } else {
            response.push_str(" Alternative possibilities include:\n");
            for alt in &prediction.alternatives {
                response.push_str(&format!("- {} ({})\n", alt.breed, percent(alt.confidence)));
            }
        }
    }
    response
}

pub fn percent(value: f32) -> String {
    format!("{:.2}%", value * 100.0)
}

pub struct RetrieverAgent {
    tool: Arc<dyn Tool>,
    llm: Option<Arc<dyn LlmClient>>,
}

impl RetrieverAgent {
    pub fn from_registry(registry: &ToolRegistry, llm: Option<Arc<dyn LlmClient>>) -> Result<Self> {
        Ok(Self {
            tool: registry.get(PAW_RETRIEVER)?,
            llm,
        })
    }

    pub async fn retrieve(&self, breed: &str) -> Result<BreedInfo> {
        let info = match self.tool.invoke(breed).await? {
            ToolOutput::BreedInfo(info) => info,
            other => return Err(unexpected_output(self.tool.name(), &other)),
        };

        if !info.success || info.content.values().all(SourceContent::is_empty) {
            let message = match info.error.as_deref() {
                Some(error) => format!("Error retrieving information for {}. {}", breed, error),
                None => format!("Error retrieving information for {}.", breed),
            };
            return Err(AppError::Retrieval(message));
        }
        Ok(info)
    }

    /// Markdown sections describing `breed`.
    pub async fn describe(&self, breed: &str) -> Result<String> {
        let info = self.retrieve(breed).await?;

        let Some(llm) = &self.llm else {
            return Ok(render_breed_info(&info));
        };

        let data = serde_json::to_string_pretty(&info.content)?;
        let user = format!("Tell me about the {} breed.\n\nRetrieved data:\n{}", breed, data);
        match llm.complete(RETRIEVER_PROMPT, &user).await {
            Ok(reply) => {
                debug!(breed, chars = reply.len(), "breed summary generated");
                Ok(extract_final_answer(&reply).to_string())
            }
            Err(e) => {
                warn!(breed, error = %e, "llm unavailable, rendering scraped content directly");
                Ok(render_breed_info(&info))
            }
        }
    }
}

/// The five summary sections built straight from the scraped fields.
pub fn render_breed_info(info: &BreedInfo) -> String {
    let sources = || info.content.values();

    let general = sources()
        .flat_map(|content| content.general_info.iter())
        .map(|(label, value)| format!("- {}: {}", label.trim_end_matches(':'), value))
        .collect::<Vec<_>>()
        .join("\n");
    let temperament = join_paragraphs(sources().map(|c| c.temperament.as_str()));
    let care = join_paragraphs(sources().filter_map(|c| c.care.as_deref()));
    let health = join_paragraphs(sources().map(|c| c.health.as_str()));
    let history = join_paragraphs(sources().filter_map(|c| c.history.as_deref()));

    let sections = [
        ("General Characteristics", general),
        ("Temperament & Personality Traits", temperament),
        ("Care Requirements", care),
        ("Health Considerations", health),
        ("History & Background", history),
    ];

    sections
        .iter()
        .map(|(title, body)| {
            let body = if body.is_empty() { NO_INFORMATION } else { body.as_str() };
            format!("**{}**\n{}", title, body)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn join_paragraphs<'a>(texts: impl Iterator<Item = &'a str>) -> String {
    texts.filter(|text| !text.is_empty()).collect::<Vec<_>>().join("\n\n")
}

fn unexpected_output(tool: &str, output: &ToolOutput) -> AppError {
    AppError::Configuration(format!("tool {} returned unexpected output {:?}", tool, output))
}
