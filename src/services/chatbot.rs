use crate::error::{AppError, Result};
use crate::models::chat_types::{ConversationContext, Role};
use crate::models::classify_types::Prediction;
use crate::services::agents::{percent, PredictorAgent, RetrieverAgent};
use crate::services::breed_name::normalize_for_display;
use std::path::Path;
use tracing::{error, info};

const INQUIRY_PHRASES: [&str; 11] = [
    "tell me more",
    "more info",
    "learn more",
    "yes",
    "tell me about",
    "information",
    "details",
    "characteristics",
    "what can you tell me",
    "breed info",
    "about this breed",
];

const HELP_PHRASES: [&str; 6] = ["help", "can you", "what", "how to", "guide", "instructions"];

pub const HELP_MESSAGE: &str = "## 🐾 Paw Detector Help\n\n\
Here's how you can use the Paw Detector:\n\n\
1. Upload your cute doggie's image, and I'll identify the breed\n\
2. Ask for more information about the identified breed\n\
3. You can upload a new image at any time\n\n\
Example questions I can answer about identified breeds:\n\
- Tell me more about this breed\n\
- What are the care requirements?\n\
- Is this breed good with children?\n\
- What is the history of this breed?";

pub const DEFAULT_MESSAGE: &str = "Woof! Paw Detector at your service! \
Provide me with your cute doggie's picture and I'll identify their breed for you.";

/// One chat session: routes each turn to prediction, breed info, help or a greeting.
pub struct DogBreedChatbot {
    predictor: PredictorAgent,
    retriever: RetrieverAgent,
    context: ConversationContext,
}

impl DogBreedChatbot {
    pub fn new(predictor: PredictorAgent, retriever: RetrieverAgent) -> Self {
        Self {
            predictor,
            retriever,
            context: ConversationContext::default(),
        }
    }

    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    /// Never fails: every error becomes a user-facing reply.
    pub async fn process_message(&mut self, message: &str, image_path: Option<&Path>) -> String {
        self.context.push(Role::User, message);

        let reply = match self.route(message, image_path).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(error = %e, source = ?std::error::Error::source(&e), "turn failed");
                format!("Sorry, I encountered an error: {}", e.user_message())
            }
        };

        self.context.push(Role::Assistant, reply.clone());
        reply
    }

    async fn route(&mut self, message: &str, image_path: Option<&Path>) -> Result<String> {
        if let Some(path) = image_path {
            if !path.exists() {
                return Err(AppError::not_found("image", path));
            }
            self.context.current_image = Some(path.to_path_buf());
            return self.process_image(path, message).await;
        }

        if let Some(breed) = self.context.current_breed.clone() {
            if is_breed_inquiry(message) {
                return self.breed_info(&breed).await;
            }
        }

        if is_help_request(message) {
            return Ok(HELP_MESSAGE.to_string());
        }

        Ok(DEFAULT_MESSAGE.to_string())
    }

    async fn process_image(&mut self, path: &Path, message: &str) -> Result<String> {
        let input = path.to_string_lossy();
        let prediction = self.predictor.identify(&input).await?;
        let breed = normalize_for_display(&prediction.breed);
        info!(%breed, confidence = prediction.confidence, "breed identified");
        self.context.current_breed = Some(breed.clone());

        let response = identification_message(&breed, &prediction);
        if is_breed_inquiry(message) {
            let details = self.breed_info(&breed).await?;
            return Ok(format!("{}\n\n{}", response, details));
        }
        Ok(format!("{}Would you like to learn more about {}s? Just ask!", response, breed))
    }

    async fn breed_info(&self, breed: &str) -> Result<String> {
        let details = self.retriever.describe(breed).await?;
        Ok(format!("🦮 About the {}\n\n{}", breed, details))
    }
}

fn identification_message(breed: &str, prediction: &Prediction) -> String {
    let mut response = String::from("🐾 Breed Identification Results\n\n");
    response.push_str(&format!(
        "I've identified this cutie as a **{}** ({})!\n\n",
        breed,
        percent(prediction.confidence)
    ));
    if !prediction.is_reliable {
        response.push_str("I'm not entirely sure about this one.");
        if !prediction.alternatives.is_empty() {
            let alternatives: Vec<String> = prediction
                .alternatives
                .iter()
                .map(|alt| format!("{} ({})", normalize_for_display(&alt.breed), percent(alt.confidence)))
                .collect();
            response.push_str(&format!(" It could also be: {}.", alternatives.join(", ")));
        }
        response.push_str("\n\n");
    }
    response
}

pub fn is_breed_inquiry(message: &str) -> bool {
    let message = message.to_lowercase();
    INQUIRY_PHRASES.iter().any(|phrase| message.contains(phrase))
}

pub fn is_help_request(message: &str) -> bool {
    let message = message.to_lowercase();
    HELP_PHRASES.iter().any(|phrase| message.contains(phrase))
}
