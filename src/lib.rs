pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;

#[cfg(test)]
mod testing;

pub use commands::{run, Cli};
pub use config::AppConfig;
pub use error::{AppError, Result};
pub use models::classify_types::{Alternative, AlternativesPolicy, Prediction};
pub use services::breed_name::{normalize_for_display, normalize_for_query};
pub use services::chatbot::DogBreedChatbot;
pub use services::classifier::decision::{decide, DecisionConfig};
pub use services::classifier::labels::LabelSet;
pub use services::classifier::predictor::BreedPredictor;
