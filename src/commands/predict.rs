use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::models::classify_types::Prediction;
use crate::services::agents::render_prediction;
use crate::services::breed_name::normalize_for_display;
use crate::services::classifier::model_manager::ModelManager;
use serde::Serialize;
use std::path::Path;

/// `--json` output: the prediction itself, or `{"error": {...}}`.
#[derive(Serialize)]
#[serde(untagged)]
enum PredictOutput<'a> {
    Prediction(&'a Prediction),
    Error { error: &'a AppError },
}

pub async fn run(config: &AppConfig, image: &Path, threshold: Option<f32>, json: bool) -> Result<()> {
    // Checked before the model loads so a typo does not cost a session build.
    if !image.exists() {
        return report(Err(AppError::not_found("image", image)), json);
    }

    let predictor = ModelManager::new(config.model.clone())
        .load(config.decision.clone())
        .await?;

    let result = match threshold {
        Some(threshold) => predictor.predict_with_threshold(image, threshold),
        None => predictor.predict(image),
    };
    report(result, json)
}

fn report(result: Result<Prediction>, json: bool) -> Result<()> {
    match (&result, json) {
        (Ok(prediction), true) => println!("{}", serde_json::to_string_pretty(&PredictOutput::Prediction(prediction))?),
        (Err(error), true) => println!("{}", serde_json::to_string_pretty(&PredictOutput::Error { error })?),
        (Ok(prediction), false) => print!("{}", render_for_terminal(prediction)),
        (Err(_), false) => {}
    }
    result.map(|_| ())
}

fn render_for_terminal(prediction: &Prediction) -> String {
    let mut display = prediction.clone();
    display.breed = normalize_for_display(&display.breed);
    for alt in &mut display.alternatives {
        alt.breed = normalize_for_display(&alt.breed);
    }
    render_prediction(&display)
}
