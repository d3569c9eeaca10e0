use crate::config::ModelConfig;
use crate::error::{AppError, Result};
use crate::services::classifier::decision::DecisionConfig;
use crate::services::classifier::inference::OnnxClassifier;
use crate::services::classifier::labels::LabelSet;
use crate::services::classifier::predictor::BreedPredictor;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Loads the label set and ONNX session described by a [`ModelConfig`].
#[derive(Clone, Debug)]
pub struct ModelManager {
    config: ModelConfig,
}

impl ModelManager {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    /// Both artifacts must exist before anything is parsed.
    pub fn check_artifacts(&self) -> Result<()> {
        if !self.config.model_path.exists() {
            return Err(AppError::not_found("model file", &self.config.model_path));
        }
        if !self.config.labels_path.exists() {
            return Err(AppError::not_found("labels file", &self.config.labels_path));
        }
        Ok(())
    }

    pub async fn load(&self, decision: DecisionConfig) -> Result<BreedPredictor> {
        decision.validate()?;
        self.check_artifacts()?;

        // Labels first: an empty set must fail before the session is built.
        let labels = LabelSet::from_csv(&self.config.labels_path)?;
        debug!(labels = labels.len(), path = %self.config.labels_path.display(), "label set loaded");

        let config = self.config.clone();
        let num_classes = labels.len();
        let classifier = tokio::task::spawn_blocking(move || -> Result<OnnxClassifier> {
            let session = build_session(&config.model_path, config.use_gpu, config.intra_threads)?;
            OnnxClassifier::new(session, num_classes, config.output)
        })
        .await
        .map_err(|e| AppError::inference_with("model loading task failed", e))??;

        info!(
            model = %self.config.model_path.display(),
            labels = num_classes,
            gpu = self.config.use_gpu,
            "breed classifier ready"
        );

        Ok(BreedPredictor::new(
            Arc::new(labels),
            Arc::new(classifier),
            self.config.normalization,
            decision,
        ))
    }
}

fn build_session(model_path: &Path, use_gpu: bool, intra_threads: usize) -> Result<Session> {
    let _ = ort::init().with_name("paw-detector").commit();

    let mut builder = Session::builder()
        .map_err(|e| AppError::inference(format!("failed to create session builder: {}", e)))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| AppError::inference(format!("failed to set optimization level: {}", e)))?
        .with_intra_threads(intra_threads)
        .map_err(|e| AppError::inference(format!("failed to set intra threads: {}", e)))?;

    if use_gpu {
        builder = builder
            .with_execution_providers([
                ort::execution_providers::DirectMLExecutionProvider::default().build(),
                ort::execution_providers::CoreMLExecutionProvider::default().build(),
                ort::execution_providers::CUDAExecutionProvider::default().build(),
                ort::execution_providers::CPUExecutionProvider::default().build(),
            ])
            .map_err(|e| AppError::inference(format!("failed to register GPU execution providers: {}", e)))?;
    } else {
        builder = builder
            .with_execution_providers([ort::execution_providers::CPUExecutionProvider::default().build()])
            .map_err(|e| AppError::inference(format!("failed to register CPU execution provider: {}", e)))?;
    }

    builder
        .commit_from_file(model_path)
        .map_err(|e| AppError::inference(format!("failed to load ONNX model {}: {}", model_path.display(), e)))
}
