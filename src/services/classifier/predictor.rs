use crate::error::{AppError, Result};
use crate::models::classify_types::{Normalization, Prediction};
use crate::services::classifier::decision::{decide, DecisionConfig};
use crate::services::classifier::inference::{preprocess_image, BreedClassifier};
use crate::services::classifier::labels::LabelSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Image path in, [`Prediction`] out. Cheap to clone; the model is shared.
#[derive(Clone)]
pub struct BreedPredictor {
    labels: Arc<LabelSet>,
    classifier: Arc<dyn BreedClassifier>,
    normalization: Normalization,
    decision: DecisionConfig,
}

impl fmt::Debug for BreedPredictor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BreedPredictor")
            .field("classes", &self.labels.len())
            .field("normalization", &self.normalization)
            .field("decision", &self.decision)
            .finish_non_exhaustive()
    }
}

impl BreedPredictor {
    pub fn new(
        labels: Arc<LabelSet>,
        classifier: Arc<dyn BreedClassifier>,
        normalization: Normalization,
        decision: DecisionConfig,
    ) -> Self {
        Self {
            labels,
            classifier,
            normalization,
            decision,
        }
    }

    pub fn predict(&self, image_path: &Path) -> Result<Prediction> {
        self.predict_with(image_path, &self.decision)
    }

    pub fn predict_with_threshold(&self, image_path: &Path, confidence_threshold: f32) -> Result<Prediction> {
        let decision = self.decision.clone().with_threshold(confidence_threshold);
        decision.validate()?;
        self.predict_with(image_path, &decision)
    }

    fn predict_with(&self, image_path: &Path, decision: &DecisionConfig) -> Result<Prediction> {
        if !image_path.exists() {
            return Err(AppError::not_found("image", image_path));
        }

        let tensor = preprocess_image(image_path, self.normalization)?;
        debug!(path = %image_path.display(), "image preprocessed");

        let probabilities = self.classifier.classify(tensor)?;
        let prediction = decide(&probabilities, &self.labels, decision)?;

        info!(
            breed = %prediction.breed,
            confidence = prediction.confidence,
            reliable = prediction.is_reliable,
            alternatives = prediction.alternatives.len(),
            "breed predicted"
        );
        Ok(prediction)
    }

    /// Runs [`predict`](Self::predict) off the async executor.
    pub async fn predict_blocking(&self, image_path: &Path) -> Result<Prediction> {
        let predictor = self.clone();
        let path = image_path.to_path_buf();
        tokio::task::spawn_blocking(move || predictor.predict(&path))
            .await
            .map_err(|e| AppError::inference_with("prediction task failed", e))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{dog_image, FakeClassifier};

    fn predictor(classifier: Arc<FakeClassifier>) -> BreedPredictor {
        let labels = LabelSet::from_breeds(["Beagle", "Golden Retriever", "Husky", "Poodle"]).unwrap();
        BreedPredictor::new(
            Arc::new(labels),
            classifier,
            Normalization::MobileNet,
            DecisionConfig::default(),
        )
    }

    #[test]
    fn debug_output_summarises_the_model() {
        let predictor = predictor(Arc::new(FakeClassifier::new(vec![0.25; 4])));
        let text = format!("{:?}", predictor);
        assert!(text.starts_with("BreedPredictor { classes: 4, normalization: MobileNet"));
    }

    #[test]
    fn predicts_from_an_image_file() {
        let (_dir, path) = dog_image();
        let classifier = Arc::new(FakeClassifier::new(vec![0.05, 0.85, 0.02, 0.08]));
        let prediction = predictor(classifier.clone()).predict(&path).unwrap();
        assert_eq!(prediction.breed, "Golden Retriever");
        assert!(prediction.is_reliable);
        assert_eq!(classifier.calls(), 1);
    }

    #[test]
    fn missing_image_never_reaches_the_classifier() {
        let classifier = Arc::new(FakeClassifier::new(vec![0.05, 0.85, 0.02, 0.08]));
        let err = predictor(classifier.clone())
            .predict(Path::new("/tmp/no-such-dog.jpg"))
            .unwrap_err();
        assert_eq!(err.to_string(), "image not found: /tmp/no-such-dog.jpg");
        assert_eq!(classifier.calls(), 0);
    }

    #[test]
    fn repeated_predictions_are_identical() {
        let (_dir, path) = dog_image();
        let predictor = predictor(Arc::new(FakeClassifier::new(vec![0.3, 0.35, 0.25, 0.1])));
        let first = predictor.predict(&path).unwrap();
        for _ in 0..3 {
            assert_eq!(predictor.predict(&path).unwrap(), first);
        }
    }

    #[test]
    fn custom_threshold_changes_reliability() {
        let (_dir, path) = dog_image();
        let predictor = predictor(Arc::new(FakeClassifier::new(vec![0.05, 0.85, 0.02, 0.08])));
        let strict = predictor.predict_with_threshold(&path, 0.95).unwrap();
        assert!(!strict.is_reliable);
        assert!(predictor.predict_with_threshold(&path, 1.5).is_err());
    }

    #[test]
    fn classifier_failure_is_surfaced_unchanged() {
        let (_dir, path) = dog_image();
        let predictor = predictor(Arc::new(FakeClassifier::failing("backend exploded")));
        let err = predictor.predict(&path).unwrap_err();
        assert!(matches!(err, AppError::Inference { .. }));
    }

    #[tokio::test]
    async fn blocking_wrapper_returns_the_same_prediction() {
        let (_dir, path) = dog_image();
        let predictor = predictor(Arc::new(FakeClassifier::new(vec![0.3, 0.35, 0.25, 0.1])));
        let sync = predictor.predict(&path).unwrap();
        let async_result = predictor.predict_blocking(&path).await.unwrap();
        assert_eq!(sync, async_result);
    }
}
