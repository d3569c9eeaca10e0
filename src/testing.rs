//! Deterministic stand-ins for the model, the scraper and the LLM.

use crate::error::{AppError, Result};
use crate::models::breed_info_types::{BreedInfo, SourceContent};
use crate::models::classify_types::{Normalization, ProbabilityVector};
use crate::services::classifier::decision::DecisionConfig;
use crate::services::classifier::inference::BreedClassifier;
use crate::services::classifier::labels::LabelSet;
use crate::services::classifier::predictor::BreedPredictor;
use crate::services::llm::LlmClient;
use crate::services::retriever::BreedInfoRetriever;
use async_trait::async_trait;
use image::{DynamicImage, Rgb, RgbImage};
use ndarray::Array4;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const TEST_BREEDS: [&str; 4] = ["Beagle", "Golden Retriever", "Husky", "Poodle"];

pub struct FakeClassifier {
    output: std::result::Result<ProbabilityVector, String>,
    calls: AtomicUsize,
}

impl FakeClassifier {
    pub fn new(probabilities: ProbabilityVector) -> Self {
        Self {
            output: Ok(probabilities),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            output: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl BreedClassifier for FakeClassifier {
    fn classify(&self, input: Array4<f32>) -> Result<ProbabilityVector> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(input.shape(), &[1, 224, 224, 3]);
        match &self.output {
            Ok(probabilities) => Ok(probabilities.clone()),
            Err(message) => Err(AppError::inference_with("fake backend failure", message.clone())),
        }
    }
}

pub fn predictor_with(probabilities: ProbabilityVector) -> BreedPredictor {
    predictor_from(Arc::new(FakeClassifier::new(probabilities)))
}

pub fn predictor_from(classifier: Arc<FakeClassifier>) -> BreedPredictor {
    let labels = LabelSet::from_breeds(TEST_BREEDS).unwrap();
    BreedPredictor::new(
        Arc::new(labels),
        classifier,
        Normalization::MobileNet,
        DecisionConfig::default(),
    )
}

/// A small PNG on disk; keep the directory alive for the file to exist.
pub fn dog_image() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dog.png");
    DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 48, Rgb([200, 160, 90])))
        .save(&path)
        .unwrap();
    (dir, path)
}

pub struct FakeRetriever {
    info: BreedInfo,
    calls: AtomicUsize,
}

impl FakeRetriever {
    pub fn with_temperament(temperament: &str) -> Self {
        let mut info = BreedInfo {
            success: true,
            ..BreedInfo::default()
        };
        info.content.insert(
            "akc".to_string(),
            SourceContent {
                general_info: vec![("Height".to_string(), "21-24 inches".to_string())],
                temperament: temperament.to_string(),
                health: "Hip dysplasia screening advised.".to_string(),
                history: Some("Developed in Scotland.".to_string()),
                care: None,
            },
        );
        Self {
            info,
            calls: AtomicUsize::new(0),
        }
    }

    /// Pages were fetched but nothing could be extracted from them.
    pub fn blank_pages() -> Self {
        let mut info = BreedInfo {
            success: true,
            ..BreedInfo::default()
        };
        info.content.insert("akc".to_string(), SourceContent::default());
        info.content.insert("dogtime".to_string(), SourceContent::default());
        Self {
            info,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unsuccessful(error: &str) -> Self {
        Self {
            info: BreedInfo {
                error: Some(error.to_string()),
                ..BreedInfo::default()
            },
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BreedInfoRetriever for FakeRetriever {
    async fn scrape_breed_info(&self, breed: &str) -> Result<BreedInfo> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(BreedInfo {
            breed: breed.to_string(),
            ..self.info.clone()
        })
    }
}

pub struct FakeLlm {
    reply: std::result::Result<String, String>,
    prompts: Mutex<Vec<(String, String)>>,
}

impl FakeLlm {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// `(system, user)` pairs received so far.
    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for FakeLlm {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        self.prompts
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string()));
        self.reply.clone().map_err(AppError::Llm)
    }
}
