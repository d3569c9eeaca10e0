use crate::error::{AppError, Result};
use crate::models::classify_types::{Normalization, OutputActivation, ProbabilityVector};
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use ndarray::Array4;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

pub const INPUT_SIZE: u32 = 224;

// ImageNet normalization constants
const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Anything that maps a `(1, 224, 224, 3)` batch to per-class probabilities.
pub trait BreedClassifier: Send + Sync {
    fn classify(&self, input: Array4<f32>) -> Result<ProbabilityVector>;
}

pub fn preprocess_image(path: &Path, normalization: Normalization) -> Result<Array4<f32>> {
    if !path.exists() {
        return Err(AppError::not_found("image", path));
    }

    let img = ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| AppError::inference_with(format!("failed to decode image {}", path.display()), e))?;

    preprocess_dynamic(&img, normalization)
}

/// Squashes the image to the model's square input (aspect ratio is not kept,
/// matching the training pipeline) and lays the pixels out as NHWC.
pub fn preprocess_dynamic(img: &DynamicImage, normalization: Normalization) -> Result<Array4<f32>> {
    let resized = img.resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::Nearest);
    let rgb = resized.to_rgb8();

    let data: Vec<f32> = rgb
        .into_raw()
        .chunks_exact(3)
        .flat_map(|pixel| std::array::from_fn::<f32, 3, _>(|c| normalize(pixel[c], c, normalization)))
        .collect();

    let size = INPUT_SIZE as usize;
    Array4::from_shape_vec((1, size, size, 3), data)
        .map_err(|e| AppError::inference_with("failed to create tensor", e))
}

fn normalize(value: u8, channel: usize, normalization: Normalization) -> f32 {
    match normalization {
        Normalization::MobileNet => value as f32 / 127.5 - 1.0,
        Normalization::ImageNet => (value as f32 / 255.0 - MEAN[channel]) / STD[channel],
    }
}

/// Numerically stable softmax over raw logits.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max_logit = logits.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
    let exp_sum: f32 = logits.iter().map(|&x| (x - max_logit).exp()).sum();
    logits.iter().map(|&x| (x - max_logit).exp() / exp_sum).collect()
}

/// ONNX Runtime backed classifier. The session is exclusive while running.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    input_name: String,
    num_classes: usize,
    output: OutputActivation,
}

impl OnnxClassifier {
    pub fn new(session: Session, num_classes: usize, output: OutputActivation) -> Result<Self> {
        let input_name = session
            .inputs()
            .first()
            .map(|input| input.name().to_string())
            .ok_or_else(|| AppError::Configuration("model declares no inputs".into()))?;

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            num_classes,
            output,
        })
    }
}

impl BreedClassifier for OnnxClassifier {
    fn classify(&self, input: Array4<f32>) -> Result<ProbabilityVector> {
        let shape = input.shape().to_vec();
        if shape != [1, INPUT_SIZE as usize, INPUT_SIZE as usize, 3] {
            return Err(AppError::inference(format!("unexpected input shape {:?}", shape)));
        }

        let input_tensor = Value::from_array(input)
            .map_err(|e| AppError::inference_with("failed to create tensor value", e))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| AppError::inference("model session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .map_err(|e| AppError::inference_with("model run failed", e))?;

        let output_value = outputs
            .values()
            .next()
            .ok_or_else(|| AppError::inference("model produced no outputs"))?;

        let (_, data) = output_value
            .try_extract_tensor::<f32>()
            .map_err(|e| AppError::inference_with("failed to extract output tensor", e))?;

        if data.len() != self.num_classes {
            return Err(AppError::inference(format!(
                "model produced {} scores for {} labels",
                data.len(),
                self.num_classes
            )));
        }

        let probabilities = match self.output {
            OutputActivation::Probabilities => data.to_vec(),
            OutputActivation::Logits => softmax(data),
        };
        debug!(classes = probabilities.len(), "inference complete");

        Ok(probabilities)
    }
}
