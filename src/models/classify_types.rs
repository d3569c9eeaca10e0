use serde::{Deserialize, Serialize};

/// Per-class probabilities, index-aligned with the label set.
pub type ProbabilityVector = Vec<f32>;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Alternative {
    pub breed: String,
    pub confidence: f32,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Prediction {
    pub breed: String,
    pub confidence: f32,
    pub is_reliable: bool,
    pub alternatives: Vec<Alternative>,
}

/// Which candidates besides the top pick are reported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlternativesPolicy {
    /// Rank runners-up for every prediction.
    Always,
    /// Only rank runners-up when the top pick is below the reliability threshold.
    #[default]
    WhenUnreliable,
}

/// Pixel scaling applied before the tensor reaches the model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// `x / 127.5 - 1`, the MobileNet family's `[-1, 1]` range.
    #[default]
    MobileNet,
    /// ImageNet mean/std standardisation.
    ImageNet,
}

/// What the model's single output tensor holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputActivation {
    #[default]
    Probabilities,
    Logits,
}
