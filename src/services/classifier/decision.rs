//! Turns a raw probability vector into a [`Prediction`].
//!
//! The top pick is the arg-max with ties going to the lowest index. Runners-up
//! are ranked by descending probability (stable, so equal probabilities keep
//! label order), truncated to `max_alternatives` and filtered to those strictly
//! above `alt_min_confidence`.

use crate::error::{AppError, Result};
use crate::models::classify_types::{Alternative, AlternativesPolicy, Prediction};
use crate::services::classifier::labels::LabelSet;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DecisionConfig {
    pub confidence_threshold: f32,
    pub alt_min_confidence: f32,
    pub max_alternatives: usize,
    pub policy: AlternativesPolicy,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.7,
            alt_min_confidence: 0.1,
            max_alternatives: 2,
            policy: AlternativesPolicy::WhenUnreliable,
        }
    }
}

impl DecisionConfig {
    pub fn with_threshold(mut self, confidence_threshold: f32) -> Self {
        self.confidence_threshold = confidence_threshold;
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("confidence_threshold", self.confidence_threshold),
            ("alt_min_confidence", self.alt_min_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(AppError::Configuration(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

pub fn decide(probabilities: &[f32], labels: &LabelSet, config: &DecisionConfig) -> Result<Prediction> {
    if probabilities.is_empty() {
        return Err(AppError::Configuration("probability vector is empty".into()));
    }
    if probabilities.len() != labels.len() {
        return Err(AppError::Configuration(format!(
            "model produced {} probabilities for {} labels",
            probabilities.len(),
            labels.len()
        )));
    }
    if let Some(idx) = probabilities.iter().position(|p| p.is_nan()) {
        return Err(AppError::inference(format!("probability at index {} is NaN", idx)));
    }

    let mut ranked: Vec<usize> = (0..probabilities.len()).collect();
    // Stable sort: equal probabilities stay in ascending index order.
    ranked.sort_by(|&a, &b| {
        probabilities[b]
            .partial_cmp(&probabilities[a])
            .unwrap_or(Ordering::Equal)
    });

    let top = ranked[0];
    let confidence = probabilities[top];
    let is_reliable = confidence >= config.confidence_threshold;

    let wants_alternatives = match config.policy {
        AlternativesPolicy::Always => true,
        AlternativesPolicy::WhenUnreliable => !is_reliable,
    };

    let alternatives = if wants_alternatives {
        ranked[1..]
            .iter()
            .take(config.max_alternatives)
            .filter(|&&idx| probabilities[idx] > config.alt_min_confidence)
            .map(|&idx| Alternative {
                breed: labels.label_of(idx).to_string(),
                confidence: probabilities[idx],
            })
            .collect()
    } else {
        Vec::new()
    };

    Ok(Prediction {
        breed: labels.label_of(top).to_string(),
        confidence,
        is_reliable,
        alternatives,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> LabelSet {
        LabelSet::from_breeds(["Poodle", "Husky", "Golden Retriever", "Beagle"]).unwrap()
    }

    fn argmax(p: &[f32]) -> usize {
        let mut best = 0;
        for (i, &v) in p.iter().enumerate() {
            if v > p[best] {
                best = i;
            }
        }
        best
    }

    fn vectors() -> Vec<Vec<f32>> {
        vec![
            vec![0.05, 0.85, 0.02, 0.08],
            vec![0.3, 0.35, 0.25, 0.10],
            vec![0.25, 0.25, 0.25, 0.25],
            vec![0.0, 0.0, 0.0, 1.0],
            vec![0.4, 0.1, 0.4, 0.1],
            vec![0.69, 0.15, 0.11, 0.05],
            vec![0.12, 0.31, 0.3, 0.27],
            vec![0.7, 0.2, 0.05, 0.05],
        ]
    }

    #[test]
    fn reliable_prediction_has_no_alternatives() {
        let p = decide(&[0.05, 0.85, 0.02, 0.08], &labels(), &DecisionConfig::default()).unwrap();
        assert_eq!(p.breed, "Golden Retriever");
        assert_eq!(p.confidence, 0.85);
        assert!(p.is_reliable);
        assert!(p.alternatives.is_empty());
    }

    #[test]
    fn unreliable_prediction_lists_alternatives_above_cutoff() {
        let p = decide(&[0.3, 0.35, 0.25, 0.10], &labels(), &DecisionConfig::default()).unwrap();
        assert_eq!(p.breed, "Golden Retriever");
        assert_eq!(p.confidence, 0.35);
        assert!(!p.is_reliable);
        assert_eq!(
            p.alternatives,
            vec![
                Alternative { breed: "Beagle".into(), confidence: 0.3 },
                Alternative { breed: "Husky".into(), confidence: 0.25 },
            ]
        );
    }

    #[test]
    fn alternative_at_cutoff_is_excluded() {
        let config = DecisionConfig {
            max_alternatives: 3,
            ..DecisionConfig::default()
        };
        let p = decide(&[0.3, 0.35, 0.25, 0.10], &labels(), &config).unwrap();
        assert!(p.alternatives.iter().all(|a| a.breed != "Poodle"));
        assert_eq!(p.alternatives.len(), 2);
    }

    #[test]
    fn always_policy_ranks_runners_up_for_reliable_predictions() {
        let config = DecisionConfig {
            policy: AlternativesPolicy::Always,
            ..DecisionConfig::default()
        };
        let p = decide(&[0.05, 0.75, 0.0, 0.2], &labels(), &config).unwrap();
        assert!(p.is_reliable);
        assert_eq!(p.alternatives.len(), 1);
        assert_eq!(p.alternatives[0].breed, "Poodle");
    }

    #[test]
    fn higher_cutoff_drops_more_alternatives() {
        let config = DecisionConfig {
            alt_min_confidence: 0.26,
            ..DecisionConfig::default()
        };
        let p = decide(&[0.3, 0.35, 0.25, 0.10], &labels(), &config).unwrap();
        assert_eq!(p.alternatives.len(), 1);
        assert_eq!(p.alternatives[0].breed, "Beagle");
    }

    #[test]
    fn ties_go_to_lowest_index() {
        let p = decide(&[0.25, 0.25, 0.25, 0.25], &labels(), &DecisionConfig::default()).unwrap();
        assert_eq!(p.breed, "Beagle");
        let names: Vec<_> = p.alternatives.iter().map(|a| a.breed.as_str()).collect();
        assert_eq!(names, vec!["Golden Retriever", "Husky"]);
    }

    #[test]
    fn decision_is_deterministic() {
        let config = DecisionConfig::default();
        for v in vectors() {
            let first = decide(&v, &labels(), &config).unwrap();
            for _ in 0..5 {
                assert_eq!(decide(&v, &labels(), &config).unwrap(), first);
            }
        }
    }

    #[test]
    fn top_matches_argmax() {
        let labels = labels();
        for v in vectors() {
            let p = decide(&v, &labels, &DecisionConfig::default()).unwrap();
            let top = argmax(&v);
            assert_eq!(p.breed, labels.label_of(top));
            assert_eq!(p.confidence, v[top]);
        }
    }

    #[test]
    fn raising_threshold_never_makes_a_prediction_reliable() {
        let low = DecisionConfig::default();
        let high = DecisionConfig::default().with_threshold(0.95);
        for v in vectors() {
            let a = decide(&v, &labels(), &low).unwrap();
            let b = decide(&v, &labels(), &high).unwrap();
            assert_eq!(a.is_reliable, a.confidence >= 0.7);
            assert_eq!(b.is_reliable, b.confidence >= 0.95);
            assert!(a.is_reliable || !b.is_reliable);
        }
    }

    #[test]
    fn alternatives_are_sorted_filtered_and_exclude_top() {
        let config = DecisionConfig {
            policy: AlternativesPolicy::Always,
            max_alternatives: 3,
            ..DecisionConfig::default()
        };
        for v in vectors() {
            let p = decide(&v, &labels(), &config).unwrap();
            assert!(p.alternatives.iter().all(|a| a.breed != p.breed));
            assert!(p.alternatives.iter().all(|a| a.confidence > config.alt_min_confidence));
            assert!(p
                .alternatives
                .windows(2)
                .all(|w| w[0].confidence >= w[1].confidence));
        }
    }

    #[test]
    fn empty_vector_is_a_configuration_error() {
        let err = decide(&[], &labels(), &DecisionConfig::default()).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn length_mismatch_is_a_configuration_error() {
        let err = decide(&[0.5, 0.5], &labels(), &DecisionConfig::default()).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn nan_is_an_inference_error() {
        let err = decide(&[0.5, f32::NAN, 0.2, 0.1], &labels(), &DecisionConfig::default()).unwrap_err();
        assert!(matches!(err, AppError::Inference { .. }));
    }

    #[test]
    fn thresholds_outside_unit_interval_are_rejected() {
        assert!(DecisionConfig::default().with_threshold(-0.1).validate().is_err());
        assert!(DecisionConfig::default().with_threshold(1.0).validate().is_ok());
        let config = DecisionConfig {
            alt_min_confidence: 2.0,
            ..DecisionConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
