use crate::error::{AppError, Result};
use std::collections::BTreeSet;
use std::path::Path;

const BREED_COLUMN: &str = "breed";

/// Sorted, deduplicated class names. Index `i` is the model's output `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSet {
    labels: Vec<String>,
}

impl LabelSet {
    /// Builds the set from arbitrary breed values; duplicates collapse and the
    /// result is sorted so it matches the training-time class order.
    pub fn from_breeds<I, S>(breeds: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let unique: BTreeSet<String> = breeds
            .into_iter()
            .map(|b| b.as_ref().trim().to_string())
            .filter(|b| !b.is_empty())
            .collect();

        if unique.is_empty() {
            return Err(AppError::Configuration("label set is empty".into()));
        }

        Ok(Self {
            labels: unique.into_iter().collect(),
        })
    }

    /// Reads the `breed` column of a CSV file (one row per training image).
    pub fn from_csv(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AppError::not_found("labels file", path));
        }

        let mut reader = csv::Reader::from_path(path)?;
        let column = reader
            .headers()?
            .iter()
            .position(|h| h.trim() == BREED_COLUMN)
            .ok_or_else(|| {
                AppError::Configuration(format!(
                    "labels file {} has no '{}' column",
                    path.display(),
                    BREED_COLUMN
                ))
            })?;

        let mut breeds = Vec::new();
        for record in reader.records() {
            let record = record?;
            if let Some(value) = record.get(column) {
                breeds.push(value.to_string());
            }
        }

        Self::from_breeds(breeds)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Panics if `idx` is out of range; callers check the vector length first.
    pub fn label_of(&self, idx: usize) -> &str {
        &self.labels[idx]
    }
}
