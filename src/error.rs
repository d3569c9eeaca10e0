use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Every failure the pipeline can surface, grouped by how the caller should react.
#[derive(Debug, Error)]
pub enum AppError {
    /// A referenced file (image, model, labels, config) does not exist.
    #[error("{resource} not found: {}", .path.display())]
    NotFound {
        resource: &'static str,
        path: std::path::PathBuf,
    },

    /// The classifier could not produce a probability vector.
    #[error("inference failed: {context}")]
    Inference {
        context: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Invalid setup; the pipeline must not be used.
    #[error("configuration: {0}")]
    Configuration(String),

    #[error("retrieval: {0}")]
    Retrieval(String),

    #[error("llm: {0}")]
    Llm(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

impl AppError {
    pub fn not_found(resource: &'static str, path: impl Into<std::path::PathBuf>) -> Self {
        AppError::NotFound {
            resource,
            path: path.into(),
        }
    }

    pub fn inference(context: impl Into<String>) -> Self {
        AppError::Inference {
            context: context.into(),
            source: None,
        }
    }

    pub fn inference_with<E>(context: impl Into<String>, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        AppError::Inference {
            context: context.into(),
            source: Some(source.into()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AppError::NotFound { .. } => "not_found",
            AppError::Inference { .. } => "inference",
            AppError::Configuration(_) => "configuration",
            AppError::Retrieval(_) => "retrieval",
            AppError::Llm(_) => "llm",
            AppError::Io(_) => "io",
            AppError::Http(_) => "http",
            AppError::Json(_) => "json",
        }
    }

    /// Text safe to show an end user. Inference causes stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            AppError::NotFound { resource, path } => {
                format!("{} not found: {}", resource, path.display())
            }
            AppError::Inference { .. } => "error during prediction, please try another image".to_string(),
            AppError::Configuration(msg) => format!("the assistant is misconfigured ({})", msg),
            AppError::Retrieval(msg) => format!("could not retrieve breed information. {}", msg),
            AppError::Llm(_) | AppError::Http(_) => "an external service is unavailable right now".to_string(),
            AppError::Io(_) | AppError::Json(_) => "an internal error occurred".to_string(),
        }
    }
}

impl Serialize for AppError {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("AppError", 2)?;
        state.serialize_field("kind", self.kind())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::inference_with("failed to decode image", err)
    }
}

impl From<ort::Error> for AppError {
    fn from(err: ort::Error) -> Self {
        AppError::inference_with("onnx runtime error", err)
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Configuration(format!("failed to read labels: {}", err))
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Configuration(format!("failed to parse config: {}", err))
    }
}
