//! The prediction service.
//!
//! [`PredictionService`] is the single place where pipeline errors become
//! [`PredictionResult`]s. Every stage below it returns
//! [`Result`](crate::error::Result); nothing escapes
//! [`predict`](PredictionService::predict).

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VerityError};
use crate::model::repository::ModelRepository;
use crate::normalize::TextNormalizer;
use crate::result::{Label, PredictionResult};
use crate::samples::SampleCatalog;

/// Description of the loaded model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub loaded: bool,
    pub model_type: String,
    pub vectorizer_type: String,
    pub vocabulary_size: usize,
    pub model_path: Option<PathBuf>,
    pub trained_at: Option<DateTime<Utc>>,
    /// Why the model could not be loaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Liveness summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub model_loaded: bool,
    pub samples_loaded: bool,
}

/// Normalize, vectorize and classify news text.
#[derive(Debug, Clone)]
pub struct PredictionService {
    normalizer: Arc<TextNormalizer>,
    repository: Arc<ModelRepository>,
    samples: Option<Arc<SampleCatalog>>,
}

impl PredictionService {
    pub fn new(normalizer: Arc<TextNormalizer>, repository: Arc<ModelRepository>) -> Self {
        PredictionService {
            normalizer,
            repository,
            samples: None,
        }
    }

    /// Attach a sample catalog, reported by [`health`](Self::health).
    pub fn with_samples(mut self, samples: Arc<SampleCatalog>) -> Self {
        self.samples = Some(samples);
        self
    }

    /// Classify one text. Failures are reported inside the result.
    pub fn predict(&self, text: Option<&str>) -> PredictionResult {
        match self.try_predict(text) {
            Ok(result) => result,
            Err(e) => {
                debug!("Prediction failed: {e}");
                PredictionResult::from(e)
            }
        }
    }

    /// Classify many texts independently, preserving order.
    pub fn predict_batch(&self, texts: &[Option<&str>]) -> Vec<PredictionResult> {
        texts.par_iter().map(|text| self.predict(*text)).collect()
    }

    fn try_predict(&self, text: Option<&str>) -> Result<PredictionResult> {
        let text = match text {
            Some(text) if !text.trim().is_empty() => text,
            _ => return Err(VerityError::EmptyInput),
        };

        let normalized = self.normalizer.normalize(Some(text))?;
        if normalized.is_empty() {
            return Err(VerityError::NoContent);
        }

        let artifact = self.repository.get()?;
        let features = artifact.vectorizer.transform(&normalized);
        let prediction = artifact.classifier.predict(&features)?;

        let label = Label::from_class(prediction.class).ok_or_else(|| {
            VerityError::internal(format!("Unknown class {}", prediction.class))
        })?;

        let confidence = prediction.confidence();
        if !(0.0..=1.0).contains(&confidence) {
            return Err(VerityError::internal(format!(
                "Confidence {confidence} out of range"
            )));
        }

        debug!(
            "Predicted {label} ({confidence:.4}) from {} features",
            features.nnz()
        );
        Ok(PredictionResult::success(label, confidence))
    }

    /// Load the model now instead of on the first prediction.
    pub fn warm_up(&self) -> Result<()> {
        self.repository.load()
    }

    pub fn health(&self) -> Health {
        Health {
            status: "ok".to_string(),
            model_loaded: self.repository.is_loaded(),
            samples_loaded: self.samples.as_ref().is_some_and(|s| s.is_loaded()),
        }
    }

    /// Describe the model, loading it if needed.
    pub fn model_info(&self) -> ModelInfo {
        match self.repository.get() {
            Ok(artifact) => ModelInfo {
                loaded: true,
                model_type: "LogisticRegression".to_string(),
                vectorizer_type: "TfidfVectorizer".to_string(),
                vocabulary_size: artifact.vectorizer.vocabulary_size(),
                model_path: self.repository.resolved_path().map(PathBuf::from),
                trained_at: Some(artifact.metadata.trained_at),
                error: None,
            },
            Err(e) => ModelInfo {
                loaded: false,
                model_type: "LogisticRegression".to_string(),
                vectorizer_type: "TfidfVectorizer".to_string(),
                vocabulary_size: 0,
                model_path: None,
                trained_at: None,
                error: Some(e.to_string()),
            },
        }
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    pub fn repository(&self) -> &ModelRepository {
        &self.repository
    }
}
