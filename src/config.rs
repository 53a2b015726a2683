//! Runtime configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all) is a
//! complete configuration:
//!
//! ```json
//! {
//!   "model": { "path": "models/fake_news_model.bin", "legacy_path": "fake_news_model.bin" },
//!   "text": { "min_word_length": 2, "resources_dir": null },
//!   "training": { "max_features": 5000, "min_df": 2, "max_df": 0.95, "ngram_range": [1, 2] },
//!   "samples": { "path": "data/samples.json", "default_count": 5 }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VerityError};
use crate::model::classifier::LogisticRegressionParams;
use crate::model::vectorizer::VectorizerParams;
use crate::normalize::{DEFAULT_MIN_WORD_LENGTH, LinguisticResources, TextNormalizer};

/// Where the artifact lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: PathBuf,
    /// Tried when `path` does not exist.
    pub legacy_path: Option<PathBuf>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            path: PathBuf::from("models/fake_news_model.bin"),
            legacy_path: Some(PathBuf::from("fake_news_model.bin")),
        }
    }
}

/// Text normalization settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Tokens must be strictly longer than this.
    pub min_word_length: usize,
    /// Directory holding stop word and lemma files; built-in lists when unset.
    pub resources_dir: Option<PathBuf>,
}

impl Default for TextConfig {
    fn default() -> Self {
        TextConfig {
            min_word_length: DEFAULT_MIN_WORD_LENGTH,
            resources_dir: None,
        }
    }
}

impl TextConfig {
    /// Resolve linguistic resources and build a normalizer.
    pub fn build_normalizer(&self) -> Result<TextNormalizer> {
        let resources = match &self.resources_dir {
            Some(dir) => LinguisticResources::from_dir(dir),
            None => LinguisticResources::builtin(),
        };
        TextNormalizer::new(resources, self.min_word_length)
    }
}

/// Offline training hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub max_features: usize,
    pub min_df: usize,
    pub max_df: f64,
    pub ngram_range: (usize, usize),
    /// Fraction of documents held out for evaluation.
    pub test_size: f64,
    pub seed: u64,
    /// Inverse regularization strength.
    pub c: f64,
    pub max_iter: usize,
    pub tol: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        let vectorizer = VectorizerParams::default();
        let classifier = LogisticRegressionParams::default();
        TrainingConfig {
            max_features: vectorizer.max_features.unwrap_or(5000),
            min_df: vectorizer.min_df,
            max_df: vectorizer.max_df,
            ngram_range: vectorizer.ngram_range,
            test_size: 0.2,
            seed: 42,
            c: classifier.c,
            max_iter: classifier.max_iter,
            tol: classifier.tol,
        }
    }
}

impl TrainingConfig {
    pub fn vectorizer_params(&self) -> VectorizerParams {
        VectorizerParams {
            max_features: Some(self.max_features),
            min_df: self.min_df,
            max_df: self.max_df,
            ngram_range: self.ngram_range,
        }
    }

    pub fn classifier_params(&self) -> LogisticRegressionParams {
        LogisticRegressionParams {
            c: self.c,
            max_iter: self.max_iter,
            tol: self.tol,
        }
    }
}

/// Sample catalog settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplesConfig {
    pub path: PathBuf,
    pub default_count: usize,
}

impl Default for SamplesConfig {
    fn default() -> Self {
        SamplesConfig {
            path: PathBuf::from("data/samples.json"),
            default_count: 5,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerityConfig {
    pub model: ModelConfig,
    pub text: TextConfig,
    pub training: TrainingConfig,
    pub samples: SamplesConfig,
}

impl VerityConfig {
    /// Read and validate a JSON configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_json(&content)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a JSON configuration string.
    pub fn from_json(content: &str) -> Result<Self> {
        let config: VerityConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no component could work with.
    pub fn validate(&self) -> Result<()> {
        let training = &self.training;

        if training.max_features == 0 {
            return Err(VerityError::invalid_config("max_features must be positive"));
        }
        if training.min_df == 0 {
            return Err(VerityError::invalid_config("min_df must be positive"));
        }
        if !(training.max_df > 0.0 && training.max_df <= 1.0) {
            return Err(VerityError::invalid_config("max_df must be between 0 and 1"));
        }
        let (min_n, max_n) = training.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(VerityError::invalid_config(
                "ngram_range must be (min, max) with 1 <= min <= max",
            ));
        }
        if !(training.test_size > 0.0 && training.test_size < 1.0) {
            return Err(VerityError::invalid_config("test_size must be between 0 and 1"));
        }
        if !(training.c > 0.0 && training.c.is_finite()) {
            return Err(VerityError::invalid_config("c must be a positive number"));
        }
        if training.max_iter == 0 {
            return Err(VerityError::invalid_config("max_iter must be positive"));
        }
        if self.text.min_word_length == 0 {
            return Err(VerityError::invalid_config("min_word_length must be positive"));
        }
        if self.model.path.as_os_str().is_empty() {
            return Err(VerityError::invalid_config("model path must not be empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = VerityConfig::default();

        assert_eq!(config.model.path, PathBuf::from("models/fake_news_model.bin"));
        assert_eq!(config.text.min_word_length, 2);
        assert_eq!(config.training.max_features, 5000);
        assert_eq!(config.training.min_df, 2);
        assert_eq!(config.training.max_df, 0.95);
        assert_eq!(config.training.ngram_range, (1, 2));
        assert_eq!(config.samples.default_count, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config =
            VerityConfig::from_json(r#"{"text": {"min_word_length": 3}, "training": {"seed": 7}}"#)
                .unwrap();

        assert_eq!(config.text.min_word_length, 3);
        assert_eq!(config.training.seed, 7);
        assert_eq!(config.training.max_features, 5000);
        assert_eq!(config.model, ModelConfig::default());
    }

    #[test]
    fn test_invalid_values() {
        for json in [
            r#"{"training": {"max_features": 0}}"#,
            r#"{"training": {"max_df": 1.5}}"#,
            r#"{"training": {"ngram_range": [2, 1]}}"#,
            r#"{"text": {"min_word_length": 0}}"#,
            r#"{"training": {"test_size": 1.0}}"#,
        ] {
            assert!(
                matches!(VerityConfig::from_json(json), Err(VerityError::InvalidConfig(_))),
                "{json}"
            );
        }
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            VerityConfig::from_json("{not json"),
            Err(VerityError::Json(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), r#"{"model": {"path": "/tmp/m.bin", "legacy_path": null}}"#)
            .unwrap();

        let config = VerityConfig::from_file(file.path()).unwrap();
        assert_eq!(config.model.path, PathBuf::from("/tmp/m.bin"));
        assert_eq!(config.model.legacy_path, None);
    }

    #[test]
    fn test_training_params() {
        let config = TrainingConfig::default();
        assert_eq!(config.vectorizer_params(), VectorizerParams::default());
        assert_eq!(config.classifier_params(), LogisticRegressionParams::default());
    }
}
