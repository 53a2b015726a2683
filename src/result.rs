//! Prediction results and their error payloads.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::VerityError;

/// Classification outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    /// Fabricated news (class 0).
    Fake,
    /// Genuine news (class 1).
    True,
    /// Sentinel carried by error results.
    Error,
}

impl Label {
    /// Map a classifier class onto a label.
    pub fn from_class(class: u8) -> Option<Self> {
        match class {
            0 => Some(Label::Fake),
            1 => Some(Label::True),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Fake => "FAKE",
            Label::True => "TRUE",
            Label::Error => "ERROR",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broad category of a failed prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The caller passed a null text to the normalizer.
    Input,
    /// The caller passed no text, or only whitespace.
    EmptyInput,
    /// Normalization left nothing to classify.
    NoContent,
    /// The model file does not exist.
    ArtifactNotFound,
    /// The model file could not be decoded or validated.
    ArtifactCorrupt,
    /// Anything else.
    Internal,
}

impl ErrorKind {
    /// Whether the caller is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::Input | ErrorKind::EmptyInput | ErrorKind::NoContent
        )
    }
}

/// Structured description of a failed prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionError {
    kind: ErrorKind,
    message: String,
}

impl PredictionError {
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S) -> Self {
        PredictionError {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for PredictionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<VerityError> for PredictionError {
    fn from(error: VerityError) -> Self {
        let kind = match &error {
            VerityError::Input(_) => ErrorKind::Input,
            VerityError::EmptyInput => ErrorKind::EmptyInput,
            VerityError::NoContent => ErrorKind::NoContent,
            VerityError::ArtifactNotFound { .. } => ErrorKind::ArtifactNotFound,
            VerityError::ArtifactCorrupt(_) => ErrorKind::ArtifactCorrupt,
            VerityError::Analysis(_)
            | VerityError::InvalidConfig(_)
            | VerityError::Training(_)
            | VerityError::Io(_)
            | VerityError::Json(_)
            | VerityError::Csv(_)
            | VerityError::Internal(_) => ErrorKind::Internal,
        };

        let message = match kind {
            ErrorKind::Internal => format!("Prediction failed: {error}"),
            _ => error.to_string(),
        };

        PredictionError { kind, message }
    }
}

/// The outcome of one prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: Label,
    pub confidence: f64,
    pub is_fake: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<PredictionError>,
}

impl PredictionResult {
    /// A successful prediction.
    pub fn success(label: Label, confidence: f64) -> Self {
        PredictionResult {
            label,
            confidence,
            is_fake: label == Label::Fake,
            error: None,
        }
    }

    /// A failed prediction carrying the `ERROR` sentinel.
    pub fn failure(error: PredictionError) -> Self {
        PredictionResult {
            label: Label::Error,
            confidence: 0.0,
            is_fake: false,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Error kind, if the prediction failed.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(PredictionError::kind)
    }
}

impl From<VerityError> for PredictionResult {
    fn from(error: VerityError) -> Self {
        PredictionResult::failure(error.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_serialization() {
        assert_eq!(serde_json::to_string(&Label::Fake).unwrap(), "\"FAKE\"");
        assert_eq!(serde_json::to_string(&Label::True).unwrap(), "\"TRUE\"");
        assert_eq!(serde_json::to_string(&Label::Error).unwrap(), "\"ERROR\"");
        assert_eq!(Label::from_class(0), Some(Label::Fake));
        assert_eq!(Label::from_class(1), Some(Label::True));
        assert_eq!(Label::from_class(7), None);
    }

    #[test]
    fn test_error_mapping() {
        let cases = [
            (VerityError::input("Text cannot be None"), ErrorKind::Input, true),
            (VerityError::EmptyInput, ErrorKind::EmptyInput, true),
            (VerityError::NoContent, ErrorKind::NoContent, true),
            (
                VerityError::artifact_not_found("model.bin"),
                ErrorKind::ArtifactNotFound,
                false,
            ),
            (
                VerityError::artifact_corrupt("bad magic"),
                ErrorKind::ArtifactCorrupt,
                false,
            ),
            (VerityError::internal("boom"), ErrorKind::Internal, false),
            (
                VerityError::Io(std::io::Error::other("disk")),
                ErrorKind::Internal,
                false,
            ),
        ];

        for (error, kind, client) in cases {
            let mapped = PredictionError::from(error);
            assert_eq!(mapped.kind(), kind);
            assert_eq!(mapped.kind().is_client_error(), client);
        }
    }

    #[test]
    fn test_error_messages() {
        let error = PredictionError::from(VerityError::EmptyInput);
        assert_eq!(error.message(), "Empty text provided");

        let error = PredictionError::from(VerityError::NoContent);
        assert_eq!(
            error.to_string(),
            "Text contains no valid words after preprocessing"
        );

        let error = PredictionError::from(VerityError::internal("boom"));
        assert_eq!(error.message(), "Prediction failed: Internal error: boom");
    }

    #[test]
    fn test_failure_result() {
        let result = PredictionResult::from(VerityError::NoContent);

        assert_eq!(result.label, Label::Error);
        assert_eq!(result.confidence, 0.0);
        assert!(!result.is_fake);
        assert!(result.is_error());
        assert_eq!(result.error_kind(), Some(ErrorKind::NoContent));
    }

    #[test]
    fn test_success_result_json() {
        let result = PredictionResult::success(Label::Fake, 0.875);
        assert!(result.is_fake);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"label": "FAKE", "confidence": 0.875, "is_fake": true})
        );
    }
}
