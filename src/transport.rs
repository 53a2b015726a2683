//! Framework-free HTTP surface.
//!
//! Maps requests onto the service and results onto `(status, JSON body)`
//! pairs, so any HTTP server can host the API by forwarding method, target
//! and body.
//!
//! | Route | Success | Failure |
//! |---|---|---|
//! | `POST /predict {"text": ..}` | `200 {label, confidence, is_fake}` | `400`/`500 {error}` |
//! | `GET /health` | `200 {status, model_loaded, samples_loaded}` | |
//! | `GET /samples` | `200 {samples: [..]}` | |
//! | `GET /samples/fake?count=N` | `200 {samples: [..]}` | |
//! | `GET /samples/true?count=N` | `200 {samples: [..]}` | |

use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::result::{Label, PredictionResult};
use crate::samples::{Sample, SampleCatalog, SampleLabel};
use crate::service::PredictionService;

/// Body of `POST /predict`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// Successful body of `POST /predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub label: Label,
    pub confidence: f64,
    pub is_fake: bool,
}

/// Body of every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Body of the sample routes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplesResponse {
    pub samples: Vec<Sample>,
}

/// Status code and JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    fn ok<T: Serialize>(body: &T) -> Self {
        Self::with_status(200, body)
    }

    fn error(status: u16, message: impl Into<String>) -> Self {
        Self::with_status(
            status,
            &ErrorResponse {
                error: message.into(),
            },
        )
    }

    fn with_status<T: Serialize>(status: u16, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => Response { status, body },
            Err(e) => Response {
                status: 500,
                body: json!({ "error": format!("Failed to encode response: {e}") }),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Map a prediction onto the wire.
pub fn predict_response(result: &PredictionResult) -> Response {
    match &result.error {
        None => Response::ok(&PredictResponse {
            label: result.label,
            confidence: result.confidence,
            is_fake: result.is_fake,
        }),
        Some(error) if error.kind().is_client_error() => Response::error(400, error.message()),
        Some(error) => Response::error(500, error.message()),
    }
}

/// Request router over a service and a sample catalog.
#[derive(Debug, Clone)]
pub struct Api {
    service: Arc<PredictionService>,
    samples: Arc<SampleCatalog>,
    default_count: usize,
}

impl Api {
    pub fn new(
        service: Arc<PredictionService>,
        samples: Arc<SampleCatalog>,
        default_count: usize,
    ) -> Self {
        Api {
            service,
            samples,
            default_count,
        }
    }

    /// Dispatch one request. `target` may carry a query string.
    pub fn handle(&self, method: &str, target: &str, body: &str) -> Response {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        let path = path.trim_end_matches('/');
        debug!("{method} {path}");

        match (method, path) {
            ("POST", "/predict") => self.predict(body),
            ("GET", "/health") => self.health(),
            ("GET", "/samples") => self.samples(None, None),
            ("GET", "/samples/fake") => {
                self.samples(Some(SampleLabel::Fake), query_count(query))
            }
            ("GET", "/samples/true") => {
                self.samples(Some(SampleLabel::True), query_count(query))
            }
            (_, "/predict" | "/health" | "/samples" | "/samples/fake" | "/samples/true") => {
                Response::error(405, "Method not allowed")
            }
            _ => Response::error(404, "Not found"),
        }
    }

    /// `POST /predict`.
    pub fn predict(&self, body: &str) -> Response {
        let request = if body.trim().is_empty() {
            PredictRequest::default()
        } else {
            match serde_json::from_str::<PredictRequest>(body) {
                Ok(request) => request,
                Err(e) => return Response::error(400, format!("Invalid request body: {e}")),
            }
        };

        let result = self.service.predict(request.text.as_deref());
        predict_response(&result)
    }

    /// `GET /health`.
    pub fn health(&self) -> Response {
        let mut health = self.service.health();
        health.samples_loaded = self.samples.is_loaded();
        Response::ok(&health)
    }

    /// `GET /samples`, optionally restricted to one label.
    pub fn samples(&self, label: Option<SampleLabel>, count: Option<usize>) -> Response {
        let count = count.unwrap_or(self.default_count);
        let samples = match label {
            None => self.samples.all().to_vec(),
            Some(SampleLabel::Fake) => self.samples.fake(count),
            Some(SampleLabel::True) => self.samples.true_samples(count),
        };
        Response::ok(&SamplesResponse { samples })
    }
}

/// Value of `count` in a query string; unparseable values are ignored.
fn query_count(query: &str) -> Option<usize> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "count")
        .and_then(|(_, value)| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VerityError;
    use crate::model::repository::ModelRepository;
    use crate::normalize::TextNormalizer;
    use crate::result::PredictionError;

    fn api(model_dir: &std::path::Path) -> Api {
        let service = PredictionService::new(
            Arc::new(TextNormalizer::builtin().unwrap()),
            Arc::new(ModelRepository::new(model_dir.join("missing.bin"))),
        );
        Api::new(Arc::new(service), Arc::new(SampleCatalog::builtin()), 5)
    }

    #[test]
    fn test_predict_response_mapping() {
        let response = predict_response(&PredictionResult::success(Label::True, 0.9));
        assert_eq!(response.status, 200);
        assert_eq!(
            response.body,
            json!({"label": "TRUE", "confidence": 0.9, "is_fake": false})
        );

        let response = predict_response(&PredictionResult::from(VerityError::NoContent));
        assert_eq!(response.status, 400);
        assert_eq!(
            response.body,
            json!({"error": "Text contains no valid words after preprocessing"})
        );

        let response = predict_response(&PredictionResult::failure(PredictionError::from(
            VerityError::artifact_corrupt("bad magic"),
        )));
        assert_eq!(response.status, 500);
    }

    #[test]
    fn test_predict_client_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        let api = api(dir.path());

        for body in ["", "{}", r#"{"text": null}"#, r#"{"text": "   "}"#] {
            let response = api.handle("POST", "/predict", body);
            assert_eq!(response.status, 400, "{body}");
            assert_eq!(response.body, json!({"error": "Empty text provided"}));
        }

        let response = api.handle("POST", "/predict", "{broken");
        assert_eq!(response.status, 400);

        let response = api.handle("POST", "/predict", r#"{"text": "the of and"}"#);
        assert_eq!(response.status, 400);
    }

    #[test]
    fn test_predict_without_model_is_server_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let response = api(dir.path()).handle("POST", "/predict", r#"{"text": "senate vote"}"#);

        assert_eq!(response.status, 500);
        assert!(response.body["error"].as_str().unwrap().contains("Model file not found"));
    }

    #[test]
    fn test_health() {
        let dir = tempfile::TempDir::new().unwrap();
        let response = api(dir.path()).handle("GET", "/health", "");

        assert_eq!(response.status, 200);
        assert_eq!(
            response.body,
            json!({"status": "ok", "model_loaded": false, "samples_loaded": true})
        );
    }

    #[test]
    fn test_sample_routes() {
        let dir = tempfile::TempDir::new().unwrap();
        let api = api(dir.path());

        let all = api.handle("GET", "/samples", "");
        assert_eq!(all.body["samples"].as_array().unwrap().len(), 10);

        let fake = api.handle("GET", "/samples/fake?count=2", "");
        let fake = fake.body["samples"].as_array().unwrap();
        assert_eq!(fake.len(), 2);
        assert!(fake.iter().all(|s| s["label"] == "fake"));

        let genuine = api.handle("GET", "/samples/true?count=oops", "");
        assert_eq!(genuine.body["samples"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_unknown_routes() {
        let dir = tempfile::TempDir::new().unwrap();
        let api = api(dir.path());

        assert_eq!(api.handle("GET", "/nope", "").status, 404);
        assert_eq!(api.handle("GET", "/predict", "").status, 405);
        assert_eq!(api.handle("DELETE", "/samples", "").status, 405);
    }

    #[test]
    fn test_query_count() {
        assert_eq!(query_count("count=3"), Some(3));
        assert_eq!(query_count("a=1&count=7"), Some(7));
        assert_eq!(query_count("count=-1"), None);
        assert_eq!(query_count(""), None);
    }
}
