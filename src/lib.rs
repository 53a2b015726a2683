//! # Verity
//!
//! Fake news classification over TF-IDF features.
//!
//! ## Features
//!
//! - Deterministic text normalization pipeline
//! - Lazily loaded, shared model artifacts
//! - Typed prediction results and error taxonomy
//! - Offline training with a held-out evaluation report
//! - Sample headlines and a transport-neutral request mapping

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod result;
pub mod samples;
pub mod service;
pub mod training;
pub mod transport;

pub mod prelude {
    pub use crate::error::{Result, VerityError};
    pub use crate::model::{ModelArtifact, ModelRepository};
    pub use crate::normalize::TextNormalizer;
    pub use crate::result::{Label, PredictionResult};
    pub use crate::service::PredictionService;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
