//! Trained model components and their on-disk form.
//!
//! - [`vectorizer::TfIdfVectorizer`] turns normalized text into features
//! - [`classifier::LogisticRegression`] scores those features
//! - [`artifact::ModelArtifact`] bundles both with metadata
//! - [`repository::ModelRepository`] loads and caches the artifact

pub mod artifact;
pub mod classifier;
pub mod repository;
pub mod vectorizer;

pub use artifact::{ArtifactMetadata, ModelArtifact};
pub use classifier::{ClassPrediction, LogisticRegression, LogisticRegressionParams};
pub use repository::{ModelRepository, RepositoryState};
pub use vectorizer::{SparseVector, TfIdfVectorizer, VectorizerParams};
