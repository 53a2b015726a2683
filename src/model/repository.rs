//! Lazily loaded, cached model artifact.
//!
//! A [`ModelRepository`] reads its artifact the first time anyone asks for
//! it and hands out the same [`Arc`] forever after. Concurrent first callers
//! serialize on a load guard, so the file is read at most once per successful
//! load; after that, access is a lock-free [`OnceLock`] read.
//!
//! ```text
//! NotLoaded ──get()──> Loading ──ok──> Loaded
//!     ^                   │
//!     └──────error────────┘
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use log::{debug, error, info, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VerityError};
use crate::model::artifact::ModelArtifact;

/// Lifecycle of a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepositoryState {
    NotLoaded,
    Loading,
    Loaded,
}

/// Owner of the process's model artifact.
#[derive(Debug)]
pub struct ModelRepository {
    primary_path: PathBuf,
    legacy_path: Option<PathBuf>,
    expected_min_word_length: Option<usize>,
    load_guard: Mutex<()>,
    loading: AtomicBool,
    artifact: OnceLock<Arc<ModelArtifact>>,
    resolved_path: OnceLock<PathBuf>,
    load_count: AtomicUsize,
}

impl ModelRepository {
    /// Create a repository reading from `primary_path`.
    pub fn new<P: Into<PathBuf>>(primary_path: P) -> Self {
        ModelRepository {
            primary_path: primary_path.into(),
            legacy_path: None,
            expected_min_word_length: None,
            load_guard: Mutex::new(()),
            loading: AtomicBool::new(false),
            artifact: OnceLock::new(),
            resolved_path: OnceLock::new(),
            load_count: AtomicUsize::new(0),
        }
    }

    /// Location tried when the primary path does not exist.
    pub fn with_legacy_path<P: Into<PathBuf>>(mut self, legacy_path: P) -> Self {
        self.legacy_path = Some(legacy_path.into());
        self
    }

    /// Token length threshold the serving normalizer uses.
    ///
    /// A different value recorded in the artifact is logged at load time.
    pub fn with_expected_min_word_length(mut self, min_word_length: usize) -> Self {
        self.expected_min_word_length = Some(min_word_length);
        self
    }

    /// A repository that already holds `artifact` and never touches disk.
    ///
    /// The artifact is validated the same way a loaded one is.
    pub fn preloaded(artifact: ModelArtifact) -> Result<Self> {
        artifact.validate()?;
        let repository = Self::new(PathBuf::new());
        let _ = repository.artifact.set(Arc::new(artifact));
        Ok(repository)
    }

    /// Get the artifact, loading it on first use.
    pub fn get(&self) -> Result<Arc<ModelArtifact>> {
        if let Some(artifact) = self.artifact.get() {
            return Ok(Arc::clone(artifact));
        }

        let _guard = self.load_guard.lock();
        // Another caller may have finished while we waited
        if let Some(artifact) = self.artifact.get() {
            return Ok(Arc::clone(artifact));
        }

        self.loading.store(true, Ordering::Release);
        let result = self.read_artifact();
        self.loading.store(false, Ordering::Release);

        match result {
            Ok((artifact, path)) => {
                let artifact = Arc::new(artifact);
                let _ = self.resolved_path.set(path);
                let _ = self.artifact.set(Arc::clone(&artifact));
                Ok(artifact)
            }
            Err(e) => {
                error!("Failed to load model: {e}");
                Err(e)
            }
        }
    }

    /// Load eagerly; a no-op once loaded.
    pub fn load(&self) -> Result<()> {
        self.get().map(|_| ())
    }

    /// Whether an artifact is cached.
    pub fn is_loaded(&self) -> bool {
        self.artifact.get().is_some()
    }

    pub fn state(&self) -> RepositoryState {
        if self.is_loaded() {
            RepositoryState::Loaded
        } else if self.loading.load(Ordering::Acquire) {
            RepositoryState::Loading
        } else {
            RepositoryState::NotLoaded
        }
    }

    /// Number of times the artifact file has been opened.
    pub fn load_count(&self) -> usize {
        self.load_count.load(Ordering::Acquire)
    }

    /// Path the cached artifact was read from.
    pub fn resolved_path(&self) -> Option<&Path> {
        self.resolved_path.get().map(PathBuf::as_path)
    }

    pub fn primary_path(&self) -> &Path {
        &self.primary_path
    }

    pub fn legacy_path(&self) -> Option<&Path> {
        self.legacy_path.as_deref()
    }

    /// The path a load would read from right now.
    pub fn locate(&self) -> Result<PathBuf> {
        if self.primary_path.exists() {
            return Ok(self.primary_path.clone());
        }
        if let Some(legacy) = self.legacy_path.as_ref().filter(|p| p.exists()) {
            warn!(
                "Model not found at {}, using legacy location {}",
                self.primary_path.display(),
                legacy.display()
            );
            return Ok(legacy.clone());
        }
        Err(VerityError::artifact_not_found(&self.primary_path))
    }

    fn read_artifact(&self) -> Result<(ModelArtifact, PathBuf)> {
        let path = self.locate()?;
        debug!("Reading model artifact from {}", path.display());

        self.load_count.fetch_add(1, Ordering::AcqRel);
        let artifact = ModelArtifact::load(&path)?;

        if let Some(expected) = self.expected_min_word_length {
            if artifact.metadata.min_word_length != expected {
                warn!(
                    "Model was trained with min_word_length {} but serving uses {}",
                    artifact.metadata.min_word_length, expected
                );
            }
        }

        info!(
            "Loaded model '{}' from {} ({} features, trained {})",
            artifact.metadata.name,
            path.display(),
            artifact.vectorizer.feature_count(),
            artifact.metadata.trained_at.to_rfc3339()
        );

        Ok((artifact, path))
    }
}
