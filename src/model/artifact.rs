//! On-disk model artifact.
//!
//! # File layout
//!
//! ```text
//! +--------+-------+-------+-------------+---------+----------------+
//! | "VRTY" | major | minor | payload len | CRC32   | bincode payload|
//! | 4 B    | 1 B   | 1 B   | u64 LE      | u32 LE  | len bytes      |
//! +--------+-------+-------+-------------+---------+----------------+
//! ```
//!
//! The payload is the tuple `(classifier, vectorizer, metadata)`.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VerityError};
use crate::model::classifier::LogisticRegression;
use crate::model::vectorizer::TfIdfVectorizer;

/// Magic number at the start of every artifact file.
pub const ARTIFACT_MAGIC: &[u8; 4] = b"VRTY";
/// Major format version; readers reject any other major version.
pub const FORMAT_VERSION_MAJOR: u8 = 1;
/// Minor format version.
pub const FORMAT_VERSION_MINOR: u8 = 0;
/// Upper bound on the payload size accepted when reading.
pub const MAX_PAYLOAD_BYTES: u64 = 1 << 30;

/// Descriptive information recorded at training time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Model name/identifier.
    pub name: String,
    /// Crate version that produced the artifact.
    pub version: String,
    /// Training timestamp.
    pub trained_at: DateTime<Utc>,
    /// Number of training documents used.
    pub training_documents: usize,
    /// Token length threshold the training corpus was normalized with.
    pub min_word_length: usize,
    /// Model hyperparameters.
    pub hyperparameters: HashMap<String, f64>,
    /// Performance metrics on the held-out set.
    pub validation_metrics: HashMap<String, f64>,
}

impl ArtifactMetadata {
    pub fn new<S: Into<String>>(name: S, min_word_length: usize) -> Self {
        ArtifactMetadata {
            name: name.into(),
            version: crate::VERSION.to_string(),
            trained_at: Utc::now(),
            training_documents: 0,
            min_word_length,
            hyperparameters: HashMap::new(),
            validation_metrics: HashMap::new(),
        }
    }
}

/// A trained classifier together with the vectorizer it was fitted against.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelArtifact {
    pub classifier: LogisticRegression,
    pub vectorizer: TfIdfVectorizer,
    pub metadata: ArtifactMetadata,
}

#[derive(Serialize)]
struct PayloadRef<'a>(
    &'a LogisticRegression,
    &'a TfIdfVectorizer,
    &'a ArtifactMetadata,
);

#[derive(Deserialize)]
struct Payload(LogisticRegression, TfIdfVectorizer, ArtifactMetadata);

impl ModelArtifact {
    pub fn new(
        classifier: LogisticRegression,
        vectorizer: TfIdfVectorizer,
        metadata: ArtifactMetadata,
    ) -> Self {
        ModelArtifact {
            classifier,
            vectorizer,
            metadata,
        }
    }

    /// Check that the classifier and vectorizer fit together.
    pub fn validate(&self) -> Result<()> {
        self.vectorizer.validate()?;
        self.classifier.validate(self.vectorizer.feature_count())
    }

    /// Serialize into any writer.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let payload = bincode::serialize(&PayloadRef(
            &self.classifier,
            &self.vectorizer,
            &self.metadata,
        ))
        .map_err(|e| VerityError::internal(format!("Failed to serialize model: {e}")))?;

        writer.write_all(ARTIFACT_MAGIC)?;
        writer.write_all(&[FORMAT_VERSION_MAJOR, FORMAT_VERSION_MINOR])?;
        writer.write_u64::<LittleEndian>(payload.len() as u64)?;
        writer.write_u32::<LittleEndian>(crc32fast::hash(&payload))?;
        writer.write_all(&payload)?;
        writer.flush()?;
        Ok(())
    }

    /// Deserialize and validate from any reader.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut magic = [0u8; 4];
        read_header(reader.read_exact(&mut magic))?;
        if &magic != ARTIFACT_MAGIC {
            return Err(VerityError::artifact_corrupt("invalid magic number"));
        }

        let mut version = [0u8; 2];
        read_header(reader.read_exact(&mut version))?;
        if version[0] != FORMAT_VERSION_MAJOR {
            return Err(VerityError::artifact_corrupt(format!(
                "unsupported format version {}.{}",
                version[0], version[1]
            )));
        }

        let payload_len = read_header(reader.read_u64::<LittleEndian>())?;
        if payload_len > MAX_PAYLOAD_BYTES {
            return Err(VerityError::artifact_corrupt(format!(
                "payload length {payload_len} exceeds limit"
            )));
        }
        let checksum = read_header(reader.read_u32::<LittleEndian>())?;

        let mut payload = Vec::new();
        reader.by_ref().take(payload_len).read_to_end(&mut payload)?;
        if payload.len() as u64 != payload_len {
            return Err(VerityError::artifact_corrupt(format!(
                "truncated payload: expected {payload_len} bytes, found {}",
                payload.len()
            )));
        }
        if crc32fast::hash(&payload) != checksum {
            return Err(VerityError::artifact_corrupt("checksum mismatch"));
        }

        let Payload(classifier, vectorizer, metadata) = bincode::deserialize(&payload)
            .map_err(|e| VerityError::artifact_corrupt(format!("undecodable payload: {e}")))?;

        let artifact = ModelArtifact {
            classifier,
            vectorizer,
            metadata,
        };
        artifact.validate()?;
        Ok(artifact)
    }

    /// Write the artifact to `path`, creating parent directories.
    ///
    /// The file is written next to its destination and renamed into place.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = path.with_extension("tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            self.write_to(&mut writer)?;
        }
        fs::rename(&tmp_path, path)?;

        debug!("Saved model artifact to {}", path.display());
        Ok(())
    }

    /// Read an artifact from `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => VerityError::artifact_not_found(path),
            _ => VerityError::Io(e),
        })?;
        Self::read_from(&mut BufReader::new(file))
    }
}

/// A short header means the file is not an artifact.
fn read_header<T>(result: io::Result<T>) -> Result<T> {
    result.map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => VerityError::artifact_corrupt("truncated header"),
        _ => VerityError::Io(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::vectorizer::VectorizerParams;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn sample_artifact() -> ModelArtifact {
        let mut vectorizer = TfIdfVectorizer::new(VectorizerParams {
            max_features: None,
            min_df: 1,
            max_df: 1.0,
            ngram_range: (1, 1),
        });
        vectorizer
            .fit(&["senate vote".to_string(), "celebrity hoax".to_string()])
            .unwrap();
        let classifier =
            LogisticRegression::from_parts(vec![-1.0, 1.5, -0.5, 2.0], 0.1, vec![0, 1]);
        ModelArtifact::new(classifier, vectorizer, ArtifactMetadata::new("test", 2))
    }

    fn encode(artifact: &ModelArtifact) -> Vec<u8> {
        let mut bytes = Vec::new();
        artifact.write_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_write_read() {
        let artifact = sample_artifact();
        let bytes = encode(&artifact);

        assert_eq!(&bytes[..4], ARTIFACT_MAGIC);
        assert_eq!(bytes[4], FORMAT_VERSION_MAJOR);

        let decoded = ModelArtifact::read_from(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(decoded, artifact);
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = encode(&sample_artifact());
        bytes[0] = b'X';
        let result = ModelArtifact::read_from(&mut Cursor::new(bytes));
        assert!(matches!(result, Err(VerityError::ArtifactCorrupt(_))));
    }

    #[test]
    fn test_unsupported_version() {
        let mut bytes = encode(&sample_artifact());
        bytes[4] = FORMAT_VERSION_MAJOR + 1;
        let result = ModelArtifact::read_from(&mut Cursor::new(bytes));
        assert!(matches!(result, Err(VerityError::ArtifactCorrupt(_))));
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut bytes = encode(&sample_artifact());
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        let result = ModelArtifact::read_from(&mut Cursor::new(bytes));
        assert!(matches!(result, Err(VerityError::ArtifactCorrupt(_))));
    }

    #[test]
    fn test_truncated_files() {
        let bytes = encode(&sample_artifact());

        for len in [0, 3, 10, bytes.len() - 1] {
            let result = ModelArtifact::read_from(&mut Cursor::new(bytes[..len].to_vec()));
            assert!(
                matches!(result, Err(VerityError::ArtifactCorrupt(_))),
                "length {len}"
            );
        }
    }

    #[test]
    fn test_validation_failure_is_corrupt() {
        let mut artifact = sample_artifact();
        artifact.classifier = LogisticRegression::from_parts(vec![1.0], 0.0, vec![0, 1]);

        let bytes = encode(&artifact);
        let result = ModelArtifact::read_from(&mut Cursor::new(bytes));
        assert!(matches!(result, Err(VerityError::ArtifactCorrupt(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("models").join("model.bin");
        let artifact = sample_artifact();

        artifact.save(&path).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());

        let loaded = ModelArtifact::load(&path).unwrap();
        assert_eq!(loaded, artifact);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = ModelArtifact::load(dir.path().join("missing.bin"));
        assert!(matches!(result, Err(VerityError::ArtifactNotFound { .. })));
    }
}
