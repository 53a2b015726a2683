//! Example headlines for trying out the classifier.
//!
//! Samples come from a JSON file shaped like
//! `{"samples": [{"text": .., "label": "fake"|"true", "category": .., "source": ..}]}`.
//! Entries with a missing text or an unknown label are skipped. When the file
//! is missing, unreadable or yields no valid entries, a built-in set is used.

use std::fs;
use std::path::Path;

use log::{debug, warn};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ground-truth label of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleLabel {
    Fake,
    True,
}

impl SampleLabel {
    /// Case-insensitive parse of `"fake"` or `"true"`.
    pub fn parse(label: &str) -> Option<Self> {
        match label.to_lowercase().as_str() {
            "fake" => Some(SampleLabel::Fake),
            "true" => Some(SampleLabel::True),
            _ => None,
        }
    }
}

/// One example headline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub text: String,
    pub label: SampleLabel,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub source: String,
}

impl Sample {
    pub fn new(text: &str, label: SampleLabel, category: &str, source: &str) -> Self {
        Sample {
            text: text.to_string(),
            label,
            category: category.to_string(),
            source: source.to_string(),
        }
    }

    pub fn is_fake(&self) -> bool {
        self.label == SampleLabel::Fake
    }

    pub fn is_true(&self) -> bool {
        self.label == SampleLabel::True
    }
}

const FALLBACK_SAMPLES: &[(&str, SampleLabel, &str)] = &[
    (
        "BREAKING: Scientists Discover Chocolate Cures All Diseases, Big Pharma Hiding Truth",
        SampleLabel::Fake,
        "health",
    ),
    (
        "SHOCKING: World Leaders Secretly Replaced by Robots, Insider Reveals",
        SampleLabel::Fake,
        "politics",
    ),
    (
        "Pope Francis Shocks World, Endorses Presidential Candidate",
        SampleLabel::Fake,
        "politics",
    ),
    (
        "FBI Agent Suspected in Hillary Email Leaks Found Dead in Apparent Murder-Suicide",
        SampleLabel::Fake,
        "politics",
    ),
    (
        "Donald Trump Sent His Own Plane to Transport 200 Stranded Marines",
        SampleLabel::Fake,
        "politics",
    ),
    (
        "Washington (Reuters) - The U.S. Senate confirmed Jerome Powell as Federal Reserve chairman",
        SampleLabel::True,
        "politics",
    ),
    (
        "NASA's Perseverance Rover Successfully Lands on Mars After Seven-Month Journey",
        SampleLabel::True,
        "science",
    ),
    (
        "Supreme Court Upholds Affordable Care Act in 7-2 Decision",
        SampleLabel::True,
        "politics",
    ),
    (
        "Global COVID-19 Vaccine Distribution Reaches 1 Billion Doses Milestone",
        SampleLabel::True,
        "health",
    ),
    (
        "European Union Announces New Climate Change Legislation Targeting Net Zero by 2050",
        SampleLabel::True,
        "environment",
    ),
];

/// The built-in samples.
pub fn fallback_samples() -> Vec<Sample> {
    FALLBACK_SAMPLES
        .iter()
        .map(|&(text, label, category)| Sample::new(text, label, category, "Fallback"))
        .collect()
}

/// Read-only collection of samples.
#[derive(Debug, Clone)]
pub struct SampleCatalog {
    samples: Vec<Sample>,
    from_file: bool,
}

impl SampleCatalog {
    /// Catalog holding only the built-in samples.
    pub fn builtin() -> Self {
        SampleCatalog {
            samples: fallback_samples(),
            from_file: false,
        }
    }

    /// Catalog holding the given samples, or the built-ins if empty.
    pub fn from_samples(samples: Vec<Sample>) -> Self {
        if samples.is_empty() {
            return Self::builtin();
        }
        SampleCatalog {
            samples,
            from_file: false,
        }
    }

    /// Load samples from a JSON file, falling back to the built-ins.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(
                    "Samples file {} unavailable ({}), using fallback samples",
                    path.display(),
                    e
                );
                return Self::builtin();
            }
        };

        match Self::parse(&content) {
            Some(samples) if !samples.is_empty() => {
                debug!("Loaded {} samples from {}", samples.len(), path.display());
                SampleCatalog {
                    samples,
                    from_file: true,
                }
            }
            Some(_) => {
                warn!("No valid samples found in {}, using fallback samples", path.display());
                Self::builtin()
            }
            None => Self::builtin(),
        }
    }

    /// Parse the samples document; `None` if it is not usable at all.
    fn parse(content: &str) -> Option<Vec<Sample>> {
        let document: Value = match serde_json::from_str(content) {
            Ok(document) => document,
            Err(e) => {
                warn!("Invalid JSON in samples file: {e}");
                return None;
            }
        };

        let Some(entries) = document.get("samples").and_then(Value::as_array) else {
            warn!("Samples file must contain a 'samples' array");
            return None;
        };

        let samples = entries
            .iter()
            .filter_map(|entry| {
                let text = entry.get("text").and_then(Value::as_str);
                let label = entry.get("label").and_then(Value::as_str);
                let (Some(text), Some(label)) = (text, label) else {
                    warn!("Skipping invalid sample (missing text or label): {entry}");
                    return None;
                };
                let Some(label) = SampleLabel::parse(label) else {
                    warn!("Skipping sample with invalid label: {label}");
                    return None;
                };
                let field = |name: &str| {
                    entry
                        .get(name)
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string()
                };
                Some(Sample {
                    text: text.to_string(),
                    label,
                    category: field("category"),
                    source: field("source"),
                })
            })
            .collect();

        Some(samples)
    }

    /// Every sample, in file order.
    pub fn all(&self) -> &[Sample] {
        &self.samples
    }

    /// Up to `count` fake samples, in file order.
    pub fn fake(&self, count: usize) -> Vec<Sample> {
        self.with_label(SampleLabel::Fake, count)
    }

    /// Up to `count` true samples, in file order.
    pub fn true_samples(&self, count: usize) -> Vec<Sample> {
        self.with_label(SampleLabel::True, count)
    }

    fn with_label(&self, label: SampleLabel, count: usize) -> Vec<Sample> {
        self.samples
            .iter()
            .filter(|s| s.label == label)
            .take(count)
            .cloned()
            .collect()
    }

    /// A random sample, optionally restricted to one label.
    pub fn random(&self, label: Option<SampleLabel>) -> Option<&Sample> {
        self.random_with(label, &mut rand::rng())
    }

    /// Like [`random`](Self::random) with a caller-supplied generator.
    pub fn random_with<R: Rng + ?Sized>(
        &self,
        label: Option<SampleLabel>,
        rng: &mut R,
    ) -> Option<&Sample> {
        let candidates: Vec<&Sample> = self
            .samples
            .iter()
            .filter(|s| label.is_none_or(|l| s.label == l))
            .collect();
        candidates.choose(rng).copied()
    }

    /// Whether the catalog holds any samples.
    pub fn is_loaded(&self) -> bool {
        !self.samples.is_empty()
    }

    /// Whether the samples came from a file rather than the built-ins.
    pub fn is_from_file(&self) -> bool {
        self.from_file
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl Default for SampleCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tempfile::NamedTempFile;

    fn catalog_from(json: &str) -> SampleCatalog {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), json).unwrap();
        SampleCatalog::load(file.path())
    }

    #[test]
    fn test_builtin() {
        let catalog = SampleCatalog::builtin();
        assert_eq!(catalog.len(), 10);
        assert_eq!(catalog.fake(100).len(), 5);
        assert_eq!(catalog.true_samples(100).len(), 5);
        assert!(catalog.is_loaded());
        assert!(!catalog.is_from_file());
    }

    #[test]
    fn test_load_skips_invalid_entries() {
        let catalog = catalog_from(
            r#"{"samples": [
                {"text": "Aliens built the pyramids", "label": "FAKE", "category": "history"},
                {"text": "Parliament passes budget", "label": "true"},
                {"text": "Missing label"},
                {"label": "fake"},
                {"text": "Odd label", "label": "satire"}
            ]}"#,
        );

        assert!(catalog.is_from_file());
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.all()[0].label, SampleLabel::Fake);
        assert_eq!(catalog.all()[0].category, "history");
        assert_eq!(catalog.all()[1].source, "");
    }

    #[test]
    fn test_fallbacks() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = SampleCatalog::load(dir.path().join("none.json"));
        assert!(!missing.is_from_file());
        assert_eq!(missing.len(), 10);

        assert!(!catalog_from("not json").is_from_file());
        assert!(!catalog_from(r#"{"items": []}"#).is_from_file());
        assert!(!catalog_from(r#"{"samples": [{"text": "x", "label": "maybe"}]}"#).is_from_file());
    }

    #[test]
    fn test_count_limits() {
        let catalog = SampleCatalog::builtin();
        let fake = catalog.fake(2);

        assert_eq!(fake.len(), 2);
        assert!(fake.iter().all(Sample::is_fake));
        assert_eq!(fake[0], catalog.all()[0]);
        assert!(catalog.true_samples(0).is_empty());
    }

    #[test]
    fn test_random() {
        let catalog = SampleCatalog::builtin();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..20 {
            assert!(catalog.random_with(Some(SampleLabel::True), &mut rng).unwrap().is_true());
            assert!(catalog.random_with(Some(SampleLabel::Fake), &mut rng).unwrap().is_fake());
        }
        assert!(catalog.random(None).is_some());

        let only_fake = SampleCatalog::from_samples(vec![Sample::new(
            "Moon made of cheese",
            SampleLabel::Fake,
            "",
            "",
        )]);
        assert!(only_fake.random(Some(SampleLabel::True)).is_none());
    }

    #[test]
    fn test_label_parse() {
        assert_eq!(SampleLabel::parse("Fake"), Some(SampleLabel::Fake));
        assert_eq!(SampleLabel::parse("TRUE"), Some(SampleLabel::True));
        assert_eq!(SampleLabel::parse("other"), None);
    }
}
