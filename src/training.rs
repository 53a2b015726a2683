//! Offline artifact builder.
//!
//! Fits the vectorizer and classifier on a labelled corpus and evaluates them
//! on a stratified hold-out split. Training input is normalized with the same
//! [`TextNormalizer`] that serving uses; documents that normalize to nothing
//! are dropped.
//!
//! Supported inputs:
//! - one CSV file per class with a `text` column (`Fake.csv`, `True.csv`)
//! - JSON lines `{"text": "...", "label": "fake" | "true" | 0 | 1}`

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use csv::ReaderBuilder;
use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::TrainingConfig;
use crate::error::{Result, VerityError};
use crate::model::artifact::{ArtifactMetadata, ModelArtifact};
use crate::model::classifier::LogisticRegression;
use crate::model::vectorizer::TfIdfVectorizer;
use crate::normalize::TextNormalizer;

/// Class index of fabricated news.
pub const FAKE_CLASS: u8 = 0;
/// Class index of genuine news.
pub const TRUE_CLASS: u8 = 1;

const CLASS_NAMES: [&str; 2] = ["Fake", "True"];

/// A raw training document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledDocument {
    pub text: String,
    pub label: u8,
}

impl LabeledDocument {
    pub fn new<S: Into<String>>(text: S, label: u8) -> Self {
        LabeledDocument {
            text: text.into(),
            label,
        }
    }
}

/// Read the `text` column of a CSV file, labelling every row with `label`.
pub fn read_csv<P: AsRef<Path>>(path: P, label: u8) -> Result<Vec<LabeledDocument>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new().flexible(true).from_path(path)?;

    let headers = reader.headers()?.clone();
    let text_column = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("text"))
        .ok_or_else(|| {
            VerityError::training(format!("{} has no 'text' column", path.display()))
        })?;

    let mut documents = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(text) = record.get(text_column) {
            documents.push(LabeledDocument::new(text, label));
        }
    }

    debug!("Read {} documents from {}", documents.len(), path.display());
    Ok(documents)
}

/// Read JSON lines of `{text, label}` objects. Blank lines are ignored.
pub fn read_jsonl<P: AsRef<Path>>(path: P) -> Result<Vec<LabeledDocument>> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let mut documents = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(&line)?;
        let text = value.get("text").and_then(Value::as_str);
        let label = value.get("label").and_then(parse_label);
        match (text, label) {
            (Some(text), Some(label)) => documents.push(LabeledDocument::new(text, label)),
            _ => warn!(
                "Skipping line {} of {}: expected text and fake/true label",
                line_no + 1,
                path.display()
            ),
        }
    }

    Ok(documents)
}

fn parse_label(value: &Value) -> Option<u8> {
    match value {
        Value::String(s) if s.eq_ignore_ascii_case("fake") => Some(FAKE_CLASS),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(TRUE_CLASS),
        Value::Number(n) => match n.as_u64() {
            Some(0) => Some(FAKE_CLASS),
            Some(1) => Some(TRUE_CLASS),
            _ => None,
        },
        _ => None,
    }
}

/// Split indices into `(train, test)`, keeping class proportions.
///
/// Each class contributes `round(test_size * n)` documents to the test set,
/// leaving at least one in training. The same seed gives the same split.
pub fn stratified_split(labels: &[u8], test_size: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut by_class: Vec<(u8, Vec<usize>)> = Vec::new();
    for (idx, &label) in labels.iter().enumerate() {
        match by_class.iter_mut().find(|(l, _)| *l == label) {
            Some((_, indices)) => indices.push(idx),
            None => by_class.push((label, vec![idx])),
        }
    }
    by_class.sort_by_key(|(label, _)| *label);

    let mut train = Vec::new();
    let mut test = Vec::new();
    for (_, mut indices) in by_class {
        indices.shuffle(&mut rng);
        let n_test = ((indices.len() as f64 * test_size).round() as usize)
            .min(indices.len().saturating_sub(1));
        test.extend_from_slice(&indices[..n_test]);
        train.extend_from_slice(&indices[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    (train, test)
}

/// Precision, recall and F1 for one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Hold-out evaluation of a trained model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub accuracy: f64,
    /// Indexed by class: fake, then true.
    pub classes: Vec<ClassMetrics>,
    /// `confusion_matrix[actual][predicted]`.
    pub confusion_matrix: [[usize; 2]; 2],
}

impl EvaluationReport {
    /// Compare predictions with the truth.
    pub fn from_predictions(actual: &[u8], predicted: &[u8]) -> Self {
        let mut matrix = [[0usize; 2]; 2];
        for (&a, &p) in actual.iter().zip(predicted) {
            if a <= 1 && p <= 1 {
                matrix[a as usize][p as usize] += 1;
            }
        }

        let total: usize = matrix.iter().flatten().sum();
        let correct = matrix[0][0] + matrix[1][1];
        let accuracy = ratio(correct, total);

        let classes = (0..2)
            .map(|c| {
                let tp = matrix[c][c];
                let predicted_c = matrix[0][c] + matrix[1][c];
                let support = matrix[c][0] + matrix[c][1];
                let precision = ratio(tp, predicted_c);
                let recall = ratio(tp, support);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                ClassMetrics {
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect();

        EvaluationReport {
            accuracy,
            classes,
            confusion_matrix: matrix,
        }
    }

    /// Flatten into named metrics for the artifact metadata.
    pub fn metrics(&self) -> HashMap<String, f64> {
        let mut metrics = HashMap::new();
        metrics.insert("accuracy".to_string(), self.accuracy);
        for (name, class) in CLASS_NAMES.iter().zip(&self.classes) {
            let name = name.to_lowercase();
            metrics.insert(format!("precision_{name}"), class.precision);
            metrics.insert(format!("recall_{name}"), class.recall);
            metrics.insert(format!("f1_{name}"), class.f1);
        }
        metrics
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Accuracy: {:.4}", self.accuracy)?;
        writeln!(f)?;
        writeln!(
            f,
            "{:>8} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for (name, class) in CLASS_NAMES.iter().zip(&self.classes) {
            writeln!(
                f,
                "{:>8} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                name, class.precision, class.recall, class.f1, class.support
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Confusion matrix (rows: actual, columns: predicted)")?;
        writeln!(f, "{:>8} {:>8} {:>8}", "", CLASS_NAMES[0], CLASS_NAMES[1])?;
        for (name, row) in CLASS_NAMES.iter().zip(&self.confusion_matrix) {
            writeln!(f, "{:>8} {:>8} {:>8}", name, row[0], row[1])?;
        }
        Ok(())
    }
}

/// Result of a training run.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub artifact: ModelArtifact,
    pub report: EvaluationReport,
    /// Raw documents kept out of training, in corpus order.
    pub held_out: Vec<LabeledDocument>,
    /// Documents dropped because they normalized to nothing.
    pub dropped: usize,
}

/// Builds model artifacts from labelled documents.
#[derive(Debug, Clone)]
pub struct Trainer {
    normalizer: Arc<TextNormalizer>,
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(normalizer: Arc<TextNormalizer>, config: TrainingConfig) -> Self {
        Trainer { normalizer, config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Normalize, split, fit and evaluate.
    pub fn train(&self, documents: Vec<LabeledDocument>) -> Result<TrainingOutcome> {
        let start = Instant::now();
        if let Some(doc) = documents.iter().find(|d| d.label > TRUE_CLASS) {
            return Err(VerityError::training(format!("Invalid label {}", doc.label)));
        }

        let total = documents.len();
        let cleaned: Vec<String> = documents
            .par_iter()
            .map(|doc| self.normalizer.clean(&doc.text))
            .collect();

        let (documents, cleaned): (Vec<LabeledDocument>, Vec<String>) = documents
            .into_iter()
            .zip(cleaned)
            .filter(|(_, text)| !text.is_empty())
            .unzip();
        let dropped = total - documents.len();
        if dropped > 0 {
            warn!("Dropped {dropped} documents that normalized to nothing");
        }

        if documents.is_empty() {
            return Err(VerityError::training(
                "No documents left after normalization",
            ));
        }

        let labels: Vec<u8> = documents.iter().map(|d| d.label).collect();
        let (train_idx, test_idx) =
            stratified_split(&labels, self.config.test_size, self.config.seed);
        info!(
            "Training on {} documents, evaluating on {}",
            train_idx.len(),
            test_idx.len()
        );

        let train_text: Vec<String> = train_idx.iter().map(|&i| cleaned[i].clone()).collect();
        let train_labels: Vec<u8> = train_idx.iter().map(|&i| labels[i]).collect();

        let mut vectorizer = TfIdfVectorizer::new(self.config.vectorizer_params());
        let train_features = vectorizer.fit_transform(&train_text)?;
        debug!("Vectorizer fitted: {vectorizer:?}");

        let classifier = LogisticRegression::fit(
            &train_features,
            &train_labels,
            &self.config.classifier_params(),
        )?;

        let test_labels: Vec<u8> = test_idx.iter().map(|&i| labels[i]).collect();
        let predicted = test_idx
            .iter()
            .map(|&i| {
                classifier
                    .predict(&vectorizer.transform(&cleaned[i]))
                    .map(|p| p.class)
            })
            .collect::<Result<Vec<u8>>>()?;
        let report = EvaluationReport::from_predictions(&test_labels, &predicted);

        let mut metadata =
            ArtifactMetadata::new("fake_news_classifier", self.normalizer.min_word_length());
        metadata.training_documents = train_idx.len();
        metadata.hyperparameters = self.hyperparameters();
        metadata.validation_metrics = report.metrics();

        let held_out = test_idx.iter().map(|&i| documents[i].clone()).collect();
        let artifact = ModelArtifact::new(classifier, vectorizer, metadata);
        artifact.validate()?;

        info!(
            "Training finished in {:.2?} with hold-out accuracy {:.4}",
            start.elapsed(),
            report.accuracy
        );

        Ok(TrainingOutcome {
            artifact,
            report,
            held_out,
            dropped,
        })
    }

    fn hyperparameters(&self) -> HashMap<String, f64> {
        let c = &self.config;
        HashMap::from([
            ("max_features".to_string(), c.max_features as f64),
            ("min_df".to_string(), c.min_df as f64),
            ("max_df".to_string(), c.max_df),
            ("ngram_min".to_string(), c.ngram_range.0 as f64),
            ("ngram_max".to_string(), c.ngram_range.1 as f64),
            ("test_size".to_string(), c.test_size),
            ("seed".to_string(), c.seed as f64),
            ("c".to_string(), c.c),
            ("max_iter".to_string(), c.max_iter as f64),
            ("tol".to_string(), c.tol),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn corpus() -> Vec<LabeledDocument> {
        let fake = [
            "Shocking miracle cure doctors hide from you",
            "Celebrity secretly replaced by clone insiders reveal",
            "Miracle diet shocking secret doctors hate",
            "Aliens secretly control government insiders claim",
            "Shocking truth about vaccines they hide",
            "Secret clone army revealed by anonymous insider",
            "Doctors hate this shocking miracle trick",
            "Government hides alien secret shocking leak",
            "Anonymous insider reveals shocking celebrity secret",
            "Miracle trick cures everything doctors stunned",
        ];
        let genuine = [
            "Senate passes budget bill after lengthy debate",
            "Central bank raises interest rates by quarter point",
            "Parliament approves infrastructure spending plan",
            "Senate committee debates budget amendment",
            "Officials report quarterly economic growth figures",
            "Central bank officials discuss interest rate policy",
            "Parliament committee approves budget report",
            "Minister announces infrastructure investment plan",
            "Senate approves spending bill amendment",
            "Economic growth figures released by officials",
        ];
        fake.iter()
            .map(|t| LabeledDocument::new(*t, FAKE_CLASS))
            .chain(genuine.iter().map(|t| LabeledDocument::new(*t, TRUE_CLASS)))
            .collect()
    }

    #[test]
    fn test_stratified_split() {
        let labels = [0, 0, 0, 0, 0, 1, 1, 1, 1, 1];
        let (train, test) = stratified_split(&labels, 0.2, 42);

        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);
        assert_eq!(test.iter().filter(|&&i| labels[i] == 0).count(), 1);
        assert_eq!(test.iter().filter(|&&i| labels[i] == 1).count(), 1);

        let mut all: Vec<usize> = train.iter().chain(&test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());

        assert_eq!(stratified_split(&labels, 0.2, 42), (train, test));
    }

    #[test]
    fn test_split_keeps_one_training_example() {
        let (train, test) = stratified_split(&[0, 1], 0.9, 1);
        assert_eq!(train, vec![0, 1]);
        assert!(test.is_empty());
    }

    #[test]
    fn test_report() {
        let report = EvaluationReport::from_predictions(&[0, 0, 1, 1], &[0, 1, 1, 1]);

        assert_eq!(report.accuracy, 0.75);
        assert_eq!(report.confusion_matrix, [[1, 1], [0, 2]]);
        assert_eq!(report.classes[0].precision, 1.0);
        assert_eq!(report.classes[0].recall, 0.5);
        assert_eq!(report.classes[1].support, 2);
        assert!(report.to_string().contains("Accuracy: 0.7500"));
        assert_eq!(report.metrics()["recall_fake"], 0.5);
    }

    #[test]
    fn test_train() {
        let normalizer = Arc::new(TextNormalizer::builtin().unwrap());
        let mut config = TrainingConfig::default();
        config.min_df = 1;
        let trainer = Trainer::new(normalizer, config);

        let mut documents = corpus();
        documents.push(LabeledDocument::new("12345 !!!", FAKE_CLASS));

        let outcome = trainer.train(documents).unwrap();

        assert_eq!(outcome.dropped, 1);
        assert_eq!(outcome.held_out.len(), 4);
        assert_eq!(outcome.artifact.metadata.training_documents, 16);
        assert_eq!(outcome.artifact.metadata.min_word_length, 2);
        assert!(outcome.artifact.validate().is_ok());
        assert!(outcome.report.accuracy >= 0.0 && outcome.report.accuracy <= 1.0);
    }

    #[test]
    fn test_train_rejects_bad_labels() {
        let trainer = Trainer::new(
            Arc::new(TextNormalizer::builtin().unwrap()),
            TrainingConfig::default(),
        );
        let result = trainer.train(vec![LabeledDocument::new("senate", 3)]);
        assert!(matches!(result, Err(VerityError::Training(_))));

        let result = trainer.train(vec![LabeledDocument::new("123", 0)]);
        assert!(matches!(result, Err(VerityError::Training(_))));
    }

    #[test]
    fn test_read_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Fake.csv");
        fs::write(
            &path,
            "title,text,subject\nA,\"Shocking, secret news\",politics\nB,Another story,news\n",
        )
        .unwrap();

        let documents = read_csv(&path, FAKE_CLASS).unwrap();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].text, "Shocking, secret news");
        assert!(documents.iter().all(|d| d.label == FAKE_CLASS));
    }

    #[test]
    fn test_read_csv_without_text_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "title,body\nA,B\n").unwrap();

        assert!(matches!(
            read_csv(&path, TRUE_CLASS),
            Err(VerityError::Training(_))
        ));
    }

    #[test]
    fn test_read_jsonl() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corpus.jsonl");
        fs::write(
            &path,
            concat!(
                "{\"text\": \"Senate votes\", \"label\": \"true\"}\n",
                "\n",
                "{\"text\": \"Alien cover-up\", \"label\": 0}\n",
                "{\"text\": \"No label\"}\n",
            ),
        )
        .unwrap();

        let documents = read_jsonl(&path).unwrap();
        assert_eq!(
            documents,
            vec![
                LabeledDocument::new("Senate votes", TRUE_CLASS),
                LabeledDocument::new("Alien cover-up", FAKE_CLASS),
            ]
        );
    }
}
