#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use verity::config::TrainingConfig;
use verity::model::ModelArtifact;
use verity::normalize::TextNormalizer;
use verity::training::{FAKE_CLASS, LabeledDocument, TRUE_CLASS, Trainer, TrainingOutcome};

const FAKE_WORDS: &[&str] = &[
    "shocking", "miracle", "secret", "hoax", "clone", "aliens", "insider", "conspiracy",
    "leaked", "cure", "hidden", "exposed",
];

const TRUE_WORDS: &[&str] = &[
    "senate", "budget", "parliament", "minister", "committee", "economy", "officials",
    "report", "quarterly", "amendment", "treasury", "approved",
];

/// Headlines built from disjoint word pools, so the classes are separable.
pub fn corpus(per_class: usize) -> Vec<LabeledDocument> {
    let headline = |words: &[&str], i: usize| {
        (0..6)
            .map(|j| words[(i * 5 + j * 7) % words.len()])
            .collect::<Vec<_>>()
            .join(" ")
    };

    let mut documents = Vec::with_capacity(per_class * 2);
    for i in 0..per_class {
        documents.push(LabeledDocument::new(
            format!("BREAKING: {}!!", headline(FAKE_WORDS, i)),
            FAKE_CLASS,
        ));
        documents.push(LabeledDocument::new(
            format!("The {} (Reuters)", headline(TRUE_WORDS, i)),
            TRUE_CLASS,
        ));
    }
    documents
}

pub fn normalizer() -> Arc<TextNormalizer> {
    Arc::new(TextNormalizer::builtin().unwrap())
}

pub fn train(per_class: usize) -> TrainingOutcome {
    Trainer::new(normalizer(), TrainingConfig::default())
        .train(corpus(per_class))
        .unwrap()
}

pub fn save_model(dir: &Path, artifact: &ModelArtifact) -> std::path::PathBuf {
    let path = dir.join("models").join("fake_news_model.bin");
    artifact.save(&path).unwrap();
    path
}
