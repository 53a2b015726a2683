//! Linguistic resources used by the text normalizer.
//!
//! Resources are resolved once, when the normalizer is built. A missing
//! stopword list degrades to an empty set and a missing lemma table degrades
//! to the identity lemmatizer; neither is an error.
//!
//! On disk, a resource directory looks like this:
//!
//! ```text
//! <dir>/stopwords/english   one stop word per line
//! <dir>/lemmas/noun.exc     WordNet exception list ("inflected base")
//! ```

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::analysis::token_filter::lemma::{Lemmatizer, NounLemmatizer};
use crate::analysis::token_filter::stop::DEFAULT_ENGLISH_STOP_WORDS_SET;

/// Relative location of the stop word list inside a resource directory.
pub const STOPWORDS_FILE: &str = "stopwords/english";

/// Relative location of the noun exception list inside a resource directory.
pub const LEMMA_EXCEPTIONS_FILE: &str = "lemmas/noun.exc";

/// Which parts of the linguistic pipeline are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationStrategy {
    /// Stop word removal and lemmatization are both available.
    Linguistic,
    /// Exactly one of the two resources is available.
    Partial,
    /// Only the ASCII cleaning and length filter run.
    AsciiOnly,
}

impl NormalizationStrategy {
    /// Derive the strategy from resource availability.
    pub fn resolve(has_stopwords: bool, has_lemmatizer: bool) -> Self {
        match (has_stopwords, has_lemmatizer) {
            (true, true) => NormalizationStrategy::Linguistic,
            (false, false) => NormalizationStrategy::AsciiOnly,
            _ => NormalizationStrategy::Partial,
        }
    }
}

impl fmt::Display for NormalizationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NormalizationStrategy::Linguistic => "linguistic",
            NormalizationStrategy::Partial => "partial",
            NormalizationStrategy::AsciiOnly => "ascii_only",
        };
        f.write_str(name)
    }
}

/// Stop words and lemmatizer handed to a [`TextNormalizer`](super::TextNormalizer).
#[derive(Clone, Default)]
pub struct LinguisticResources {
    stop_words: Option<HashSet<String>>,
    lemmatizer: Option<Arc<dyn Lemmatizer>>,
}

impl LinguisticResources {
    /// The compiled-in English stop word list and noun lemmatizer.
    pub fn builtin() -> Self {
        LinguisticResources {
            stop_words: Some(DEFAULT_ENGLISH_STOP_WORDS_SET.clone()),
            lemmatizer: Some(Arc::new(NounLemmatizer::new())),
        }
    }

    /// No resources at all.
    pub fn none() -> Self {
        Self::default()
    }

    /// Load resources from a directory, degrading for each missing file.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();

        let stop_words = match fs::read_to_string(dir.join(STOPWORDS_FILE)) {
            Ok(content) => {
                let words: HashSet<String> = content
                    .lines()
                    .map(|line| line.trim().to_lowercase())
                    .filter(|line| !line.is_empty())
                    .collect();
                debug!("Loaded {} stop words from {}", words.len(), dir.display());
                Some(words)
            }
            Err(e) => {
                warn!(
                    "Stop word list unavailable under {} ({}); stop word removal disabled",
                    dir.display(),
                    e
                );
                None
            }
        };

        let lemmatizer: Option<Arc<dyn Lemmatizer>> =
            match fs::read_to_string(dir.join(LEMMA_EXCEPTIONS_FILE)) {
                Ok(content) => {
                    let exceptions = NounLemmatizer::parse_exceptions(&content);
                    debug!(
                        "Loaded {} lemma exceptions from {}",
                        exceptions.len(),
                        dir.display()
                    );
                    Some(Arc::new(NounLemmatizer::with_exceptions(exceptions)))
                }
                Err(e) => {
                    warn!(
                        "Lemma table unavailable under {} ({}); lemmatization disabled",
                        dir.display(),
                        e
                    );
                    None
                }
            };

        LinguisticResources {
            stop_words,
            lemmatizer,
        }
    }

    /// Replace the stop word set.
    pub fn with_stop_words(mut self, stop_words: HashSet<String>) -> Self {
        self.stop_words = Some(stop_words);
        self
    }

    /// Replace the lemmatizer.
    pub fn with_lemmatizer(mut self, lemmatizer: Arc<dyn Lemmatizer>) -> Self {
        self.lemmatizer = Some(lemmatizer);
        self
    }

    /// Drop the stop word set.
    pub fn without_stop_words(mut self) -> Self {
        self.stop_words = None;
        self
    }

    /// Drop the lemmatizer.
    pub fn without_lemmatizer(mut self) -> Self {
        self.lemmatizer = None;
        self
    }

    pub fn has_stopwords(&self) -> bool {
        self.stop_words.is_some()
    }

    pub fn has_lemmatizer(&self) -> bool {
        self.lemmatizer.is_some()
    }

    /// The strategy these resources support.
    pub fn strategy(&self) -> NormalizationStrategy {
        NormalizationStrategy::resolve(self.has_stopwords(), self.has_lemmatizer())
    }

    pub(crate) fn into_parts(self) -> (Option<HashSet<String>>, Option<Arc<dyn Lemmatizer>>) {
        (self.stop_words, self.lemmatizer)
    }
}

impl fmt::Debug for LinguisticResources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinguisticResources")
            .field("stop_words", &self.stop_words.as_ref().map(HashSet::len))
            .field("lemmatizer", &self.lemmatizer.as_ref().map(|l| l.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_strategy_resolution() {
        assert_eq!(
            LinguisticResources::builtin().strategy(),
            NormalizationStrategy::Linguistic
        );
        assert_eq!(
            LinguisticResources::none().strategy(),
            NormalizationStrategy::AsciiOnly
        );
        assert_eq!(
            LinguisticResources::builtin().without_lemmatizer().strategy(),
            NormalizationStrategy::Partial
        );
        assert_eq!(
            LinguisticResources::builtin().without_stop_words().strategy(),
            NormalizationStrategy::Partial
        );
    }

    #[test]
    fn test_from_dir_with_both_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("stopwords")).unwrap();
        fs::create_dir_all(dir.path().join("lemmas")).unwrap();
        fs::write(dir.path().join(STOPWORDS_FILE), "the\nAnd\n\n").unwrap();
        fs::write(dir.path().join(LEMMA_EXCEPTIONS_FILE), "geese goose\n").unwrap();

        let resources = LinguisticResources::from_dir(dir.path());
        assert_eq!(resources.strategy(), NormalizationStrategy::Linguistic);

        let (stop_words, lemmatizer) = resources.into_parts();
        let stop_words = stop_words.unwrap();
        assert_eq!(stop_words.len(), 2);
        assert!(stop_words.contains("and"));
        assert_eq!(lemmatizer.unwrap().lemmatize("geese"), "goose");
    }

    #[test]
    fn test_from_dir_degrades_when_missing() {
        let dir = TempDir::new().unwrap();
        let resources = LinguisticResources::from_dir(dir.path());

        assert!(!resources.has_stopwords());
        assert!(!resources.has_lemmatizer());
        assert_eq!(resources.strategy(), NormalizationStrategy::AsciiOnly);
    }

    #[test]
    fn test_strategy_display() {
        assert_eq!(NormalizationStrategy::AsciiOnly.to_string(), "ascii_only");
        assert_eq!(NormalizationStrategy::Linguistic.to_string(), "linguistic");
    }
}
