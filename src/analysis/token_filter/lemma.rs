//! Lemmatizing token filter and lemmatizer implementations.

use std::collections::HashSet;
use std::sync::Arc;

use super::Filter;
use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for lemmatization algorithms.
pub trait Lemmatizer: Send + Sync {
    /// Reduce a word to its dictionary base form.
    fn lemmatize(&self, word: &str) -> String;

    /// Get the name of this lemmatizer.
    fn name(&self) -> &'static str;
}

pub mod identity;
pub mod noun;

pub use identity::IdentityLemmatizer;
pub use noun::NounLemmatizer;

/// Words a lemma must not collapse into.
#[derive(Clone, Debug)]
struct Retention {
    stop_words: Arc<HashSet<String>>,
    min_length: usize,
}

impl Retention {
    fn keeps(&self, lemma: &str) -> bool {
        lemma.chars().count() > self.min_length && !self.stop_words.contains(lemma)
    }
}

/// Filter that replaces every token with its lemma.
pub struct LemmaFilter {
    lemmatizer: Arc<dyn Lemmatizer>,
    retention: Option<Retention>,
}

impl std::fmt::Debug for LemmaFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LemmaFilter")
            .field("lemmatizer", &self.lemmatizer.name())
            .field("retention", &self.retention.is_some())
            .finish()
    }
}

impl LemmaFilter {
    /// Create a lemma filter with the given lemmatizer.
    pub fn new(lemmatizer: Arc<dyn Lemmatizer>) -> Self {
        LemmaFilter {
            lemmatizer,
            retention: None,
        }
    }

    /// Keep the surface form whenever the lemma would be a stop word or no
    /// longer than `min_length`.
    ///
    /// Without this, a later pass over already-normalized text could drop
    /// tokens that the first pass produced.
    pub fn with_retention(mut self, stop_words: Arc<HashSet<String>>, min_length: usize) -> Self {
        self.retention = Some(Retention {
            stop_words,
            min_length,
        });
        self
    }

    /// Name of the wrapped lemmatizer.
    pub fn lemmatizer_name(&self) -> &'static str {
        self.lemmatizer.name()
    }
}

impl Default for LemmaFilter {
    fn default() -> Self {
        Self::new(Arc::new(NounLemmatizer::new()))
    }
}

impl Filter for LemmaFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered_tokens = tokens
            .map(|token| {
                if token.is_stopped() {
                    return token;
                }
                let lemma = self.lemmatizer.lemmatize(&token.text);
                match &self.retention {
                    Some(retention) if !retention.keeps(&lemma) => token,
                    _ => token.with_text(lemma),
                }
            })
            .collect::<Vec<_>>();

        Ok(Box::new(filtered_tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "lemma"
    }
}
