//! Text normalization shared by training and serving.
//!
//! [`TextNormalizer`] turns raw news text into the space-joined token form the
//! vectorizer was fitted on. It is a fixed [`PipelineAnalyzer`]:
//!
//! ```text
//! lowercase → strip [brackets] → strip URLs → strip <tags> → non-letters to spaces
//!   → whitespace tokens → stop words → min length → noun lemmas → join
//! ```
//!
//! # Examples
//!
//! ```
//! use verity::normalize::TextNormalizer;
//!
//! let normalizer = TextNormalizer::builtin().unwrap();
//! let text = normalizer.normalize(Some("The Senate passed 3 new bills! <b>Read</b> https://x.co")).unwrap();
//! assert_eq!(text, "senate passed new bill read");
//! ```

use std::sync::Arc;

use log::{debug, warn};
use rayon::prelude::*;

use crate::analysis::analyzer::{Analyzer, PipelineAnalyzer};
use crate::analysis::char_filter::{LowercaseCharFilter, PatternReplaceCharFilter};
use crate::analysis::token::Token;
use crate::analysis::token_filter::{
    IdentityLemmatizer, LemmaFilter, Lemmatizer, MinLengthFilter, StopFilter,
};
use crate::analysis::tokenizer::WhitespaceTokenizer;
use crate::error::{Result, VerityError};

pub mod resources;

pub use resources::{LinguisticResources, NormalizationStrategy};

/// Tokens must be strictly longer than this many characters.
pub const DEFAULT_MIN_WORD_LENGTH: usize = 2;

/// Bracketed annotations such as `[citation needed]`.
const BRACKET_PATTERN: &str = r"\[.*?\]";
/// Web links.
const URL_PATTERN: &str = r"https?://\S+|www\.\S+";
/// HTML-like tags.
const TAG_PATTERN: &str = r"<.*?>+";
/// Anything that is not an ASCII letter.
const NON_LETTER_PATTERN: &str = r"[^a-zA-Z]";

/// Deterministic text cleaner.
///
/// Resources are resolved once in [`TextNormalizer::new`]; the resulting
/// [`NormalizationStrategy`] never changes afterwards.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    analyzer: PipelineAnalyzer,
    strategy: NormalizationStrategy,
    has_stopwords: bool,
    has_lemmatizer: bool,
    min_word_length: usize,
}

impl TextNormalizer {
    /// Build a normalizer from the given resources.
    pub fn new(resources: LinguisticResources, min_word_length: usize) -> Result<Self> {
        if min_word_length == 0 {
            return Err(VerityError::invalid_config(
                "min_word_length must be at least 1",
            ));
        }

        let strategy = resources.strategy();
        let has_stopwords = resources.has_stopwords();
        let has_lemmatizer = resources.has_lemmatizer();
        match strategy {
            NormalizationStrategy::Linguistic => {}
            NormalizationStrategy::Partial => warn!(
                "Normalizer running with partial linguistic resources (stopwords: {}, lemmatizer: {})",
                has_stopwords, has_lemmatizer
            ),
            NormalizationStrategy::AsciiOnly => {
                warn!("Normalizer running without stop words or lemmatizer")
            }
        }

        let (stop_words, lemmatizer) = resources.into_parts();
        let stop_filter = match stop_words {
            Some(words) => StopFilter::with_stop_words(words),
            None => StopFilter::empty(),
        };
        let lemmatizer: Arc<dyn Lemmatizer> =
            lemmatizer.unwrap_or_else(|| Arc::new(IdentityLemmatizer::new()));
        let lemma_filter =
            LemmaFilter::new(lemmatizer).with_retention(stop_filter.stop_words(), min_word_length);

        let analyzer = PipelineAnalyzer::new(Arc::new(WhitespaceTokenizer::new()))
            .add_char_filter(Arc::new(LowercaseCharFilter::new()))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::new(BRACKET_PATTERN, "")?))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::new(URL_PATTERN, "")?))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::new(TAG_PATTERN, "")?))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::new(
                NON_LETTER_PATTERN,
                " ",
            )?))
            .add_filter(Arc::new(stop_filter))
            .add_filter(Arc::new(MinLengthFilter::new(min_word_length)))
            .add_filter(Arc::new(lemma_filter))
            .with_name(format!("normalizer_{strategy}"));

        debug!("Built text normalizer: {analyzer:?}");

        Ok(TextNormalizer {
            analyzer,
            strategy,
            has_stopwords,
            has_lemmatizer,
            min_word_length,
        })
    }

    /// Normalizer with the compiled-in resources and default word length.
    pub fn builtin() -> Result<Self> {
        Self::new(LinguisticResources::builtin(), DEFAULT_MIN_WORD_LENGTH)
    }

    /// Normalize raw text.
    ///
    /// `None` is rejected; every string, including the empty one, succeeds and
    /// may produce an empty result.
    pub fn normalize(&self, text: Option<&str>) -> Result<String> {
        let text = text.ok_or_else(|| VerityError::input("Text cannot be None"))?;
        Ok(self.clean(text))
    }

    /// Normalize a string that is known to be present.
    pub fn clean(&self, text: &str) -> String {
        match self.analyzer.analyze(text) {
            Ok(tokens) => join_tokens(tokens),
            Err(e) => {
                // None of the configured filters fail
                warn!("Analysis failed, treating text as empty: {e}");
                String::new()
            }
        }
    }

    /// Normalize many strings in parallel, preserving order.
    pub fn normalize_batch(&self, texts: &[Option<&str>]) -> Vec<Result<String>> {
        texts.par_iter().map(|text| self.normalize(*text)).collect()
    }

    /// The strategy resolved at construction.
    pub fn strategy(&self) -> NormalizationStrategy {
        self.strategy
    }

    /// Whether stop words are removed.
    pub fn has_stopwords(&self) -> bool {
        self.has_stopwords
    }

    /// Whether tokens are lemmatized.
    pub fn has_lemmatizer(&self) -> bool {
        self.has_lemmatizer
    }

    pub fn min_word_length(&self) -> usize {
        self.min_word_length
    }

    /// The underlying analysis pipeline.
    pub fn analyzer(&self) -> &PipelineAnalyzer {
        &self.analyzer
    }
}

fn join_tokens(tokens: impl Iterator<Item = Token>) -> String {
    let mut joined = String::new();
    for token in tokens {
        if !joined.is_empty() {
            joined.push(' ');
        }
        joined.push_str(&token.text);
    }
    joined
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> TextNormalizer {
        TextNormalizer::builtin().unwrap()
    }

    #[test]
    fn test_full_pipeline() {
        let normalizer = normalizer();
        let text = "BREAKING: The [Reuters] senators' votes <p>were</p> counted at \
                    https://example.com/story and www.example.org today!!";

        assert_eq!(
            normalizer.normalize(Some(text)).unwrap(),
            "breaking senator vote counted today"
        );
    }

    #[test]
    fn test_none_is_an_input_error() {
        let result = normalizer().normalize(None);
        assert!(matches!(result, Err(VerityError::Input(_))));
    }

    #[test]
    fn test_inputs_without_letters_become_empty() {
        let normalizer = normalizer();
        for text in ["", "   ", "12345", "!!! ??? ...", "3.14 + 2.71 = 5.85", "\t\n"] {
            assert_eq!(normalizer.normalize(Some(text)).unwrap(), "", "{text:?}");
        }
    }

    #[test]
    fn test_only_stop_words_become_empty() {
        assert_eq!(normalizer().clean("the a an of to"), "");
    }

    #[test]
    fn test_short_words_are_dropped() {
        assert_eq!(normalizer().clean("us ok go war"), "war");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let normalizer = normalizer();
        let texts = [
            "Scientists say the crises were caused by viruses and gases.",
            "Women and children left their houses; the buses stopped.",
            "SHOCKING!!! You won't BELIEVE what these celebrities did [video]",
            "The analyses of indices shows ares, ties and lies everywhere",
            "Wolves, leaves, knives: classes of boxes and churches",
            "Womens March draws crowds",
            "Childrens hospital funding",
            "Mens health",
        ];

        for text in texts {
            let once = normalizer.clean(text);
            let twice = normalizer.clean(&once);
            assert_eq!(once, twice, "not idempotent for {text:?}");
        }
    }

    #[test]
    fn test_plurals_of_irregular_plurals() {
        let normalizer = normalizer();

        assert_eq!(
            normalizer.clean("Womens March draws crowds"),
            "woman march draw crowd"
        );
        assert_eq!(
            normalizer.clean("Childrens hospital funding"),
            "child hospital funding"
        );
        assert_eq!(normalizer.clean("Mens health"), "man health");
    }

    #[test]
    fn test_generated_text_is_idempotent() {
        let normalizer = normalizer();
        let stems = [
            "men", "women", "children", "mice", "lice", "geese", "feet", "lives", "crises",
            "vote", "story", "church", "class", "bus", "gas", "news", "ox", "tie", "are", "the",
            "senate", "policy", "analysis", "index", "wolf", "quiz",
        ];
        let suffixes = ["", "s", "es", "ies", "ses", "xes", "'s", "-"];

        let words: Vec<String> = stems
            .iter()
            .flat_map(|stem| suffixes.iter().map(move |suffix| format!("{stem}{suffix}")))
            .collect();

        for chunk in words.chunks(5) {
            let text = chunk.join(" ").to_uppercase();
            let once = normalizer.clean(&text);
            let twice = normalizer.clean(&once);
            assert_eq!(once, twice, "not idempotent for {text:?}");
        }
    }

    #[test]
    fn test_output_tokens_are_lowercase_letters() {
        let normalizer = normalizer();
        let output = normalizer.clean("Ünïcödé façade, naïve café: résumé 2024 ÀÉÎ");

        for token in output.split(' ').filter(|t| !t.is_empty()) {
            assert!(token.bytes().all(|b| b.is_ascii_lowercase()), "{token}");
            assert!(token.len() > DEFAULT_MIN_WORD_LENGTH);
        }
    }

    #[test]
    fn test_ascii_only_strategy() {
        let normalizer = TextNormalizer::new(LinguisticResources::none(), 2).unwrap();

        assert_eq!(normalizer.strategy(), NormalizationStrategy::AsciiOnly);
        assert!(!normalizer.has_stopwords());
        assert!(!normalizer.has_lemmatizer());
        assert_eq!(normalizer.clean("The stories are true"), "the stories are true");
    }

    #[test]
    fn test_partial_strategy() {
        let resources = LinguisticResources::builtin().without_lemmatizer();
        let normalizer = TextNormalizer::new(resources, 2).unwrap();

        assert_eq!(normalizer.strategy(), NormalizationStrategy::Partial);
        assert!(normalizer.has_stopwords());
        assert!(!normalizer.has_lemmatizer());
        assert_eq!(normalizer.clean("The stories are true"), "stories true");
    }

    #[test]
    fn test_custom_min_word_length() {
        let normalizer = TextNormalizer::new(LinguisticResources::builtin(), 4).unwrap();
        assert_eq!(normalizer.min_word_length(), 4);
        // "vote" would be too short, so the surface form stays
        assert_eq!(normalizer.clean("bill senate votes"), "senate votes");
    }

    #[test]
    fn test_zero_min_word_length_is_rejected() {
        let result = TextNormalizer::new(LinguisticResources::builtin(), 0);
        assert!(matches!(result, Err(VerityError::InvalidConfig(_))));
    }

    #[test]
    fn test_normalize_batch_preserves_order() {
        let normalizer = normalizer();
        let results = normalizer.normalize_batch(&[Some("senate votes"), None, Some("123")]);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap(), "senate vote");
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap(), "");
    }
}
