//! Token filter implementations for token transformation.
//!
//! # Available Filters
//!
//! - [`stop::StopFilter`] - Removes stop words
//! - [`length::MinLengthFilter`] - Removes tokens that are too short
//! - [`lemma::LemmaFilter`] - Reduces words to their dictionary base form
//!
//! # Filter Chaining
//!
//! ```text
//! Tokenizer → Stop Words → Min Length → Lemmatizer → Joined text
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for filters that transform token streams.
pub trait Filter: Send + Sync {
    /// Apply this filter to a token stream.
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Get the name of this filter (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod lemma;
pub mod length;
pub mod stop;

pub use lemma::{IdentityLemmatizer, LemmaFilter, Lemmatizer, NounLemmatizer};
pub use length::MinLengthFilter;
pub use stop::StopFilter;
