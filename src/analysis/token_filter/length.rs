//! Minimum length filter implementation.

use super::Filter;

use crate::analysis::token::{Token, TokenStream};
use crate::error::Result;

/// Removes tokens whose character count is less than or equal to `min_length`.
#[derive(Clone, Debug)]
pub struct MinLengthFilter {
    min_length: usize,
}

impl MinLengthFilter {
    /// Create a filter keeping only tokens strictly longer than `min_length`.
    pub fn new(min_length: usize) -> Self {
        MinLengthFilter { min_length }
    }

    /// Get the exclusive minimum length.
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Whether a word of this text would survive the filter.
    pub fn accepts(&self, text: &str) -> bool {
        text.chars().count() > self.min_length
    }
}

impl Filter for MinLengthFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let kept: Vec<Token> = tokens
            .filter(|token| token.is_stopped() || self.accepts(&token.text))
            .collect();
        Ok(Box::new(kept.into_iter()))
    }

    fn name(&self) -> &'static str {
        "min_length"
    }
}
