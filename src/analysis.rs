//! Text analysis building blocks for Verity.
//!
//! Raw news text flows through char filters (whole-string rewrites), a
//! tokenizer, and a chain of token filters. [`analyzer::PipelineAnalyzer`]
//! wires the stages together; [`crate::normalize::TextNormalizer`] builds the
//! concrete pipeline used for classification.

pub mod analyzer;
pub mod char_filter;
pub mod token;
pub mod token_filter;
pub mod tokenizer;
