//! Sub-word tokenization.
//!
//! Thin wrapper around the HuggingFace [tokenizers] crate, plus the
//! normalization helpers that turn raw sub-word sequences back into
//! whitespace-approximate text.
pub mod bert;

pub use bert::{normalized_text, strip_boundaries, BertWordPiece};
