//! Text handling for word-lsp.
//!
//! Tokenizer strategies that split editor text into candidate tokens,
//! and the rope-backed document buffer kept for every open file.

pub mod document;
pub mod tokenizer;

pub use document::Document;
pub use tokenizer::{create_tokenizer, DefaultTokenizer, EnglishTokenizer, Tokenizer};
