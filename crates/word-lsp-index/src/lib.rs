//! Word indexes for word-lsp.
//!
//! One first-letter index per word source, a store that swaps whole
//! indexes atomically, and the providers that build them from the active
//! document, custom dictionary files and workspace notes.

pub mod current_file;
pub mod custom_dictionary;
pub mod internal_link;
pub mod word_index;

pub use word_index::{IndexedWords, WordIndex, WordIndexStore};
