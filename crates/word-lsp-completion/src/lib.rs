//! Completion engine for word-lsp.
//!
//! Judges words against queries, ranks candidates across the word sources,
//! decides per keystroke whether to query at all, debounces the queries and
//! computes the text edit for a chosen suggestion.

pub mod debounce;
pub mod matcher;
pub mod predictable;
pub mod query;
pub mod ranking;
pub mod selection;
pub mod trigger;
