//! Word completion language server.
//!
//! Suggests words from the open document, custom dictionaries and the notes
//! of the workspace while the user types.

pub mod commands;
pub mod server;

pub use server::WordLspBackend;
