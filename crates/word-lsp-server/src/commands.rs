//! workspace/executeCommand names and argument decoding.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tower_lsp::jsonrpc::{Error, Result};
use tower_lsp::ls_types::Position;

/// Make the next completion request bypass the automatic-trigger checks.
pub const TRIGGER_MANUALLY: &str = "wordLsp.triggerManually";
/// `[bool]`: whether an IME composition is in progress.
pub const SET_IME_STATE: &str = "wordLsp.setImeState";
/// Attached to every completion item; the client runs it after insertion.
pub const SUGGESTION_SELECTED: &str = "wordLsp.suggestionSelected";
/// `[{uri, position}]`: complete the token at `position` from nearby text.
pub const PREDICTABLE_COMPLETE: &str = "wordLsp.predictableComplete";
/// Rebuild every word index.
pub const REFRESH_INDEXES: &str = "wordLsp.refreshIndexes";
/// Switch between prefix and partial matching. Returns the new strategy.
pub const TOGGLE_MATCH_STRATEGY: &str = "wordLsp.toggleMatchStrategy";

pub const ALL: [&str; 6] = [
    TRIGGER_MANUALLY,
    SET_IME_STATE,
    SUGGESTION_SELECTED,
    PREDICTABLE_COMPLETE,
    REFRESH_INDEXES,
    TOGGLE_MATCH_STRATEGY,
];

#[derive(Debug, Deserialize)]
pub struct PredictableCompleteArgs {
    pub uri: String,
    pub position: Position,
}

/// Decode the first command argument.
pub fn first_arg<T: DeserializeOwned>(command: &str, arguments: &[serde_json::Value]) -> Result<T> {
    let value = arguments
        .first()
        .cloned()
        .ok_or_else(|| Error::invalid_params(format!("{} expects an argument", command)))?;
    serde_json::from_value(value)
        .map_err(|e| Error::invalid_params(format!("Invalid argument for {}: {}", command, e)))
}
