//! Client-facing settings.
//!
//! Sent by the client as `initializationOptions` and on
//! `workspace/didChangeConfiguration`. Missing keys take their defaults.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How raw text is split into tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenizeStrategy {
    #[default]
    Default,
    English,
}

impl TokenizeStrategy {
    /// Minimum token length that triggers suggestions when not configured.
    pub fn trigger_threshold(self) -> usize {
        match self {
            TokenizeStrategy::Default => 3,
            TokenizeStrategy::English => 3,
        }
    }
}

/// Matching policy used by the ranking engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    #[default]
    Prefix,
    /// Prefix or substring. Scans every bucket, markedly slower.
    Partial,
}

impl MatchStrategy {
    pub fn toggled(self) -> Self {
        match self {
            MatchStrategy::Prefix => MatchStrategy::Partial,
            MatchStrategy::Partial => MatchStrategy::Prefix,
        }
    }
}

/// Column separator in custom dictionary files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColumnDelimiter {
    #[default]
    Tab,
    Comma,
    Pipe,
}

impl ColumnDelimiter {
    pub fn as_char(self) -> char {
        match self {
            ColumnDelimiter::Tab => '\t',
            ColumnDelimiter::Comma => ',',
            ColumnDelimiter::Pipe => '|',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    // general
    pub strategy: TokenizeStrategy,
    pub match_strategy: MatchStrategy,
    pub max_number_of_suggestions: i64,
    pub max_number_of_words_as_phrase: usize,
    pub min_number_of_characters_triggered: usize,
    pub min_number_of_words_triggered_phrase: usize,
    pub complement_automatically: bool,
    pub delay_milli_seconds: u64,
    pub disable_suggestions_during_ime_on: bool,
    pub insert_after_completion: bool,
    pub first_characters_disable_suggestions: String,

    // current file
    pub enable_current_file_complement: bool,
    pub only_complement_english_on_current_file_complement: bool,

    // custom dictionary
    pub enable_custom_dictionary_complement: bool,
    pub custom_dictionary_paths: Vec<String>,
    pub column_delimiter: ColumnDelimiter,
    pub custom_dictionary_word_regex_pattern: String,
    pub delimiter_to_hide_suggestion: String,
    pub caret_location_symbol_after_complement: String,

    // internal link
    pub enable_internal_link_complement: bool,
    pub suggest_internal_link_with_alias: bool,
    pub exclude_internal_link_path_prefix_patterns: Vec<String>,

    // debug
    pub show_log_about_performance_in_console: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            strategy: TokenizeStrategy::Default,
            match_strategy: MatchStrategy::Prefix,
            max_number_of_suggestions: 5,
            max_number_of_words_as_phrase: 3,
            min_number_of_characters_triggered: 0,
            min_number_of_words_triggered_phrase: 1,
            complement_automatically: true,
            delay_milli_seconds: 0,
            disable_suggestions_during_ime_on: false,
            insert_after_completion: true,
            first_characters_disable_suggestions: ":/^".to_string(),
            enable_current_file_complement: true,
            only_complement_english_on_current_file_complement: false,
            enable_custom_dictionary_complement: false,
            custom_dictionary_paths: vec![],
            column_delimiter: ColumnDelimiter::Tab,
            custom_dictionary_word_regex_pattern: String::new(),
            delimiter_to_hide_suggestion: String::new(),
            caret_location_symbol_after_complement: String::new(),
            enable_internal_link_complement: true,
            suggest_internal_link_with_alias: false,
            exclude_internal_link_path_prefix_patterns: vec![],
            show_log_about_performance_in_console: false,
        }
    }
}

impl Settings {
    /// Effective minimum token length, falling back to the strategy threshold.
    pub fn min_number_triggered(&self) -> usize {
        if self.min_number_of_characters_triggered > 0 {
            self.min_number_of_characters_triggered
        } else {
            self.strategy.trigger_threshold()
        }
    }

    /// Result cap. Non-positive values mean "no results".
    pub fn max_suggestions(&self) -> usize {
        usize::try_from(self.max_number_of_suggestions).unwrap_or(0)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_milli_seconds)
    }

    /// The close is debounced slightly longer than the suggestion query.
    pub fn close_delay(&self) -> Duration {
        Duration::from_millis(self.delay_milli_seconds + 50)
    }

    pub fn hide_delimiter(&self) -> Option<&str> {
        non_empty(&self.delimiter_to_hide_suggestion)
    }

    pub fn caret_symbol(&self) -> Option<&str> {
        non_empty(&self.caret_location_symbol_after_complement)
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
