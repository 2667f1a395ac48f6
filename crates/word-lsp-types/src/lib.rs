//! Shared types for word-lsp.
//!
//! Contains the completion candidate model, per-query records and the
//! client-facing settings used across text, index and completion crates.

pub mod settings;

pub use settings::{ColumnDelimiter, MatchStrategy, Settings, TokenizeStrategy};

use serde::{Deserialize, Serialize};

/// Which word source an index belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    CurrentFile,
    CustomDictionary,
    InternalLink,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [
        SourceKind::CurrentFile,
        SourceKind::CustomDictionary,
        SourceKind::InternalLink,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SourceKind::CurrentFile => "current-file",
            SourceKind::CustomDictionary => "custom-dictionary",
            SourceKind::InternalLink => "internal-link",
        }
    }
}

/// A completion candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    /// Canonical text, both displayed and inserted.
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Alternate strings that also match this word.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// True when the word references another document.
    #[serde(default)]
    pub internal_link: bool,
    /// Set on matched candidates when the match came through an alias.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_alias: Option<String>,
    /// Token position inside a multi-token phrase query. Set on matched candidates only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
}

impl Word {
    pub fn new(value: impl Into<String>) -> Self {
        Word {
            value: value.into(),
            ..Default::default()
        }
    }

    /// A word that links to another document.
    pub fn link(value: impl Into<String>) -> Self {
        Word {
            value: value.into(),
            internal_link: true,
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// First character of the value, the key the word is indexed under.
    pub fn first_char(&self) -> Option<char> {
        self.value.chars().next()
    }

    /// Two words are the same suggestion iff value and link flag agree.
    pub fn same_suggestion(&self, other: &Word) -> bool {
        self.value == other.value && self.internal_link == other.internal_link
    }
}

/// Outcome of testing one word against one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Judgement {
    pub word: Word,
    /// Matched string; `None` when the word does not match.
    pub value: Option<String>,
    /// Whether `value` came from an alias.
    pub alias: bool,
}

impl Judgement {
    pub fn miss(word: Word) -> Self {
        Judgement {
            word,
            value: None,
            alias: false,
        }
    }

    pub fn is_match(&self) -> bool {
        self.value.is_some()
    }
}

/// One token of a phrase query, with its char offset from the first token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryToken {
    pub word: String,
    pub offset: usize,
}

impl QueryToken {
    pub fn new(word: impl Into<String>, offset: usize) -> Self {
        QueryToken {
            word: word.into(),
            offset,
        }
    }
}

/// Line/char position in the editor. `ch` counts chars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EditorPosition {
    pub line: u32,
    pub ch: u32,
}

impl EditorPosition {
    pub fn new(line: u32, ch: u32) -> Self {
        EditorPosition { line, ch }
    }
}
