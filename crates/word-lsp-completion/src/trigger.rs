//! Per-keystroke trigger decision.
//!
//! `decide` is pure: it looks at the line up to the cursor and the session
//! flags and either suppresses suggestions or produces the phrase query.
//! `SuggestSession` owns the flags and clears the single-shot manual flag
//! after every evaluation.

use word_lsp_text::Tokenizer;
use word_lsp_types::{EditorPosition, QueryToken, Settings};

/// Why a keystroke did not produce a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    AutoCompleteOff,
    ImeActive,
    FrontMatterOrRule,
    CodeFence,
    NoCurrentToken,
    ConflictingCommand,
    TrimCharacter,
    TooShort,
    Ignored,
}

impl SuppressReason {
    pub fn describe(self) -> &'static str {
        match self {
            SuppressReason::AutoCompleteOff => "automatic completion is off",
            SuppressReason::ImeActive => "IME composition is active",
            SuppressReason::FrontMatterOrRule => "line supposes front matter or a horizontal rule",
            SuppressReason::CodeFence => "line supposes a fenced code block",
            SuppressReason::NoCurrentToken => "current token is empty",
            SuppressReason::ConflictingCommand => "last fragment starts with a command character",
            SuppressReason::TrimCharacter => "current token is a trim character",
            SuppressReason::TooShort => "current token is shorter than the trigger threshold",
            SuppressReason::Ignored => "current token should be ignored",
        }
    }
}

/// An accepted trigger: the range to replace and the serialized phrase query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerInfo {
    /// Start of the innermost token at the cursor.
    pub start: EditorPosition,
    pub end: EditorPosition,
    /// JSON list of `QueryToken`s, offsets relative to the first one.
    pub query: String,
    /// Char column where the first token of the phrase window starts.
    pub context_start_ch: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    Active(TriggerInfo),
    Suppressed(SuppressReason),
}

impl TriggerOutcome {
    pub fn info(&self) -> Option<&TriggerInfo> {
        match self {
            TriggerOutcome::Active(info) => Some(info),
            TriggerOutcome::Suppressed(_) => None,
        }
    }
}

/// Session flags consulted by the decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriggerFlags {
    pub run_manually: bool,
    pub is_open: bool,
    pub ime_active: bool,
}

/// Decide whether the edit at `cursor` should query, and with what.
pub fn decide(
    flags: TriggerFlags,
    cursor: EditorPosition,
    line_until_cursor: &str,
    settings: &Settings,
    tokenizer: &dyn Tokenizer,
) -> TriggerOutcome {
    use TriggerOutcome::Suppressed;

    let manual = flags.run_manually;
    if !settings.complement_automatically && !flags.is_open && !manual {
        return Suppressed(SuppressReason::AutoCompleteOff);
    }
    if settings.disable_suggestions_during_ime_on && flags.ime_active && !manual {
        return Suppressed(SuppressReason::ImeActive);
    }

    let line = line_until_cursor;
    if line.starts_with("---") {
        return Suppressed(SuppressReason::FrontMatterOrRule);
    }
    if line.starts_with("~~~") || line.starts_with("```") {
        return Suppressed(SuppressReason::CodeFence);
    }

    let tokenized = tokenizer.recursive_tokenize(line);
    let window_start = tokenized
        .len()
        .saturating_sub(settings.max_number_of_words_as_phrase);
    let current_tokens = &tokenized[window_start..];

    let Some(first) = current_tokens.first().filter(|t| !t.word.is_empty()) else {
        return Suppressed(SuppressReason::NoCurrentToken);
    };
    let current_token = first.word.as_str();

    let last_fragment = line.split(' ').last().unwrap_or_default();
    if last_fragment
        .chars()
        .next()
        .is_some_and(|c| settings.first_characters_disable_suggestions.contains(c))
    {
        return Suppressed(SuppressReason::ConflictingCommand);
    }

    let token_len = current_token.chars().count();
    if token_len == 1 && current_token.chars().all(|c| tokenizer.is_trim_char(c)) {
        return Suppressed(SuppressReason::TrimCharacter);
    }

    if !manual {
        if token_len < settings.min_number_triggered() {
            return Suppressed(SuppressReason::TooShort);
        }
        if tokenizer.should_ignore(current_token) {
            return Suppressed(SuppressReason::Ignored);
        }
    }

    let base = first.offset;
    let tokens: Vec<QueryToken> = current_tokens
        .iter()
        .map(|t| QueryToken::new(t.word.clone(), t.offset - base))
        .collect();
    let innermost_len = tokenized
        .last()
        .map(|t| t.word.chars().count())
        .unwrap_or(0);

    TriggerOutcome::Active(TriggerInfo {
        start: EditorPosition::new(cursor.line, cursor.ch.saturating_sub(innermost_len as u32)),
        end: cursor,
        query: serde_json::to_string(&tokens).unwrap_or_default(),
        context_start_ch: cursor.ch.saturating_sub(token_len as u32),
    })
}

/// Mutable per-editor suggestion state.
#[derive(Debug, Default)]
pub struct SuggestSession {
    flags: TriggerFlags,
    context: Option<TriggerInfo>,
}

impl SuggestSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next evaluation a manual invocation. Single shot.
    pub fn arm_manual(&mut self) {
        self.flags.run_manually = true;
    }

    pub fn set_ime_active(&mut self, active: bool) {
        self.flags.ime_active = active;
    }

    pub fn set_open(&mut self, open: bool) {
        self.flags.is_open = open;
    }

    pub fn is_open(&self) -> bool {
        self.flags.is_open
    }

    pub fn flags(&self) -> TriggerFlags {
        self.flags
    }

    /// Context of the last accepted trigger.
    pub fn context(&self) -> Option<&TriggerInfo> {
        self.context.as_ref()
    }

    pub fn on_trigger(
        &mut self,
        cursor: EditorPosition,
        line_until_cursor: &str,
        settings: &Settings,
        tokenizer: &dyn Tokenizer,
    ) -> TriggerOutcome {
        let outcome = decide(self.flags, cursor, line_until_cursor, settings, tokenizer);
        self.flags.run_manually = false;

        match &outcome {
            TriggerOutcome::Active(info) => {
                tracing::debug!("[onTrigger] query is {}", info.query);
                self.context = Some(info.clone());
            }
            TriggerOutcome::Suppressed(reason) => {
                tracing::debug!("Don't show suggestions: {}", reason.describe());
            }
        }
        outcome
    }
}
