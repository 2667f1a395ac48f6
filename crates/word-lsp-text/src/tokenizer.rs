//! Tokenizer strategies.
//!
//! A tokenizer splits text on its trim characters. Offsets and lengths are
//! counted in chars, matching `EditorPosition::ch`.

use std::sync::Arc;
use word_lsp_types::{QueryToken, TokenizeStrategy};

/// Characters that separate tokens for the default strategy.
const DEFAULT_TRIM_CHARS: &[char] = &[
    '[', ']', '$', '/', ':', '?', '!', '=', '(', ')', '<', '>', '"', '\'', '.', ',', '|', ';',
    '*', '~', '`',
];

pub trait Tokenizer: Send + Sync {
    /// The trim pattern: true for chars that never belong to a token.
    fn is_trim_char(&self, c: char) -> bool;

    fn trigger_threshold(&self) -> usize;

    /// Split `text` into tokens.
    ///
    /// With `raw`, a text that ends on a trim char yields a trailing empty
    /// token, so callers can tell the cursor sits right after a separator.
    fn tokenize(&self, text: &str, raw: bool) -> Vec<String> {
        let mut tokens: Vec<String> = text
            .split(|c: char| self.is_trim_char(c))
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .collect();
        if raw && text.chars().last().is_some_and(|c| self.is_trim_char(c)) {
            tokens.push(String::new());
        }
        tokens
    }

    /// The whole text at offset 0, then every suffix starting right after a
    /// trim char. The last element is the innermost token at the end of `text`.
    fn recursive_tokenize(&self, text: &str) -> Vec<QueryToken> {
        let mut tokens = vec![QueryToken::new(text, 0)];
        for (char_idx, (byte_idx, c)) in text.char_indices().enumerate() {
            if self.is_trim_char(c) {
                let rest = &text[byte_idx + c.len_utf8()..];
                tokens.push(QueryToken::new(rest, char_idx + 1));
            }
        }
        tokens
    }

    /// Tokens that never trigger or get indexed (pure numbers).
    fn should_ignore(&self, token: &str) -> bool {
        !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
    }
}

/// Splits on whitespace and common punctuation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTokenizer;

impl Tokenizer for DefaultTokenizer {
    fn is_trim_char(&self, c: char) -> bool {
        c.is_whitespace() || DEFAULT_TRIM_CHARS.contains(&c)
    }

    fn trigger_threshold(&self) -> usize {
        TokenizeStrategy::Default.trigger_threshold()
    }
}

/// Keeps only `[A-Za-z0-9_-]` runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishTokenizer;

impl Tokenizer for EnglishTokenizer {
    fn is_trim_char(&self, c: char) -> bool {
        !(c.is_ascii_alphanumeric() || c == '_' || c == '-')
    }

    fn trigger_threshold(&self) -> usize {
        TokenizeStrategy::English.trigger_threshold()
    }
}

pub fn create_tokenizer(strategy: TokenizeStrategy) -> Arc<dyn Tokenizer> {
    tracing::debug!("Creating tokenizer: {:?}", strategy);
    match strategy {
        TokenizeStrategy::Default => Arc::new(DefaultTokenizer),
        TokenizeStrategy::English => Arc::new(EnglishTokenizer),
    }
}
