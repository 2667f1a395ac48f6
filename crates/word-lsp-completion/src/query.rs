//! Phrase query handling.
//!
//! A trigger serializes the tokens of its phrase window; this module turns
//! them back into candidates, one ranking pass per eligible token.

use crate::ranking::{suggest, uniq_words};
use word_lsp_index::IndexedWords;
use word_lsp_text::Tokenizer;
use word_lsp_types::{QueryToken, Settings, Word};

/// Parse a serialized phrase query. Anything malformed is an empty query.
pub fn parse_query(query: &str) -> Vec<QueryToken> {
    match serde_json::from_str(query) {
        Ok(tokens) => tokens,
        Err(e) => {
            tracing::debug!("Ignoring malformed query {:?}: {}", query, e);
            vec![]
        }
    }
}

/// Tokens that get their own ranking pass.
///
/// The last `min_number_of_words_triggered_phrase - 1` tokens are too short a
/// phrase to look up; the remaining filters mirror the trigger's checks.
fn is_eligible(
    index: usize,
    token: &QueryToken,
    token_count: usize,
    settings: &Settings,
    tokenizer: &dyn Tokenizer,
) -> bool {
    settings.min_number_of_words_triggered_phrase + index < token_count + 1
        && token.word.chars().count() >= settings.min_number_triggered()
        && !tokenizer.should_ignore(&token.word)
        && !token.word.ends_with(char::is_whitespace)
}

/// Candidates for every eligible token, each tagged with its token's offset,
/// deduplicated and capped.
pub fn collect_phrase_suggestions(
    indexed: &IndexedWords,
    tokens: &[QueryToken],
    settings: &Settings,
    tokenizer: &dyn Tokenizer,
) -> Vec<Word> {
    let max = settings.max_suggestions();
    if max == 0 {
        return vec![];
    }

    let words: Vec<Word> = tokens
        .iter()
        .enumerate()
        .filter(|(i, token)| is_eligible(*i, token, tokens.len(), settings, tokenizer))
        .flat_map(|(_, token)| {
            suggest(settings.match_strategy, indexed, &token.word, max)
                .into_iter()
                .map(move |mut word| {
                    word.offset = Some(token.offset);
                    word
                })
        })
        .collect();

    let mut unique = uniq_words(words);
    unique.truncate(max);
    unique
}
