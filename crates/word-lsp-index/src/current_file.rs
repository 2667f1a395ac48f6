//! Current-file word source: every distinct token of the active document.

use crate::word_index::WordIndex;
use std::collections::HashSet;
use word_lsp_text::Tokenizer;
use word_lsp_types::Word;

fn is_english_word(token: &str) -> bool {
    token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Build the current-file index from `text`.
///
/// `exclude` is the token being typed at the cursor; it is left out so the
/// half-typed word does not suggest itself.
pub fn index_current_file(
    text: &str,
    tokenizer: &dyn Tokenizer,
    exclude: Option<&str>,
    only_english: bool,
) -> WordIndex {
    let mut seen = HashSet::new();
    let mut index = WordIndex::new();

    for token in tokenizer.tokenize(text, false) {
        if Some(token.as_str()) == exclude
            || tokenizer.should_ignore(&token)
            || (only_english && !is_english_word(&token))
        {
            continue;
        }
        if !seen.insert(token.clone()) {
            continue;
        }
        if let Some(key) = token.chars().next() {
            index.push(key, Word::new(token));
        }
    }

    index
}
