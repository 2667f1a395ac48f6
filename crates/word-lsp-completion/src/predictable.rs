//! Predictable completion: finish the token at the cursor from nearby text,
//! without consulting any index.

use word_lsp_text::{Document, Tokenizer};
use word_lsp_types::EditorPosition;

/// Lines searched on each side of the cursor.
const SEARCH_LINES: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictableCompletion {
    pub text: String,
    pub start: EditorPosition,
    pub end: EditorPosition,
}

/// Complete the token before `cursor` with the closest earlier token that
/// extends it, falling back to the first such token after the cursor.
pub fn predictable_complete(
    document: &Document,
    cursor: EditorPosition,
    tokenizer: &dyn Tokenizer,
) -> Option<PredictableCompletion> {
    let current = tokenizer
        .tokenize(&document.line_until(cursor), true)
        .pop()
        .filter(|token| !token.is_empty())?;
    let extends = |token: &&String| token.starts_with(current.as_str()) && **token != current;

    let before_start = EditorPosition::new(cursor.line.saturating_sub(SEARCH_LINES), 0);
    let before = tokenizer.tokenize(&document.range_text(before_start, cursor), false);
    // The last token before the cursor is the current one.
    let found = before.iter().rev().skip(1).find(extends).cloned().or_else(|| {
        let last_line = (document.line_count() as u32).saturating_sub(1);
        let after_end = EditorPosition::new((cursor.line + SEARCH_LINES).min(last_line), 0);
        let after = tokenizer.tokenize(&document.range_text(cursor, after_end), false);
        after.iter().find(extends).cloned()
    })?;

    let current_len = current.chars().count() as u32;
    Some(PredictableCompletion {
        text: found,
        start: EditorPosition::new(cursor.line, cursor.ch.saturating_sub(current_len)),
        end: cursor,
    })
}
