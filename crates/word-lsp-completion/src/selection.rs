//! Text to insert for a chosen suggestion, and its display label.

use crate::trigger::TriggerInfo;
use word_lsp_types::{EditorPosition, Settings, Word};

/// Where the chosen suggestion goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionContext {
    /// Triggering line.
    pub line: u32,
    /// Column where the phrase window starts; a word's `offset` is relative to it.
    pub context_start_ch: u32,
    pub end: EditorPosition,
}

impl From<&TriggerInfo> for SelectionContext {
    fn from(info: &TriggerInfo) -> Self {
        SelectionContext {
            line: info.start.line,
            context_start_ch: info.context_start_ch,
            end: info.end,
        }
    }
}

/// A single replacement on the triggering line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    pub text: String,
    pub start: EditorPosition,
    pub end: EditorPosition,
    /// Char index into `text` where the caret marker was, if any.
    pub caret_offset: Option<usize>,
}

impl Insertion {
    /// Cursor position after the edit is applied, when a caret marker moved it.
    pub fn cursor(&self) -> Option<EditorPosition> {
        let offset = self.caret_offset?;
        let mut position = self.start;
        for c in self.text.chars().take(offset) {
            if c == '\n' {
                position.line += 1;
                position.ch = 0;
            } else {
                position.ch += 1;
            }
        }
        Some(position)
    }

    /// `text` with `$0` at the caret position, escaped for an LSP snippet.
    pub fn snippet(&self) -> String {
        let mut snippet = String::with_capacity(self.text.len() + 2);
        for (i, c) in self.text.chars().enumerate() {
            if self.caret_offset == Some(i) {
                snippet.push_str("$0");
            }
            if matches!(c, '$' | '}' | '\\') {
                snippet.push('\\');
            }
            snippet.push(c);
        }
        if self.caret_offset == Some(self.text.chars().count()) {
            snippet.push_str("$0");
        }
        snippet
    }
}

/// The word as it appears in text: link words get a `[[...]]` wrapper, with
/// the matched alias as display text when enabled.
pub fn word_text(word: &Word, settings: &Settings) -> String {
    if !word.internal_link {
        return word.value.clone();
    }
    match word.matched_alias.as_deref() {
        Some(alias) if settings.suggest_internal_link_with_alias => {
            format!("[[{}|{}]]", word.value, alias)
        }
        _ => format!("[[{}]]", word.value),
    }
}

/// Display text. Everything after the hide delimiter is elided.
pub fn render_label(word: &Word, settings: &Settings) -> String {
    let text = word_text(word, settings);
    match settings.hide_delimiter() {
        Some(delimiter) if text.contains(delimiter) => {
            let head = text.split(delimiter).next().unwrap_or_default();
            format!("{} ...", head)
        }
        _ => text,
    }
}

pub fn compute_insertion(word: &Word, context: &SelectionContext, settings: &Settings) -> Insertion {
    let mut text = word_text(word, settings);
    if settings.insert_after_completion {
        text.push(' ');
    }
    if let Some(delimiter) = settings.hide_delimiter() {
        text = text.replacen(delimiter, "", 1);
    }

    let mut caret_offset = None;
    if let Some(caret) = settings.caret_symbol() {
        if let Some(byte_idx) = text.find(caret) {
            caret_offset = Some(text[..byte_idx].chars().count());
            text.replace_range(byte_idx..byte_idx + caret.len(), "");
        }
    }

    let offset = word.offset.unwrap_or(0) as u32;
    Insertion {
        text,
        start: EditorPosition::new(context.line, context.context_start_ch + offset),
        end: context.end,
        caret_offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(start_ch: u32, end_ch: u32) -> SelectionContext {
        SelectionContext {
            line: 4,
            context_start_ch: start_ch,
            end: EditorPosition::new(4, end_ch),
        }
    }

    #[test]
    fn test_plain_word_with_trailing_space() {
        let insertion = compute_insertion(&Word::new("hello"), &context(6, 9), &Settings::default());
        assert_eq!(insertion.text, "hello ");
        assert_eq!(insertion.start, EditorPosition::new(4, 6));
        assert_eq!(insertion.end, EditorPosition::new(4, 9));
        assert_eq!(insertion.cursor(), None);
    }

    #[test]
    fn test_offset_shifts_replacement_start() {
        let mut word = Word::new("york");
        word.offset = Some(4);
        let settings = Settings {
            insert_after_completion: false,
            ..Default::default()
        };
        let insertion = compute_insertion(&word, &context(2, 9), &settings);
        assert_eq!(insertion.text, "york");
        assert_eq!(insertion.start, EditorPosition::new(4, 6));
    }

    #[test]
    fn test_link_with_and_without_alias() {
        let mut word = Word::link("Home");
        word.matched_alias = Some("start".to_string());
        let plain = Settings {
            insert_after_completion: false,
            ..Default::default()
        };
        assert_eq!(compute_insertion(&word, &context(0, 2), &plain).text, "[[Home]]");

        let with_alias = Settings {
            suggest_internal_link_with_alias: true,
            ..plain
        };
        assert_eq!(
            compute_insertion(&word, &context(0, 2), &with_alias).text,
            "[[Home|start]]"
        );
    }

    #[test]
    fn test_hide_delimiter_is_stripped_once() {
        let settings = Settings {
            delimiter_to_hide_suggestion: "::".to_string(),
            ..Default::default()
        };
        let word = Word::new("print::(value)::");
        assert_eq!(compute_insertion(&word, &context(0, 2), &settings).text, "print(value):: ");
        assert_eq!(render_label(&word, &settings), "print ...");
        assert_eq!(render_label(&Word::new("plain"), &settings), "plain");
    }

    #[test]
    fn test_caret_marker_moves_cursor() {
        let settings = Settings {
            caret_location_symbol_after_complement: "<CARET>".to_string(),
            ..Default::default()
        };
        let word = Word::new("console.log(<CARET>)");
        let insertion = compute_insertion(&word, &context(10, 13), &settings);
        assert_eq!(insertion.text, "console.log() ");
        assert_eq!(insertion.caret_offset, Some(12));
        assert_eq!(insertion.cursor(), Some(EditorPosition::new(4, 22)));
        assert_eq!(insertion.snippet(), "console.log($0) ");
    }

    #[test]
    fn test_snippet_escapes_special_chars() {
        let insertion = Insertion {
            text: "${x}".to_string(),
            start: EditorPosition::default(),
            end: EditorPosition::default(),
            caret_offset: Some(4),
        };
        assert_eq!(insertion.snippet(), "\\${x\\}$0");
    }

    #[test]
    fn test_render_label_wraps_links() {
        let settings = Settings::default();
        assert_eq!(render_label(&Word::link("Tokyo"), &settings), "[[Tokyo]]");
        assert_eq!(render_label(&Word::new("Tokyo"), &settings), "Tokyo");
    }

    #[test]
    fn test_context_from_trigger_info() {
        let info = TriggerInfo {
            start: EditorPosition::new(2, 7),
            end: EditorPosition::new(2, 10),
            query: String::new(),
            context_start_ch: 3,
        };
        let context = SelectionContext::from(&info);
        assert_eq!(context.line, 2);
        assert_eq!(context.context_start_ch, 3);
        assert_eq!(context.end, EditorPosition::new(2, 10));
    }
}
