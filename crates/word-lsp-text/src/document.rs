//! Document: ropey::Rope buffer for an open file, kept in sync with didChange.

use ropey::Rope;
use word_lsp_types::EditorPosition;

/// Text of a single open file.
pub struct Document {
    rope: Rope,
}

impl Document {
    pub fn new(text: &str) -> Self {
        Document {
            rope: Rope::from_str(text),
        }
    }

    /// Replace the whole content (used on didOpen and full-sync didChange).
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
    }

    /// Apply an incremental edit from LSP didChange.
    ///
    /// Positions are (line, char) with out-of-range values clamped to the
    /// end of the line or document.
    pub fn apply_edit(&mut self, start: EditorPosition, end: EditorPosition, new_text: &str) {
        let start_idx = self.position_to_char(start);
        let end_idx = self.position_to_char(end).max(start_idx);
        self.rope.remove(start_idx..end_idx);
        self.rope.insert(start_idx, new_text);
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Content of `line` without its line break.
    pub fn line(&self, line: usize) -> String {
        if line >= self.rope.len_lines() {
            return String::new();
        }
        let text = self.rope.line(line).to_string();
        text.trim_end_matches(['\n', '\r']).to_string()
    }

    /// The line text from its start up to (not including) char `ch`.
    pub fn line_until(&self, position: EditorPosition) -> String {
        self.line(position.line as usize)
            .chars()
            .take(position.ch as usize)
            .collect()
    }

    /// Text between two positions.
    pub fn range_text(&self, start: EditorPosition, end: EditorPosition) -> String {
        let start_idx = self.position_to_char(start);
        let end_idx = self.position_to_char(end).max(start_idx);
        self.rope.slice(start_idx..end_idx).to_string()
    }

    /// Convert (line, char) to a char index in the rope.
    pub fn position_to_char(&self, position: EditorPosition) -> usize {
        let line = position.line as usize;
        if line >= self.rope.len_lines() {
            return self.rope.len_chars();
        }
        let line_start = self.rope.line_to_char(line);
        let line_len = self.line(line).chars().count();
        line_start + (position.ch as usize).min(line_len)
    }

    /// Convert a char index to (line, char).
    pub fn char_to_position(&self, char_idx: usize) -> EditorPosition {
        let char_idx = char_idx.min(self.rope.len_chars());
        let line = self.rope.char_to_line(char_idx);
        let line_start = self.rope.line_to_char(line);
        EditorPosition::new(line as u32, (char_idx - line_start) as u32)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("")
    }
}
