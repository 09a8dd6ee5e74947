//! Byte offset to UTF-16 line/character conversion.

use serde::Serialize;

/// Zero-based line and UTF-16 code-unit column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// Byte offsets at which each line of a text starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    /// Indexes `text`; a line starts at offset 0 and after every `\n`.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, byte)| *byte == b'\n')
                .map(|(index, _)| index + 1),
        );
        Self {
            line_starts,
            len: text.len(),
        }
    }

    pub fn line_starts(&self) -> &[usize] {
        &self.line_starts
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Maps a byte offset to `(line, byte column)`. Offsets past the end
    /// clamp to the end of the text.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(insertion) => insertion - 1,
        };
        (line, offset - self.line_starts[line])
    }

    /// Maps a byte offset in `text` (the text this index was built from) to a
    /// UTF-16 position.
    pub fn position(&self, text: &str, offset: usize) -> Position {
        let (line, column) = self.line_col(offset);
        let start = self.line_starts[line];
        let character = utf16_units_in(&text.as_bytes()[start..start + column]);
        Position::new(to_u32(line), to_u32(character))
    }

    /// Maps a UTF-16 position back to a byte offset in `text`.
    ///
    /// Lines past the end map to the end of the text; characters past the end
    /// of a line stop at its line break.
    pub fn offset(&self, text: &str, position: Position) -> usize {
        let Some(&start) = self.line_starts.get(position.line as usize) else {
            return text.len();
        };
        let target = position.character as usize;
        let mut units = 0usize;
        for (index, ch) in text[start..].char_indices() {
            if units >= target || ch == '\n' {
                return start + index;
            }
            units += ch.len_utf16();
        }
        text.len()
    }
}

/// Length of `text` in UTF-16 code units.
pub fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Counts UTF-16 code units covered by raw UTF-8 bytes: one per sequence,
/// two for four-byte sequences. Continuation bytes add nothing, so a slice
/// cut mid-character still counts the characters it starts.
fn utf16_units_in(bytes: &[u8]) -> usize {
    bytes
        .iter()
        .filter(|byte| (**byte & 0xC0) != 0x80)
        .map(|byte| if *byte >= 0xF0 { 2 } else { 1 })
        .sum()
}

/// Converts a byte offset to a UTF-16 position without keeping the index.
pub fn byte_offset_to_position(text: &str, offset: usize) -> Position {
    LineIndex::new(text).position(text, offset)
}

/// Converts a UTF-16 `(line, character)` to a byte offset in `text`.
pub fn position_to_byte_offset(text: &str, line: u32, character: u32) -> usize {
    LineIndex::new(text).offset(text, Position::new(line, character))
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod position_tests {
    use super::{
        byte_offset_to_position, position_to_byte_offset, utf16_len, LineIndex, Position,
    };

    #[test]
    fn line_starts_follow_newlines() {
        let index = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(index.line_starts(), &[0, 3, 6, 7]);
        assert_eq!(index.line_count(), 4);
        assert_eq!(LineIndex::new("").line_starts(), &[0]);
    }

    #[test]
    fn line_col_uses_enclosing_line() {
        let index = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(index.line_col(0), (0, 0));
        assert_eq!(index.line_col(2), (0, 2));
        assert_eq!(index.line_col(3), (1, 0));
        assert_eq!(index.line_col(6), (2, 0));
        assert_eq!(index.line_col(8), (3, 1));
        assert_eq!(index.line_col(100), (3, 2));
    }

    #[test]
    fn three_byte_characters_are_one_unit() {
        let text = "誤解です";
        assert_eq!(byte_offset_to_position(text, 6), Position::new(0, 2));
        assert_eq!(utf16_len("誤解"), 2);
    }

    #[test]
    fn four_byte_characters_are_two_units() {
        let text = "🍣寿司";
        assert_eq!(utf16_len("🍣"), 2);
        assert_eq!(byte_offset_to_position(text, 4), Position::new(0, 2));
        assert_eq!(byte_offset_to_position(text, 7), Position::new(0, 3));
    }

    #[test]
    fn combining_marks_count_per_code_point() {
        // "か" + U+3099 combining voiced mark
        let text = "か\u{3099}ら";
        assert_eq!(utf16_len("か\u{3099}"), 2);
        assert_eq!(byte_offset_to_position(text, 6), Position::new(0, 2));
    }

    #[test]
    fn positions_on_later_lines_restart_columns() {
        let text = "一行目\n🍣二行目";
        let index = LineIndex::new(text);
        let offset = text.find('二').expect("present");
        assert_eq!(index.position(text, offset), Position::new(1, 2));
    }

    #[test]
    fn offsets_past_the_end_clamp() {
        let text = "ab\nc";
        assert_eq!(byte_offset_to_position(text, 99), Position::new(1, 1));
    }

    #[test]
    fn position_to_byte_offset_inverts_mapping() {
        let text = "誤解\n🍣です";
        assert_eq!(position_to_byte_offset(text, 0, 1), 3);
        assert_eq!(position_to_byte_offset(text, 1, 0), 7);
        assert_eq!(position_to_byte_offset(text, 1, 2), 11);
        assert_eq!(position_to_byte_offset(text, 1, 3), 14);
        assert_eq!(position_to_byte_offset(text, 0, 50), 6);
        assert_eq!(position_to_byte_offset(text, 9, 0), text.len());
        assert_eq!(position_to_byte_offset(text, 1, 50), text.len());
    }
}
