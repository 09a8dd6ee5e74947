use serde::Serialize;

use crate::feature::{TokenModifier, TokenType};
use crate::position::Position;

/// One analyzed word with its location in the source text.
///
/// `line` is zero-based; `start_char`/`end_char` are UTF-16 code-unit
/// columns on that line, end exclusive.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    /// Surface form, decoded to UTF-8.
    pub surface: String,
    /// Zero-based line.
    pub line: u32,
    /// Inclusive start column in UTF-16 code units.
    pub start_char: u32,
    /// Exclusive end column, `start_char + utf16_len(surface)`.
    pub end_char: u32,
    /// Raw feature string, decoded to UTF-8.
    pub feature: String,
    /// Dictionary form; the surface when the dictionary has none.
    pub base_form: String,
    /// Reading, empty when unknown.
    pub reading: String,
    /// Pronunciation, empty when unknown.
    pub pronunciation: String,
    /// Coarse part of speech.
    pub token_type: TokenType,
    /// Extra classification flags.
    pub token_modifiers: Vec<TokenModifier>,
    /// The surface could not be found in the text; the position is the end
    /// of the text rather than the token's real location.
    pub position_approximate: bool,
}

impl Token {
    /// Start position of the token.
    pub fn start(&self) -> Position {
        Position::new(self.line, self.start_char)
    }

    /// End position of the token.
    pub fn end(&self) -> Position {
        Position::new(self.line, self.end_char)
    }
}

/// One bunsetsu chunk of a dependency analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyChunk {
    /// Index of the chunk in the sentence.
    pub chunk_id: usize,
    /// Index of the head chunk, `-1` for none.
    pub head_id: i32,
    /// Dependency score reported by the parser.
    pub score: f32,
    /// Concatenated surfaces of the chunk's tokens.
    pub text: String,
}

impl DependencyChunk {
    pub fn head(&self) -> Option<usize> {
        usize::try_from(self.head_id).ok()
    }
}
