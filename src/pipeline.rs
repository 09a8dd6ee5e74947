//! Tokenization with byte-accurate re-alignment to the source text.
//!
//! The tagger only reports surfaces, in its own charset. Each decoded surface
//! is searched for in the UTF-8 text starting at a cursor that only moves
//! forward, and the byte offset found is converted to a UTF-16 position.

use tracing::{debug, warn};

use crate::encoding::{sanitize_utf8, to_system, to_utf8, Charset};
use crate::engine::Tagger;
use crate::feature::{compute_modifiers, parse_feature};
use crate::model::Token;
use crate::position::{utf16_len, LineIndex};

/// Tokenizes possibly malformed UTF-8; invalid sequences become U+FFFD first.
pub fn analyze_bytes(tagger: &mut dyn Tagger, charset: &Charset, bytes: &[u8]) -> Vec<Token> {
    let clean_text = sanitize_utf8(bytes);
    analyze(tagger, charset, &clean_text)
}

/// Tokenizes `text`, returning tokens in document order.
///
/// Engine failures yield an empty list. A surface that cannot be found in
/// the text is still reported, placed at the end of the text and flagged
/// with `position_approximate`.
pub fn analyze(tagger: &mut dyn Tagger, charset: &Charset, text: &str) -> Vec<Token> {
    if text.is_empty() {
        return Vec::new();
    }

    let input = to_system(text, charset);
    let nodes = match tagger.parse(&input) {
        Ok(nodes) => nodes,
        Err(error) => {
            warn!("tagger failed on {} bytes of input: {error}", input.len());
            return Vec::new();
        }
    };

    let line_index = LineIndex::new(text);
    let mut cursor = 0usize;
    let mut tokens = Vec::with_capacity(nodes.len());

    for node in nodes.iter().filter(|node| !node.stat.is_boundary()) {
        let surface = to_utf8(&node.surface, charset);
        if surface.is_empty() {
            continue;
        }

        let found = text
            .get(cursor..)
            .and_then(|rest| rest.find(surface.as_str()))
            .map(|relative| cursor + relative);
        let (offset, position_approximate) = match found {
            Some(offset) => {
                cursor = offset + surface.len();
                (offset, false)
            }
            None => {
                warn!("surface {surface:?} not found after byte {cursor}; placing it at the end");
                cursor = text.len();
                (text.len(), true)
            }
        };

        let start = line_index.position(text, offset);
        let end_char = start
            .character
            .saturating_add(u32::try_from(utf16_len(&surface)).unwrap_or(u32::MAX));

        let feature = to_utf8(&node.feature, charset);
        let details = parse_feature(&feature, &surface);
        let matched_len = if position_approximate { 0 } else { surface.len() };
        let token_modifiers = compute_modifiers(text, offset, matched_len, &feature);

        tokens.push(Token {
            line: start.line,
            start_char: start.character,
            end_char,
            base_form: details.base_form,
            reading: details.reading,
            pronunciation: details.pronunciation,
            token_type: details.token_type,
            token_modifiers,
            position_approximate,
            surface,
            feature,
        });
    }

    debug!("tokenized {} bytes into {} tokens", text.len(), tokens.len());
    tokens
}
