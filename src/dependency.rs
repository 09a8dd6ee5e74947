//! Projection of chunk-parser trees into [`DependencyChunk`]s.

use tracing::{debug, warn};

use crate::encoding::{sanitize_utf8, to_system, to_utf8, Charset};
use crate::engine::{ChunkParser, ChunkTree};
use crate::model::DependencyChunk;

/// Dependency analysis of possibly malformed UTF-8.
pub fn project_bytes(
    parser: &mut dyn ChunkParser,
    charset: &Charset,
    bytes: &[u8],
) -> Vec<DependencyChunk> {
    let clean_text = sanitize_utf8(bytes);
    project(parser, charset, &clean_text)
}

/// Runs the chunk parser over `text` and returns its chunks in order.
/// Engine failures and missing trees yield an empty list.
pub fn project(parser: &mut dyn ChunkParser, charset: &Charset, text: &str) -> Vec<DependencyChunk> {
    if text.is_empty() {
        return Vec::new();
    }

    let input = to_system(text, charset);
    let tree = match parser.parse_to_tree(&input) {
        Ok(Some(tree)) => tree,
        Ok(None) => {
            debug!("chunk parser returned no tree");
            return Vec::new();
        }
        Err(error) => {
            warn!("chunk parser failed: {error}");
            return Vec::new();
        }
    };

    let chunks = project_tree(&tree, charset);
    debug!("projected {} chunks", chunks.len());
    chunks
}

/// Converts an already parsed tree. Token ranges running past the tree's
/// token count are cut short.
pub fn project_tree(tree: &ChunkTree, charset: &Charset) -> Vec<DependencyChunk> {
    let token_size = tree.token_size();
    tree.chunks
        .iter()
        .enumerate()
        .map(|(chunk_id, chunk)| {
            let end = chunk.token_pos.saturating_add(chunk.token_size).min(token_size);
            let start = chunk.token_pos.min(end);
            let text = (start..end)
                .filter_map(|index| tree.token(index))
                .map(|surface| to_utf8(surface, charset))
                .collect::<String>();
            DependencyChunk {
                chunk_id,
                head_id: chunk.link,
                score: chunk.score,
                text,
            }
        })
        .collect()
}
