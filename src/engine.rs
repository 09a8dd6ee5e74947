//! Narrow call interface to the external tokenizer and chunk-parser engines.
//!
//! The native MeCab/CaboCha bindings in this crate implement these traits, and
//! so can any in-process stand-in. Everything above this seam works on owned
//! byte buffers in the engine's charset; nothing here decodes text.

use crate::constants::{
    MECAB_BOS_NODE, MECAB_EON_NODE, MECAB_EOS_NODE, MECAB_NOR_NODE, MECAB_UNK_NODE,
};
use crate::error::Result;

/// Status of a node emitted by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStat {
    /// Dictionary word.
    Normal,
    /// Word not found in the dictionary.
    Unknown,
    /// Beginning-of-sentence sentinel.
    BeginOfSentence,
    /// End-of-sentence sentinel.
    EndOfSentence,
    /// End of an N-best enumeration.
    EndOfNbest,
}

impl NodeStat {
    /// Maps the raw `stat` byte reported by MeCab.
    pub fn from_raw(stat: u8) -> Self {
        match stat {
            MECAB_NOR_NODE => NodeStat::Normal,
            MECAB_UNK_NODE => NodeStat::Unknown,
            MECAB_BOS_NODE => NodeStat::BeginOfSentence,
            MECAB_EOS_NODE => NodeStat::EndOfSentence,
            MECAB_EON_NODE => NodeStat::EndOfNbest,
            _ => NodeStat::Unknown,
        }
    }

    /// Whether the node is a sentence-boundary sentinel carrying no text.
    pub fn is_boundary(self) -> bool {
        matches!(
            self,
            NodeStat::BeginOfSentence | NodeStat::EndOfSentence | NodeStat::EndOfNbest
        )
    }
}

/// One analysis node, with surface and feature still in the engine charset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineNode {
    /// Surface bytes (exactly `length` bytes of the engine input).
    pub surface: Vec<u8>,
    /// Feature string bytes.
    pub feature: Vec<u8>,
    /// Node status.
    pub stat: NodeStat,
}

impl EngineNode {
    /// Builds a content node.
    pub fn content(surface: impl Into<Vec<u8>>, feature: impl Into<Vec<u8>>) -> Self {
        Self {
            surface: surface.into(),
            feature: feature.into(),
            stat: NodeStat::Normal,
        }
    }

    /// Builds a sentinel node of the given status.
    pub fn boundary(stat: NodeStat) -> Self {
        Self {
            surface: Vec::new(),
            feature: b"BOS/EOS,*,*,*,*,*,*,*,*".to_vec(),
            stat,
        }
    }
}

/// One chunk of a dependency tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeChunk {
    /// Index of the head chunk, `-1` when the chunk has no head.
    pub link: i32,
    /// Dependency score.
    pub score: f32,
    /// Index of the chunk's first token in the tree.
    pub token_pos: usize,
    /// Number of tokens in the chunk.
    pub token_size: usize,
}

/// Chunk/link tree returned by the chunk parser.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkTree {
    /// Chunks in engine order.
    pub chunks: Vec<TreeChunk>,
    /// Token surfaces in the engine charset; `None` where the engine had no surface.
    pub tokens: Vec<Option<Vec<u8>>>,
}

impl ChunkTree {
    /// Number of tokens in the tree.
    pub fn token_size(&self) -> usize {
        self.tokens.len()
    }

    /// Surface bytes of the token at `index`, if any.
    pub fn token(&self, index: usize) -> Option<&[u8]> {
        self.tokens.get(index).and_then(|token| token.as_deref())
    }
}

/// Morphological tokenizer instance.
///
/// Instances are not assumed safe for concurrent use; `&mut self` receivers
/// leave mutual exclusion to the owner.
pub trait Tagger: Send {
    /// Parses `input` (already in the engine charset) into nodes in document
    /// order, sentinels included.
    fn parse(&mut self, input: &[u8]) -> Result<Vec<EngineNode>>;
}

/// Dependency chunk parser instance.
pub trait ChunkParser: Send {
    /// Parses `input` into a chunk tree, `None` when the engine produced no tree.
    fn parse_to_tree(&mut self, input: &[u8]) -> Result<Option<ChunkTree>>;
}

/// Factory for engine instances.
///
/// `argument` is the engine's command-line style configuration string, for
/// example `-d /usr/lib/mecab/dic/ipadic`; an empty string asks for the
/// compiled-in defaults.
pub trait EngineBackend {
    /// Constructs a tokenizer.
    fn create_tagger(&self, argument: &str) -> Result<Box<dyn Tagger>>;

    /// Constructs a chunk parser.
    fn create_chunk_parser(&self, argument: &str) -> Result<Box<dyn ChunkParser>>;
}

#[cfg(test)]
mod engine_tests {
    use super::{ChunkTree, EngineNode, NodeStat, TreeChunk};

    #[test]
    fn raw_stat_maps_to_boundary_kinds() {
        assert_eq!(NodeStat::from_raw(0), NodeStat::Normal);
        assert_eq!(NodeStat::from_raw(1), NodeStat::Unknown);
        assert!(NodeStat::from_raw(2).is_boundary());
        assert!(NodeStat::from_raw(3).is_boundary());
        assert!(NodeStat::from_raw(4).is_boundary());
        assert!(!NodeStat::from_raw(0).is_boundary());
        assert_eq!(NodeStat::from_raw(200), NodeStat::Unknown);
    }

    #[test]
    fn boundary_nodes_carry_no_surface() {
        let node = EngineNode::boundary(NodeStat::BeginOfSentence);
        assert!(node.surface.is_empty());
        assert!(node.stat.is_boundary());
    }

    #[test]
    fn chunk_tree_token_lookup_is_bounded() {
        let tree = ChunkTree {
            chunks: vec![TreeChunk {
                link: -1,
                score: 0.0,
                token_pos: 0,
                token_size: 2,
            }],
            tokens: vec![Some(b"a".to_vec()), None],
        };
        assert_eq!(tree.token_size(), 2);
        assert_eq!(tree.token(0), Some(&b"a"[..]));
        assert_eq!(tree.token(1), None);
        assert_eq!(tree.token(5), None);
    }
}
