//! Japanese morphological analysis core for language servers.
//!
//! Tokenization is delegated to MeCab and dependency parsing to CaboCha, both
//! loaded at runtime through their C APIs. This crate discovers the installed
//! dictionary, negotiates the engine charset, and maps every token the engine
//! reports back onto the original UTF-8 text as LSP-style positions.
//!
//! ## Quick Start
//! ```no_run
//! use mozuku_rs::{Analyzer, AnalyzerConfig};
//!
//! let mut analyzer = Analyzer::new(AnalyzerConfig::default());
//! if !analyzer.initialize() {
//!     eprintln!("MeCab is not installed");
//!     return;
//! }
//! for token in analyzer.analyze("誤解です。") {
//!     println!("{}/{} {}:{}", token.surface, token.token_type.as_str(), token.line, token.start_char);
//! }
//! for chunk in analyzer.analyze_dependencies("東京に行った。") {
//!     println!("{} -> {}", chunk.chunk_id, chunk.head_id);
//! }
//! ```
//!
//! ## Position Rules
//! - `line` is zero-based and counts `\n` line breaks.
//! - `start_char`/`end_char` are UTF-16 code units, so characters outside the
//!   Basic Multilingual Plane occupy two columns.
//! - A token whose surface cannot be found in the text is reported at the end
//!   of the text with `position_approximate` set.
//!
//! ## Environment Variables
//! - `MOZUKU_MECAB_LIBRARY_PATH`: explicit libmecab path.
//! - `MOZUKU_CABOCHA_LIBRARY_PATH`: explicit libcabocha path.
//! - `MOZUKU_MECAB_DICDIR`: dictionary directory, skipping discovery.
//! - `MOZUKU_MECAB_CHARSET`: engine charset, overriding discovery.
//!
//! ## Engine Seams
//! [`Tagger`], [`ChunkParser`], [`EngineBackend`] and [`ConfigQuery`] are the
//! only points where the crate talks to the outside world; the native
//! [`MecabLibrary`] implements the first three, and any other implementation
//! can be passed to [`Analyzer::initialize_with`].

mod analyzer;
mod bootstrap;
mod config;
mod constants;
mod dependency;
mod discovery;
mod encoding;
mod engine;
mod error;
mod feature;
mod locator;
mod model;
mod native;
mod pipeline;
mod position;
mod probe;
mod runtime;
mod types;

pub use analyzer::Analyzer;
pub use bootstrap::{BootstrapState, EngineBootstrap, EngineHandle};
pub use constants::*;
pub use dependency::{project, project_bytes, project_tree};
pub use encoding::{sanitize_utf8, to_system, to_utf8, Charset};
pub use engine::{ChunkParser, ChunkTree, EngineBackend, EngineNode, NodeStat, Tagger, TreeChunk};
pub use error::{MozukuError, Result};
pub use feature::{
    compute_modifiers, map_pos_to_type, parse_feature, FeatureDetails, TokenModifier, TokenType,
};
pub use locator::{
    locate_chunk_parser, parse_config_charset, read_declared_charset, CommandQuery, ConfigQuery,
    EngineDescriptor, EngineLocator,
};
pub use model::{DependencyChunk, Token};
pub use pipeline::{analyze, analyze_bytes};
pub use position::{
    byte_offset_to_position, position_to_byte_offset, utf16_len, LineIndex, Position,
};
pub use probe::probe;
pub use runtime::{MecabLibrary, NativeChunkParser, NativeTagger};
pub use types::AnalyzerConfig;

#[cfg(test)]
mod test_support;
