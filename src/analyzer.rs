use tracing::{debug, error};

use crate::bootstrap::{EngineBootstrap, EngineHandle};
use crate::constants::DEFAULT_CHARSET;
use crate::dependency;
use crate::encoding::Charset;
use crate::engine::EngineBackend;
use crate::locator::{locate_chunk_parser, EngineLocator};
use crate::model::{DependencyChunk, Token};
use crate::pipeline;
use crate::runtime::MecabLibrary;
use crate::types::AnalyzerConfig;

/// Entry point: bootstraps the engines once, then analyzes texts.
///
/// Methods that reach an engine take `&mut self`; share an analyzer between
/// threads behind a `Mutex`. Before a successful [`Analyzer::initialize`]
/// every analysis returns an empty list.
///
/// ```no_run
/// use mozuku_rs::{Analyzer, AnalyzerConfig};
///
/// let mut analyzer = Analyzer::new(AnalyzerConfig::default());
/// if analyzer.initialize() {
///     for token in analyzer.analyze("吾輩は猫である。") {
///         println!("{} {}:{}-{}", token.surface, token.line, token.start_char, token.end_char);
///     }
/// }
/// ```
pub struct Analyzer {
    config: AnalyzerConfig,
    handle: Option<EngineHandle>,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            handle: None,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Loads the native libraries named by the configuration and bootstraps
    /// the engines. Returns whether a tagger is usable.
    pub fn initialize(&mut self) -> bool {
        let library = match MecabLibrary::load_from_config(&self.config) {
            Ok(library) => library,
            Err(failure) => {
                error!("MeCab library not loaded: {failure}");
                self.handle = None;
                return false;
            }
        };
        if let Some(version) = library.version() {
            debug!("MeCab {version}");
        }
        if self.config.enable_chunk_parser {
            locate_chunk_parser();
        }

        let locator = EngineLocator::from_config(&self.config);
        self.initialize_with(&library, &locator)
    }

    /// Bootstraps the engines from an arbitrary backend and locator.
    pub fn initialize_with(&mut self, backend: &dyn EngineBackend, locator: &EngineLocator) -> bool {
        let mut bootstrap =
            EngineBootstrap::new(backend, locator).with_chunk_parser(self.config.enable_chunk_parser);
        let ready = bootstrap.initialize(
            self.config.explicit_dictionary_path(),
            self.config.requested_charset(),
        );
        self.handle = if ready { bootstrap.into_handle() } else { None };
        self.handle.is_some()
    }

    pub fn is_initialized(&self) -> bool {
        self.handle.is_some()
    }

    /// Effective engine charset, or `None` before initialization.
    pub fn charset(&self) -> Option<&Charset> {
        self.handle.as_ref().map(EngineHandle::charset)
    }

    /// Label of the effective engine charset; `UTF-8` before initialization.
    pub fn system_charset(&self) -> &str {
        self.charset().map_or(DEFAULT_CHARSET, Charset::label)
    }

    pub fn is_chunk_parser_available(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(EngineHandle::has_chunk_parser)
    }

    /// Tokenizes `text` into positioned tokens.
    pub fn analyze(&mut self, text: &str) -> Vec<Token> {
        let Some(handle) = self.handle.as_mut() else {
            debug!("analyze called before initialization");
            return Vec::new();
        };
        let charset = handle.charset().clone();
        pipeline::analyze(handle.tagger_mut(), &charset, text)
    }

    /// Tokenizes raw bytes, replacing invalid UTF-8 with U+FFFD first.
    pub fn analyze_bytes(&mut self, bytes: &[u8]) -> Vec<Token> {
        let Some(handle) = self.handle.as_mut() else {
            return Vec::new();
        };
        let charset = handle.charset().clone();
        pipeline::analyze_bytes(handle.tagger_mut(), &charset, bytes)
    }

    /// Dependency chunks of `text`; empty when no chunk parser is available.
    pub fn analyze_dependencies(&mut self, text: &str) -> Vec<DependencyChunk> {
        let Some(handle) = self.handle.as_mut() else {
            return Vec::new();
        };
        let charset = handle.charset().clone();
        match handle.chunk_parser_mut() {
            Some(parser) => dependency::project(parser, &charset, text),
            None => Vec::new(),
        }
    }
}
