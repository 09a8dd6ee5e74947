//! One-shot engine construction and charset negotiation.

use std::path::Path;

use tracing::{debug, error, warn};

use crate::encoding::Charset;
use crate::engine::{ChunkParser, EngineBackend, Tagger};
use crate::locator::EngineLocator;
use crate::probe::probe;

/// Progress of an [`EngineBootstrap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapState {
    Unconfigured,
    DictionarySelected,
    TaggerConstructed,
    CharsetResolved,
    Ready,
    Failed,
}

/// Engines and charset produced by a successful bootstrap.
///
/// The chunk parser, when present, speaks the tagger's charset. Native
/// handles are released when the handle is dropped.
pub struct EngineHandle {
    tagger: Box<dyn Tagger>,
    chunk_parser: Option<Box<dyn ChunkParser>>,
    charset: Charset,
}

impl EngineHandle {
    pub fn new(tagger: Box<dyn Tagger>, charset: Charset) -> Self {
        Self {
            tagger,
            chunk_parser: None,
            charset,
        }
    }

    pub fn with_chunk_parser(mut self, chunk_parser: Box<dyn ChunkParser>) -> Self {
        self.chunk_parser = Some(chunk_parser);
        self
    }

    pub fn charset(&self) -> &Charset {
        &self.charset
    }

    pub fn tagger_mut(&mut self) -> &mut dyn Tagger {
        self.tagger.as_mut()
    }

    pub fn chunk_parser_mut(&mut self) -> Option<&mut (dyn ChunkParser + 'static)> {
        self.chunk_parser.as_deref_mut()
    }

    pub fn has_chunk_parser(&self) -> bool {
        self.chunk_parser.is_some()
    }
}

/// Builds the tagger (and optionally the chunk parser) exactly once.
///
/// The charset is chosen by precedence: the requested charset, then the one
/// discovery reports, then UTF-8. A non-UTF-8 choice is re-checked against
/// the constructed tagger with the charset probe.
pub struct EngineBootstrap<'a> {
    backend: &'a dyn EngineBackend,
    locator: &'a EngineLocator,
    enable_chunk_parser: bool,
    state: BootstrapState,
    charset: Charset,
    tagger: Option<Box<dyn Tagger>>,
    chunk_parser: Option<Box<dyn ChunkParser>>,
}

impl<'a> EngineBootstrap<'a> {
    pub fn new(backend: &'a dyn EngineBackend, locator: &'a EngineLocator) -> Self {
        Self {
            backend,
            locator,
            enable_chunk_parser: true,
            state: BootstrapState::Unconfigured,
            charset: Charset::utf8(),
            tagger: None,
            chunk_parser: None,
        }
    }

    pub fn with_chunk_parser(mut self, enabled: bool) -> Self {
        self.enable_chunk_parser = enabled;
        self
    }

    /// Selects a dictionary, constructs the engines and settles the charset.
    ///
    /// Returns whether a usable tagger exists. Empty strings for either
    /// argument count as absent.
    pub fn initialize(
        &mut self,
        explicit_dictionary_path: Option<&Path>,
        requested_charset: Option<&str>,
    ) -> bool {
        self.tagger = None;
        self.chunk_parser = None;

        let explicit_dictionary_path =
            explicit_dictionary_path.filter(|path| !path.as_os_str().is_empty());
        let requested_charset = requested_charset
            .map(str::trim)
            .filter(|charset| !charset.is_empty());

        let (argument, discovered_charset) = match explicit_dictionary_path {
            Some(path) => (format!("-d {}", path.display()), None),
            None => {
                let descriptor = self.locator.locate(self.backend);
                let argument = match descriptor.dictionary_path.as_ref() {
                    Some(root) if descriptor.available => format!(
                        "-d {}",
                        root.join(self.locator.subdictionary()).display()
                    ),
                    _ => {
                        debug!("no dictionary discovered; using engine defaults");
                        String::new()
                    }
                };
                (argument, descriptor.declared_charset)
            }
        };
        self.state = BootstrapState::DictionarySelected;

        let label = requested_charset
            .map(str::to_string)
            .or(discovered_charset.filter(|charset| !charset.trim().is_empty()))
            .unwrap_or_else(|| Charset::utf8().label().to_string());
        let charset = Charset::new(&label);
        if !charset.is_recognized() {
            warn!("unknown charset {label}; transcoding as UTF-8");
        }
        debug!("tagger argument: {argument:?}, charset: {label}");

        let (mut tagger, argument) = match self.construct_tagger(&argument) {
            Some(constructed) => constructed,
            None => {
                self.state = BootstrapState::Failed;
                return false;
            }
        };
        self.state = BootstrapState::TaggerConstructed;

        self.charset = if !charset.is_utf8() && probe(tagger.as_mut()) {
            debug!("tagger accepts UTF-8 input; overriding {label}");
            Charset::utf8()
        } else {
            charset
        };
        self.state = BootstrapState::CharsetResolved;
        self.tagger = Some(tagger);

        if self.enable_chunk_parser {
            match self.backend.create_chunk_parser(&argument) {
                Ok(chunk_parser) => {
                    debug!("chunk parser constructed");
                    self.chunk_parser = Some(chunk_parser);
                }
                Err(error) => debug!("chunk parser unavailable: {error}"),
            }
        }

        self.state = BootstrapState::Ready;
        debug!(
            "engines ready: charset {}, chunk parser {}",
            self.charset,
            if self.chunk_parser.is_some() { "available" } else { "unavailable" }
        );
        true
    }

    /// Tries `argument`, then once more with the engine defaults. Returns the
    /// tagger with the argument that worked.
    fn construct_tagger(&self, argument: &str) -> Option<(Box<dyn Tagger>, String)> {
        match self.backend.create_tagger(argument) {
            Ok(tagger) => return Some((tagger, argument.to_string())),
            Err(failure) => {
                error!("tagger construction failed with {argument:?}: {failure}");
                if argument.is_empty() {
                    return None;
                }
            }
        }

        debug!("retrying tagger construction without a dictionary argument");
        match self.backend.create_tagger("") {
            Ok(tagger) => Some((tagger, String::new())),
            Err(failure) => {
                error!("tagger fallback construction failed: {failure}");
                None
            }
        }
    }

    pub fn state(&self) -> BootstrapState {
        self.state
    }

    pub fn charset(&self) -> &Charset {
        &self.charset
    }

    pub fn is_chunk_parser_available(&self) -> bool {
        self.chunk_parser.is_some()
    }

    /// Hands over the constructed engines; `None` unless the bootstrap is ready.
    pub fn into_handle(self) -> Option<EngineHandle> {
        if self.state != BootstrapState::Ready {
            return None;
        }
        let handle = EngineHandle::new(self.tagger?, self.charset);
        Some(match self.chunk_parser {
            Some(chunk_parser) => handle.with_chunk_parser(chunk_parser),
            None => handle,
        })
    }
}
