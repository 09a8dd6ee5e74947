use std::ffi::CString;
use std::os::raw::c_char;
use std::path::Path;
use std::ptr;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::config::{CabochaHandle, MecabHandle};
use crate::discovery::{default_library_candidates, discover_default_library_path, EngineLibrary};
use crate::engine::{ChunkParser, ChunkTree, EngineBackend, EngineNode, NodeStat, Tagger, TreeChunk};
use crate::error::{MozukuError, Result};
use crate::native::{
    copy_bytes, cstr_to_bytes, cstr_to_string, read_cabocha_error, read_mecab_error, CabochaApi,
    DynamicLibrary, LoadedCabocha, LoadedMecab, MecabApi,
};
use crate::types::AnalyzerConfig;

/// Handle to a loaded libmecab (and optionally libcabocha) plus resolved
/// function tables.
///
/// Implements [`EngineBackend`]; every tagger or parser it creates keeps the
/// library alive for as long as the instance exists.
#[derive(Clone)]
pub struct MecabLibrary {
    mecab: Arc<LoadedMecab>,
    cabocha: Option<Arc<LoadedCabocha>>,
}

impl MecabLibrary {
    /// Loads libmecab from an explicit path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let library = DynamicLibrary::open(path)?;
        Self::from_library(library)
    }

    /// Loads libmecab from common platform-specific locations and caches it.
    pub fn load_default() -> Result<Self> {
        static DEFAULT_LIBRARY: Mutex<Option<Arc<LoadedMecab>>> = Mutex::new(None);

        let mut guard = DEFAULT_LIBRARY.lock().map_err(|_| {
            MozukuError::LibraryLoad("failed to lock default library cache".to_string())
        })?;

        if let Some(mecab) = guard.as_ref() {
            return Ok(Self {
                mecab: mecab.clone(),
                cabocha: None,
            });
        }

        let loaded = Self::load_default_internal()?;
        *guard = Some(loaded.mecab.clone());
        Ok(loaded)
    }

    /// Loads the libraries named by `config`, falling back to platform
    /// defaults. libcabocha is only attempted when the chunk parser is
    /// enabled, and failing to find it is not an error.
    pub fn load_from_config(config: &AnalyzerConfig) -> Result<Self> {
        let library = match config.mecab_library_path.as_ref() {
            Some(path) => Self::load(path)?,
            None => Self::load_default()?,
        };
        if !config.enable_chunk_parser {
            return Ok(library);
        }

        let with_cabocha = match config.cabocha_library_path.as_ref() {
            Some(path) => library.clone().with_cabocha(path),
            None => library.clone().with_default_cabocha(),
        };
        match with_cabocha {
            Ok(library) => Ok(library),
            Err(error) => {
                debug!("chunk parser library not loaded: {error}");
                Ok(library)
            }
        }
    }

    /// Attaches libcabocha from an explicit path.
    pub fn with_cabocha(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let library = DynamicLibrary::open(path)?;
        let api = unsafe { CabochaApi::load(&library)? };
        self.cabocha = Some(Arc::new(LoadedCabocha {
            _library: library,
            api,
        }));
        Ok(self)
    }

    /// Attaches libcabocha from common platform-specific locations.
    pub fn with_default_cabocha(self) -> Result<Self> {
        let mut errors = Vec::new();

        if let Some(path) = discover_default_library_path(EngineLibrary::Cabocha) {
            match self.clone().with_cabocha(&path) {
                Ok(loaded) => return Ok(loaded),
                Err(error) => errors.push(format!("{}: {}", path.display(), error)),
            }
        }

        for candidate in default_library_candidates(EngineLibrary::Cabocha) {
            match self.clone().with_cabocha(candidate) {
                Ok(loaded) => return Ok(loaded),
                Err(error) => errors.push(format!("{candidate}: {error}")),
            }
        }

        Err(MozukuError::LibraryLoad(format!(
            "set MOZUKU_CABOCHA_LIBRARY_PATH to the dynamic library path. tried: {}",
            errors.join(" | ")
        )))
    }

    /// Returns whether libcabocha is attached.
    pub fn has_chunk_parser_library(&self) -> bool {
        self.cabocha.is_some()
    }

    /// Returns the loaded MeCab version string, when the library exports one.
    pub fn version(&self) -> Option<String> {
        let version = self.mecab.api.mecab_version?;
        let pointer = unsafe { version() };
        if pointer.is_null() {
            return None;
        }
        Some(cstr_to_string(pointer))
    }

    fn load_default_internal() -> Result<Self> {
        let mut errors = Vec::new();

        if let Some(path) = discover_default_library_path(EngineLibrary::Mecab) {
            match Self::load(&path) {
                Ok(loaded) => return Ok(loaded),
                Err(error) => errors.push(format!("{}: {}", path.display(), error)),
            }
        }

        for candidate in default_library_candidates(EngineLibrary::Mecab) {
            let library = match DynamicLibrary::open(candidate) {
                Ok(library) => library,
                Err(error) => {
                    errors.push(format!("{candidate}: {error}"));
                    continue;
                }
            };

            match Self::from_library(library) {
                Ok(loaded) => return Ok(loaded),
                Err(error) => errors.push(format!("{candidate}: {error}")),
            }
        }

        Err(MozukuError::LibraryLoad(format!(
            "set MOZUKU_MECAB_LIBRARY_PATH to the dynamic library path. tried: {}",
            errors.join(" | ")
        )))
    }

    fn from_library(library: DynamicLibrary) -> Result<Self> {
        let api = unsafe { MecabApi::load(&library)? };
        Ok(Self {
            mecab: Arc::new(LoadedMecab {
                _library: library,
                api,
            }),
            cabocha: None,
        })
    }
}

impl EngineBackend for MecabLibrary {
    fn create_tagger(&self, argument: &str) -> Result<Box<dyn Tagger>> {
        let argument_c = CString::new(argument)?;
        let api = &self.mecab.api;
        let handle = unsafe { (api.mecab_new2)(argument_c.as_ptr()) };
        if handle.is_null() {
            let message = read_mecab_error(api, ptr::null_mut())
                .unwrap_or_else(|| "mecab_new2 returned a null handle".to_string());
            return Err(MozukuError::ConstructionFailed(message));
        }

        Ok(Box::new(NativeTagger {
            inner: self.mecab.clone(),
            handle,
        }))
    }

    fn create_chunk_parser(&self, argument: &str) -> Result<Box<dyn ChunkParser>> {
        let Some(cabocha) = self.cabocha.as_ref() else {
            return Err(MozukuError::Unavailable(
                "libcabocha is not loaded".to_string(),
            ));
        };

        let argument_c = CString::new(argument)?;
        let handle = unsafe { (cabocha.api.cabocha_new2)(argument_c.as_ptr()) };
        if handle.is_null() {
            let message = read_cabocha_error(&cabocha.api, ptr::null_mut())
                .unwrap_or_else(|| "cabocha_new2 returned a null handle".to_string());
            return Err(MozukuError::ConstructionFailed(message));
        }

        Ok(Box::new(NativeChunkParser {
            inner: cabocha.clone(),
            handle,
        }))
    }
}

/// MeCab tagger instance, destroyed on drop.
pub struct NativeTagger {
    inner: Arc<LoadedMecab>,
    handle: MecabHandle,
}

// A tagger may move between threads; `&mut self` on `parse` keeps it from
// being used by two at once.
unsafe impl Send for NativeTagger {}

impl Tagger for NativeTagger {
    fn parse(&mut self, input: &[u8]) -> Result<Vec<EngineNode>> {
        let api = &self.inner.api;
        let head = unsafe {
            (api.mecab_sparse_tonode2)(self.handle, input.as_ptr().cast::<c_char>(), input.len())
        };
        if head.is_null() {
            return Err(MozukuError::Engine(
                read_mecab_error(api, self.handle)
                    .unwrap_or_else(|| "mecab_sparse_tonode2 returned a null node".to_string()),
            ));
        }

        let mut nodes = Vec::new();
        let mut cursor = head;
        while !cursor.is_null() {
            let raw = unsafe { &*cursor };
            let stat = NodeStat::from_raw(raw.stat);
            let surface = if stat.is_boundary() {
                Vec::new()
            } else {
                unsafe { copy_bytes(raw.surface, usize::from(raw.length)) }
            };
            nodes.push(EngineNode {
                surface,
                feature: unsafe { cstr_to_bytes(raw.feature) },
                stat,
            });
            cursor = raw.next;
        }
        Ok(nodes)
    }
}

impl Drop for NativeTagger {
    fn drop(&mut self) {
        if self.handle.is_null() {
            return;
        }
        unsafe {
            (self.inner.api.mecab_destroy)(self.handle);
        }
        self.handle = ptr::null_mut();
    }
}

/// CaboCha parser instance, destroyed on drop.
pub struct NativeChunkParser {
    inner: Arc<LoadedCabocha>,
    handle: CabochaHandle,
}

unsafe impl Send for NativeChunkParser {}

impl ChunkParser for NativeChunkParser {
    fn parse_to_tree(&mut self, input: &[u8]) -> Result<Option<ChunkTree>> {
        let api = &self.inner.api;
        let tree = unsafe {
            (api.cabocha_sparse_totree2)(self.handle, input.as_ptr().cast::<c_char>(), input.len())
        };
        if tree.is_null() {
            if let Some(message) = read_cabocha_error(api, self.handle) {
                debug!("cabocha produced no tree: {message}");
            }
            return Ok(None);
        }

        // The tree is owned by the parser and overwritten by the next call,
        // so everything is copied out here.
        let chunk_size = unsafe { (api.cabocha_tree_chunk_size)(tree) };
        let mut chunks = Vec::with_capacity(chunk_size);
        for index in 0..chunk_size {
            let chunk = unsafe { (api.cabocha_tree_chunk)(tree, index) };
            if chunk.is_null() {
                continue;
            }
            let chunk = unsafe { &*chunk };
            chunks.push(TreeChunk {
                link: chunk.link,
                score: chunk.score,
                token_pos: chunk.token_pos,
                token_size: chunk.token_size,
            });
        }

        let token_size = unsafe { (api.cabocha_tree_token_size)(tree) };
        let mut tokens = Vec::with_capacity(token_size);
        for index in 0..token_size {
            let token = unsafe { (api.cabocha_tree_token)(tree, index) };
            if token.is_null() {
                tokens.push(None);
                continue;
            }
            let surface = unsafe { (*token).surface };
            if surface.is_null() {
                tokens.push(None);
            } else {
                tokens.push(Some(unsafe { cstr_to_bytes(surface) }));
            }
        }

        Ok(Some(ChunkTree { chunks, tokens }))
    }
}

impl Drop for NativeChunkParser {
    fn drop(&mut self) {
        if self.handle.is_null() {
            return;
        }
        unsafe {
            (self.inner.api.cabocha_destroy)(self.handle);
        }
        self.handle = ptr::null_mut();
    }
}
