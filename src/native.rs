use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int, c_void};
use std::path::Path;
use std::ptr;

use crate::config::{
    CabochaChunkRaw, CabochaHandle, CabochaTokenRaw, CabochaTreeHandle, MecabHandle, MecabNodeRaw,
};
use crate::error::{MozukuError, Result};

type FnMecabNew2 = unsafe extern "C" fn(*const c_char) -> MecabHandle;
type FnMecabStrerror = unsafe extern "C" fn(MecabHandle) -> *const c_char;
type FnMecabDestroy = unsafe extern "C" fn(MecabHandle);
type FnMecabSparseToNode2 =
    unsafe extern "C" fn(MecabHandle, *const c_char, usize) -> *const MecabNodeRaw;
type FnMecabVersion = unsafe extern "C" fn() -> *const c_char;

type FnCabochaNew2 = unsafe extern "C" fn(*const c_char) -> CabochaHandle;
type FnCabochaStrerror = unsafe extern "C" fn(CabochaHandle) -> *const c_char;
type FnCabochaDestroy = unsafe extern "C" fn(CabochaHandle);
type FnCabochaSparseToTree2 =
    unsafe extern "C" fn(CabochaHandle, *const c_char, usize) -> CabochaTreeHandle;
type FnCabochaTreeChunkSize = unsafe extern "C" fn(CabochaTreeHandle) -> usize;
type FnCabochaTreeTokenSize = unsafe extern "C" fn(CabochaTreeHandle) -> usize;
type FnCabochaTreeChunk = unsafe extern "C" fn(CabochaTreeHandle, usize) -> *const CabochaChunkRaw;
type FnCabochaTreeToken = unsafe extern "C" fn(CabochaTreeHandle, usize) -> *const CabochaTokenRaw;

#[derive(Clone, Copy)]
pub(crate) struct MecabApi {
    pub(crate) mecab_new2: FnMecabNew2,
    pub(crate) mecab_strerror: FnMecabStrerror,
    pub(crate) mecab_destroy: FnMecabDestroy,
    pub(crate) mecab_sparse_tonode2: FnMecabSparseToNode2,
    pub(crate) mecab_version: Option<FnMecabVersion>,
}

impl MecabApi {
    pub(crate) unsafe fn load(library: &DynamicLibrary) -> Result<Self> {
        Ok(Self {
            mecab_new2: library.load_symbol("mecab_new2")?,
            mecab_strerror: library.load_symbol("mecab_strerror")?,
            mecab_destroy: library.load_symbol("mecab_destroy")?,
            mecab_sparse_tonode2: library.load_symbol("mecab_sparse_tonode2")?,
            mecab_version: library.load_symbol_optional("mecab_version")?,
        })
    }
}

#[derive(Clone, Copy)]
pub(crate) struct CabochaApi {
    pub(crate) cabocha_new2: FnCabochaNew2,
    pub(crate) cabocha_strerror: FnCabochaStrerror,
    pub(crate) cabocha_destroy: FnCabochaDestroy,
    pub(crate) cabocha_sparse_totree2: FnCabochaSparseToTree2,
    pub(crate) cabocha_tree_chunk_size: FnCabochaTreeChunkSize,
    pub(crate) cabocha_tree_token_size: FnCabochaTreeTokenSize,
    pub(crate) cabocha_tree_chunk: FnCabochaTreeChunk,
    pub(crate) cabocha_tree_token: FnCabochaTreeToken,
}

impl CabochaApi {
    pub(crate) unsafe fn load(library: &DynamicLibrary) -> Result<Self> {
        Ok(Self {
            cabocha_new2: library.load_symbol("cabocha_new2")?,
            cabocha_strerror: library.load_symbol("cabocha_strerror")?,
            cabocha_destroy: library.load_symbol("cabocha_destroy")?,
            cabocha_sparse_totree2: library.load_symbol("cabocha_sparse_totree2")?,
            cabocha_tree_chunk_size: library.load_symbol("cabocha_tree_chunk_size")?,
            cabocha_tree_token_size: library.load_symbol("cabocha_tree_token_size")?,
            cabocha_tree_chunk: library.load_symbol("cabocha_tree_chunk")?,
            cabocha_tree_token: library.load_symbol("cabocha_tree_token")?,
        })
    }
}

pub(crate) struct LoadedMecab {
    pub(crate) _library: DynamicLibrary,
    pub(crate) api: MecabApi,
}

pub(crate) struct LoadedCabocha {
    pub(crate) _library: DynamicLibrary,
    pub(crate) api: CabochaApi,
}

#[derive(Debug)]
pub(crate) struct DynamicLibrary {
    handle: *mut c_void,
}

impl DynamicLibrary {
    pub(crate) fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_string = path.as_ref().to_string_lossy().to_string();
        let path_c = CString::new(path_string.clone())?;
        let handle = unsafe { platform_open(path_c.as_ptr()) };
        if handle.is_null() {
            return Err(MozukuError::LibraryLoad(format!(
                "{} ({})",
                path_string,
                platform_last_error()
            )));
        }
        Ok(Self { handle })
    }

    pub(crate) unsafe fn load_symbol<T: Copy>(&self, symbol_name: &str) -> Result<T> {
        let symbol_c = CString::new(symbol_name)?;
        let symbol_ptr = platform_symbol(self.handle, symbol_c.as_ptr());
        if symbol_ptr.is_null() {
            return Err(MozukuError::SymbolLoad(format!(
                "{} ({})",
                symbol_name,
                platform_last_error()
            )));
        }
        Ok(std::mem::transmute_copy::<*mut c_void, T>(&symbol_ptr))
    }

    pub(crate) unsafe fn load_symbol_optional<T: Copy>(
        &self,
        symbol_name: &str,
    ) -> Result<Option<T>> {
        let symbol_c = CString::new(symbol_name)?;
        let symbol_ptr = platform_symbol(self.handle, symbol_c.as_ptr());
        if symbol_ptr.is_null() {
            return Ok(None);
        }
        Ok(Some(std::mem::transmute_copy::<*mut c_void, T>(
            &symbol_ptr,
        )))
    }
}

impl Drop for DynamicLibrary {
    fn drop(&mut self) {
        if self.handle.is_null() {
            return;
        }
        unsafe {
            platform_close(self.handle);
        }
        self.handle = ptr::null_mut();
    }
}

// The handle is an opaque loader token; dlopen/LoadLibrary handles may be
// used and closed from any thread.
unsafe impl Send for DynamicLibrary {}
unsafe impl Sync for DynamicLibrary {}

/// Reads MeCab's error message. A null tagger reads the global
/// construction error.
pub(crate) fn read_mecab_error(api: &MecabApi, handle: MecabHandle) -> Option<String> {
    let message_ptr = unsafe { (api.mecab_strerror)(handle) };
    non_empty_message(message_ptr)
}

pub(crate) fn read_cabocha_error(api: &CabochaApi, handle: CabochaHandle) -> Option<String> {
    let message_ptr = unsafe { (api.cabocha_strerror)(handle) };
    non_empty_message(message_ptr)
}

fn non_empty_message(message_ptr: *const c_char) -> Option<String> {
    if message_ptr.is_null() {
        return None;
    }
    let message = unsafe { CStr::from_ptr(message_ptr) }
        .to_string_lossy()
        .trim()
        .to_string();
    if message.is_empty() {
        None
    } else {
        Some(message)
    }
}

/// Copies `length` bytes starting at `pointer`.
///
/// MeCab surfaces are not NUL-terminated; they point into the input buffer.
pub(crate) unsafe fn copy_bytes(pointer: *const c_char, length: usize) -> Vec<u8> {
    if pointer.is_null() || length == 0 {
        return Vec::new();
    }
    std::slice::from_raw_parts(pointer.cast::<u8>(), length).to_vec()
}

/// Copies a NUL-terminated C string as raw bytes, without assuming UTF-8.
pub(crate) unsafe fn cstr_to_bytes(pointer: *const c_char) -> Vec<u8> {
    if pointer.is_null() {
        return Vec::new();
    }
    CStr::from_ptr(pointer).to_bytes().to_vec()
}

pub(crate) fn cstr_to_string(pointer: *const c_char) -> String {
    if pointer.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(pointer) }
        .to_string_lossy()
        .to_string()
}

#[cfg(target_os = "windows")]
#[link(name = "kernel32")]
extern "system" {
    fn LoadLibraryA(lp_lib_file_name: *const c_char) -> *mut c_void;
    fn GetProcAddress(h_module: *mut c_void, lp_proc_name: *const c_char) -> *mut c_void;
    fn FreeLibrary(h_lib_module: *mut c_void) -> i32;
    fn GetLastError() -> u32;
}

#[cfg(target_os = "windows")]
unsafe fn platform_open(path: *const c_char) -> *mut c_void {
    LoadLibraryA(path)
}

#[cfg(target_os = "windows")]
unsafe fn platform_symbol(handle: *mut c_void, symbol: *const c_char) -> *mut c_void {
    GetProcAddress(handle, symbol)
}

#[cfg(target_os = "windows")]
unsafe fn platform_close(handle: *mut c_void) {
    let _ = FreeLibrary(handle);
}

#[cfg(target_os = "windows")]
fn platform_last_error() -> String {
    format!("GetLastError={}", unsafe { GetLastError() })
}

#[cfg(target_os = "linux")]
#[link(name = "dl")]
extern "C" {
    fn dlopen(filename: *const c_char, flags: c_int) -> *mut c_void;
    fn dlsym(handle: *mut c_void, symbol: *const c_char) -> *mut c_void;
    fn dlclose(handle: *mut c_void) -> c_int;
    fn dlerror() -> *const c_char;
}

#[cfg(target_os = "macos")]
extern "C" {
    fn dlopen(filename: *const c_char, flags: c_int) -> *mut c_void;
    fn dlsym(handle: *mut c_void, symbol: *const c_char) -> *mut c_void;
    fn dlclose(handle: *mut c_void) -> c_int;
    fn dlerror() -> *const c_char;
}

#[cfg(unix)]
unsafe fn platform_open(path: *const c_char) -> *mut c_void {
    const RTLD_NOW: c_int = 2;
    const RTLD_LOCAL: c_int = 0;
    dlopen(path, RTLD_NOW | RTLD_LOCAL)
}

#[cfg(unix)]
unsafe fn platform_symbol(handle: *mut c_void, symbol: *const c_char) -> *mut c_void {
    dlsym(handle, symbol)
}

#[cfg(unix)]
unsafe fn platform_close(handle: *mut c_void) {
    let _ = dlclose(handle);
}

#[cfg(unix)]
fn platform_last_error() -> String {
    let pointer = unsafe { dlerror() };
    if pointer.is_null() {
        "unknown error".to_string()
    } else {
        let full = unsafe { CStr::from_ptr(pointer) }
            .to_string_lossy()
            .to_string();
        full.split(": tried:").next().unwrap_or(&full).to_string()
    }
}
