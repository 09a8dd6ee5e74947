use thiserror::Error;

/// Error type returned by mozuku-rs construction APIs.
///
/// Per-text analysis never returns this type; it degrades to empty or
/// partial results instead.
#[derive(Debug, Error)]
pub enum MozukuError {
    /// Dynamic library could not be loaded.
    #[error("failed to load library: {0}")]
    LibraryLoad(String),
    /// Required symbol could not be resolved from the library.
    #[error("failed to load symbol: {0}")]
    SymbolLoad(String),
    /// Rust string contained an interior `NUL` byte for C interop.
    #[error("string contains NUL byte: {0}")]
    NulByte(#[from] std::ffi::NulError),
    /// An optional engine or tool is not installed or was disabled.
    #[error("unavailable: {0}")]
    Unavailable(String),
    /// The engine refused to construct an instance.
    #[error("engine construction failed: {0}")]
    ConstructionFailed(String),
    /// Error reported by an engine while processing input.
    #[error("engine error: {0}")]
    Engine(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MozukuError>;
