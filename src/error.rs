use thiserror::Error;

/// Error type returned by mecab-rs public APIs.
#[derive(Debug, Error)]
pub enum MecabError {
    /// The runtime platform matched no entry of the supported platform table.
    #[error("unsupported platform: got {platform}, supported platforms are {}", .supported.join(", "))]
    UnsupportedPlatform {
        /// Platform string detected (or overridden) at construction.
        platform: String,
        /// Names of the supported platforms.
        supported: Vec<String>,
    },
    /// Dynamic library could not be loaded.
    #[error("failed to load library: {0}")]
    LibraryLoad(String),
    /// Required symbol could not be resolved from the library.
    #[error("failed to load symbol: {0}")]
    SymbolLoad(String),
    /// Rust string contained an interior `NUL` byte for C interop.
    #[error("string contains NUL byte: {0}")]
    NulByte(#[from] std::ffi::NulError),
    /// User-provided arguments were invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The engine refused to create a tagger handle.
    #[error("failed to create mecab handle: {0}")]
    EngineHandle(String),
    /// The engine returned no output for a line.
    #[error("mecab analysis failed: {0}")]
    Analyze(String),
    /// Input text is not representable in the configured encoding.
    #[error("text cannot be encoded as {encoding}")]
    Encode {
        /// Name of the configured encoding.
        encoding: &'static str,
    },
    /// An engine output line violates the `SURFACE\tF0,...,F6[,F7,F8]` grammar.
    #[error("malformed mecab output line {line:?}: expected at least 7 features, found {fields}")]
    MalformedOutput {
        /// The offending line, lossily decoded.
        line: String,
        /// Number of features found after the tab (0 when there is no tab).
        fields: usize,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MecabError>;
