use std::env;
use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_ENCODING, LIBRARY_PATH_ENV};

/// Construction-time settings for [`crate::Tokenizer`].
#[derive(Debug, Clone)]
pub struct TokenizerConfig {
    /// Explicit library name or path. `None` uses the platform default.
    pub library_path: Option<PathBuf>,
    /// Encoding label of the MeCab dictionary (`utf8`, `euc-jp`, `shift_jis`, ...).
    pub encoding: String,
    /// Force wakati output for every call on this tokenizer.
    pub wakati: bool,
    /// Platform string to gate on. `None` uses [`crate::runtime_platform`].
    pub platform: Option<String>,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            library_path: env::var_os(LIBRARY_PATH_ENV).map(PathBuf::from),
            encoding: DEFAULT_ENCODING.to_string(),
            wakati: false,
            platform: None,
        }
    }
}

impl TokenizerConfig {
    /// Sets an explicit library name or path.
    pub fn with_library_path(mut self, library_path: impl AsRef<Path>) -> Self {
        self.library_path = Some(library_path.as_ref().to_path_buf());
        self
    }

    /// Sets the dictionary encoding label.
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    /// Sets the default wakati mode.
    pub fn with_wakati(mut self, wakati: bool) -> Self {
        self.wakati = wakati;
        self
    }

    /// Overrides the detected platform string.
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }
}

/// Per-call settings for [`crate::Tokenizer::tokenize_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenizeOptions {
    /// Return a lazy [`crate::TokenStream`] instead of a collected list.
    pub stream: bool,
    /// Request surface-only output. Ignored (always on) when the tokenizer
    /// was built with `wakati = true`.
    pub wakati: bool,
}

impl TokenizeOptions {
    /// Sets stream mode.
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Requests wakati mode for this call.
    pub fn with_wakati(mut self, wakati: bool) -> Self {
        self.wakati = wakati;
        self
    }
}
