//! Constants shared by the binding, the parser and the tokenizer.

/// Line the engine emits after the tokens of one input line.
pub const EOS: &[u8] = b"EOS";
/// Placeholder used by the engine (and by this crate) for empty features.
pub const FEATURE_PLACEHOLDER: &str = "*";
/// Minimum feature count for a well-formed full-mode line.
pub const MIN_FEATURES: usize = 7;
/// Default text encoding label.
pub const DEFAULT_ENCODING: &str = "utf8";
/// Environment variable holding an explicit library path.
pub const LIBRARY_PATH_ENV: &str = "MECAB_LIBRARY_PATH";

/// Argument string handed to `mecab_new2`: default analysis mode.
pub(crate) const ENGINE_ARGS: &[u8] = b"mecab\0";

pub(crate) const FEATURE_SEPARATOR: u8 = b',';
pub(crate) const SURFACE_SEPARATOR: u8 = b'\t';

pub(crate) const FEATURE_POS_END: usize = 4;
pub(crate) const FEATURE_INFL_TYPE: usize = 4;
pub(crate) const FEATURE_INFL_FORM: usize = 5;
pub(crate) const FEATURE_BASE_FORM: usize = 6;
pub(crate) const FEATURE_READING: usize = 7;
pub(crate) const FEATURE_PHONETIC: usize = 8;
