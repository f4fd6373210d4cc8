use std::collections::VecDeque;
use std::fmt;
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use log::{debug, trace, warn};

use crate::discovery::{find_platform, library_candidates, runtime_platform};
use crate::error::{MecabError, Result};
use crate::handle::{with_tagger, Tagger};
use crate::lines::{encode_text, split_lines, OwnedLines};
use crate::model::Piece;
use crate::native::{Engine, LoadedLibrary};
use crate::parser::parse_output;
use crate::types::{TokenizeOptions, TokenizerConfig};

/// MeCab-backed tokenizer.
///
/// Owns the loaded library for its whole lifetime. Engine handles are not
/// kept between calls: every tokenize call creates its own handle and
/// destroys it before returning (or, for streams, when the stream ends).
///
/// # Examples
/// ```no_run
/// use mecab_rs::Tokenizer;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let tokenizer = Tokenizer::new()?;
/// for piece in tokenizer.tokenize("すもももももももものうち")? {
///     println!("{piece}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct Tokenizer {
    engine: Box<dyn Engine>,
    library_path: PathBuf,
    platform: String,
    encoding: &'static Encoding,
    wakati: bool,
}

impl Tokenizer {
    /// Loads MeCab with [`TokenizerConfig::default`].
    pub fn new() -> Result<Self> {
        Self::from_config(TokenizerConfig::default())
    }

    /// Loads MeCab with explicit settings.
    ///
    /// Fails with [`MecabError::UnsupportedPlatform`] before touching any
    /// library when the platform is not in the supported table.
    pub fn from_config(config: TokenizerConfig) -> Result<Self> {
        Self::from_config_with_loader(config, |path| {
            LoadedLibrary::open(path).map(|library| Box::new(library) as Box<dyn Engine>)
        })
    }

    pub(crate) fn from_config_with_loader(
        config: TokenizerConfig,
        mut loader: impl FnMut(&Path) -> Result<Box<dyn Engine>>,
    ) -> Result<Self> {
        let platform = config.platform.unwrap_or_else(runtime_platform);
        let entry = find_platform(&platform)?;
        let encoding = resolve_encoding(&config.encoding)?;

        let candidates = library_candidates(entry, config.library_path.as_deref());
        let mut errors = Vec::new();
        for candidate in &candidates {
            debug!("loading mecab from {} ({})", candidate.display(), entry.name);
            match loader(candidate) {
                Ok(engine) => {
                    return Ok(Self {
                        engine,
                        library_path: candidate.clone(),
                        platform,
                        encoding,
                        wakati: config.wakati,
                    });
                }
                Err(error) => {
                    warn!("could not load {}: {error}", candidate.display());
                    errors.push((candidate, error));
                }
            }
        }

        if errors.len() == 1 {
            if let Some((_, error)) = errors.pop() {
                return Err(error);
            }
        }
        Err(MecabError::LibraryLoad(format!(
            "set {} to the libmecab path. tried: {}",
            crate::constants::LIBRARY_PATH_ENV,
            errors
                .iter()
                .map(|(candidate, error)| format!("{}: {error}", candidate.display()))
                .collect::<Vec<_>>()
                .join(" | ")
        )))
    }

    /// Library name or path that was loaded.
    pub fn library_path(&self) -> &Path {
        &self.library_path
    }

    /// Platform string the tokenizer was gated on.
    pub fn platform(&self) -> &str {
        &self.platform
    }

    /// Encoding used for input text and engine output.
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Whether wakati mode is forced for every call.
    pub fn wakati(&self) -> bool {
        self.wakati
    }

    /// Version reported by the loaded library, if it exports `mecab_version`.
    pub fn engine_version(&self) -> Option<String> {
        self.engine.version()
    }

    /// Tokenizes `text` eagerly in the tokenizer's default mode.
    pub fn tokenize(&self, text: &str) -> Result<Vec<Piece>> {
        self.collect(text, self.wakati)
    }

    /// Tokenizes `text` eagerly, returning surface forms only.
    pub fn tokenize_wakati(&self, text: &str) -> Result<Vec<String>> {
        Ok(self
            .collect(text, true)?
            .into_iter()
            .map(|piece| match piece {
                Piece::Surface(surface) => surface,
                Piece::Token(token) => token.surface().to_string(),
            })
            .collect())
    }

    /// Tokenizes `text` lazily in the tokenizer's default mode.
    pub fn tokenize_stream(&self, text: &str) -> Result<TokenStream<'_>> {
        self.stream(text, self.wakati)
    }

    /// Tokenizes `text` with per-call options.
    ///
    /// A tokenizer built with `wakati = true` produces surfaces even when
    /// `options.wakati` is false; the construction-time setting wins.
    pub fn tokenize_with(&self, text: &str, options: TokenizeOptions) -> Result<Tokenized<'_>> {
        let wakati = self.wakati || options.wakati;
        if options.stream {
            Ok(Tokenized::Streaming(self.stream(text, wakati)?))
        } else {
            Ok(Tokenized::Collected(self.collect(text, wakati)?))
        }
    }

    fn collect(&self, text: &str, wakati: bool) -> Result<Vec<Piece>> {
        let bytes = encode_text(text, self.encoding)?;
        with_tagger(self.engine.as_ref(), |tagger| {
            let mut pieces = Vec::new();
            for line in split_lines(&bytes) {
                trace!("analyzing line of {} bytes", line.len());
                let output = tagger.analyze(line)?;
                parse_output(&output, self.encoding, wakati, &mut pieces)?;
            }
            Ok(pieces)
        })
    }

    fn stream(&self, text: &str, wakati: bool) -> Result<TokenStream<'_>> {
        let bytes = encode_text(text, self.encoding)?.into_owned();
        let tagger = Tagger::acquire(self.engine.as_ref())?;
        Ok(TokenStream {
            tagger: Some(tagger),
            lines: OwnedLines::new(bytes),
            pending: VecDeque::new(),
            encoding: self.encoding,
            wakati,
        })
    }
}

impl fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tokenizer")
            .field("library_path", &self.library_path)
            .field("platform", &self.platform)
            .field("encoding", &self.encoding.name())
            .field("wakati", &self.wakati)
            .finish()
    }
}

fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    let encoding = Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
        MecabError::InvalidArgument(format!("unknown encoding label: {label}"))
    })?;
    // Separators are matched on raw bytes, so the encoding must keep ASCII
    // bytes out of multibyte sequences. This excludes UTF-16 and ISO-2022-JP.
    if encoding.output_encoding() != encoding || !encoding.is_ascii_compatible() {
        return Err(MecabError::InvalidArgument(format!(
            "encoding {} cannot be used to feed mecab",
            encoding.name()
        )));
    }
    Ok(encoding)
}

/// Result of [`Tokenizer::tokenize_with`].
#[derive(Debug)]
pub enum Tokenized<'t> {
    /// Eager mode: every piece, with the engine handle already released.
    Collected(Vec<Piece>),
    /// Stream mode: pieces produced line by line.
    Streaming(TokenStream<'t>),
}

impl Tokenized<'_> {
    /// Whether the result is a lazy stream.
    pub fn is_streaming(&self) -> bool {
        matches!(self, Tokenized::Streaming(_))
    }

    /// Collects the pieces, draining the stream if needed.
    pub fn into_vec(self) -> Result<Vec<Piece>> {
        match self {
            Tokenized::Collected(pieces) => Ok(pieces),
            Tokenized::Streaming(stream) => stream.collect(),
        }
    }
}

/// Lazy, single-pass sequence of pieces.
///
/// The stream owns one engine handle. It is released when the input is
/// exhausted, after the first error (the stream then yields nothing more),
/// on [`TokenStream::close`], or when the stream is dropped.
pub struct TokenStream<'t> {
    tagger: Option<Tagger<'t>>,
    lines: OwnedLines,
    pending: VecDeque<Piece>,
    encoding: &'static Encoding,
    wakati: bool,
}

impl TokenStream<'_> {
    /// Releases the engine handle now. Later calls to `next` return `None`.
    pub fn close(&mut self) {
        self.pending.clear();
        self.tagger = None;
    }

    /// Whether the engine handle has been released.
    pub fn is_closed(&self) -> bool {
        self.tagger.is_none()
    }
}

impl Iterator for TokenStream<'_> {
    type Item = Result<Piece>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(piece) = self.pending.pop_front() {
                return Some(Ok(piece));
            }
            let tagger = self.tagger.as_ref()?;
            let outcome = match self.lines.next_line() {
                Some(line) => tagger
                    .analyze(line)
                    .and_then(|output| {
                        parse_output(&output, self.encoding, self.wakati, &mut self.pending)
                    })
                    .map(|()| true),
                None => Ok(false),
            };
            match outcome {
                Ok(true) => continue,
                Ok(false) => {
                    self.close();
                    return None;
                }
                Err(error) => {
                    self.close();
                    return Some(Err(error));
                }
            }
        }
    }
}

impl FusedIterator for TokenStream<'_> {}

impl fmt::Debug for TokenStream<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStream")
            .field("closed", &self.is_closed())
            .field("pending", &self.pending.len())
            .field("encoding", &self.encoding.name())
            .field("wakati", &self.wakati)
            .finish()
    }
}

#[cfg(test)]
mod runtime_tests {
    use super::resolve_encoding;
    use crate::error::MecabError;

    #[test]
    fn default_label_is_utf8() {
        let encoding = resolve_encoding("utf8").expect("utf8 is a known label");
        assert_eq!(encoding, encoding_rs::UTF_8);
    }

    #[test]
    fn japanese_dictionary_encodings_resolve() {
        assert_eq!(resolve_encoding("euc-jp").ok(), Some(encoding_rs::EUC_JP));
        assert_eq!(resolve_encoding("shift_jis").ok(), Some(encoding_rs::SHIFT_JIS));
        assert_eq!(resolve_encoding(" UTF-8 ").ok(), Some(encoding_rs::UTF_8));
    }

    #[test]
    fn unknown_label_is_rejected() {
        assert!(matches!(
            resolve_encoding("klingon"),
            Err(MecabError::InvalidArgument(_))
        ));
    }

    #[test]
    fn stateful_iso_2022_jp_is_rejected() {
        assert!(matches!(
            resolve_encoding("iso-2022-jp"),
            Err(MecabError::InvalidArgument(_))
        ));
    }

    #[test]
    fn utf16_is_rejected() {
        assert!(matches!(
            resolve_encoding("utf-16le"),
            Err(MecabError::InvalidArgument(_))
        ));
    }
}
