use std::fmt;

use encoding_rs::Encoding;
use once_cell::unsync::OnceCell;

use crate::constants::{
    FEATURE_BASE_FORM, FEATURE_INFL_FORM, FEATURE_INFL_TYPE, FEATURE_PHONETIC,
    FEATURE_PLACEHOLDER, FEATURE_POS_END, FEATURE_READING, FEATURE_SEPARATOR, SURFACE_SEPARATOR,
};

/// One morphologically analyzed unit, built from a line of MeCab output.
///
/// The raw line is kept undecoded; `surface` and `features` are decoded on
/// first access and cached.
///
/// A `Token` always has at least seven features, so the accessors for
/// part-of-speech through base form never fail. `reading` and `phonetic`
/// fall back to `*` when the dictionary entry omits them, as MeCab does for
/// unknown words and some symbols.
#[derive(Clone)]
pub struct Token {
    raw_line: Vec<u8>,
    encoding: &'static Encoding,
    surface: OnceCell<String>,
    features: OnceCell<Vec<String>>,
}

impl Token {
    /// Caller guarantees a tab and at least seven features.
    pub(crate) fn new(raw_line: Vec<u8>, encoding: &'static Encoding) -> Self {
        Self {
            raw_line,
            encoding,
            surface: OnceCell::new(),
            features: OnceCell::new(),
        }
    }

    fn split(&self) -> (&[u8], &[u8]) {
        match self.raw_line.iter().position(|&b| b == SURFACE_SEPARATOR) {
            Some(tab) => (&self.raw_line[..tab], &self.raw_line[tab + 1..]),
            None => (&self.raw_line[..], &[]),
        }
    }

    fn decode(&self, bytes: &[u8]) -> String {
        self.encoding.decode_without_bom_handling(bytes).0.into_owned()
    }

    /// Undecoded engine output for this token.
    pub fn raw_line(&self) -> &[u8] {
        &self.raw_line
    }

    /// Encoding used to decode [`Self::raw_line`].
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Surface form (表層形): the text before the tab.
    pub fn surface(&self) -> &str {
        self.surface.get_or_init(|| self.decode(self.split().0))
    }

    /// All features after the tab, split on every comma.
    ///
    /// Empty fields are kept as empty strings.
    pub fn features(&self) -> &[String] {
        self.features.get_or_init(|| {
            self.split()
                .1
                .split(|&b| b == FEATURE_SEPARATOR)
                .map(|field| self.decode(field))
                .collect()
        })
    }

    fn feature(&self, index: usize) -> &str {
        self.features()
            .get(index)
            .map_or(FEATURE_PLACEHOLDER, String::as_str)
    }

    /// Part of speech (品詞): the first four features joined by commas.
    pub fn part_of_speech(&self) -> String {
        self.features()[..FEATURE_POS_END].join(",")
    }

    /// Inflection type (活用型).
    pub fn infl_type(&self) -> &str {
        self.feature(FEATURE_INFL_TYPE)
    }

    /// Inflection form (活用形).
    pub fn infl_form(&self) -> &str {
        self.feature(FEATURE_INFL_FORM)
    }

    /// Base form (基本形).
    pub fn base_form(&self) -> &str {
        self.feature(FEATURE_BASE_FORM)
    }

    /// Reading (読み), `*` when absent.
    pub fn reading(&self) -> &str {
        self.feature(FEATURE_READING)
    }

    /// Pronunciation (発音), `*` when absent.
    pub fn phonetic(&self) -> &str {
        self.feature(FEATURE_PHONETIC)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{},{},{},{},{},{}",
            self.surface(),
            self.part_of_speech(),
            self.infl_type(),
            self.infl_form(),
            self.base_form(),
            self.reading(),
            self.phonetic()
        )
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("raw_line", &self.decode(&self.raw_line))
            .field("encoding", &self.encoding.name())
            .finish()
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.raw_line == other.raw_line && self.encoding == other.encoding
    }
}

impl Eq for Token {}

/// One item of a tokenization result.
///
/// Full mode yields [`Piece::Token`]; wakati mode yields [`Piece::Surface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    /// A fully analyzed token.
    Token(Token),
    /// Surface form only (wakati mode).
    Surface(String),
}

impl Piece {
    /// Surface form in either mode.
    pub fn surface(&self) -> &str {
        match self {
            Piece::Token(token) => token.surface(),
            Piece::Surface(surface) => surface,
        }
    }

    /// The token, when produced in full mode.
    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Piece::Token(token) => Some(token),
            Piece::Surface(_) => None,
        }
    }

    /// Consumes the piece, returning the token in full mode.
    pub fn into_token(self) -> Option<Token> {
        match self {
            Piece::Token(token) => Some(token),
            Piece::Surface(_) => None,
        }
    }

    /// Whether this piece came from wakati mode.
    pub fn is_surface(&self) -> bool {
        matches!(self, Piece::Surface(_))
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Piece::Token(token) => token.fmt(f),
            Piece::Surface(surface) => f.write_str(surface),
        }
    }
}
