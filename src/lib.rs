#![deny(missing_docs)]

//! Rust bindings for MeCab, loaded at runtime.
//!
//! The crate locates `libmecab` for the running platform, feeds it text one
//! line at a time and parses MeCab's default textual output into [`Token`]s.
//! No MeCab headers or link-time dependency are needed.
//!
//! ## Quick Start
//! ```no_run
//! use mecab_rs::Tokenizer;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tokenizer = Tokenizer::new()?;
//!     for piece in tokenizer.tokenize("すもももももももものうち")? {
//!         if let Some(token) = piece.as_token() {
//!             println!("{} {} {}", token.surface(), token.part_of_speech(), token.reading());
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Modes
//! - Full mode yields [`Piece::Token`] values with surface, part of speech,
//!   inflection, base form, reading and pronunciation.
//! - Wakati mode yields [`Piece::Surface`] values only. A tokenizer built
//!   with `wakati = true` always uses wakati mode, whatever a call asks for.
//! - Stream mode ([`Tokenizer::tokenize_stream`], or
//!   [`TokenizeOptions::stream`]) analyzes lazily, one input line per step.
//!
//! ```no_run
//! use mecab_rs::{TokenizeOptions, Tokenizer, TokenizerConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TokenizerConfig::default()
//!         .with_library_path("/usr/lib/x86_64-linux-gnu/libmecab.so.2")
//!         .with_encoding("euc-jp");
//!     let tokenizer = Tokenizer::from_config(config)?;
//!     let options = TokenizeOptions::default().with_stream(true);
//!     for piece in tokenizer.tokenize_with("一行目\n二行目", options)?.into_vec()? {
//!         println!("{piece}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//! - `MECAB_LIBRARY_PATH`: explicit dynamic library path.

mod config;
mod constants;
mod discovery;
mod error;
mod handle;
mod lines;
mod model;
mod native;
mod parser;
mod runtime;
mod types;

pub use constants::{
    DEFAULT_ENCODING, EOS, FEATURE_PLACEHOLDER, LIBRARY_PATH_ENV, MIN_FEATURES,
};
pub use discovery::{runtime_platform, supported_platforms};
pub use error::{MecabError, Result};
pub use model::{Piece, Token};
pub use runtime::{TokenStream, Tokenized, Tokenizer};
pub use types::{TokenizeOptions, TokenizerConfig};

#[cfg(test)]
mod test_support;
