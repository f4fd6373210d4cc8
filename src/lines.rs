//! Encoding input text and splitting byte buffers into lines.

use std::borrow::Cow;

use encoding_rs::Encoding;

use crate::error::{MecabError, Result};

/// Encodes `text` in `encoding`, failing on unmappable characters.
pub(crate) fn encode_text<'a>(text: &'a str, encoding: &'static Encoding) -> Result<Cow<'a, [u8]>> {
    let (bytes, _, had_errors) = encoding.encode(text);
    if had_errors {
        return Err(MecabError::Encode {
            encoding: encoding.name(),
        });
    }
    Ok(bytes)
}

/// Iterator over the lines of a byte buffer.
///
/// `\n`, `\r` and `\r\n` all end a line. Interior empty lines are kept; a
/// trailing terminator does not produce a final empty line, and an empty
/// buffer yields nothing.
#[derive(Debug, Clone)]
pub(crate) struct Lines<'a> {
    rest: &'a [u8],
}

pub(crate) fn split_lines(bytes: &[u8]) -> Lines<'_> {
    Lines { rest: bytes }
}

impl<'a> Iterator for Lines<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        match self.rest.iter().position(|&b| b == b'\n' || b == b'\r') {
            Some(end) => {
                let line = &self.rest[..end];
                let skip = if self.rest[end] == b'\r' && self.rest.get(end + 1) == Some(&b'\n') {
                    2
                } else {
                    1
                };
                self.rest = &self.rest[end + skip..];
                Some(line)
            }
            None => {
                let line = self.rest;
                self.rest = &[];
                Some(line)
            }
        }
    }
}

/// Owning cursor over the lines of an encoded input.
///
/// Used by streams that must outlive the borrowed input text.
#[derive(Debug)]
pub(crate) struct OwnedLines {
    bytes: Vec<u8>,
    offset: usize,
}

impl OwnedLines {
    pub(crate) fn new(bytes: Vec<u8>) -> Self {
        Self { bytes, offset: 0 }
    }

    pub(crate) fn next_line(&mut self) -> Option<&[u8]> {
        let rest = &self.bytes[self.offset..];
        let mut lines = split_lines(rest);
        let line = lines.next()?;
        self.offset = self.bytes.len() - lines.rest.len();
        Some(line)
    }
}
