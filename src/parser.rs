//! Turning one block of MeCab output into pieces.

use encoding_rs::Encoding;

use crate::constants::{EOS, FEATURE_SEPARATOR, MIN_FEATURES, SURFACE_SEPARATOR};
use crate::error::{MecabError, Result};
use crate::lines::split_lines;
use crate::model::{Piece, Token};

/// Parses the output of one `analyze` call, appending pieces to `out`.
///
/// `EOS` lines are dropped. On error, `out` keeps the pieces parsed before
/// the offending line.
pub(crate) fn parse_output(
    output: &[u8],
    encoding: &'static Encoding,
    wakati: bool,
    out: &mut impl Extend<Piece>,
) -> Result<()> {
    for line in split_lines(output) {
        if line == EOS {
            continue;
        }
        out.extend(Some(parse_line(line, encoding, wakati)?));
    }
    Ok(())
}

fn parse_line(line: &[u8], encoding: &'static Encoding, wakati: bool) -> Result<Piece> {
    if wakati {
        let surface = match line.iter().position(|&b| b == SURFACE_SEPARATOR) {
            Some(tab) => &line[..tab],
            None => line,
        };
        let (surface, _) = encoding.decode_without_bom_handling(surface);
        return Ok(Piece::Surface(surface.into_owned()));
    }
    check_feature_count(line, encoding)?;
    Ok(Piece::Token(Token::new(line.to_vec(), encoding)))
}

// Only ASCII-compatible encodings are accepted, so tab and comma never occur
// inside a multibyte sequence and the count is taken on raw bytes.
fn check_feature_count(line: &[u8], encoding: &'static Encoding) -> Result<()> {
    let fields = match line.iter().position(|&b| b == SURFACE_SEPARATOR) {
        Some(tab) => {
            line[tab + 1..]
                .iter()
                .filter(|&&b| b == FEATURE_SEPARATOR)
                .count()
                + 1
        }
        None => 0,
    };
    if fields < MIN_FEATURES {
        return Err(MecabError::MalformedOutput {
            line: encoding.decode_without_bom_handling(line).0.into_owned(),
            fields,
        });
    }
    Ok(())
}
