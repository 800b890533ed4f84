//! # Input Normalization
//!
//! Turns raw bytes into clean UTF-8 lines before any parsing happens.
//!
//! The canonical PSL encoding is plain UTF-8 with `\n` line endings, no BOM,
//! and no stray whitespace. Older Windows tooling mangles files in a few
//! predictable ways, so the normalizer accepts UTF-8, UTF-8 with BOM, and
//! UTF-16 in either byte order (with or without BOM), reports every
//! deviation, and hands the parser lines that are always clean.

use std::borrow::Cow;
use std::char::REPLACEMENT_CHARACTER;

use crate::parsing::errors::Error;
use crate::parsing::source::Source;

pub const BOM_UTF8: &[u8] = b"\xEF\xBB\xBF";
pub const BOM_UTF16_BE: &[u8] = b"\xFE\xFF";
pub const BOM_UTF16_LE: &[u8] = b"\xFF\xFE";

/// How many leading bytes [`guess_utf_variant`] looks at.
pub const GUESS_LIMIT: usize = 200;
/// Zero bytes to see before deciding anything.
const DECISION_THRESHOLD: usize = 20;
/// Zero bytes at even (or odd) offsets needed to call it UTF-16.
const UTF16_THRESHOLD: usize = 15;

/// Character encodings the normalizer can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Utf16Be,
    Utf16Le,
}

impl Encoding {
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Utf16Be => "UTF-16BE",
            Encoding::Utf16Le => "UTF-16LE",
        }
    }
}

/// Guesses the encoding of BOM-less input.
///
/// UTF-8 text never contains zero bytes unless it encodes U+0000, while
/// mostly-ASCII UTF-16 has a zero in every other byte. The position of the
/// zeros gives away the byte order. A handful of zeros is not enough to
/// decide: UTF-8 with a few U+0000 codepoints would decode as garbage
/// UTF-16, so wait for [`DECISION_THRESHOLD`] zeros and require a strong
/// even/odd bias before leaving UTF-8.
pub fn guess_utf_variant(bs: &[u8]) -> Encoding {
    let bs = &bs[..bs.len().min(GUESS_LIMIT)];

    let (mut even_zeros, mut odd_zeros) = (0usize, 0usize);
    for (i, _) in bs.iter().enumerate().filter(|(_, b)| **b == 0) {
        if i % 2 == 0 {
            even_zeros += 1;
        } else {
            odd_zeros += 1;
        }

        if even_zeros + odd_zeros < DECISION_THRESHOLD {
            continue;
        }
        return if even_zeros > UTF16_THRESHOLD {
            Encoding::Utf16Be
        } else if odd_zeros > UTF16_THRESHOLD {
            Encoding::Utf16Le
        } else {
            // Lots of zeros but no clear bias, UTF-8 gives the most
            // coherent errors.
            Encoding::Utf8
        };
    }

    Encoding::Utf8
}

/// Normalizes `bs` into sanitized UTF-8 lines.
///
/// Always returns usable lines. Every returned line is valid UTF-8 (invalid
/// sequences become U+FFFD) with no `\r` terminator and no leading or
/// trailing whitespace. The returned errors describe each deviation from
/// the canonical encoding.
pub fn normalize(bs: &[u8]) -> (Vec<String>, Vec<Error>) {
    let mut errs = Vec::new();

    let (payload, encoding) = if let Some(rest) = bs.strip_prefix(BOM_UTF8) {
        errs.push(Error::Utf8Bom);
        (rest, Encoding::Utf8)
    } else if let Some(rest) = bs.strip_prefix(BOM_UTF16_BE) {
        errs.push(Error::InvalidEncoding {
            encoding: Encoding::Utf16Be.name().to_string(),
        });
        (rest, Encoding::Utf16Be)
    } else if let Some(rest) = bs.strip_prefix(BOM_UTF16_LE) {
        errs.push(Error::InvalidEncoding {
            encoding: Encoding::Utf16Le.name().to_string(),
        });
        (rest, Encoding::Utf16Le)
    } else {
        let guess = guess_utf_variant(bs);
        if guess != Encoding::Utf8 {
            errs.push(Error::InvalidEncoding {
                encoding: format!("{} (guessed)", guess.name()),
            });
        }
        (bs, guess)
    };
    log::debug!("decoding {} bytes as {}", payload.len(), encoding.name());

    let decoded = decode(payload, encoding);
    if decoded.is_empty() {
        return (Vec::new(), errs);
    }

    let lines = decoded
        .split(|b| *b == b'\n')
        .enumerate()
        .map(|(i, raw)| sanitize_line(i, raw, &mut errs))
        .collect();
    (lines, errs)
}

/// Converts `bs` to UTF-8 bytes. UTF-8 input passes through untouched,
/// invalid sequences are dealt with per line.
///
/// UTF-16 decoding is lossy too: unpaired surrogates and a dangling odd
/// byte at the end both become U+FFFD, which the per-line checks report.
fn decode(bs: &[u8], encoding: Encoding) -> Cow<'_, [u8]> {
    let from_bytes: fn([u8; 2]) -> u16 = match encoding {
        Encoding::Utf8 => return Cow::Borrowed(bs),
        Encoding::Utf16Be => u16::from_be_bytes,
        Encoding::Utf16Le => u16::from_le_bytes,
    };

    let chunks = bs.chunks_exact(2);
    let dangling = !chunks.remainder().is_empty();
    let units = chunks.map(|pair| from_bytes([pair[0], pair[1]]));
    let mut text: String = char::decode_utf16(units)
        .map(|c| c.unwrap_or(REPLACEMENT_CHARACTER))
        .collect();
    if dangling {
        log::debug!("{} bytes is not a whole number of 16-bit code units", bs.len());
        text.push(REPLACEMENT_CHARACTER);
    }
    Cow::Owned(text.into_bytes())
}

/// Cleans up one raw line, recording what had to be fixed.
///
/// Diagnostics point at the line as it was before tidying, so they show the
/// problem they describe. The text is still the lossy UTF-8 decoding rather
/// than raw bytes: raw bytes rarely display well, and the replacement
/// character stands out enough to find the bad spot.
fn sanitize_line(idx: usize, raw: &[u8], errs: &mut Vec<Error>) -> String {
    let decoded = String::from_utf8_lossy(raw).into_owned();
    let before = || Source::single(decoded.clone(), idx);

    if decoded.contains(REPLACEMENT_CHARACTER) {
        errs.push(Error::InvalidUtf8 { line: before() });
    }

    let mut line = decoded.as_str();
    if let Some(stripped) = line.strip_suffix('\r') {
        line = stripped;
        errs.push(Error::DosNewline { line: before() });
    }
    let trimmed = line.trim_end();
    if trimmed.len() != line.len() {
        line = trimmed;
        errs.push(Error::TrailingWhitespace { line: before() });
    }
    let trimmed = line.trim_start();
    if trimmed.len() != line.len() {
        line = trimmed;
        errs.push(Error::LeadingWhitespace { line: before() });
    }

    line.to_string()
}
