//! Input normalization.
//!
//! Names arrive as arbitrary user text: mixed case, HTML entities from web
//! forms, legacy single-byte encodings, and spelling artifacts such as
//! apostrophes and dashes. [`normalize`] reduces a name to a trimmed,
//! entity-decoded, lowercased form; [`join_leading_prefix`] and
//! [`canonicalize_delimiters`] then shape it for the rewrite engine, which
//! expects at most one token boundary per delimiter kind.

use crate::error::{InputError, MAX_INPUT_CHARS};
use crate::language::NameType;

/// Leading phrases whose inner spaces are joined before word splitting.
const LEADING_PHRASES: &[&str] = &["de la", "van der", "van den"];

/// Normalize a name: trim, decode HTML/XML entities, enforce the length
/// cap, Unicode-lowercase.
///
/// Idempotent for entity-free inputs. Returns [`InputError::Empty`] when
/// nothing remains after trimming and [`InputError::TooLong`] when the
/// result exceeds [`MAX_INPUT_CHARS`] codepoints.
pub fn normalize(input: &str) -> Result<String, InputError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(InputError::Empty);
    }

    let decoded = if trimmed.contains('&') {
        decode_entities(trimmed)
    } else {
        trimmed.to_string()
    };

    if decoded.chars().count() > MAX_INPUT_CHARS {
        return Err(InputError::TooLong { max: MAX_INPUT_CHARS });
    }

    Ok(decoded.chars().flat_map(char::to_lowercase).collect())
}

/// Decode raw name bytes to UTF-8 text.
///
/// Candidate encodings are tried in order: UTF-8, ISO-8859-1 (which has no
/// assignments in the 0x80-0x9F block), Windows-1252, ASCII. Bytes that fit
/// none of them yield [`InputError::InvalidEncoding`].
pub fn decode_name_bytes(bytes: &[u8]) -> Result<String, InputError> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(text.to_string());
    }
    if !bytes.iter().any(|b| (0x80..=0x9F).contains(b)) {
        // ISO-8859-1: every remaining byte maps directly to U+00XX
        return Ok(bytes.iter().map(|&b| b as char).collect());
    }
    if let Some(text) = decode_windows_1252(bytes) {
        return Ok(text);
    }
    // ASCII would have been valid UTF-8 already
    Err(InputError::InvalidEncoding)
}

/// The Windows-1252 assignments for 0x80-0x9F. `None` marks the five
/// unmapped bytes.
const WINDOWS_1252_C1: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

fn decode_windows_1252(bytes: &[u8]) -> Option<String> {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        let c = match b {
            0x80..=0x9F => WINDOWS_1252_C1[(b - 0x80) as usize]?,
            _ => b as char,
        };
        out.push(c);
    }
    Some(out)
}

/// Decode HTML/XML character references. Unknown references are kept
/// verbatim.
fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match parse_entity(tail) {
            Some((c, len)) => {
                out.push(c);
                rest = &tail[len..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Parse one reference at the head of `tail` (which starts with `&`);
/// returns the decoded char and the byte length consumed.
fn parse_entity(tail: &str) -> Option<(char, usize)> {
    let semi = tail.find(';')?;
    // entity bodies are short; anything longer is a stray ampersand
    if semi < 2 || semi > 9 {
        return None;
    }
    let body = &tail[1..semi];
    let c = match body {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        _ => {
            let digits = body.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse::<u32>().ok()?,
            };
            char::from_u32(code)?
        }
    };
    Some((c, semi + 1))
}

/// Join the inner spaces of a recognized leading phrase, so that
/// `"de la rosa"` becomes `"dela rosa"` before word splitting.
pub fn join_leading_prefix(input: &str) -> String {
    for phrase in LEADING_PHRASES {
        if let Some(rest) = input.strip_prefix(phrase) {
            if rest.starts_with(' ') {
                let mut out = phrase.replace(' ', "");
                out.push_str(rest);
                return out;
            }
        }
    }
    input.to_string()
}

/// Canonicalize delimiters: for each of `'`, `-` and space, the first
/// occurrence keeps a single space and every occurrence is removed.
///
/// Generic and Ashkenazic names lose their apostrophes entirely before the
/// scan; Sephardic names keep them as a phonetic marker, so a Sephardic
/// apostrophe canonicalizes into a word boundary.
pub fn canonicalize_delimiters(input: &str, name_type: NameType) -> String {
    let mut chars: Vec<char> = input.chars().collect();
    if name_type != NameType::Sephardic {
        chars.retain(|&c| c != '\'');
    }
    for delim in ['\'', '-', ' '] {
        if let Some(first) = chars.iter().position(|&c| c == delim) {
            chars.retain(|&c| c != delim);
            chars.insert(first, ' ');
        }
    }
    chars.into_iter().collect()
}
