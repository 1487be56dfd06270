//! Defensive decoding of captured tool output.
//!
//! TeX engines echo source fragments and font names into their logs verbatim, so the
//! captured bytes are not guaranteed to be UTF-8. Decoding tries a list of encodings
//! in order and never fails.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextEncoding {
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    #[serde(rename = "latin-1", alias = "latin1", alias = "iso-8859-1")]
    Latin1,
    #[serde(rename = "cp1252", alias = "windows-1252")]
    Windows1252,
    #[serde(rename = "ascii")]
    Ascii,
}

/// Order used when the configuration does not name one.
pub const DEFAULT_ENCODINGS: [TextEncoding; 4] = [
    TextEncoding::Utf8,
    TextEncoding::Latin1,
    TextEncoding::Windows1252,
    TextEncoding::Ascii,
];

// 0x80..=0x9F in Windows-1252; None marks the five undefined code points.
const CP1252_HIGH: [Option<char>; 32] = [
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

impl TextEncoding {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Latin1 => "latin-1",
            Self::Windows1252 => "cp1252",
            Self::Ascii => "ascii",
        }
    }

    /// Strict decode. Returns `None` when `bytes` is not valid in this encoding.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_owned),
            Self::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
            Self::Windows1252 => bytes
                .iter()
                .map(|&b| match b {
                    0x80..=0x9F => CP1252_HIGH[usize::from(b - 0x80)],
                    _ => Some(char::from(b)),
                })
                .collect(),
            Self::Ascii => {
                if bytes.is_ascii() {
                    Some(bytes.iter().map(|&b| char::from(b)).collect())
                } else {
                    None
                }
            }
        }
    }
}

/// Decodes `bytes` with the first encoding that accepts them, falling back to a lossy
/// UTF-8 decode (invalid sequences become U+FFFD).
pub fn decode_output(bytes: &[u8], encodings: &[TextEncoding]) -> String {
    encodings
        .iter()
        .find_map(|encoding| encoding.decode(bytes))
        .unwrap_or_else(|| String::from_utf8_lossy(bytes).into_owned())
}
