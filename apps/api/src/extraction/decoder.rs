//! Decoder: interprets a raw byte buffer under one of a fixed set of text encodings.
//!
//! Decoding is total: invalid sequences become U+FFFD (or the Windows-1252 mapping),
//! never an error.

use std::fmt;

use serde::Serialize;

/// Text encodings the extractors may try.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    Utf8,
    Latin1,
    Windows1252,
}

/// Fixed trial order for the structural and character-pattern extractors.
pub const ENCODING_ORDER: [TextEncoding; 3] = [
    TextEncoding::Utf8,
    TextEncoding::Latin1,
    TextEncoding::Windows1252,
];

impl TextEncoding {
    pub fn name(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Latin1 => "iso-8859-1",
            TextEncoding::Windows1252 => "windows-1252",
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A buffer decoded under one encoding.
#[derive(Debug, Clone)]
pub struct DecodedCandidate {
    pub encoding: TextEncoding,
    pub text: String,
}

/// Decodes `bytes` under `encoding`. Never fails.
pub fn decode(bytes: &[u8], encoding: TextEncoding) -> String {
    match encoding {
        TextEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
        // ISO-8859-1 maps every byte to the code point of the same value.
        TextEncoding::Latin1 => bytes.iter().map(|&b| b as char).collect(),
        TextEncoding::Windows1252 => {
            let (text, _had_errors) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes);
            text.into_owned()
        }
    }
}

/// Lazily decodes `bytes` under each encoding in order, skipping repeats.
pub fn candidates<'a>(
    bytes: &'a [u8],
    encodings: &'a [TextEncoding],
) -> impl Iterator<Item = DecodedCandidate> + 'a {
    encodings
        .iter()
        .enumerate()
        .filter(move |(i, enc)| !encodings[..*i].contains(enc))
        .map(move |(_, &encoding)| DecodedCandidate {
            encoding,
            text: decode(bytes, encoding),
        })
}
