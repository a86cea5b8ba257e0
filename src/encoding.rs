//! Single-byte and UTF-8 text codecs used by the sample files.
//!
//! Only the three encodings the pipeline writes are supported. Decoding with
//! fallback tries them in a fixed order, so a file that is not valid UTF-8 is
//! read as cp1251, and anything cp1251 rejects is read as Latin-1.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};

/// Candidate order for [`decode_with_fallback`].
pub const FALLBACK_ORDER: [TextEncoding; 3] = [
    TextEncoding::Utf8,
    TextEncoding::Windows1251,
    TextEncoding::Latin1,
];

/// Upper half (0x80..=0xFF) of Windows code page 1251. `None` is unassigned.
const CP1251_HIGH: [Option<char>; 128] = {
    let mut table: [Option<char>; 128] = [None; 128];
    let specials: [(usize, char); 63] = [
        (0x80, '\u{0402}'), (0x81, '\u{0403}'), (0x82, '\u{201A}'), (0x83, '\u{0453}'),
        (0x84, '\u{201E}'), (0x85, '\u{2026}'), (0x86, '\u{2020}'), (0x87, '\u{2021}'),
        (0x88, '\u{20AC}'), (0x89, '\u{2030}'), (0x8A, '\u{0409}'), (0x8B, '\u{2039}'),
        (0x8C, '\u{040A}'), (0x8D, '\u{040C}'), (0x8E, '\u{040B}'), (0x8F, '\u{040F}'),
        (0x90, '\u{0452}'), (0x91, '\u{2018}'), (0x92, '\u{2019}'), (0x93, '\u{201C}'),
        (0x94, '\u{201D}'), (0x95, '\u{2022}'), (0x96, '\u{2013}'), (0x97, '\u{2014}'),
        (0x99, '\u{2122}'), (0x9A, '\u{0459}'), (0x9B, '\u{203A}'), (0x9C, '\u{045A}'),
        (0x9D, '\u{045C}'), (0x9E, '\u{045B}'), (0x9F, '\u{045F}'), (0xA0, '\u{00A0}'),
        (0xA1, '\u{040E}'), (0xA2, '\u{045E}'), (0xA3, '\u{0408}'), (0xA4, '\u{00A4}'),
        (0xA5, '\u{0490}'), (0xA6, '\u{00A6}'), (0xA7, '\u{00A7}'), (0xA8, '\u{0401}'),
        (0xA9, '\u{00A9}'), (0xAA, '\u{0404}'), (0xAB, '\u{00AB}'), (0xAC, '\u{00AC}'),
        (0xAD, '\u{00AD}'), (0xAE, '\u{00AE}'), (0xAF, '\u{0407}'), (0xB0, '\u{00B0}'),
        (0xB1, '\u{00B1}'), (0xB2, '\u{0406}'), (0xB3, '\u{0456}'), (0xB4, '\u{0491}'),
        (0xB5, '\u{00B5}'), (0xB6, '\u{00B6}'), (0xB7, '\u{00B7}'), (0xB8, '\u{0451}'),
        (0xB9, '\u{2116}'), (0xBA, '\u{0454}'), (0xBB, '\u{00BB}'), (0xBC, '\u{0458}'),
        (0xBD, '\u{0405}'), (0xBE, '\u{0455}'), (0xBF, '\u{0457}'),
    ];

    let mut i = 0;
    while i < specials.len() {
        let (byte, ch) = specials[i];
        table[byte - 0x80] = Some(ch);
        i += 1;
    }

    // 0xC0..=0xFF map onto U+0410..=U+044F (А..я).
    let mut byte = 0xC0;
    while byte <= 0xFF {
        table[byte - 0x80] = char::from_u32(0x0410 + (byte as u32 - 0xC0));
        byte += 1;
    }
    table
};

/// Text encodings the pipeline can read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextEncoding {
    #[serde(rename = "utf-8")]
    Utf8,
    #[serde(rename = "cp1251")]
    Windows1251,
    #[serde(rename = "iso-8859-1")]
    Latin1,
}

impl TextEncoding {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Windows1251 => "cp1251",
            Self::Latin1 => "iso-8859-1",
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What to do with characters the target encoding cannot represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodePolicy {
    Strict,
    Ignore,
}

/// Encode `text` into bytes of the given encoding.
pub fn encode(text: &str, encoding: TextEncoding, policy: EncodePolicy) -> PipelineResult<Vec<u8>> {
    if encoding == TextEncoding::Utf8 {
        return Ok(text.as_bytes().to_vec());
    }

    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        match encode_char(ch, encoding) {
            Some(byte) => out.push(byte),
            None if policy == EncodePolicy::Ignore => {}
            None => return Err(PipelineError::Unencodable { ch, encoding }),
        }
    }
    Ok(out)
}

fn encode_char(ch: char, encoding: TextEncoding) -> Option<u8> {
    let code = ch as u32;
    if code < 0x80 {
        return Some(code as u8);
    }
    match encoding {
        TextEncoding::Latin1 => u8::try_from(code).ok(),
        TextEncoding::Windows1251 => CP1251_HIGH
            .iter()
            .position(|entry| *entry == Some(ch))
            .map(|offset| 0x80 + offset as u8),
        TextEncoding::Utf8 => None,
    }
}

/// Decode `bytes` as the given encoding. Returns `None` when the bytes are
/// not valid in that encoding.
pub fn decode(bytes: &[u8], encoding: TextEncoding) -> Option<String> {
    match encoding {
        TextEncoding::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_owned),
        TextEncoding::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
        TextEncoding::Windows1251 => bytes
            .iter()
            .map(|&b| {
                if b < 0x80 {
                    Some(char::from(b))
                } else {
                    CP1251_HIGH[usize::from(b - 0x80)]
                }
            })
            .collect(),
    }
}

/// Decode with the fixed [`FALLBACK_ORDER`], returning the text and the
/// encoding that accepted it.
pub fn decode_with_fallback(bytes: &[u8]) -> Option<(String, TextEncoding)> {
    FALLBACK_ORDER
        .iter()
        .find_map(|&encoding| decode(bytes, encoding).map(|text| (text, encoding)))
}

/// Swap the case of every cased character.
///
/// Uppercase characters take their full lowercase mapping and vice versa,
/// so a single character may expand (`ß` becomes `SS`).
pub fn swapcase(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_uppercase() {
            out.extend(ch.to_lowercase());
        } else if ch.is_lowercase() {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
    }
    out
}
