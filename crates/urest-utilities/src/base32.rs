//! Unpadded base32 over the RFC 4648 alphabet.
//!
//! Used to carry arbitrary bytes inside a request's query string, which must
//! stay within plain ASCII letters and digits.

use thiserror::Error;

const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Errors produced while decoding base32 text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Base32Error {
    /// A character outside the alphabet, at the given byte offset.
    #[error("invalid base32 character {character:?} at offset {offset}")]
    InvalidCharacter {
        /// Offending character
        character: char,
        /// Byte offset in the input
        offset: usize,
    },
}

/// Encodes `data`; no `=` padding is emitted.
///
/// ```
/// use urest_utilities::base32;
///
/// assert_eq!(base32::encode(b"foobar"), "MZXW6YTBOI");
/// ```
pub fn encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(encoded_len(data.len()));
    let mut buffer: u32 = 0;
    let mut bits = 0;

    for &byte in data {
        buffer = (buffer << 8) | u32::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
    }
    if bits > 0 {
        out.push(ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }
    out
}

/// Decodes base32 text.
///
/// Letters are accepted in either case. Whitespace and `=` padding are
/// skipped; trailing bits that do not fill a byte are dropped.
pub fn decode(text: &str) -> Result<Vec<u8>, Base32Error> {
    let mut out = Vec::with_capacity(text.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits = 0;

    for (offset, character) in text.char_indices() {
        let value = match character {
            'A'..='Z' => character as u32 - 'A' as u32,
            'a'..='z' => character as u32 - 'a' as u32,
            '2'..='7' => character as u32 - '2' as u32 + 26,
            '=' | ' ' | '\t' | '\r' | '\n' => continue,
            _ => return Err(Base32Error::InvalidCharacter { character, offset }),
        };
        buffer = (buffer << 5) | value;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
        }
    }
    Ok(out)
}

/// Length of the encoding of `len` bytes.
pub fn encoded_len(len: usize) -> usize {
    (len * 8).div_ceil(5)
}
