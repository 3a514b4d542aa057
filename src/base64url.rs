//! Base64url encoding without padding, as used in JWT segments.
//!
//! Decoding restores the padding and decodes with the standard alphabet after translating
//! the URL-safe characters, so both `-_` and `+/` are accepted. Trailing padding
//! in the input is tolerated. Non-canonical encodings (e.g., non-zero trailing bits)
//! are rejected.

use base64ct::{Base64, Base64UrlUnpadded, Encoding};

/// Error returned when a base64url string cannot be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeError;

impl core::fmt::Display for DecodeError {
    fn fmt(&self, formatter: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        formatter.write_str("invalid base64url encoding")
    }
}

impl std::error::Error for DecodeError {}

/// Encodes bytes as base64url without padding.
pub fn encode(source: impl AsRef<[u8]>) -> String {
    Base64UrlUnpadded::encode_string(source.as_ref())
}

/// Appends base64url encoding of `source` (without padding) to the `buffer`.
pub(crate) fn encode_buf(source: impl AsRef<[u8]>, buffer: &mut String) {
    buffer.push_str(&encode(source));
}

/// Decodes a base64url string, with or without padding.
pub fn decode(input: &str) -> Result<Vec<u8>, DecodeError> {
    let mut standard: String = input
        .chars()
        .map(|ch| match ch {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    let remainder = standard.len() % 4;
    if remainder != 0 {
        standard.extend(core::iter::repeat('=').take(4 - remainder));
    }
    Base64::decode_vec(&standard).map_err(|_| DecodeError)
}
