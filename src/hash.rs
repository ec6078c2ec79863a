//! Entity name hashing and the two text encodings of the wire format.
//!
//! Names are stored in the default (single-byte) encoding, descriptions in
//! the alternate (multi-byte) encoding; both carry a 16-bit rolling hash of
//! their encoded bytes as a corruption check.

use crate::error::{CodecError, CodecResult};

/// 16-bit rolling hash over encoded bytes.
///
/// Accumulates `h = h * 3 + byte` left-to-right in a wrapping u32 and keeps
/// the low 16 bits. Doubles as the schema-selection key and the corruption
/// check of the entity envelope.
pub fn rolling_hash(bytes: &[u8]) -> u16 {
    let mut acc: u32 = 0;
    for &byte in bytes {
        acc = acc.wrapping_mul(3).wrapping_add(u32::from(byte));
    }
    (acc & 0xFFFF) as u16
}

/// Encodes text in the default encoding (Latin-1, one byte per scalar).
///
/// # Errors
/// Fails for characters above U+00FF, which the default encoding cannot
/// represent.
pub fn encode_default(text: &str) -> CodecResult<Vec<u8>> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        let scalar = ch as u32;
        if scalar > 0xFF {
            return Err(CodecError::Encoding(format!(
                "character {ch:?} is not representable in the default encoding"
            )));
        }
        out.push(scalar as u8);
    }
    Ok(out)
}

/// Decodes default-encoded bytes. Total: every byte maps to one scalar.
pub fn decode_default(bytes: &[u8]) -> String {
    bytes.iter().map(|&byte| char::from(byte)).collect()
}

/// Encodes text in the alternate (multi-byte-aware) encoding.
pub fn encode_alternate(text: &str) -> Vec<u8> {
    text.as_bytes().to_vec()
}

/// Decodes alternate-encoded bytes.
///
/// # Errors
/// Invalid byte sequences are a corruption of the enclosing record.
pub fn decode_alternate(bytes: &[u8]) -> CodecResult<String> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|_| CodecError::Corruption("text is not valid in the alternate encoding".into()))
}
