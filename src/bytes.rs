//! Byte <-> text helpers shared by the codec and the facade.

use crate::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Width of a `bytes32` contract parameter slot.
pub const BYTES32_LEN: usize = 32;

/// Lowercase hex, no prefix.
pub fn hex_encode(data: &[u8]) -> String {
    hex::encode(data)
}

/// Decode hex text. A leading `0x` is optional and stripped.
pub fn hex_decode(text: &str) -> Result<Vec<u8>> {
    let digits = text.strip_prefix("0x").unwrap_or(text);
    Ok(hex::decode(digits)?)
}

/// Standard (padded) base64, as used by the resolver for address payloads.
pub fn base64_encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decode standard (padded) base64.
pub fn base64_decode(text: &str) -> Result<Vec<u8>> {
    Ok(STANDARD.decode(text)?)
}

/// Right-pad `bytes` with zeros to exactly 32 bytes.
///
/// # Errors
///
/// Returns [`Error::ValueTooLarge`] when `bytes` is longer than 32 bytes;
/// the input is never truncated.
pub fn to_bytes32(bytes: &[u8]) -> Result<[u8; BYTES32_LEN]> {
    if bytes.len() > BYTES32_LEN {
        return Err(Error::ValueTooLarge {
            len: bytes.len(),
            max: BYTES32_LEN,
        });
    }

    let mut padded = [0u8; BYTES32_LEN];
    padded[..bytes.len()].copy_from_slice(bytes);
    Ok(padded)
}
