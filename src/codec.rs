//! Address codec: human-readable addresses <-> canonical record bytes.
//!
//! The canonical form depends on the coin type and is *not* fixed length:
//!
//! | coin type        | text form            | bytes                                  |
//! |------------------|----------------------|----------------------------------------|
//! | 3030 (HBAR)      | `0.0.1040`           | 20-byte solidity address               |
//! | 3030 (HBAR)      | `0.0.<alias key>`    | protobuf `AccountID` (40+ bytes)       |
//! | 0 (BTC)          | `bc1q…`, `1A1z…`     | the text's UTF-8 bytes                 |
//! | 60, 714, 9006    | `0x` + 40 hex digits | 20 bytes                               |
//!
//! Fixed-width padding is a separate step, see [`crate::bytes::to_bytes32`].

use crate::account::{AccountId, SOLIDITY_ADDRESS_LEN};
use crate::bytes::hex_encode;
use crate::coin::{AddressFormat, CoinType};
use crate::{Error, Result};

/// Byte length of an EVM address.
pub const EVM_ADDRESS_LEN: usize = 20;

/// An address as handed to a write operation.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum AddressInput {
    /// Already serialized; passed through unchanged.
    Bytes(Vec<u8>),
    /// Human-readable text, serialized per coin type.
    Text(String),
    /// A ledger account id (HBAR only).
    Account(AccountId),
}

impl From<Vec<u8>> for AddressInput {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for AddressInput {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

impl From<String> for AddressInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for AddressInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<AccountId> for AddressInput {
    fn from(id: AccountId) -> Self {
        Self::Account(id)
    }
}

/// Serialize `address` into the canonical bytes for `coin_type`.
///
/// # Errors
///
/// * [`Error::UnsupportedCoinType`] for text addresses of coin types with no
///   known text form; serialize those before calling.
/// * [`Error::InvalidAddress`] / [`Error::InvalidAccountId`] when the text
///   does not have the shape the coin type requires.
pub fn serialize_address(coin_type: CoinType, address: impl Into<AddressInput>) -> Result<Vec<u8>> {
    let text = match address.into() {
        AddressInput::Bytes(bytes) => return Ok(bytes),
        AddressInput::Account(id) if coin_type.address_format() == AddressFormat::LedgerAccount => {
            return serialize_account_id(&id)
        }
        AddressInput::Account(id) => {
            return Err(Error::InvalidAddress {
                coin_type,
                reason: format!("ledger account {id} given for a non-ledger coin type"),
            })
        }
        AddressInput::Text(text) => text,
    };

    match coin_type.address_format() {
        AddressFormat::LedgerAccount => serialize_account_id(&text.parse::<AccountId>()?),
        AddressFormat::Utf8Text => Ok(text.into_bytes()),
        AddressFormat::Evm => serialize_evm(coin_type, &text),
        AddressFormat::Unknown => Err(Error::UnsupportedCoinType(coin_type)),
    }
}

/// Serialize an HBAR address given as bytes, text or an [`AccountId`].
pub fn serialize_ledger_address(address: impl Into<AddressInput>) -> Result<Vec<u8>> {
    serialize_address(CoinType::HBAR, address)
}

/// Numbered accounts use the 20-byte solidity form; alias-keyed accounts
/// need the protobuf form, which is always longer than 20 bytes.
pub fn serialize_account_id(id: &AccountId) -> Result<Vec<u8>> {
    match id.alias_key() {
        Some(_) => Ok(id.to_bytes()),
        None => Ok(id.to_solidity_address()?.to_vec()),
    }
}

fn serialize_evm(coin_type: CoinType, text: &str) -> Result<Vec<u8>> {
    let invalid = |reason: String| Error::InvalidAddress { coin_type, reason };

    let digits = text
        .strip_prefix("0x")
        .ok_or_else(|| invalid(format!("`{text}` is missing the 0x prefix")))?;
    let bytes = hex::decode(digits).map_err(|e| invalid(format!("`{text}`: {e}")))?;
    if bytes.len() != EVM_ADDRESS_LEN {
        return Err(invalid(format!(
            "{} bytes, expected {EVM_ADDRESS_LEN}",
            bytes.len()
        )));
    }
    Ok(bytes)
}

/// Recover a ledger account id from HBAR record bytes.
///
/// Exactly 20 bytes decode as the solidity form; any other length decodes as
/// a protobuf `AccountID` (alias keys, arbitrary magnitudes).
pub fn deserialize_ledger_address(bytes: &[u8]) -> Result<AccountId> {
    if bytes.len() == SOLIDITY_ADDRESS_LEN {
        AccountId::from_solidity_address(bytes)
    } else {
        AccountId::from_bytes(bytes)
    }
}

/// Format record bytes for display. Never fails: anything without a better
/// rendering is shown as `0x` + lowercase hex.
pub fn format_address(coin_type: CoinType, bytes: &[u8]) -> String {
    match coin_type.address_format() {
        AddressFormat::LedgerAccount => match deserialize_ledger_address(bytes) {
            Ok(id) => id.to_string(),
            Err(_) => format_hex(bytes),
        },
        AddressFormat::Utf8Text => String::from_utf8_lossy(bytes).into_owned(),
        AddressFormat::Evm | AddressFormat::Unknown => format_hex(bytes),
    }
}

fn format_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex_encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_pass_through() {
        let raw = vec![1u8, 2, 3];
        assert_eq!(serialize_address(CoinType(12345), raw.clone()).unwrap(), raw);
        assert_eq!(serialize_address(CoinType::HBAR, raw.as_slice()).unwrap(), raw);
    }

    #[test]
    fn numbered_hbar_account_is_solidity_form() {
        let bytes = serialize_address(CoinType::HBAR, "50.20.1040").unwrap();
        assert_eq!(
            hex_encode(&bytes),
            "0000003200000000000000140000000000000410"
        );
        assert_eq!(format_address(CoinType::HBAR, &bytes), "50.20.1040");
    }

    #[test]
    fn legacy_protobuf_bytes_still_decode() {
        let bytes = hex::decode("08321014189008").unwrap();
        assert_eq!(
            deserialize_ledger_address(&bytes).unwrap(),
            AccountId::new(50, 20, 1040)
        );
    }

    #[test]
    fn evm_address_round_trip() {
        let text = "0x52908400098527886e0f7030069857d2e4169ee7";
        let bytes = serialize_address(CoinType::ETHEREUM, text).unwrap();
        assert_eq!(bytes.len(), EVM_ADDRESS_LEN);
        assert_eq!(format_address(CoinType::ETHEREUM, &bytes), text);
    }

    #[test]
    fn evm_address_shape_is_checked() {
        for bad in [
            "52908400098527886e0f7030069857d2e4169ee7",
            "0x5290",
            "0xzz908400098527886e0f7030069857d2e4169ee7",
        ] {
            assert!(matches!(
                serialize_address(CoinType::BNB_SMART_CHAIN, bad),
                Err(Error::InvalidAddress { .. })
            ));
        }
    }

    #[test]
    fn unknown_coin_type_text_is_rejected() {
        match serialize_address(CoinType(2), "LQTpS3VaYTjCr4s9Y1t5zbeY26zevf7Fb3") {
            Err(Error::UnsupportedCoinType(CoinType(2))) => {}
            other => panic!("expected UnsupportedCoinType, got {:?}", other),
        }
    }

    #[test]
    fn unknown_coin_type_formats_as_hex() {
        assert_eq!(format_address(CoinType(2), &[0xab, 0x01]), "0xab01");
    }

    #[test]
    fn undecodable_hbar_bytes_format_as_hex() {
        assert_eq!(format_address(CoinType::HBAR, &[0xff]), "0xff");
    }

    #[test]
    fn account_input_only_for_ledger_coin() {
        let id = AccountId::new(0, 0, 98);
        assert_eq!(serialize_ledger_address(id).unwrap().len(), SOLIDITY_ADDRESS_LEN);
        assert!(matches!(
            serialize_address(CoinType::ETHEREUM, id),
            Err(Error::InvalidAddress { .. })
        ));
    }
}
