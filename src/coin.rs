//! Coin types (SLIP-44 numbers) and their address formats.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Integer identifying a cryptocurrency / chain.
///
/// Not an exhaustive enum: any `u32` is a valid coin type, and the address
/// codec falls back to hex for values it does not know.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoinType(pub u32);

impl CoinType {
    /// Bitcoin; addresses are stored as their UTF-8 text.
    pub const BITCOIN: Self = Self(0);
    /// Ethereum.
    pub const ETHEREUM: Self = Self(60);
    /// BNB Beacon Chain.
    pub const BNB: Self = Self(714);
    /// BNB Smart Chain.
    pub const BNB_SMART_CHAIN: Self = Self(9006);
    /// HBAR, the native coin of the Hedera ledger.
    pub const HBAR: Self = Self(3030);

    /// How addresses of this coin type map to bytes.
    pub const fn address_format(self) -> AddressFormat {
        match self.0 {
            3030 => AddressFormat::LedgerAccount,
            0 => AddressFormat::Utf8Text,
            60 | 714 | 9006 => AddressFormat::Evm,
            _ => AddressFormat::Unknown,
        }
    }
}

impl From<u32> for CoinType {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for CoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Address representations understood by the codec.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AddressFormat {
    /// Ledger account id: 20-byte solidity form, or protobuf for alias keys.
    LedgerAccount,
    /// Opaque text stored as its own UTF-8 bytes.
    Utf8Text,
    /// `0x`-prefixed hex of exactly 20 bytes.
    Evm,
    /// No known text form; callers must pre-serialize.
    Unknown,
}
