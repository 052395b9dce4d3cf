//! Records and registration metadata returned by the facade.

use crate::account::{AccountId, EntityId};
use crate::coin::CoinType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Contract serial numbers above this belong to the V3 registry.
pub const V3_SERIAL_OFFSET: i64 = 32_000;

/// Generation of the registry contract a name was minted by.
///
/// Each generation has its own token and contract, and their NFT serial
/// ranges overlap. The resolver and the V3 contract disambiguate them with a
/// single *contract serial number*: V1 serials as-is, V2 serials negated, V3
/// serials offset by [`V3_SERIAL_OFFSET`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum RegistryVersion {
    /// First-generation registry.
    V1,
    /// Second-generation registry.
    V2,
    /// Current registry; new names are minted here.
    V3,
}

impl RegistryVersion {
    /// Split a contract serial number into `(version, token serial)`.
    pub fn from_contract_serial(contract_serial: i64) -> (Self, i64) {
        if contract_serial > V3_SERIAL_OFFSET {
            (Self::V3, contract_serial - V3_SERIAL_OFFSET)
        } else if contract_serial < 0 {
            (Self::V2, -contract_serial)
        } else {
            (Self::V1, contract_serial)
        }
    }

    /// Contract serial number of token serial `serial` in this registry.
    pub fn to_contract_serial(self, serial: i64) -> i64 {
        match self {
            Self::V3 => V3_SERIAL_OFFSET + serial,
            Self::V2 => -serial,
            Self::V1 => serial,
        }
    }
}

/// Everything needed to address a registered name on-chain.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct NameId {
    /// NFT collection of the name's registry.
    pub token_id: EntityId,
    /// Registry contract.
    pub contract_id: EntityId,
    /// NFT serial within `token_id`.
    pub serial_number: i64,
    /// Serial as the contract expects it, see [`RegistryVersion`].
    pub contract_serial_number: i64,
    /// Registry generation.
    pub version: RegistryVersion,
}

/// A top-level domain's current (V3) registry.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TldId {
    /// Registry contract, the target of `purchaseZone`.
    pub contract_id: EntityId,
    /// NFT collection names are minted into.
    pub token_id: EntityId,
}

/// Registration information for a name.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Name {
    /// Normalized `label.tld`.
    pub domain: String,
    /// Current holder of the name's NFT.
    pub owner_account_id: AccountId,
    /// NFT serial within `token_id`.
    pub serial_number: i64,
    /// Serial as the contract expects it.
    pub contract_serial_number: i64,
    /// When the registration lapses.
    pub expiration_time: DateTime<Utc>,
    /// Registry contract.
    pub contract_id: EntityId,
    /// NFT collection.
    pub token_id: EntityId,
    /// Registry generation.
    pub version: RegistryVersion,
}

impl Name {
    /// On-chain handle of this name.
    pub fn id(&self) -> NameId {
        NameId {
            token_id: self.token_id,
            contract_id: self.contract_id,
            serial_number: self.serial_number,
            contract_serial_number: self.contract_serial_number,
            version: self.version,
        }
    }
}

/// A name found by owner search.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct OwnedName {
    /// `label.tld`.
    #[serde(rename = "name")]
    pub domain: String,
    /// When the registration lapses.
    #[serde(rename = "expiresAt")]
    pub expiration_time: DateTime<Utc>,
}

/// An address record of a name.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AddressRecord {
    /// Record label, empty for the domain itself.
    pub name: String,
    /// Coin type of the address.
    pub coin_type: CoinType,
    /// Canonical bytes as stored on-chain.
    pub address_bytes: Vec<u8>,
    /// Display form of `address_bytes`.
    pub address: String,
}

/// A text record of a name.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TextRecord {
    /// Record label, empty for the domain itself.
    pub name: String,
    /// Record contents.
    pub text: String,
}

/// All records of a name.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Records {
    /// Address records.
    pub address: Vec<AddressRecord>,
    /// Text records.
    pub text: Vec<TextRecord>,
}
