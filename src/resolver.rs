//! Resolver collaborator: the name service's read API.

use crate::account::EntityId;
use crate::bytes::base64_decode;
use crate::codec::format_address;
use crate::coin::CoinType;
use crate::models::{AddressRecord, NameId, OwnedName, RegistryVersion, TextRecord, TldId};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Read access to the resolver.
///
/// Names passed in are already normalized. Implementations must report an
/// unknown or expired name as [`Error::NameNotFound`] and every other failure
/// as-is.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Registration info, GET `/name/{name}`.
    async fn name(&self, name: &str) -> Result<NameInfo>;

    /// All address and text records, GET `/name/{name}/record`.
    async fn records(&self, name: &str) -> Result<RawRecords>;

    /// One address record, GET `/name/{record_name}/record/address/{coin_type}`.
    async fn address(&self, record_name: &str, coin_type: CoinType) -> Result<RawAddressRecord>;

    /// Text record, GET `/name/{record_name}/record/text`.
    async fn text(&self, record_name: &str) -> Result<TextRecord>;

    /// HIP-412 NFT metadata, GET `/name/{name}/metadata`.
    async fn metadata(&self, name: &str) -> Result<serde_json::Value>;

    /// Current registry of a TLD, GET `/name/.{tld}`.
    async fn tld(&self, tld: &str) -> Result<TldInfo>;

    /// Names held by an account, GET `/owner/{account}`.
    async fn names_by_owner(&self, owner: &str) -> Result<Vec<OwnedName>>;

    /// Reverse lookup, GET `/record/address/{coin_type}/{address}/name`.
    async fn names_by_address(&self, coin_type: CoinType, address: &str) -> Result<Vec<AddressMatch>>;

    /// USD per HBAR, GET `/exchange-rate`.
    async fn exchange_rate(&self) -> Result<f64>;
}

/// Registration info as served by the resolver.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameInfo {
    pub v1_contract_id: Option<EntityId>,
    pub v2_contract_id: Option<EntityId>,
    pub v3_contract_id: Option<EntityId>,
    pub v1_token_id: Option<EntityId>,
    pub v2_token_id: Option<EntityId>,
    pub v3_token_id: Option<EntityId>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub max_records: Option<u32>,
    /// Contract serial number, see [`RegistryVersion`].
    pub token_serial_number: i64,
}

impl NameInfo {
    /// Pick the token and contract of the generation the serial belongs to.
    pub fn name_id(&self) -> Result<NameId> {
        let contract_serial_number = self.token_serial_number;
        let (version, serial_number) = RegistryVersion::from_contract_serial(contract_serial_number);

        let (token_id, contract_id) = match version {
            RegistryVersion::V1 => (self.v1_token_id, self.v1_contract_id),
            RegistryVersion::V2 => (self.v2_token_id, self.v2_contract_id),
            RegistryVersion::V3 => (self.v3_token_id, self.v3_contract_id),
        };
        let (Some(token_id), Some(contract_id)) = (token_id, contract_id) else {
            return Err(Error::MalformedResponse(format!(
                "serial {contract_serial_number} is {version:?} but the resolver sent no {version:?} ids"
            )));
        };

        Ok(NameId {
            token_id,
            contract_id,
            serial_number,
            contract_serial_number,
            version,
        })
    }
}

/// An address record with its bytes still base64-encoded.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAddressRecord {
    pub name: String,
    pub coin_type: CoinType,
    /// Base64 of the canonical address bytes.
    pub address: String,
}

impl RawAddressRecord {
    /// Decode the payload and format it for display.
    pub fn into_record(self) -> Result<AddressRecord> {
        let address_bytes = base64_decode(&self.address)?;
        Ok(AddressRecord {
            address: format_address(self.coin_type, &address_bytes),
            address_bytes,
            name: self.name,
            coin_type: self.coin_type,
        })
    }
}

/// `/name/{name}/record` payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecords {
    #[serde(default)]
    pub address: Vec<RawAddressRecord>,
    #[serde(default)]
    pub text: Vec<TextRecord>,
}

/// `/name/.{tld}` payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TldInfo {
    pub v3_contract_id: EntityId,
    pub v3_token_id: EntityId,
}

impl From<TldInfo> for TldId {
    fn from(info: TldInfo) -> Self {
        Self {
            contract_id: info.v3_contract_id,
            token_id: info.v3_token_id,
        }
    }
}

/// A name holding a searched-for address.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
pub struct AddressMatch {
    /// Second-level label.
    pub domain: String,
    /// Top-level domain.
    pub parent: String,
}

impl AddressMatch {
    /// `domain.parent`.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.domain, self.parent)
    }
}
