//! Hedera ledger identifiers: entity ids, account ids and alias keys.
//!
//! An [`AccountId`] has three byte forms:
//! * the 20-byte *solidity* form (`shard` u32 BE ‖ `realm` u64 BE ‖ `num` u64 BE),
//!   usable wherever a contract expects an address;
//! * the protobuf `AccountID` message (`shardNum = 1`, `realmNum = 2`,
//!   `accountNum = 3`, `alias = 4`), the only form that can carry an alias key;
//! * its text form, `shard.realm.num` or `shard.realm.<DER public key hex>`.

use crate::proto::{self, Reader, Value};
use crate::{Error, Result};
use core::fmt;
use core::str::FromStr;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Length of the solidity address form.
pub const SOLIDITY_ADDRESS_LEN: usize = 20;

const FIELD_SHARD: u64 = 1;
const FIELD_REALM: u64 = 2;
const FIELD_NUM: u64 = 3;
const FIELD_ALIAS: u64 = 4;

// `Key` message fields.
const FIELD_KEY_ED25519: u64 = 2;
const FIELD_KEY_ECDSA_SECP256K1: u64 = 6;

const ED25519_LEN: usize = 32;
const ECDSA_SECP256K1_LEN: usize = 33;

// DER `SubjectPublicKeyInfo` prefixes, as printed by the ledger SDKs.
const ED25519_DER_PREFIX: [u8; 12] = [
    0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x03, 0x21, 0x00,
];
const ECDSA_SECP256K1_DER_PREFIX: [u8; 23] = [
    0x30, 0x36, 0x30, 0x10, 0x06, 0x07, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01, 0x06, 0x05,
    0x2b, 0x81, 0x04, 0x00, 0x0a, 0x03, 0x22, 0x00,
];

/* ------------------------------------------------------------- *
 *  Alias keys                                                    *
 * ------------------------------------------------------------- */

/// Public key used as an account alias.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PublicKey {
    /// Raw Ed25519 public key.
    Ed25519([u8; ED25519_LEN]),
    /// Compressed secp256k1 public key (`02/03 + 32 bytes`).
    EcdsaSecp256k1([u8; ECDSA_SECP256K1_LEN]),
}

impl PublicKey {
    /// Build from raw key bytes; the length selects the algorithm.
    pub fn from_raw(bytes: &[u8]) -> Result<Self> {
        if let Ok(key) = <[u8; ED25519_LEN]>::try_from(bytes) {
            return Ok(Self::Ed25519(key));
        }
        if let Ok(key) = <[u8; ECDSA_SECP256K1_LEN]>::try_from(bytes) {
            return Self::ecdsa(key);
        }
        Err(Error::InvalidAccountId(format!(
            "public key of {} bytes, expected {ED25519_LEN} or {ECDSA_SECP256K1_LEN}",
            bytes.len()
        )))
    }

    /// Build from DER `SubjectPublicKeyInfo` bytes.
    pub fn from_der(bytes: &[u8]) -> Result<Self> {
        if let Some(key) = bytes.strip_prefix(&ED25519_DER_PREFIX[..]) {
            let key = <[u8; ED25519_LEN]>::try_from(key)
                .map_err(|_| Error::InvalidAccountId("truncated Ed25519 DER key".into()))?;
            return Ok(Self::Ed25519(key));
        }
        if let Some(key) = bytes.strip_prefix(&ECDSA_SECP256K1_DER_PREFIX[..]) {
            let key = <[u8; ECDSA_SECP256K1_LEN]>::try_from(key)
                .map_err(|_| Error::InvalidAccountId("truncated secp256k1 DER key".into()))?;
            return Self::ecdsa(key);
        }
        Err(Error::InvalidAccountId("unrecognised DER public key".into()))
    }

    fn ecdsa(key: [u8; ECDSA_SECP256K1_LEN]) -> Result<Self> {
        if key[0] != 0x02 && key[0] != 0x03 {
            return Err(Error::InvalidAccountId(
                "secp256k1 alias key must be compressed".into(),
            ));
        }

        #[cfg(feature = "validate-secp256k1")]
        validate_secp256k1(&key)?;

        Ok(Self::EcdsaSecp256k1(key))
    }

    /// Raw key bytes, without any DER framing.
    pub fn as_raw(&self) -> &[u8] {
        match self {
            PublicKey::Ed25519(key) => &key[..],
            PublicKey::EcdsaSecp256k1(key) => &key[..],
        }
    }

    /// DER `SubjectPublicKeyInfo` encoding.
    pub fn to_der(&self) -> Vec<u8> {
        let prefix: &[u8] = match self {
            PublicKey::Ed25519(_) => &ED25519_DER_PREFIX,
            PublicKey::EcdsaSecp256k1(_) => &ECDSA_SECP256K1_DER_PREFIX,
        };
        let mut out = Vec::with_capacity(prefix.len() + self.as_raw().len());
        out.extend_from_slice(prefix);
        out.extend_from_slice(self.as_raw());
        out
    }

    /// Protobuf `Key` message.
    fn to_proto(&self) -> Vec<u8> {
        let field = match self {
            PublicKey::Ed25519(_) => FIELD_KEY_ED25519,
            PublicKey::EcdsaSecp256k1(_) => FIELD_KEY_ECDSA_SECP256K1,
        };
        let mut out = Vec::with_capacity(2 + self.as_raw().len());
        proto::put_bytes(&mut out, field as u8, self.as_raw());
        out
    }

    fn from_proto(buf: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(buf);
        let mut key = None;

        while let Some((field, value)) = reader.next_field()? {
            key = match (field, value) {
                (FIELD_KEY_ED25519, Value::Bytes(raw)) => {
                    let raw = <[u8; ED25519_LEN]>::try_from(raw)
                        .map_err(|_| Error::BadProto("Ed25519 alias key length"))?;
                    Some(Self::Ed25519(raw))
                }
                (FIELD_KEY_ECDSA_SECP256K1, Value::Bytes(raw)) => {
                    let raw = <[u8; ECDSA_SECP256K1_LEN]>::try_from(raw)
                        .map_err(|_| Error::BadProto("secp256k1 alias key length"))?;
                    Some(Self::ecdsa(raw)?)
                }
                _ => return Err(Error::BadProto("unsupported alias key")),
            };
        }

        key.ok_or(Error::BadProto("empty alias key"))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.to_der()))
    }
}

impl FromStr for PublicKey {
    type Err = Error;

    /// Accepts DER hex (as displayed) or raw key hex.
    fn from_str(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)
            .map_err(|e| Error::InvalidAccountId(format!("alias key is not hex: {e}")))?;
        if bytes.len() > ECDSA_SECP256K1_LEN {
            Self::from_der(&bytes)
        } else {
            Self::from_raw(&bytes)
        }
    }
}

#[cfg(feature = "validate-secp256k1")]
fn validate_secp256k1(key: &[u8]) -> Result<()> {
    secp256k1::PublicKey::from_slice(key)
        .map_err(|_| Error::InvalidAccountId("invalid secp256k1 public key".into()))?;
    Ok(())
}

/* ------------------------------------------------------------- *
 *  Entity ids (tokens, contracts)                                *
 * ------------------------------------------------------------- */

/// `shard.realm.num` identifier of a token or contract.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    /// Shard number.
    pub shard: u64,
    /// Realm number.
    pub realm: u64,
    /// Entity number.
    pub num: u64,
}

impl EntityId {
    /// Build from components.
    pub const fn new(shard: u64, realm: u64, num: u64) -> Self {
        Self { shard, realm, num }
    }
}

/// Split `shard.realm.rest`, dropping an optional `-checksum` suffix.
fn split_triplet(s: &str) -> Result<(u64, u64, &str)> {
    let body = s.trim();
    let body = body.split_once('-').map_or(body, |(id, _checksum)| id);

    let mut parts = body.split('.');
    let (Some(shard), Some(realm), Some(rest), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(Error::InvalidAccountId(format!(
            "`{s}` is not of the form `shard.realm.num`"
        )));
    };

    let number = |part: &str| {
        part.parse::<u64>()
            .map_err(|_| Error::InvalidAccountId(format!("`{part}` is not a number in `{s}`")))
    };

    Ok((number(shard)?, number(realm)?, rest))
}

impl FromStr for EntityId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (shard, realm, num) = split_triplet(s)?;
        let num = num
            .parse::<u64>()
            .map_err(|_| Error::InvalidAccountId(format!("`{num}` is not a number in `{s}`")))?;
        Ok(Self { shard, realm, num })
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}

/* ------------------------------------------------------------- *
 *  Account ids                                                   *
 * ------------------------------------------------------------- */

/// What identifies the account within its shard and realm.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AccountKind {
    /// Sequential account number.
    Num(u64),
    /// Public key alias (the account number is not known).
    Alias(PublicKey),
}

/// Ledger account identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct AccountId {
    /// Shard number.
    pub shard: u64,
    /// Realm number.
    pub realm: u64,
    /// Account number or alias key.
    pub kind: AccountKind,
}

impl AccountId {
    /// Numbered account `shard.realm.num`.
    pub const fn new(shard: u64, realm: u64, num: u64) -> Self {
        Self {
            shard,
            realm,
            kind: AccountKind::Num(num),
        }
    }

    /// Alias-keyed account `shard.realm.<key>`.
    pub const fn from_alias(shard: u64, realm: u64, key: PublicKey) -> Self {
        Self {
            shard,
            realm,
            kind: AccountKind::Alias(key),
        }
    }

    /// Account number; zero for alias-keyed accounts.
    pub fn num(&self) -> u64 {
        match self.kind {
            AccountKind::Num(num) => num,
            AccountKind::Alias(_) => 0,
        }
    }

    /// Alias key, if the account is alias-keyed.
    pub fn alias_key(&self) -> Option<&PublicKey> {
        match &self.kind {
            AccountKind::Alias(key) => Some(key),
            AccountKind::Num(_) => None,
        }
    }

    /// Protobuf `AccountID` encoding. Shard and realm are always written,
    /// even when zero.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        proto::put_uint64(&mut out, FIELD_SHARD as u8, self.shard);
        proto::put_uint64(&mut out, FIELD_REALM as u8, self.realm);
        match &self.kind {
            AccountKind::Num(num) => proto::put_uint64(&mut out, FIELD_NUM as u8, *num),
            AccountKind::Alias(key) => proto::put_bytes(&mut out, FIELD_ALIAS as u8, &key.to_proto()),
        }
        out
    }

    /// Decode a protobuf `AccountID`. Missing fields default to zero.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let mut id = Self::new(0, 0, 0);

        while let Some((field, value)) = reader.next_field()? {
            match (field, value) {
                (FIELD_SHARD, Value::Varint(v)) => id.shard = v,
                (FIELD_REALM, Value::Varint(v)) => id.realm = v,
                (FIELD_NUM, Value::Varint(v)) => id.kind = AccountKind::Num(v),
                (FIELD_ALIAS, Value::Bytes(key)) => {
                    id.kind = AccountKind::Alias(PublicKey::from_proto(key)?)
                }
                (FIELD_SHARD..=FIELD_ALIAS, _) => {
                    return Err(Error::BadProto("unexpected wire type in AccountID"))
                }
                // unknown fields are skipped
                _ => {}
            }
        }

        Ok(id)
    }

    /// 20-byte solidity address form.
    ///
    /// # Errors
    ///
    /// Fails for alias-keyed accounts and for shards that do not fit in 32 bits.
    pub fn to_solidity_address(&self) -> Result<[u8; SOLIDITY_ADDRESS_LEN]> {
        let AccountKind::Num(num) = self.kind else {
            return Err(Error::InvalidAccountId(
                "alias-keyed accounts have no solidity address".into(),
            ));
        };
        let shard = u32::try_from(self.shard).map_err(|_| {
            Error::InvalidAccountId(format!("shard {} does not fit a solidity address", self.shard))
        })?;

        let mut out = [0u8; SOLIDITY_ADDRESS_LEN];
        out[..4].copy_from_slice(&shard.to_be_bytes());
        out[4..12].copy_from_slice(&self.realm.to_be_bytes());
        out[12..].copy_from_slice(&num.to_be_bytes());
        Ok(out)
    }

    /// Decode the 20-byte solidity address form.
    pub fn from_solidity_address(bytes: &[u8]) -> Result<Self> {
        let bytes = <&[u8; SOLIDITY_ADDRESS_LEN]>::try_from(bytes).map_err(|_| {
            Error::InvalidAccountId(format!(
                "solidity address of {} bytes, expected {SOLIDITY_ADDRESS_LEN}",
                bytes.len()
            ))
        })?;

        let mut shard = [0u8; 4];
        let mut realm = [0u8; 8];
        let mut num = [0u8; 8];
        shard.copy_from_slice(&bytes[..4]);
        realm.copy_from_slice(&bytes[4..12]);
        num.copy_from_slice(&bytes[12..]);

        Ok(Self::new(
            u64::from(u32::from_be_bytes(shard)),
            u64::from_be_bytes(realm),
            u64::from_be_bytes(num),
        ))
    }
}

impl FromStr for AccountId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (shard, realm, rest) = split_triplet(s)?;

        if !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()) {
            let num = rest
                .parse::<u64>()
                .map_err(|_| Error::InvalidAccountId(format!("account number out of range in `{s}`")))?;
            return Ok(Self::new(shard, realm, num));
        }

        Ok(Self::from_alias(shard, realm, rest.parse()?))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            AccountKind::Num(num) => write!(f, "{}.{}.{}", self.shard, self.realm, num),
            AccountKind::Alias(key) => write!(f, "{}.{}.{}", self.shard, self.realm, key),
        }
    }
}

/* ------------------------------------------------------------- *
 *  serde: ids travel as strings                                  *
 * ------------------------------------------------------------- */

macro_rules! serde_via_str {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
                let text = String::deserialize(deserializer)?;
                text.parse::<$ty>().map_err(de::Error::custom)
            }
        }
    };
}

serde_via_str!(EntityId);
serde_via_str!(AccountId);
