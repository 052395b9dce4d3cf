//! Client SDK for the Kabuto Name Service (KNS) on Hedera.
//!
//! # Crate Overview
//! Names are NFTs minted by a registry contract, one registry per top-level
//! domain (`example.hh`, `example.ℏ`). Each name carries address records keyed
//! by [SLIP-44](https://github.com/satoshilabs/slips/blob/master/slip-0044.md)
//! coin type and free-form text records, optionally under sub-labels
//! (`pay.example.hh`).
//!
//! The crate has two layers:
//! * A pure layer: name parsing ([`parse_name`]), the per-coin address codec
//!   ([`serialize_address`], [`format_address`]), account ids ([`AccountId`])
//!   and registration pricing ([`register_price_usd`]).
//! * The [`NameService`] facade, which reads through a [`Resolver`] and a
//!   [`Mirror`] and writes through a caller-supplied [`Signer`].
//!
//! ```rust
//! use kns_sdk::{format_address, serialize_address, AccountId, CoinType};
//!
//! let account: AccountId = "50.20.1040".parse()?;
//! let bytes = serialize_address(CoinType::HBAR, account)?;
//! assert_eq!(kns_sdk::bytes::hex_encode(&bytes), "0000003200000000000000140000000000000410");
//! assert_eq!(format_address(CoinType::HBAR, &bytes), "50.20.1040");
//! # Ok::<(), kns_sdk::Error>(())
//! ```
//!
//! ## Feature Flags
//! * **`client`** *(default)*: `reqwest`-backed [`HttpResolver`] and
//!   [`HttpMirror`], plus [`NameService::connect`].
//! * **`validate-secp256k1`**: check that ECDSA alias keys are points on the
//!   curve using the `secp256k1` crate.
//!
//! ## MSRV
//! Minimum supported Rust version: **1.75**.

#![forbid(unsafe_code)]

pub mod account;
pub mod bytes;
pub mod cache;
pub mod client;
pub mod codec;
pub mod coin;
pub mod config;
pub mod error;
pub mod hbar;
#[cfg(feature = "client")]
pub mod http;
pub mod ledger;
pub mod mirror;
pub mod models;
pub mod name;
pub mod price;
mod proto;
pub mod resolver;

pub use account::{AccountId, AccountKind, EntityId, PublicKey};
pub use client::NameService;
pub use codec::{
    deserialize_ledger_address, format_address, serialize_account_id, serialize_address,
    serialize_ledger_address, AddressInput,
};
pub use coin::{AddressFormat, CoinType};
pub use config::{ClientConfig, Network};
pub use error::{BoxError, Error, Result};
pub use hbar::Hbar;
#[cfg(feature = "client")]
pub use http::{HttpMirror, HttpResolver};
pub use ledger::{
    ChildReceipt, ContractExecute, ContractFunctionParams, ContractParam, Ledger, Receipt, Signer,
    TokenAssociate, Transaction, TransactionId,
};
pub use mirror::Mirror;
pub use models::{AddressRecord, Name, NameId, OwnedName, Records, RegistryVersion, TextRecord, TldId};
pub use name::{
    normalize_name, normalize_record_name, parse_name, parse_record_name, ParsedName,
    ParsedRecordName,
};
pub use price::{register_price_hbar, register_price_usd, UsdPrice};
pub use resolver::Resolver;
