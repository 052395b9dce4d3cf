//! Ledger transaction collaborators.
//!
//! The facade only builds [`Transaction`] values out of pre-encoded contract
//! parameters. Freezing, signing and submitting is the [`Signer`]'s job;
//! fetching the receipt is the [`Ledger`]'s.

use crate::account::{AccountId, EntityId};
use crate::bytes::{to_bytes32, BYTES32_LEN};
use crate::error::BoxError;
use crate::hbar::Hbar;
use crate::Result;
use async_trait::async_trait;
use core::fmt;

/// Gas for `purchaseZone` and `extendZoneLifetime`.
pub const PURCHASE_GAS: u64 = 2_860_000;
/// Gas for `setAddress` and `setText`.
pub const SET_RECORD_GAS: u64 = 300_000;
/// Gas for `deleteAddress` and `deleteText`.
pub const DELETE_RECORD_GAS: u64 = 200_000;

/// One ABI-typed argument of a contract call.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ContractParam {
    /// `bytes32`
    Bytes32([u8; BYTES32_LEN]),
    /// `bytes`
    Bytes(Vec<u8>),
    /// `string`
    String(String),
    /// `uint32`
    Uint32(u32),
    /// `int64`
    Int64(i64),
    /// `uint256`, limited to 64 bits here.
    Uint256(u64),
}

/// Ordered arguments of a contract call.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ContractFunctionParams(Vec<ContractParam>);

impl ContractFunctionParams {
    /// No arguments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a `bytes32` holding `bytes`, right-padded with zeros.
    pub fn add_bytes32(mut self, bytes: &[u8]) -> Result<Self> {
        self.0.push(ContractParam::Bytes32(to_bytes32(bytes)?));
        Ok(self)
    }

    /// Append `bytes`.
    pub fn add_bytes(mut self, bytes: Vec<u8>) -> Self {
        self.0.push(ContractParam::Bytes(bytes));
        self
    }

    /// Append `string`.
    pub fn add_string(mut self, text: impl Into<String>) -> Self {
        self.0.push(ContractParam::String(text.into()));
        self
    }

    /// Append `uint32`.
    pub fn add_uint32(mut self, value: u32) -> Self {
        self.0.push(ContractParam::Uint32(value));
        self
    }

    /// Append `int64`.
    pub fn add_int64(mut self, value: i64) -> Self {
        self.0.push(ContractParam::Int64(value));
        self
    }

    /// Append `uint256`.
    pub fn add_uint256(mut self, value: u64) -> Self {
        self.0.push(ContractParam::Uint256(value));
        self
    }

    /// Arguments in call order.
    pub fn as_slice(&self) -> &[ContractParam] {
        &self.0
    }
}

/// Smart contract call.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ContractExecute {
    pub contract_id: EntityId,
    /// Solidity function name.
    pub function: &'static str,
    pub params: ContractFunctionParams,
    /// HBAR sent along with the call.
    pub payable_amount: Hbar,
    pub gas: u64,
    pub max_transaction_fee: Hbar,
}

/// Token association.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TokenAssociate {
    pub account_id: AccountId,
    pub token_ids: Vec<EntityId>,
    pub max_transaction_fee: Hbar,
}

/// A transaction the facade asks a [`Signer`] to submit.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Transaction {
    ContractExecute(ContractExecute),
    TokenAssociate(TokenAssociate),
}

/// Opaque id of a submitted transaction (`0.0.123@1700000000.000000000`).
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct TransactionId(pub String);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Receipt of a child transaction.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ChildReceipt {
    /// Serials of NFTs minted by the child.
    pub serials: Vec<i64>,
}

/// Receipt of a submitted transaction, children included.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Receipt {
    pub children: Vec<ChildReceipt>,
}

impl Receipt {
    /// First serial minted by any child transaction.
    pub fn minted_serial(&self) -> Option<i64> {
        self.children
            .iter()
            .find_map(|child| child.serials.first().copied())
    }
}

/// Signing capability supplied by the caller (a wallet, a key, an HSM).
#[async_trait]
pub trait Signer: Send + Sync {
    /// Account that pays for and signs transactions.
    fn account_id(&self) -> AccountId;

    /// Sign and submit `transaction`.
    ///
    /// `Ok(None)` means the signer declined without an error.
    async fn call(&self, transaction: &Transaction) -> std::result::Result<Option<TransactionId>, BoxError>;
}

/// Receipt lookup against the ledger.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Receipt of `transaction_id`, including child receipts. Implementations
    /// wait for consensus and fail on a non-success status.
    async fn receipt(&self, transaction_id: &TransactionId) -> Result<Receipt>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn params_keep_order() {
        let params = ContractFunctionParams::new()
            .add_int64(32_001)
            .add_bytes32(b"sub")
            .unwrap()
            .add_uint32(3030)
            .add_bytes(vec![1, 2]);

        let mut label = [0u8; 32];
        label[..3].copy_from_slice(b"sub");
        assert_eq!(
            params.as_slice(),
            &[
                ContractParam::Int64(32_001),
                ContractParam::Bytes32(label),
                ContractParam::Uint32(3030),
                ContractParam::Bytes(vec![1, 2]),
            ]
        );
    }

    #[test]
    fn oversized_label_is_rejected() {
        let label = "a".repeat(33);
        assert!(matches!(
            ContractFunctionParams::new().add_bytes32(label.as_bytes()),
            Err(Error::ValueTooLarge { len: 33, max: 32 })
        ));
    }

    #[test]
    fn minted_serial_skips_empty_children() {
        let receipt = Receipt {
            children: vec![
                ChildReceipt::default(),
                ChildReceipt { serials: vec![77, 78] },
            ],
        };
        assert_eq!(receipt.minted_serial(), Some(77));
        assert_eq!(Receipt::default().minted_serial(), None);
    }
}
