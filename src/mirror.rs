//! Mirror node collaborator: read-only ledger state.

use crate::account::{AccountId, EntityId};
use crate::Result;
use async_trait::async_trait;
use serde::Deserialize;

/// Read-only lookups against a ledger mirror node.
#[async_trait]
pub trait Mirror: Send + Sync {
    /// Current holder of NFT `serial` of `token_id`.
    async fn nft_owner(&self, token_id: &EntityId, serial: i64) -> Result<AccountId>;

    /// Tokens `account` is associated with.
    async fn account_token_ids(&self, account: &AccountId) -> Result<Vec<EntityId>>;
}

/// `/api/v1/tokens/{token}/nfts/{serial}` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct NftInfo {
    pub account_id: AccountId,
}

/// `/api/v1/accounts/{account}` payload, reduced to token balances.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountInfo {
    pub balance: AccountBalance,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountBalance {
    #[serde(default)]
    pub tokens: Vec<TokenBalance>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenBalance {
    pub token_id: EntityId,
}

impl AccountInfo {
    /// Ids of every associated token.
    pub fn token_ids(&self) -> Vec<EntityId> {
        self.balance.tokens.iter().map(|t| t.token_id).collect()
    }
}
