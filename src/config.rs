//! Client configuration.

use crate::hbar::Hbar;
use core::fmt;
use core::str::FromStr;
use core::time::Duration;
use serde::{Deserialize, Serialize};

/* ------------------------------------------------------------- *
 *  Network ⇄ endpoints                                           *
 * ------------------------------------------------------------- */

/// Ledger networks the name service is deployed on.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Hedera testnet.
    #[default]
    Testnet,
    /// Hedera mainnet.
    Mainnet,
}

impl Network {
    /// Lowercase network name.
    pub fn name(self) -> &'static str {
        match self {
            Network::Testnet => "testnet",
            Network::Mainnet => "mainnet",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "testnet" => Some(Network::Testnet),
            "mainnet" => Some(Network::Mainnet),
            _ => None,
        }
    }

    /// Default resolver API base URL.
    pub fn resolver_url(self) -> &'static str {
        match self {
            Network::Testnet => "https://ns.testnet.kabuto.sh/api",
            Network::Mainnet => "https://ns.kabuto.sh/api",
        }
    }

    /// Default mirror node base URL.
    pub fn mirror_url(self) -> &'static str {
        match self {
            Network::Testnet => "https://testnet.mirrornode.hedera.com/",
            Network::Mainnet => "https://mainnet-public.mirrornode.hedera.com/",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownNetwork(s.to_string()))
    }
}

/// A network name that is neither `testnet` nor `mainnet`.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
#[error("unknown network: {0}")]
pub struct UnknownNetwork(pub String);

/* ------------------------------------------------------------- *
 *  ClientConfig                                                  *
 * ------------------------------------------------------------- */

/// Name service client configuration.
///
/// Every field has a default, so a config file only needs the keys it
/// changes:
///
/// ```
/// let config: kns_sdk::ClientConfig =
///     serde_json::from_str(r#"{ "network": "mainnet" }"#).unwrap();
/// assert_eq!(config.resolver_url(), "https://ns.kabuto.sh/api");
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Network to talk to.
    pub network: Network,
    /// Resolver base URL; the network default when unset.
    pub resolver_url: Option<String>,
    /// Mirror node base URL; the network default when unset.
    pub mirror_url: Option<String>,
    /// Max fee attached to every transaction.
    pub max_transaction_fee: Hbar,
    /// How long a fetched exchange rate is reused.
    pub exchange_rate_ttl_secs: u64,
    /// How long TLD and name ids are reused.
    pub id_cache_ttl_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            network: Network::Testnet,
            resolver_url: None,
            mirror_url: None,
            max_transaction_fee: Hbar::new(8),
            exchange_rate_ttl_secs: 10 * 60,
            id_cache_ttl_secs: 60 * 60,
        }
    }
}

impl ClientConfig {
    /// Defaults for `network`.
    pub fn for_network(network: Network) -> Self {
        Self {
            network,
            ..Self::default()
        }
    }

    /// Effective resolver base URL.
    pub fn resolver_url(&self) -> &str {
        self.resolver_url
            .as_deref()
            .unwrap_or_else(|| self.network.resolver_url())
    }

    /// Effective mirror node base URL.
    pub fn mirror_url(&self) -> &str {
        self.mirror_url
            .as_deref()
            .unwrap_or_else(|| self.network.mirror_url())
    }

    /// Exchange rate time-to-live.
    pub fn exchange_rate_ttl(&self) -> Duration {
        Duration::from_secs(self.exchange_rate_ttl_secs)
    }

    /// TLD / name id time-to-live.
    pub fn id_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.id_cache_ttl_secs)
    }
}
