//! `reqwest`-backed resolver and mirror node clients.

use crate::account::{AccountId, EntityId};
use crate::coin::CoinType;
use crate::mirror::{AccountInfo, Mirror, NftInfo};
use crate::models::{OwnedName, TextRecord};
use crate::resolver::{AddressMatch, NameInfo, RawAddressRecord, RawRecords, Resolver, TldInfo};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Resolver responses wrap their payload in `{"data": ...}`.
#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

/// How a 404 / 400 answer is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Missing {
    /// The name is unknown or expired.
    NameNotFound,
    /// An ordinary HTTP error.
    Propagate,
}

/// Base URL plus a shared connection pool.
#[derive(Debug, Clone)]
struct Endpoint {
    base_url: Url,
    client: reqwest::Client,
}

impl Endpoint {
    fn new(base_url: &str, client: reqwest::Client) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| Error::Transport(Box::new(e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Transport(
                format!("{base_url} cannot be used as a base url").into(),
            ));
        }
        Ok(Self { base_url, client })
    }

    /// Base URL with `segments` appended, each percent-encoded.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get<R: DeserializeOwned>(&self, segments: &[&str], missing: Missing) -> Result<R> {
        let url = self.url(segments);
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if missing == Missing::NameNotFound
            && matches!(status, StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST)
        {
            tracing::debug!("name not found ({})", status);
            return Err(Error::NameNotFound);
        }

        Ok(response.error_for_status()?.json::<R>().await?)
    }
}

/* ------------------------------------------------------------- *
 *  Resolver                                                      *
 * ------------------------------------------------------------- */

/// HTTP client for the resolver API.
#[derive(Debug, Clone)]
pub struct HttpResolver {
    endpoint: Endpoint,
}

impl HttpResolver {
    /// Client for the resolver at `base_url` (e.g. `https://ns.kabuto.sh/api`).
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Same as [`HttpResolver::new`], sharing an existing `reqwest` client.
    pub fn with_client(base_url: &str, client: reqwest::Client) -> Result<Self> {
        Ok(Self {
            endpoint: Endpoint::new(base_url, client)?,
        })
    }

    async fn data<R: DeserializeOwned>(&self, segments: &[&str], missing: Missing) -> Result<R> {
        let envelope: Envelope<R> = self.endpoint.get(segments, missing).await?;
        Ok(envelope.data)
    }
}

#[derive(Deserialize)]
struct OwnedNames {
    names: Vec<OwnedName>,
}

#[derive(Deserialize)]
struct ExchangeRate {
    usd: f64,
}

#[async_trait]
impl Resolver for HttpResolver {
    async fn name(&self, name: &str) -> Result<NameInfo> {
        self.data(&["name", name], Missing::NameNotFound).await
    }

    async fn records(&self, name: &str) -> Result<RawRecords> {
        self.data(&["name", name, "record"], Missing::NameNotFound).await
    }

    async fn address(&self, record_name: &str, coin_type: CoinType) -> Result<RawAddressRecord> {
        let coin_type = coin_type.to_string();
        self.data(
            &["name", record_name, "record", "address", coin_type.as_str()],
            Missing::NameNotFound,
        )
        .await
    }

    async fn text(&self, record_name: &str) -> Result<TextRecord> {
        self.data(&["name", record_name, "record", "text"], Missing::NameNotFound)
            .await
    }

    async fn metadata(&self, name: &str) -> Result<serde_json::Value> {
        self.endpoint
            .get(&["name", name, "metadata"], Missing::NameNotFound)
            .await
    }

    async fn tld(&self, tld: &str) -> Result<TldInfo> {
        let segment = format!(".{tld}");
        self.data(&["name", segment.as_str()], Missing::NameNotFound).await
    }

    async fn names_by_owner(&self, owner: &str) -> Result<Vec<OwnedName>> {
        let names: OwnedNames = self.data(&["owner", owner], Missing::Propagate).await?;
        Ok(names.names)
    }

    async fn names_by_address(&self, coin_type: CoinType, address: &str) -> Result<Vec<AddressMatch>> {
        let coin_type = coin_type.to_string();
        self.data(
            &["record", "address", coin_type.as_str(), address, "name"],
            Missing::Propagate,
        )
        .await
    }

    async fn exchange_rate(&self) -> Result<f64> {
        let rate: ExchangeRate = self.data(&["exchange-rate"], Missing::Propagate).await?;
        Ok(rate.usd)
    }
}

/* ------------------------------------------------------------- *
 *  Mirror node                                                   *
 * ------------------------------------------------------------- */

/// HTTP client for a mirror node REST API.
#[derive(Debug, Clone)]
pub struct HttpMirror {
    endpoint: Endpoint,
}

impl HttpMirror {
    /// Client for the mirror node at `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Same as [`HttpMirror::new`], sharing an existing `reqwest` client.
    pub fn with_client(base_url: &str, client: reqwest::Client) -> Result<Self> {
        Ok(Self {
            endpoint: Endpoint::new(base_url, client)?,
        })
    }
}

#[async_trait]
impl Mirror for HttpMirror {
    async fn nft_owner(&self, token_id: &EntityId, serial: i64) -> Result<AccountId> {
        let token_id = token_id.to_string();
        let serial = serial.to_string();
        let nft: NftInfo = self
            .endpoint
            .get(
                &["api", "v1", "tokens", token_id.as_str(), "nfts", serial.as_str()],
                Missing::Propagate,
            )
            .await?;
        Ok(nft.account_id)
    }

    async fn account_token_ids(&self, account: &AccountId) -> Result<Vec<EntityId>> {
        let account = account.to_string();
        let info: AccountInfo = self
            .endpoint
            .get(&["api", "v1", "accounts", account.as_str()], Missing::Propagate)
            .await?;
        Ok(info.token_ids())
    }
}
