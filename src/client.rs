//! The name service facade.

use crate::account::{AccountId, EntityId};
use crate::bytes::base64_decode;
use crate::cache::NameServiceCache;
use crate::codec::{deserialize_ledger_address, format_address, serialize_address, serialize_ledger_address, AddressInput};
use crate::coin::CoinType;
use crate::config::ClientConfig;
use crate::hbar::Hbar;
use crate::ledger::{
    ContractExecute, ContractFunctionParams, Ledger, Receipt, Signer, TokenAssociate, Transaction,
    DELETE_RECORD_GAS, PURCHASE_GAS, SET_RECORD_GAS,
};
use crate::mirror::Mirror;
use crate::models::{AddressRecord, Name, NameId, OwnedName, Records, RegistryVersion, TextRecord, TldId};
use crate::name::{normalize_name, normalize_record_name, parse_name, parse_record_name, ParsedName};
use crate::price::{self, UsdPrice};
use crate::resolver::Resolver;
use crate::{Error, Result};
use chrono::{DateTime, Months, Utc};
use std::sync::Arc;

/// Client for reading and writing names.
///
/// Reads go through the [`Resolver`] and [`Mirror`]; writes are built here,
/// signed and submitted by the configured [`Signer`], and confirmed through
/// the [`Ledger`]. TLD ids, name ids and the exchange rate are memoized per
/// instance.
pub struct NameService {
    config: ClientConfig,
    resolver: Arc<dyn Resolver>,
    mirror: Arc<dyn Mirror>,
    ledger: Arc<dyn Ledger>,
    signer: Option<Arc<dyn Signer>>,
    cache: NameServiceCache,
}

impl NameService {
    /// Assemble a client from its collaborators.
    pub fn new(
        config: ClientConfig,
        resolver: Arc<dyn Resolver>,
        mirror: Arc<dyn Mirror>,
        ledger: Arc<dyn Ledger>,
    ) -> Self {
        let cache = NameServiceCache::new(&config);
        Self {
            config,
            resolver,
            mirror,
            ledger,
            signer: None,
            cache,
        }
    }

    /// Client using the HTTP resolver and mirror node from `config`.
    #[cfg(feature = "client")]
    pub fn connect(config: ClientConfig, ledger: Arc<dyn Ledger>) -> Result<Self> {
        let http = reqwest::Client::new();
        let resolver = crate::http::HttpResolver::with_client(config.resolver_url(), http.clone())?;
        let mirror = crate::http::HttpMirror::with_client(config.mirror_url(), http)?;
        tracing::debug!(
            "name service on {} (resolver {}, mirror {})",
            config.network,
            config.resolver_url(),
            config.mirror_url()
        );
        Ok(Self::new(config, Arc::new(resolver), Arc::new(mirror), ledger))
    }

    /// Signer used for every write operation. Must be set before any write.
    pub fn set_signer(&mut self, signer: Arc<dyn Signer>) {
        self.signer = Some(signer);
    }

    /// Active configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Memoized lookups.
    pub fn cache(&self) -> &NameServiceCache {
        &self.cache
    }

    /* --------------------------------------------------------- *
     *  Pricing                                                   *
     * --------------------------------------------------------- */

    /// Estimated yearly price of `name` in USD. Does not check availability.
    pub fn register_price_usd(&self, name: &str) -> Result<UsdPrice> {
        price::register_price_usd(name)
    }

    /// Estimated yearly price of `name` in HBAR at the current exchange rate.
    /// Does not check availability.
    pub async fn register_price_hbar(&self, name: &str) -> Result<Hbar> {
        let usd = self.register_price_usd(name)?;
        let rate = self.exchange_rate().await?;
        price::register_price_hbar(name, usd, rate)
    }

    async fn price_for_years(&self, name: &str, years: u32) -> Result<Hbar> {
        let unit = self.register_price_hbar(name).await?;
        unit.checked_mul(i64::from(years))
            .ok_or_else(|| Error::Unregistrable(name.to_string()))
    }

    async fn exchange_rate(&self) -> Result<f64> {
        if let Some(rate) = self.cache.exchange_rate.get(&()) {
            return Ok(rate);
        }

        let rate = self.resolver.exchange_rate().await?;
        tracing::debug!("fetched exchange rate: {} USD/HBAR", rate);
        self.cache.exchange_rate.insert((), rate);
        Ok(rate)
    }

    /* --------------------------------------------------------- *
     *  Token association                                         *
     * --------------------------------------------------------- */

    /// Whether the signer is associated with the token of `name`'s registry.
    /// Each TLD has its own token.
    pub async fn is_associated_for_name(&self, name: &str) -> Result<bool> {
        let signer = self.require_signer()?;
        let parsed = parse_name(name)?;
        let token_id = self.token_id_for_name(&parsed).await?;

        let tokens = self.mirror.account_token_ids(&signer.account_id()).await?;
        Ok(tokens.contains(&token_id))
    }

    /// Associate the signer with the token of `name`'s registry.
    pub async fn associate_name(&self, name: &str) -> Result<()> {
        let signer = self.require_signer()?;
        let parsed = parse_name(name)?;
        let token_id = self.token_id_for_name(&parsed).await?;

        let transaction = Transaction::TokenAssociate(TokenAssociate {
            account_id: signer.account_id(),
            token_ids: vec![token_id],
            max_transaction_fee: self.config.max_transaction_fee,
        });
        self.execute(transaction).await?;
        Ok(())
    }

    /// Registered names use their own registry's token; unregistered names
    /// will be minted into the TLD's current one.
    async fn token_id_for_name(&self, parsed: &ParsedName) -> Result<EntityId> {
        match self.name_id(parsed).await {
            Ok(id) => Ok(id.token_id),
            Err(Error::NameNotFound) => Ok(self.v3_tld_id(&parsed.top_level_domain).await?.token_id),
            Err(e) => Err(e),
        }
    }

    /* --------------------------------------------------------- *
     *  Registration                                              *
     * --------------------------------------------------------- */

    /// Register `name` to the signer for `years`. See
    /// [`NameService::register_price_hbar`] for the yearly cost.
    pub async fn register_name(&self, name: &str, years: u32) -> Result<Name> {
        let signer = self.require_signer()?;
        let parsed = parse_name(name)?;
        let tld = self.v3_tld_id(&parsed.top_level_domain).await?;
        let price = self.price_for_years(name, years).await?;

        let params = ContractFunctionParams::new()
            .add_bytes32(parsed.second_level_domain.as_bytes())?
            .add_uint256(u64::from(years));

        let receipt = self
            .execute(self.contract_call(tld.contract_id, "purchaseZone", params, price, PURCHASE_GAS))
            .await?;
        let serial_number = receipt.minted_serial().ok_or(Error::MissingSerial)?;

        let version = RegistryVersion::V3;
        let name_id = NameId {
            token_id: tld.token_id,
            contract_id: tld.contract_id,
            serial_number,
            contract_serial_number: version.to_contract_serial(serial_number),
            version,
        };

        let domain = parsed.to_string();
        self.cache.name_ids.insert(domain.clone(), name_id);
        tracing::info!("registered {} (serial {})", domain, serial_number);

        Ok(Name {
            domain,
            owner_account_id: signer.account_id(),
            serial_number,
            contract_serial_number: name_id.contract_serial_number,
            expiration_time: add_years(Utc::now(), years),
            contract_id: name_id.contract_id,
            token_id: name_id.token_id,
            version,
        })
    }

    /// Extend the registration of `name` by `years`. The signer must own it.
    pub async fn extend_name_registration(&self, name: &str, years: u32) -> Result<Name> {
        self.require_signer()?;
        let parsed = parse_name(name)?;
        let mut registered = self.get_name(name).await?;
        let price = self.price_for_years(name, years).await?;

        let params = ContractFunctionParams::new()
            .add_bytes32(parsed.second_level_domain.as_bytes())?
            .add_uint256(u64::from(years));

        self.execute(self.contract_call(
            registered.contract_id,
            "extendZoneLifetime",
            params,
            price,
            PURCHASE_GAS,
        ))
        .await?;

        registered.expiration_time = add_years(registered.expiration_time, years);
        Ok(registered)
    }

    /* --------------------------------------------------------- *
     *  Reads                                                     *
     * --------------------------------------------------------- */

    /// Registration info for `name`.
    ///
    /// # Errors
    ///
    /// [`Error::NameNotFound`] when the name is not registered or expired.
    pub async fn get_name(&self, name: &str) -> Result<Name> {
        let domain = normalize_name(name)?;
        let info = self.resolver.name(&domain).await?;
        let id = info.name_id()?;
        let owner_account_id = self.mirror.nft_owner(&id.token_id, id.serial_number).await?;

        Ok(Name {
            domain,
            owner_account_id,
            serial_number: id.serial_number,
            contract_serial_number: id.contract_serial_number,
            expiration_time: info.expires_at,
            contract_id: id.contract_id,
            token_id: id.token_id,
            version: id.version,
        })
    }

    /// All address and text records of `name`.
    pub async fn get_all(&self, name: &str) -> Result<Records> {
        let raw = self.resolver.records(&normalize_name(name)?).await?;
        let address = raw
            .address
            .into_iter()
            .map(|rec| rec.into_record())
            .collect::<Result<Vec<_>>>()?;

        Ok(Records {
            address,
            text: raw.text,
        })
    }

    /// All address records of `name`.
    pub async fn get_all_address(&self, name: &str) -> Result<Vec<AddressRecord>> {
        Ok(self.get_all(name).await?.address)
    }

    /// All text records of `name`.
    pub async fn get_all_text(&self, name: &str) -> Result<Vec<TextRecord>> {
        Ok(self.get_all(name).await?.text)
    }

    /// Canonical address bytes of record `name` for `coin_type`.
    pub async fn get_address_bytes(&self, name: &str, coin_type: CoinType) -> Result<Vec<u8>> {
        let record = self
            .resolver
            .address(&normalize_record_name(name)?, coin_type)
            .await?;
        base64_decode(&record.address)
    }

    /// Display form of record `name`'s address for `coin_type`.
    pub async fn get_address(&self, name: &str, coin_type: CoinType) -> Result<String> {
        let bytes = self.get_address_bytes(name, coin_type).await?;
        Ok(format_address(coin_type, &bytes))
    }

    /// HBAR account of record `name`.
    pub async fn get_ledger_address(&self, name: &str) -> Result<AccountId> {
        let bytes = self.get_address_bytes(name, CoinType::HBAR).await?;
        deserialize_ledger_address(&bytes)
    }

    /// Text record of `name`.
    pub async fn get_text(&self, name: &str) -> Result<String> {
        let record = self.resolver.text(&normalize_record_name(name)?).await?;
        Ok(record.text)
    }

    /// HIP-412 JSON metadata of `name`'s NFT.
    pub async fn get_metadata(&self, name: &str) -> Result<serde_json::Value> {
        self.resolver.metadata(&normalize_name(name)?).await
    }

    /// Names holding `address` as their `coin_type` record.
    pub async fn find_names_by_address(
        &self,
        coin_type: CoinType,
        address: impl Into<AddressInput>,
    ) -> Result<Vec<String>> {
        let formatted = format_address(coin_type, &serialize_address(coin_type, address)?);
        let matches = self.resolver.names_by_address(coin_type, &formatted).await?;
        Ok(matches.iter().map(|m| m.full_name()).collect())
    }

    /// Names holding `account` as their HBAR record.
    pub async fn find_names_by_ledger_address(&self, account: &AccountId) -> Result<Vec<String>> {
        self.find_names_by_address(CoinType::HBAR, *account).await
    }

    /// Names owned by `owner`, or by the signer when `None`.
    pub async fn find_names_by_owner(&self, owner: Option<&AccountId>) -> Result<Vec<OwnedName>> {
        let owner = match owner {
            Some(owner) => *owner,
            None => self.require_signer()?.account_id(),
        };
        self.resolver.names_by_owner(&owner.to_string()).await
    }

    /* --------------------------------------------------------- *
     *  Record writes                                             *
     * --------------------------------------------------------- */

    /// Set record `name`'s address for `coin_type`.
    ///
    /// Text addresses are serialized per coin type; for coin types without a
    /// known text form pass the serialized bytes instead.
    pub async fn set_address(
        &self,
        name: &str,
        coin_type: CoinType,
        address: impl Into<AddressInput>,
    ) -> Result<AddressRecord> {
        self.require_signer()?;
        let parsed = parse_record_name(name)?;
        let address_bytes = serialize_address(coin_type, address)?;
        let name_id = self.name_id(&parsed.parsed_name()).await?;

        let params = ContractFunctionParams::new()
            .add_int64(name_id.contract_serial_number)
            .add_bytes32(parsed.record_name.as_bytes())?
            .add_uint32(coin_type.0)
            .add_bytes(address_bytes.clone());

        self.execute(self.contract_call(name_id.contract_id, "setAddress", params, Hbar::ZERO, SET_RECORD_GAS))
            .await?;

        Ok(AddressRecord {
            address: format_address(coin_type, &address_bytes),
            name: parsed.record_name,
            coin_type,
            address_bytes,
        })
    }

    /// Set record `name`'s HBAR address.
    pub async fn set_ledger_address(
        &self,
        name: &str,
        address: impl Into<AddressInput>,
    ) -> Result<AddressRecord> {
        let bytes = serialize_ledger_address(address)?;
        self.set_address(name, CoinType::HBAR, bytes).await
    }

    /// Set record `name`'s text.
    pub async fn set_text(&self, name: &str, text: &str) -> Result<TextRecord> {
        self.require_signer()?;
        let parsed = parse_record_name(name)?;
        let name_id = self.name_id(&parsed.parsed_name()).await?;

        let params = ContractFunctionParams::new()
            .add_int64(name_id.contract_serial_number)
            .add_bytes32(parsed.record_name.as_bytes())?
            .add_string(text);

        self.execute(self.contract_call(name_id.contract_id, "setText", params, Hbar::ZERO, SET_RECORD_GAS))
            .await?;

        Ok(TextRecord {
            name: parsed.record_name,
            text: text.to_string(),
        })
    }

    /// Remove record `name`'s text.
    pub async fn remove_text(&self, name: &str) -> Result<()> {
        self.require_signer()?;
        let parsed = parse_record_name(name)?;
        let name_id = self.name_id(&parsed.parsed_name()).await?;

        let params = ContractFunctionParams::new()
            .add_int64(name_id.contract_serial_number)
            .add_bytes32(parsed.record_name.as_bytes())?;

        self.execute(self.contract_call(name_id.contract_id, "deleteText", params, Hbar::ZERO, DELETE_RECORD_GAS))
            .await?;
        Ok(())
    }

    /// Remove record `name`'s address for `coin_type`.
    pub async fn remove_address(&self, name: &str, coin_type: CoinType) -> Result<()> {
        self.require_signer()?;
        let parsed = parse_record_name(name)?;
        let name_id = self.name_id(&parsed.parsed_name()).await?;

        let params = ContractFunctionParams::new()
            .add_int64(name_id.contract_serial_number)
            .add_bytes32(parsed.record_name.as_bytes())?
            .add_uint32(coin_type.0);

        self.execute(self.contract_call(
            name_id.contract_id,
            "deleteAddress",
            params,
            Hbar::ZERO,
            DELETE_RECORD_GAS,
        ))
        .await?;
        Ok(())
    }

    /* --------------------------------------------------------- *
     *  Internals                                                 *
     * --------------------------------------------------------- */

    fn require_signer(&self) -> Result<&Arc<dyn Signer>> {
        self.signer.as_ref().ok_or(Error::SignerRequired)
    }

    async fn v3_tld_id(&self, tld: &str) -> Result<TldId> {
        if let Some(id) = self.cache.tld_ids.get(tld) {
            tracing::debug!("tld ids for .{} from cache", tld);
            return Ok(id);
        }

        let id = TldId::from(self.resolver.tld(tld).await?);
        self.cache.tld_ids.insert(tld.to_string(), id);
        Ok(id)
    }

    async fn name_id(&self, parsed: &ParsedName) -> Result<NameId> {
        let domain = parsed.to_string();
        if let Some(id) = self.cache.name_ids.get(domain.as_str()) {
            tracing::debug!("name ids for {} from cache", domain);
            return Ok(id);
        }

        let id = self.get_name(&domain).await?.id();
        self.cache.name_ids.insert(domain, id);
        Ok(id)
    }

    fn contract_call(
        &self,
        contract_id: EntityId,
        function: &'static str,
        params: ContractFunctionParams,
        payable_amount: Hbar,
        gas: u64,
    ) -> Transaction {
        Transaction::ContractExecute(ContractExecute {
            contract_id,
            function,
            params,
            payable_amount,
            gas,
            max_transaction_fee: self.config.max_transaction_fee,
        })
    }

    async fn execute(&self, transaction: Transaction) -> Result<Receipt> {
        let signer = self.require_signer()?;

        let transaction_id = match signer.call(&transaction).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                tracing::warn!("signer declined the transaction");
                return Err(Error::SignerRejected(None));
            }
            Err(source) => {
                tracing::warn!("signer failed: {}", source);
                return Err(Error::SignerRejected(Some(source)));
            }
        };

        tracing::info!("submitted transaction {}", transaction_id);
        self.ledger.receipt(&transaction_id).await
    }
}

fn add_years(from: DateTime<Utc>, years: u32) -> DateTime<Utc> {
    from.checked_add_months(Months::new(years.saturating_mul(12)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
