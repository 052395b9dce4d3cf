use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use kns_sdk::mirror::Mirror;
use kns_sdk::resolver::{AddressMatch, NameInfo, RawAddressRecord, RawRecords, Resolver, TldInfo};
use kns_sdk::{
    AccountId, BoxError, ChildReceipt, ClientConfig, CoinType, ContractParam, EntityId, Error, Hbar,
    Ledger, NameService, OwnedName, Receipt, RegistryVersion, Result, Signer, TextRecord,
    Transaction, TransactionId,
};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const SIGNER: AccountId = AccountId::new(0, 0, 4242);
const TLD_CONTRACT: EntityId = EntityId::new(0, 0, 900);
const TLD_TOKEN: EntityId = EntityId::new(0, 0, 901);

/* ------------------------------------------------------------- *
 *  Mock collaborators                                            *
 * ------------------------------------------------------------- */

#[derive(Default)]
struct MockResolver {
    exchange_rate_calls: AtomicUsize,
    tld_calls: AtomicUsize,
    name_calls: AtomicUsize,
    owner_queries: Mutex<Vec<String>>,
    address_queries: Mutex<Vec<(CoinType, String)>>,
}

fn registered(serial: i64) -> NameInfo {
    serde_json::from_value(json!({
        "v1ContractId": "0.0.100",
        "v1TokenId": "0.0.101",
        "v3ContractId": TLD_CONTRACT.to_string(),
        "v3TokenId": TLD_TOKEN.to_string(),
        "expiresAt": "2030-06-01T00:00:00Z",
        "tokenSerialNumber": serial,
    }))
    .unwrap()
}

#[async_trait]
impl Resolver for MockResolver {
    async fn name(&self, name: &str) -> Result<NameInfo> {
        self.name_calls.fetch_add(1, Ordering::SeqCst);
        match name {
            "taken.hh" => Ok(registered(32_007)),
            "legacy.hh" => Ok(registered(12)),
            _ => Err(Error::NameNotFound),
        }
    }

    async fn records(&self, name: &str) -> Result<RawRecords> {
        assert_eq!(name, "taken.hh");
        Ok(serde_json::from_value(json!({
            "address": [
                { "name": "", "coinType": 3030, "address": "AAAAMgAAAAAAAAAUAAAAAAAABBA=" },
                { "name": "btc", "coinType": 0, "address": "MUExelAxZVA1UUdlZmkyRE1QVGZUTDVTTG12N0RpdmZOYQ==" },
            ],
            "text": [{ "name": "", "text": "hello" }],
        }))
        .unwrap())
    }

    async fn address(&self, record_name: &str, coin_type: CoinType) -> Result<RawAddressRecord> {
        assert_eq!(record_name, "pay.taken.ℏ");
        assert_eq!(coin_type, CoinType::HBAR);
        Ok(RawAddressRecord {
            name: "pay".into(),
            coin_type,
            address: "AAAAMgAAAAAAAAAUAAAAAAAABBA=".into(),
        })
    }

    async fn text(&self, record_name: &str) -> Result<TextRecord> {
        Ok(TextRecord {
            name: record_name.into(),
            text: "gm".into(),
        })
    }

    async fn metadata(&self, _name: &str) -> Result<serde_json::Value> {
        Ok(json!({ "name": "taken.hh", "type": "image/png" }))
    }

    async fn tld(&self, tld: &str) -> Result<TldInfo> {
        self.tld_calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(tld, "hh");
        Ok(TldInfo {
            v3_contract_id: TLD_CONTRACT,
            v3_token_id: TLD_TOKEN,
        })
    }

    async fn names_by_owner(&self, owner: &str) -> Result<Vec<OwnedName>> {
        self.owner_queries.lock().push(owner.to_string());
        Ok(serde_json::from_value(json!([
            { "name": "taken.hh", "expiresAt": "2030-06-01T00:00:00Z" },
        ]))
        .unwrap())
    }

    async fn names_by_address(&self, coin_type: CoinType, address: &str) -> Result<Vec<AddressMatch>> {
        self.address_queries.lock().push((coin_type, address.to_string()));
        Ok(vec![AddressMatch {
            domain: "taken".into(),
            parent: "hh".into(),
        }])
    }

    async fn exchange_rate(&self) -> Result<f64> {
        self.exchange_rate_calls.fetch_add(1, Ordering::SeqCst);
        Ok(0.05)
    }
}

#[derive(Default)]
struct MockMirror {
    associated: Mutex<Vec<EntityId>>,
}

#[async_trait]
impl Mirror for MockMirror {
    async fn nft_owner(&self, token_id: &EntityId, serial: i64) -> Result<AccountId> {
        assert!(serial > 0);
        assert!(*token_id == TLD_TOKEN || *token_id == EntityId::new(0, 0, 101));
        Ok(AccountId::new(0, 0, 777))
    }

    async fn account_token_ids(&self, account: &AccountId) -> Result<Vec<EntityId>> {
        assert_eq!(*account, SIGNER);
        Ok(self.associated.lock().clone())
    }
}

struct MockLedger {
    minted: Vec<i64>,
}

#[async_trait]
impl Ledger for MockLedger {
    async fn receipt(&self, transaction_id: &TransactionId) -> Result<Receipt> {
        assert_eq!(transaction_id.0, "0.0.4242@1700000000.000000001");
        Ok(Receipt {
            children: vec![ChildReceipt {
                serials: self.minted.clone(),
            }],
        })
    }
}

enum Answer {
    Submit,
    Decline,
    Fail,
}

struct MockSigner {
    answer: Answer,
    sent: Mutex<Vec<Transaction>>,
}

impl MockSigner {
    fn new(answer: Answer) -> Arc<Self> {
        Arc::new(Self {
            answer,
            sent: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Signer for MockSigner {
    fn account_id(&self) -> AccountId {
        SIGNER
    }

    async fn call(&self, transaction: &Transaction) -> std::result::Result<Option<TransactionId>, BoxError> {
        self.sent.lock().push(transaction.clone());
        match self.answer {
            Answer::Submit => Ok(Some(TransactionId("0.0.4242@1700000000.000000001".into()))),
            Answer::Decline => Ok(None),
            Answer::Fail => Err("wallet locked".into()),
        }
    }
}

struct Fixture {
    service: NameService,
    resolver: Arc<MockResolver>,
    mirror: Arc<MockMirror>,
}

fn fixture(minted: Vec<i64>) -> Fixture {
    let resolver = Arc::new(MockResolver::default());
    let mirror = Arc::new(MockMirror::default());
    let service = NameService::new(
        ClientConfig::default(),
        resolver.clone(),
        mirror.clone(),
        Arc::new(MockLedger { minted }),
    );
    Fixture {
        service,
        resolver,
        mirror,
    }
}

fn contract_call(tx: &Transaction) -> &kns_sdk::ContractExecute {
    match tx {
        Transaction::ContractExecute(call) => call,
        other => panic!("expected a contract call, got {:?}", other),
    }
}

fn label(text: &str) -> ContractParam {
    let mut out = [0u8; 32];
    out[..text.len()].copy_from_slice(text.as_bytes());
    ContractParam::Bytes32(out)
}

/* ------------------------------------------------------------- *
 *  Writes                                                        *
 * ------------------------------------------------------------- */

#[tokio::test]
async fn writes_require_a_signer() {
    let f = fixture(vec![]);

    match f.service.register_name("fresh.hh", 1).await {
        Err(Error::SignerRequired) => {}
        other => panic!("expected SignerRequired, got {:?}", other),
    }
    match f.service.set_text("taken.hh", "gm").await {
        Err(Error::SignerRequired) => {}
        other => panic!("expected SignerRequired, got {:?}", other),
    }
    match f.service.find_names_by_owner(None).await {
        Err(Error::SignerRequired) => {}
        other => panic!("expected SignerRequired, got {:?}", other),
    }

    // fails before touching any collaborator
    assert_eq!(f.resolver.tld_calls.load(Ordering::SeqCst), 0);
    assert_eq!(f.resolver.name_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn register_name_purchases_zone() {
    let mut f = fixture(vec![55]);
    let signer = MockSigner::new(Answer::Submit);
    f.service.set_signer(signer.clone());

    let before: DateTime<Utc> = Utc::now();
    let name = f.service.register_name("fresh.hh", 2).await.unwrap();

    assert_eq!(name.domain, "fresh.hh");
    assert_eq!(name.serial_number, 55);
    assert_eq!(name.contract_serial_number, 32_055);
    assert_eq!(name.version, RegistryVersion::V3);
    assert_eq!(name.owner_account_id, SIGNER);
    assert_eq!(name.token_id, TLD_TOKEN);
    assert!(name.expiration_time.year() >= before.year() + 2);

    let sent = signer.sent.lock();
    let call = contract_call(&sent[0]);
    assert_eq!(call.contract_id, TLD_CONTRACT);
    assert_eq!(call.function, "purchaseZone");
    assert_eq!(call.gas, 2_860_000);
    // $5 a year at 0.05 USD/HBAR
    assert_eq!(call.payable_amount, Hbar::new(200));
    assert_eq!(call.max_transaction_fee, Hbar::new(8));
    assert_eq!(
        call.params.as_slice(),
        &[label("fresh"), ContractParam::Uint256(2)]
    );
}

#[tokio::test]
async fn register_name_needs_a_minted_serial() {
    let mut f = fixture(vec![]);
    f.service.set_signer(MockSigner::new(Answer::Submit));

    match f.service.register_name("fresh.hh", 1).await {
        Err(Error::MissingSerial) => {}
        other => panic!("expected MissingSerial, got {:?}", other),
    }
}

#[tokio::test]
async fn registered_name_id_is_cached() {
    let mut f = fixture(vec![55]);
    let signer = MockSigner::new(Answer::Submit);
    f.service.set_signer(signer.clone());

    f.service.register_name("fresh.hh", 1).await.unwrap();
    f.service.set_text("fresh.hh", "gm").await.unwrap();

    assert_eq!(f.resolver.name_calls.load(Ordering::SeqCst), 0);
    let sent = signer.sent.lock();
    let call = contract_call(&sent[1]);
    assert_eq!(call.function, "setText");
    assert_eq!(call.params.as_slice()[0], ContractParam::Int64(32_055));
}

#[tokio::test]
async fn declined_and_failed_signatures() {
    let mut f = fixture(vec![1]);
    f.service.set_signer(MockSigner::new(Answer::Decline));
    match f.service.remove_text("taken.hh").await {
        Err(Error::SignerRejected(None)) => {}
        other => panic!("expected SignerRejected(None), got {:?}", other),
    }

    f.service.set_signer(MockSigner::new(Answer::Fail));
    match f.service.remove_text("taken.hh").await {
        Err(Error::SignerRejected(Some(source))) => assert_eq!(source.to_string(), "wallet locked"),
        other => panic!("expected SignerRejected(Some(_)), got {:?}", other),
    }
}

#[tokio::test]
async fn set_address_builds_record_call() {
    let mut f = fixture(vec![]);
    let signer = MockSigner::new(Answer::Submit);
    f.service.set_signer(signer.clone());

    let record = f
        .service
        .set_ledger_address("pay.taken.hh", AccountId::new(50, 20, 1040))
        .await
        .unwrap();
    assert_eq!(record.name, "pay");
    assert_eq!(record.coin_type, CoinType::HBAR);
    assert_eq!(record.address, "50.20.1040");

    let sent = signer.sent.lock();
    let call = contract_call(&sent[0]);
    assert_eq!(call.function, "setAddress");
    assert_eq!(call.gas, 300_000);
    assert_eq!(call.payable_amount, Hbar::ZERO);
    assert_eq!(
        call.params.as_slice(),
        &[
            ContractParam::Int64(32_007),
            label("pay"),
            ContractParam::Uint32(3030),
            ContractParam::Bytes(hex::decode("0000003200000000000000140000000000000410").unwrap()),
        ]
    );
}

#[tokio::test]
async fn legacy_names_use_their_own_registry() {
    let mut f = fixture(vec![]);
    let signer = MockSigner::new(Answer::Submit);
    f.service.set_signer(signer.clone());

    f.service.remove_address("legacy.hh", CoinType::ETHEREUM).await.unwrap();

    let sent = signer.sent.lock();
    let call = contract_call(&sent[0]);
    assert_eq!(call.function, "deleteAddress");
    assert_eq!(call.contract_id, EntityId::new(0, 0, 100));
    assert_eq!(call.gas, 200_000);
    assert_eq!(
        call.params.as_slice(),
        &[ContractParam::Int64(12), label(""), ContractParam::Uint32(60)]
    );
}

#[tokio::test]
async fn oversized_record_label() {
    let mut f = fixture(vec![]);
    f.service.set_signer(MockSigner::new(Answer::Submit));

    let name = format!("{}.taken.hh", "x".repeat(33));
    match f.service.set_text(&name, "gm").await {
        Err(Error::ValueTooLarge { len: 33, max: 32 }) => {}
        other => panic!("expected ValueTooLarge, got {:?}", other),
    }
}

#[tokio::test]
async fn extend_pushes_expiration() {
    let mut f = fixture(vec![]);
    let signer = MockSigner::new(Answer::Submit);
    f.service.set_signer(signer.clone());

    let name = f.service.extend_name_registration("taken.hh", 3).await.unwrap();
    assert_eq!(name.expiration_time.year(), 2033);

    let sent = signer.sent.lock();
    let call = contract_call(&sent[0]);
    assert_eq!(call.function, "extendZoneLifetime");
    assert_eq!(call.payable_amount, Hbar::new(300));
}

/* ------------------------------------------------------------- *
 *  Association                                                   *
 * ------------------------------------------------------------- */

#[tokio::test]
async fn unregistered_names_associate_with_tld_token() {
    let mut f = fixture(vec![]);
    let signer = MockSigner::new(Answer::Submit);
    f.service.set_signer(signer.clone());

    assert!(!f.service.is_associated_for_name("fresh.hh").await.unwrap());
    f.mirror.associated.lock().push(TLD_TOKEN);
    assert!(f.service.is_associated_for_name("fresh.hh").await.unwrap());

    f.service.associate_name("fresh.hh").await.unwrap();
    let sent = signer.sent.lock();
    match &sent[0] {
        Transaction::TokenAssociate(assoc) => {
            assert_eq!(assoc.account_id, SIGNER);
            assert_eq!(assoc.token_ids, vec![TLD_TOKEN]);
        }
        other => panic!("expected TokenAssociate, got {:?}", other),
    }

    // tld ids are looked up once
    assert_eq!(f.resolver.tld_calls.load(Ordering::SeqCst), 1);
}

/* ------------------------------------------------------------- *
 *  Reads                                                         *
 * ------------------------------------------------------------- */

#[tokio::test]
async fn exchange_rate_is_cached() {
    let f = fixture(vec![]);

    assert_eq!(f.service.register_price_hbar("abc.hh").await.unwrap(), Hbar::new(100));
    assert_eq!(f.service.register_price_hbar("ab.hh").await.unwrap(), Hbar::new(1000));
    assert_eq!(f.resolver.exchange_rate_calls.load(Ordering::SeqCst), 1);

    f.service.cache().clear();
    f.service.register_price_hbar("abc.hh").await.unwrap();
    assert_eq!(f.resolver.exchange_rate_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn get_name_resolves_owner() {
    let f = fixture(vec![]);

    let name = f.service.get_name("taken.hh").await.unwrap();
    assert_eq!(name.owner_account_id, AccountId::new(0, 0, 777));
    assert_eq!(name.serial_number, 7);
    assert_eq!(name.version, RegistryVersion::V3);

    match f.service.get_name("nobody.hh").await {
        Err(Error::NameNotFound) => {}
        other => panic!("expected NameNotFound, got {:?}", other),
    }
    match f.service.get_name("not a name").await {
        Err(Error::InvalidNameFormat(_)) => {}
        other => panic!("expected InvalidNameFormat, got {:?}", other),
    }
}

#[tokio::test]
async fn records_are_decoded() {
    let f = fixture(vec![]);

    let records = f.service.get_all("taken.hh").await.unwrap();
    assert_eq!(records.address.len(), 2);
    assert_eq!(records.address[0].address, "50.20.1040");
    assert_eq!(records.address[1].address, "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa");
    assert_eq!(f.service.get_all_text("taken.hh").await.unwrap()[0].text, "hello");

    assert_eq!(
        f.service.get_address("pay.taken.h", CoinType::HBAR).await.unwrap(),
        "50.20.1040"
    );
    assert_eq!(
        f.service.get_ledger_address("pay.taken.h").await.unwrap(),
        AccountId::new(50, 20, 1040)
    );
    assert_eq!(f.service.get_text("taken.hh").await.unwrap(), "gm");
    assert_eq!(
        f.service.get_metadata("taken.hh").await.unwrap()["type"],
        "image/png"
    );
}

#[tokio::test]
async fn reverse_lookups() {
    let mut f = fixture(vec![]);

    let names = f
        .service
        .find_names_by_address(CoinType::ETHEREUM, "0xde0b295669a9fd93d5f28d9ec85e40f4cb697bae")
        .await
        .unwrap();
    assert_eq!(names, vec!["taken.hh".to_string()]);

    f.service
        .find_names_by_ledger_address(&AccountId::new(0, 0, 1040))
        .await
        .unwrap();
    assert_eq!(
        f.resolver.address_queries.lock().clone(),
        vec![
            (CoinType::ETHEREUM, "0xde0b295669a9fd93d5f28d9ec85e40f4cb697bae".to_string()),
            (CoinType::HBAR, "0.0.1040".to_string()),
        ]
    );

    f.service.set_signer(MockSigner::new(Answer::Submit));
    let owned = f.service.find_names_by_owner(None).await.unwrap();
    assert_eq!(owned[0].domain, "taken.hh");
    f.service
        .find_names_by_owner(Some(&AccountId::new(0, 0, 1)))
        .await
        .unwrap();
    assert_eq!(
        f.resolver.owner_queries.lock().clone(),
        vec!["0.0.4242".to_string(), "0.0.1".to_string()]
    );
}
