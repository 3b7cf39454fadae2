//! Hand-rolled wallet-connect client double shared by the session and
//! hold-invoice tests. Failure modes are toggled per call site and every
//! external call is recorded verbatim.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time;

use crate::client::{
    ClientFactory, Invoice, ListTransactionsParams, MakeHoldInvoiceParams, MakeInvoiceParams,
    Notification, PayInvoiceResponse, Transaction, WalletClient, WalletInfo,
};
use crate::{Error, Result};

pub const VALID_URL: &str =
    "nostr+walletconnect://69effe7b49a6dd5cf525bd0905917a5005ffe480b58eeb8e861418cf3ae760d9\
     ?relay=wss://relay.example.com&secret=deadbeef";

#[derive(Default)]
pub struct MockConfig {
    fail_connect: Mutex<Option<String>>,
    fail_info: AtomicBool,
    fail_balance: AtomicBool,
    fail_hold_create: Mutex<Option<String>>,
    fail_settle: Mutex<Option<String>>,
    fail_cancel: Mutex<Option<String>>,
    balance_msat: AtomicU64,
    connect_delay_ms: AtomicU64,
    settle_delay_ms: AtomicU64,
}

impl MockConfig {
    pub fn set_fail_connect(&self, msg: Option<&str>) {
        *self.fail_connect.lock() = msg.map(String::from);
    }
    pub fn set_fail_info(&self, fail: bool) {
        self.fail_info.store(fail, Ordering::SeqCst);
    }
    pub fn set_fail_balance(&self, fail: bool) {
        self.fail_balance.store(fail, Ordering::SeqCst);
    }
    pub fn set_fail_hold_create(&self, msg: Option<&str>) {
        *self.fail_hold_create.lock() = msg.map(String::from);
    }
    pub fn set_fail_settle(&self, msg: Option<&str>) {
        *self.fail_settle.lock() = msg.map(String::from);
    }
    pub fn set_fail_cancel(&self, msg: Option<&str>) {
        *self.fail_cancel.lock() = msg.map(String::from);
    }
    pub fn set_balance_msat(&self, msat: u64) {
        self.balance_msat.store(msat, Ordering::SeqCst);
    }
    pub fn set_connect_delay_ms(&self, ms: u64) {
        self.connect_delay_ms.store(ms, Ordering::SeqCst);
    }
    pub fn set_settle_delay_ms(&self, ms: u64) {
        self.settle_delay_ms.store(ms, Ordering::SeqCst);
    }
}

/// Counters over every client the factory ever built.
#[derive(Default)]
pub struct MockLedger {
    built: AtomicUsize,
    live: AtomicUsize,
    max_live: AtomicUsize,
    closed: AtomicUsize,
    calls: Mutex<Vec<String>>,
    notify_txs: Mutex<Vec<mpsc::UnboundedSender<Notification>>>,
}

impl MockLedger {
    pub fn built(&self) -> usize {
        self.built.load(Ordering::SeqCst)
    }
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
    pub fn max_live(&self) -> usize {
        self.max_live.load(Ordering::SeqCst)
    }
    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
    pub fn calls_matching(&self, prefix: &str) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .cloned()
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }
}

pub struct MockFactory {
    pub cfg: Arc<MockConfig>,
    pub ledger: Arc<MockLedger>,
}

impl MockFactory {
    pub fn new() -> Self {
        let factory = MockFactory {
            cfg: Arc::new(MockConfig::default()),
            ledger: Arc::new(MockLedger::default()),
        };
        factory.cfg.set_balance_msat(21_000_000);
        factory
    }
}

#[async_trait]
impl ClientFactory for MockFactory {
    async fn connect(&self, connection_string: &str) -> Result<Arc<dyn WalletClient>> {
        let delay = self.cfg.connect_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            time::sleep(Duration::from_millis(delay)).await;
        }
        if let Some(msg) = self.cfg.fail_connect.lock().clone() {
            return Err(Error::Connection(msg));
        }
        self.ledger
            .record(format!("connect {}", connection_string));
        self.ledger.built.fetch_add(1, Ordering::SeqCst);
        let live = self.ledger.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.ledger.max_live.fetch_max(live, Ordering::SeqCst);
        Ok(Arc::new(MockClient {
            cfg: self.cfg.clone(),
            ledger: self.ledger.clone(),
            closed: AtomicBool::new(false),
        }))
    }
}

pub struct MockClient {
    cfg: Arc<MockConfig>,
    ledger: Arc<MockLedger>,
    closed: AtomicBool,
}

fn canned_transaction() -> Transaction {
    Transaction {
        transaction_type: "incoming".to_string(),
        invoice: "lntbs1canned".to_string(),
        description: "canned".to_string(),
        payment_hash: "00".repeat(32),
        preimage: None,
        amount_msat: 1_000,
        fees_paid_msat: 0,
        created_at: 1_700_000_000,
        settled_at: None,
    }
}

#[async_trait]
impl WalletClient for MockClient {
    async fn get_info(&self) -> Result<WalletInfo> {
        if self.cfg.fail_info.load(Ordering::SeqCst) {
            return Err(Error::External("info unavailable".to_string()));
        }
        Ok(WalletInfo {
            alias: "Test Wallet".to_string(),
            color: "#3399ff".to_string(),
            pubkey: "02abc".to_string(),
            network: "signet".to_string(),
            block_height: 170_000,
            methods: vec![
                "get_info".to_string(),
                "get_balance".to_string(),
                "make_invoice".to_string(),
                "pay_invoice".to_string(),
            ],
            lud16: Some("test@example.com".to_string()),
        })
    }

    async fn get_balance(&self) -> Result<u64> {
        if self.cfg.fail_balance.load(Ordering::SeqCst) {
            return Err(Error::External("balance unavailable".to_string()));
        }
        Ok(self.cfg.balance_msat.load(Ordering::SeqCst))
    }

    async fn make_invoice(&self, params: &MakeInvoiceParams) -> Result<Invoice> {
        self.ledger
            .record(format!("make_invoice {}", params.amount_msat));
        Ok(Invoice {
            invoice: "lntbs1canned".to_string(),
            payment_hash: "00".repeat(32),
            amount_msat: params.amount_msat,
        })
    }

    async fn pay_invoice(&self, invoice: &str) -> Result<PayInvoiceResponse> {
        self.ledger.record(format!("pay_invoice {}", invoice));
        Ok(PayInvoiceResponse {
            preimage: "11".repeat(32),
            fees_paid_msat: 3,
        })
    }

    async fn make_hold_invoice(&self, params: &MakeHoldInvoiceParams) -> Result<String> {
        self.ledger.record(format!(
            "make_hold_invoice {} {} {}",
            params.amount_msat, params.description, params.payment_hash
        ));
        if let Some(msg) = self.cfg.fail_hold_create.lock().clone() {
            return Err(Error::External(msg));
        }
        Ok(format!("lntbs1hold{}", params.payment_hash))
    }

    async fn settle_hold_invoice(&self, preimage: &str) -> Result<()> {
        self.ledger
            .record(format!("settle_hold_invoice {}", preimage));
        let delay = self.cfg.settle_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            time::sleep(Duration::from_millis(delay)).await;
        }
        if let Some(msg) = self.cfg.fail_settle.lock().clone() {
            return Err(Error::External(msg));
        }
        Ok(())
    }

    async fn cancel_hold_invoice(&self, payment_hash: &str) -> Result<()> {
        self.ledger
            .record(format!("cancel_hold_invoice {}", payment_hash));
        if let Some(msg) = self.cfg.fail_cancel.lock().clone() {
            return Err(Error::External(msg));
        }
        Ok(())
    }

    async fn list_transactions(
        &self,
        _params: &ListTransactionsParams,
    ) -> Result<Vec<Transaction>> {
        self.ledger.record("list_transactions".to_string());
        Ok(vec![canned_transaction()])
    }

    async fn subscribe_notifications(&self) -> Result<mpsc::UnboundedReceiver<Notification>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.ledger.notify_txs.lock().push(tx);
        Ok(rx)
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.ledger.live.fetch_sub(1, Ordering::SeqCst);
            self.ledger.closed.fetch_add(1, Ordering::SeqCst);
        }
    }
}
