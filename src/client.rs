use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::Result;

/// Static wallet metadata returned by `get_info` right after connecting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletInfo {
    pub alias: String,
    pub color: String,
    pub pubkey: String,
    pub network: String,
    pub block_height: u64,
    pub methods: Vec<String>,
    /// Lightning address of the wallet, if it has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lud16: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MakeInvoiceParams {
    pub amount_msat: u64,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub invoice: String,
    pub payment_hash: String,
    pub amount_msat: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayInvoiceResponse {
    pub preimage: String,
    pub fees_paid_msat: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MakeHoldInvoiceParams {
    pub amount_msat: u64,
    pub description: String,
    /// Commitment the payee holds the preimage for.
    pub payment_hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListTransactionsParams {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub invoice: String,
    pub description: String,
    pub payment_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preimage: Option<String>,
    pub amount_msat: u64,
    pub fees_paid_msat: u64,
    pub created_at: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settled_at: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub notification_type: String,
    pub transaction: Transaction,
}

/// One live session with a wallet-connect-capable node.
///
/// Implementors wrap the actual wallet-connect SDK; the store and the
/// orchestrator only ever talk through this interface. A handle carries live
/// network resources and must be released with `close` before it is
/// replaced. `close` is idempotent.
#[async_trait]
pub trait WalletClient: Send + Sync {
    async fn get_info(&self) -> Result<WalletInfo>;

    /// Current spendable balance in millisats.
    async fn get_balance(&self) -> Result<u64>;

    async fn make_invoice(&self, params: &MakeInvoiceParams) -> Result<Invoice>;

    async fn pay_invoice(&self, invoice: &str) -> Result<PayInvoiceResponse>;

    /// Requests an invoice locked to the given payment hash. Settlement is
    /// deferred until `settle_hold_invoice` releases the preimage.
    async fn make_hold_invoice(&self, params: &MakeHoldInvoiceParams) -> Result<String>;

    async fn settle_hold_invoice(&self, preimage: &str) -> Result<()>;

    async fn cancel_hold_invoice(&self, payment_hash: &str) -> Result<()>;

    async fn list_transactions(&self, params: &ListTransactionsParams)
        -> Result<Vec<Transaction>>;

    /// Streams payment notifications until the receiver is dropped.
    async fn subscribe_notifications(&self) -> Result<mpsc::UnboundedReceiver<Notification>>;

    async fn close(&self);
}

/// Builds a client handle from an opaque connection string. The store calls
/// this once per (re)connect; construction failures surface as
/// `Error::Connection` on the slot.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn connect(&self, connection_string: &str) -> Result<Arc<dyn WalletClient>>;
}
