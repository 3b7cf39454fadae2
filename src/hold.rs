//! Hold-invoice orchestrator: runs the create -> settle | cancel protocol
//! for at most one hold invoice per slot, composing the proof codec with
//! the session store's active client.
//!
//! At most one create/settle/cancel may be in flight per slot. The busy
//! flag is not just UI state: a second hold against the same commitment or
//! a doubled settle is unrecoverable against the external ledger, so
//! overlapping calls are rejected outright.

use std::sync::Arc;

use log::{info, warn};
use parking_lot::Mutex;
use serde::Serialize;

use crate::client::{MakeHoldInvoiceParams, WalletClient};
use crate::proof;
use crate::session::WalletStore;
use crate::{Error, HoldState, Result, WalletSlot};

const CREATE_FALLBACK_ERROR: &str = "Failed to create hold invoice";
const SETTLE_FALLBACK_ERROR: &str = "Failed to settle hold invoice";
const CANCEL_FALLBACK_ERROR: &str = "Failed to cancel hold invoice";

/// A tracked hold invoice. The preimage never leaves this process until
/// settlement releases it to the external client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldInvoiceRecord {
    pub preimage: String,
    pub payment_hash: String,
    pub invoice: String,
    pub state: HoldState,
    pub amount_msat: u64,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct CreateHoldInvoiceParams {
    pub amount_msat: u64,
    pub description: String,
}

/// Observable per-slot orchestrator state for the UI.
#[derive(Debug, Clone, Serialize)]
pub struct HoldStatus {
    pub busy: bool,
    pub last_error: Option<String>,
    pub record: Option<HoldInvoiceRecord>,
}

#[derive(Default)]
struct HoldSlot {
    busy: bool,
    last_error: Option<String>,
    record: Option<HoldInvoiceRecord>,
}

pub struct HoldInvoiceOrchestrator {
    store: Arc<WalletStore>,
    alice: Mutex<HoldSlot>,
    bob: Mutex<HoldSlot>,
}

impl HoldInvoiceOrchestrator {
    pub fn new(store: Arc<WalletStore>) -> Self {
        HoldInvoiceOrchestrator {
            store,
            alice: Mutex::new(HoldSlot::default()),
            bob: Mutex::new(HoldSlot::default()),
        }
    }

    fn slot(&self, slot: WalletSlot) -> &Mutex<HoldSlot> {
        match slot {
            WalletSlot::Alice => &self.alice,
            WalletSlot::Bob => &self.bob,
        }
    }

    pub fn status(&self, slot: WalletSlot) -> HoldStatus {
        let state = self.slot(slot).lock();
        HoldStatus {
            busy: state.busy,
            last_error: state.last_error.clone(),
            record: state.record.clone(),
        }
    }

    pub fn record(&self, slot: WalletSlot) -> Option<HoldInvoiceRecord> {
        self.slot(slot).lock().record.clone()
    }

    /// Generates a fresh commitment and requests a hold invoice locked to
    /// its hash. The returned record is in `created` state; the preimage
    /// stays local. Any previously tracked record for the slot is dropped.
    pub async fn create_hold_invoice(
        &self,
        slot: WalletSlot,
        params: CreateHoldInvoiceParams,
    ) -> Result<HoldInvoiceRecord> {
        let client = self.client(slot).await?;
        self.begin(slot)?;
        let res = self.run_create(slot, client, params).await;
        self.finish(slot, res.as_ref().err(), CREATE_FALLBACK_ERROR);
        res
    }

    async fn run_create(
        &self,
        slot: WalletSlot,
        client: Arc<dyn WalletClient>,
        params: CreateHoldInvoiceParams,
    ) -> Result<HoldInvoiceRecord> {
        if params.amount_msat == 0 {
            return Err(Error::Validation(
                "hold invoice amount must be greater than zero".to_string(),
            ));
        }
        let commitment = proof::generate_commitment()?;
        let invoice = client
            .make_hold_invoice(&MakeHoldInvoiceParams {
                amount_msat: params.amount_msat,
                description: params.description.clone(),
                payment_hash: commitment.payment_hash.clone(),
            })
            .await?;
        info!(
            "hold invoice created for '{}': payment_hash={}",
            slot, commitment.payment_hash
        );
        let record = HoldInvoiceRecord {
            preimage: commitment.preimage,
            payment_hash: commitment.payment_hash,
            invoice,
            state: HoldState::Created,
            amount_msat: params.amount_msat,
            description: params.description,
        };
        let mut state = self.slot(slot).lock();
        if let Some(prev) = &state.record {
            if prev.state == HoldState::Created {
                warn!(
                    "replacing unsettled hold invoice for '{}': payment_hash={}",
                    slot, prev.payment_hash
                );
            }
        }
        state.record = Some(record.clone());
        Ok(record)
    }

    /// Releases `preimage` to the external client, settling the tracked
    /// hold invoice. The record only moves to `settled` after the external
    /// call succeeded; on failure it stays `created` and retrying is up to
    /// the caller.
    pub async fn settle_hold_invoice(&self, slot: WalletSlot, preimage: &str) -> Result<()> {
        let client = self.client(slot).await?;
        self.begin(slot)?;
        let res = self.run_settle(slot, client, preimage).await;
        self.finish(slot, res.as_ref().err(), SETTLE_FALLBACK_ERROR);
        res
    }

    async fn run_settle(
        &self,
        slot: WalletSlot,
        client: Arc<dyn WalletClient>,
        preimage: &str,
    ) -> Result<()> {
        {
            let state = self.slot(slot).lock();
            let record = tracked_record(&state, slot)?;
            if !record.state.is_valid_transition(&HoldState::Settled) {
                return Err(Error::WrongHoldState(record.state));
            }
            if !proof::verify_preimage(&record.payment_hash, preimage) {
                return Err(Error::Validation(
                    "preimage does not match the tracked hold invoice".to_string(),
                ));
            }
        }
        client.settle_hold_invoice(preimage).await?;
        if let Some(record) = self.slot(slot).lock().record.as_mut() {
            record.state = HoldState::Settled;
        }
        info!("hold invoice settled for '{}'", slot);
        Ok(())
    }

    /// Aborts the tracked hold invoice keyed by its payment hash.
    /// Symmetric to settle: the record moves to `cancelled` only after the
    /// external call succeeded.
    pub async fn cancel_hold_invoice(&self, slot: WalletSlot, payment_hash: &str) -> Result<()> {
        let client = self.client(slot).await?;
        self.begin(slot)?;
        let res = self.run_cancel(slot, client, payment_hash).await;
        self.finish(slot, res.as_ref().err(), CANCEL_FALLBACK_ERROR);
        res
    }

    async fn run_cancel(
        &self,
        slot: WalletSlot,
        client: Arc<dyn WalletClient>,
        payment_hash: &str,
    ) -> Result<()> {
        {
            let state = self.slot(slot).lock();
            let record = tracked_record(&state, slot)?;
            if !record.state.is_valid_transition(&HoldState::Cancelled) {
                return Err(Error::WrongHoldState(record.state));
            }
            if record.payment_hash != payment_hash {
                return Err(Error::Validation(
                    "payment hash does not match the tracked hold invoice".to_string(),
                ));
            }
        }
        client.cancel_hold_invoice(payment_hash).await?;
        if let Some(record) = self.slot(slot).lock().record.as_mut() {
            record.state = HoldState::Cancelled;
        }
        info!("hold invoice cancelled for '{}'", slot);
        Ok(())
    }

    async fn client(&self, slot: WalletSlot) -> Result<Arc<dyn WalletClient>> {
        self.store
            .client(slot)
            .await
            .ok_or(Error::NotConnected(slot))
    }

    fn begin(&self, slot: WalletSlot) -> Result<()> {
        let mut state = self.slot(slot).lock();
        if state.busy {
            return Err(Error::Busy(slot));
        }
        state.busy = true;
        state.last_error = None;
        Ok(())
    }

    fn finish(&self, slot: WalletSlot, err: Option<&Error>, fallback: &str) {
        let mut state = self.slot(slot).lock();
        state.busy = false;
        state.last_error = err.map(|e| {
            let msg = e.to_string();
            if msg.trim().is_empty() {
                fallback.to_string()
            } else {
                msg
            }
        });
    }
}

fn tracked_record<'a>(state: &'a HoldSlot, slot: WalletSlot) -> Result<&'a HoldInvoiceRecord> {
    state
        .record
        .as_ref()
        .ok_or_else(|| Error::Validation(format!("no hold invoice tracked for '{}'", slot)))
}
