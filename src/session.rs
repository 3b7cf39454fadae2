//! Per-wallet connection store. Holds the session state for the two fixed
//! slots and exclusively owns the wallet-connect client handle of each one.
//!
//! Per-slot serialization: the handle sits behind a `tokio::sync::Mutex`
//! that every mutating operation holds across its external calls, so at
//! most one connect/disconnect/refresh is in flight per slot while
//! operations on different slots proceed independently.

use std::sync::Arc;

use log::{debug, info, warn};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::client::{ClientFactory, Notification, WalletClient, WalletInfo};
use crate::{ConnectionStatus, Error, Result, WalletSlot};

/// URI scheme a connection string must carry; anything else is rejected
/// before the client factory is touched.
pub const CONNECTION_SCHEME: &str = "nostr+walletconnect://";

const DEFAULT_CONNECT_ERROR: &str = "Connection failed";

/// Observable state of one wallet slot. `connection_string` and `info` are
/// set iff the slot is connected; `last_error` is set iff it is errored.
/// The balance survives an error transition but not an explicit disconnect.
#[derive(Debug, Clone, Serialize)]
pub struct WalletSession {
    pub slot: WalletSlot,
    pub status: ConnectionStatus,
    pub connection_string: Option<String>,
    pub balance_msat: Option<u64>,
    pub info: Option<WalletInfo>,
    pub last_error: Option<String>,
}

impl WalletSession {
    fn new(slot: WalletSlot) -> Self {
        WalletSession {
            slot,
            status: ConnectionStatus::Disconnected,
            connection_string: None,
            balance_msat: None,
            info: None,
            last_error: None,
        }
    }
}

struct SlotState {
    session: Mutex<WalletSession>,
    /// Owns the live client handle and doubles as the per-slot operation
    /// lock. Present iff the session is connected.
    handle: tokio::sync::Mutex<Option<Arc<dyn WalletClient>>>,
}

impl SlotState {
    fn new(slot: WalletSlot) -> Self {
        SlotState {
            session: Mutex::new(WalletSession::new(slot)),
            handle: tokio::sync::Mutex::new(None),
        }
    }
}

pub struct WalletStore {
    factory: Arc<dyn ClientFactory>,
    alice: SlotState,
    bob: SlotState,
}

impl WalletStore {
    pub fn new(factory: Arc<dyn ClientFactory>) -> Self {
        WalletStore {
            factory,
            alice: SlotState::new(WalletSlot::Alice),
            bob: SlotState::new(WalletSlot::Bob),
        }
    }

    fn slot(&self, slot: WalletSlot) -> &SlotState {
        match slot {
            WalletSlot::Alice => &self.alice,
            WalletSlot::Bob => &self.bob,
        }
    }

    /// Snapshot of the slot's observable state.
    pub fn session(&self, slot: WalletSlot) -> WalletSession {
        self.slot(slot).session.lock().clone()
    }

    /// The live client handle, `None` unless the slot is connected. Waits
    /// for any in-flight operation on the slot to settle first.
    pub async fn client(&self, slot: WalletSlot) -> Option<Arc<dyn WalletClient>> {
        self.slot(slot).handle.lock().await.clone()
    }

    /// Establishes a session for `slot`, superseding any existing one. The
    /// previous handle is closed before the new one is constructed, on
    /// every path. On failure the slot transitions to `error`, keeps the
    /// failure message and holds no handle.
    pub async fn connect(&self, slot: WalletSlot, connection_string: &str) -> Result<()> {
        let trimmed = connection_string.trim();
        if !trimmed.starts_with(CONNECTION_SCHEME) {
            return Err(Error::Validation(format!(
                "connection string for '{}' must start with '{}'",
                slot, CONNECTION_SCHEME
            )));
        }

        let state = self.slot(slot);
        let mut handle = state.handle.lock().await;

        {
            let mut session = state.session.lock();
            session.status = ConnectionStatus::Connecting;
            session.connection_string = None;
            session.info = None;
            session.last_error = None;
        }
        if let Some(old) = handle.take() {
            debug!("closing superseded client for '{}'", slot);
            old.close().await;
        }

        let client = match self.factory.connect(trimmed).await {
            Ok(client) => client,
            Err(e) => return Err(self.fail_connect(slot, e)),
        };
        let info = match client.get_info().await {
            Ok(info) => info,
            Err(e) => {
                client.close().await;
                return Err(self.fail_connect(slot, e));
            }
        };

        info!(
            "wallet '{}' connected: alias={} network={}",
            slot, info.alias, info.network
        );
        {
            let mut session = state.session.lock();
            session.status = ConnectionStatus::Connected;
            session.connection_string = Some(trimmed.to_string());
            session.info = Some(info);
            session.last_error = None;
        }
        *handle = Some(client.clone());

        // The initial balance is best effort, a failure here does not undo
        // the connect.
        match client.get_balance().await {
            Ok(msat) => state.session.lock().balance_msat = Some(msat),
            Err(e) => warn!("balance fetch for '{}' failed after connect: {}", slot, e),
        }
        Ok(())
    }

    fn fail_connect(&self, slot: WalletSlot, err: Error) -> Error {
        let mut msg = err.to_string();
        if msg.trim().is_empty() {
            msg = DEFAULT_CONNECT_ERROR.to_string();
        }
        warn!("wallet '{}' failed to connect: {}", slot, msg);
        let mut session = self.slot(slot).session.lock();
        session.status = ConnectionStatus::Error;
        session.last_error = Some(msg.clone());
        Error::Connection(msg)
    }

    /// Closes the slot's handle if there is one and resets the session to
    /// its initial state. Idempotent, never fails.
    pub async fn disconnect(&self, slot: WalletSlot) {
        let state = self.slot(slot);
        let mut handle = state.handle.lock().await;
        if let Some(client) = handle.take() {
            client.close().await;
        }
        *state.session.lock() = WalletSession::new(slot);
        info!("wallet '{}' disconnected", slot);
    }

    /// Re-reads the balance of a connected slot. Failures are soft: the
    /// previous balance and the connection status stay untouched. No-op
    /// when the slot holds no client.
    pub async fn refresh_balance(&self, slot: WalletSlot) {
        let state = self.slot(slot);
        // Holding the handle lock keeps this ordered against a concurrent
        // disconnect, a cleared balance cannot be resurrected.
        let handle = state.handle.lock().await;
        let Some(client) = handle.as_ref() else {
            debug!("balance refresh skipped, '{}' is not connected", slot);
            return;
        };
        match client.get_balance().await {
            Ok(msat) => state.session.lock().balance_msat = Some(msat),
            Err(e) => warn!("balance refresh for '{}' failed: {}", slot, e),
        }
    }

    /// Pass-through to the client's notification stream. Subscription
    /// failures are reported to the caller but leave the session state
    /// untouched.
    pub async fn subscribe_notifications(
        &self,
        slot: WalletSlot,
    ) -> Result<mpsc::UnboundedReceiver<Notification>> {
        let client = self.client(slot).await.ok_or(Error::NotConnected(slot))?;
        client.subscribe_notifications().await.map_err(|e| {
            warn!("notification subscription for '{}' failed: {}", slot, e);
            e
        })
    }
}
