use thiserror::Error;

use crate::{HoldState, WalletSlot};

/// Failures surfaced by the session store and the hold-invoice
/// orchestrator. Validation errors are raised before any external call is
/// made; `Connection` carries the message that was also written to the
/// slot's `last_error`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Connection(String),
    #[error("wallet '{0}' is not connected")]
    NotConnected(WalletSlot),
    #[error("{0}")]
    External(String),
    #[error("{0}")]
    Validation(String),
    #[error("hold invoice is in wrong state: '{0}'")]
    WrongHoldState(HoldState),
    #[error("wallet '{0}' has another hold operation in flight")]
    Busy(WalletSlot),
}

pub type Result<T> = std::result::Result<T, Error>;
