use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

pub mod client;
pub mod demo;
pub mod error;
pub mod hold;
pub mod proof;
pub mod session;
#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, Result};

/// One of the two fixed demo participants. Slots are never created or
/// destroyed at runtime.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletSlot {
    Alice,
    Bob,
}

impl WalletSlot {
    pub const ALL: [WalletSlot; 2] = [WalletSlot::Alice, WalletSlot::Bob];
}

impl fmt::Display for WalletSlot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WalletSlot::Alice => write!(f, "alice"),
            WalletSlot::Bob => write!(f, "bob"),
        }
    }
}

impl FromStr for WalletSlot {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "alice" => Ok(WalletSlot::Alice),
            "bob" => Ok(WalletSlot::Bob),
            _ => Err(Error::Validation(format!(
                "could not parse WalletSlot from {}",
                s
            ))),
        }
    }
}

/// Connection lifecycle of one wallet slot. There is no terminal state,
/// `error` and `disconnected` both accept a fresh connect.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConnectionStatus::Disconnected => write!(f, "disconnected"),
            ConnectionStatus::Connecting => write!(f, "connecting"),
            ConnectionStatus::Connected => write!(f, "connected"),
            ConnectionStatus::Error => write!(f, "error"),
        }
    }
}

/// Lifecycle of a hold invoice. `settled` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoldState {
    Created,
    Settled,
    Cancelled,
}

impl HoldState {
    pub fn is_valid_transition(&self, newstate: &HoldState) -> bool {
        match self {
            HoldState::Created => !matches!(newstate, HoldState::Created),
            HoldState::Settled => false,
            HoldState::Cancelled => false,
        }
    }
}

impl fmt::Display for HoldState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HoldState::Created => write!(f, "created"),
            HoldState::Settled => write!(f, "settled"),
            HoldState::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for HoldState {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "created" => Ok(HoldState::Created),
            "settled" => Ok(HoldState::Settled),
            "cancelled" => Ok(HoldState::Cancelled),
            _ => Err(Error::Validation(format!(
                "could not parse HoldState from {}",
                s
            ))),
        }
    }
}
