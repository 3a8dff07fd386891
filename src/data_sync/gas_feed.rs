use crate::data_sync::providers::FeeOracle;
use alloy_primitives::U256;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{Display, EnumString};
use tokio::sync::watch;
use tracing::{debug, info};

/// Events pushed by the relay socket.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SocketEvent {
    GasChange,
    #[strum(serialize = "SOCKET_SESSION")]
    SocketSessionResponse,
    TransactionRequest,
    TransactionResponse,
}

/// Gas prices in wei as carried by a `GAS_CHANGE` payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasSnapshot {
    pub rapid: U256,
    pub fast: U256,
    pub standard: U256,
    pub slow: U256,
    #[serde(default)]
    pub base_fee_per_gas: Option<U256>,
    #[serde(default)]
    pub timestamp: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum GasFeedError {
    #[error("unknown socket event {0}")]
    UnknownEvent(String),
    #[error("invalid gas payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

/// Latest gas state, shared with anyone holding a receiver.
pub struct GasFeed {
    tx: watch::Sender<Option<GasSnapshot>>,
}

impl GasFeed {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<GasSnapshot>> {
        self.tx.subscribe()
    }

    pub fn latest(&self) -> Option<GasSnapshot> {
        self.tx.borrow().clone()
    }

    pub fn apply(&self, snapshot: GasSnapshot) {
        debug!("Gas update: rapid={} base_fee={:?}", snapshot.rapid, snapshot.base_fee_per_gas);
        self.tx.send_replace(Some(snapshot));
    }

    /// Handles one socket message. Returns true when the gas state changed.
    pub fn apply_message(&self, event: &str, payload: &str) -> Result<bool, GasFeedError> {
        let event = SocketEvent::from_str(event).map_err(|_| GasFeedError::UnknownEvent(event.to_string()))?;
        match event {
            SocketEvent::GasChange => {
                let snapshot: GasSnapshot = serde_json::from_str(payload)?;
                self.apply(snapshot);
                Ok(true)
            }
            other => {
                info!("Ignoring {} event", other);
                Ok(false)
            }
        }
    }
}

impl Default for GasFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeeOracle for GasFeed {
    async fn base_fee_per_gas(&self) -> Option<U256> {
        self.tx.borrow().as_ref().and_then(|snapshot| snapshot.base_fee_per_gas)
    }

    /// The rapid price is the one to outbid.
    async fn gas_price_to_beat(&self) -> Option<U256> {
        self.tx.borrow().as_ref().map(|snapshot| snapshot.rapid)
    }
}
