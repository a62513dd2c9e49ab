//! Signals published to UI subscribers

use carnival_core::{Lane, TxId};
use serde::Serialize;

use crate::TransferState;

/// What confirmed a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfirmationSource {
    /// The polled balance differs from the pre-submission snapshot
    BalanceChanged,
    /// The verify-balance-change endpoint affirmed the expected delta
    Verified,
}

/// Event broadcast by the coordinator.
///
/// `Submitted` only means the wallet API accepted the transfer. Exactly one of
/// `Confirmed` or `TimedOut` follows unless the transfer is cancelled first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TransferEvent {
    StateChanged {
        lane: Lane,
        state: TransferState,
    },
    #[serde(rename_all = "camelCase")]
    Submitted { lane: Lane, tx_id: TxId },
    #[serde(rename_all = "camelCase")]
    Confirmed {
        lane: Lane,
        tx_id: TxId,
        source: ConfirmationSource,
        attempts: u32,
    },
    #[serde(rename_all = "camelCase")]
    TimedOut {
        lane: Lane,
        tx_id: TxId,
        advisory: String,
        attempts: u32,
    },
}

impl TransferEvent {
    /// Wire name, matching the serialized `type` tag
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StateChanged { .. } => "stateChanged",
            Self::Submitted { .. } => "submitted",
            Self::Confirmed { .. } => "confirmed",
            Self::TimedOut { .. } => "timedOut",
        }
    }

    pub fn lane(&self) -> Lane {
        match self {
            Self::StateChanged { lane, .. }
            | Self::Submitted { lane, .. }
            | Self::Confirmed { lane, .. }
            | Self::TimedOut { lane, .. } => *lane,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_type_tag() {
        let events = [
            TransferEvent::StateChanged {
                lane: Lane::Native,
                state: TransferState::Idle,
            },
            TransferEvent::Submitted {
                lane: Lane::Token,
                tx_id: TxId::new("0x1"),
            },
            TransferEvent::Confirmed {
                lane: Lane::Native,
                tx_id: TxId::new("0x1"),
                source: ConfirmationSource::Verified,
                attempts: 3,
            },
            TransferEvent::TimedOut {
                lane: Lane::Native,
                tx_id: TxId::new("0x1"),
                advisory: "check".into(),
                attempts: 60,
            },
        ];
        for event in events {
            let json = serde_json::to_value(&event).unwrap();
            assert_eq!(json["type"], event.kind());
        }
    }
}
