//! Transfer lifecycle state

use carnival_core::TxId;
use serde::Serialize;

/// Lifecycle of one transfer on one lane.
///
/// `Idle → Submitting → Submitted → Verifying → Confirmed | Unconfirmed`,
/// with `Failed` reachable from `Submitting`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum TransferState {
    #[default]
    Idle,
    Submitting,
    #[serde(rename_all = "camelCase")]
    Submitted { tx_id: TxId },
    #[serde(rename_all = "camelCase")]
    Verifying { tx_id: TxId },
    #[serde(rename_all = "camelCase")]
    Confirmed { tx_id: TxId },
    /// Sent, but confirmation polling gave up. Not a failure.
    #[serde(rename_all = "camelCase")]
    Unconfirmed { tx_id: TxId, advisory: String },
    Failed { reason: String },
}

impl TransferState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Submitting => "submitting",
            Self::Submitted { .. } => "submitted",
            Self::Verifying { .. } => "verifying",
            Self::Confirmed { .. } => "confirmed",
            Self::Unconfirmed { .. } => "unconfirmed",
            Self::Failed { .. } => "failed",
        }
    }

    /// Transaction id once the send call has succeeded
    pub fn tx_id(&self) -> Option<&TxId> {
        match self {
            Self::Submitted { tx_id }
            | Self::Verifying { tx_id }
            | Self::Confirmed { tx_id }
            | Self::Unconfirmed { tx_id, .. } => Some(tx_id),
            Self::Idle | Self::Submitting | Self::Failed { .. } => None,
        }
    }

    /// No further transitions happen without a new submission
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Confirmed { .. } | Self::Unconfirmed { .. } | Self::Failed { .. }
        )
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            Self::Submitting | Self::Submitted { .. } | Self::Verifying { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_accessors() {
        let tx = TxId::new("0xabc");
        assert_eq!(TransferState::Idle.tx_id(), None);
        assert_eq!(
            TransferState::Verifying { tx_id: tx.clone() }.tx_id(),
            Some(&tx)
        );
        assert!(TransferState::Submitting.is_in_flight());
        assert!(!TransferState::Submitting.is_terminal());
        assert!(TransferState::Failed {
            reason: "x".into()
        }
        .is_terminal());
    }

    #[test]
    fn test_state_serialization() {
        let state = TransferState::Unconfirmed {
            tx_id: TxId::new("0xabc"),
            advisory: "check manually".into(),
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "unconfirmed", "txId": "0xabc", "advisory": "check manually"})
        );
        assert_eq!(
            serde_json::to_value(TransferState::Idle).unwrap(),
            serde_json::json!({"status": "idle"})
        );
    }
}
