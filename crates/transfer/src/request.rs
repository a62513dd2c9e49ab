//! Outbound transfer request

use carnival_core::constants::DEFAULT_DECIMALS;
use carnival_core::{normalize, Address, ChainId, NormalizedAmount, SubmitError};
use serde::{Deserialize, Serialize};

/// A transfer as requested by the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub from_address: Address,
    /// Not format-checked here; the wallet API rejects bad addresses
    pub to_address: Address,
    /// User-facing decimal amount, e.g. "0.001"
    pub human_amount: String,
    pub chain_id: ChainId,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

fn default_decimals() -> u8 {
    DEFAULT_DECIMALS
}

impl TransferRequest {
    pub fn new(
        from_address: impl Into<String>,
        to_address: impl Into<String>,
        human_amount: impl Into<String>,
        chain_id: ChainId,
    ) -> Self {
        Self {
            from_address: Address::new(from_address),
            to_address: Address::new(to_address),
            human_amount: human_amount.into(),
            chain_id,
            decimals: DEFAULT_DECIMALS,
        }
    }

    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }

    /// Local checks only; nothing here touches the network.
    pub fn validate(&self) -> Result<NormalizedAmount, SubmitError> {
        if self.from_address.is_blank() {
            return Err(SubmitError::MissingField {
                field: "fromAddress",
            });
        }
        if self.to_address.is_blank() {
            return Err(SubmitError::MissingField { field: "toAddress" });
        }
        if self.human_amount.trim().is_empty() {
            return Err(SubmitError::MissingField { field: "amount" });
        }
        Ok(normalize(&self.human_amount, self.decimals)?)
    }

    /// Balance delta the verify endpoint should look for
    pub(crate) fn expected_change(&self) -> String {
        format!("-{}", self.human_amount.trim())
    }
}
