//! Confirmation polling
//!
//! After a successful send, the balance is re-fetched once per interval and
//! compared (as an opaque value) against the snapshot taken before the send.
//! Each tick also asks the verify-balance-change endpoint. Either signal
//! confirms the transfer. Errors on a tick are logged and the next tick runs
//! as normal.

use std::sync::Arc;

use carnival_core::{BalanceSnapshot, ChainId, PollConfig, TxId};
use wallet_api_client::{first_snapshot, VerifyBalanceChangeRequest, WalletApi, WalletBalance};

use crate::lane::PollTicket;
use crate::ConfirmationSource;

/// How a poll ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PollOutcome {
    Confirmed {
        source: ConfirmationSource,
        attempts: u32,
        /// Latest balance when confirmed by a balance change
        balance: Option<WalletBalance>,
    },
    TimedOut {
        attempts: u32,
    },
    Cancelled,
}

/// Everything one confirmation poll needs
pub(crate) struct PollJob {
    pub(crate) ticket: PollTicket,
    pub(crate) api: Arc<dyn WalletApi>,
    pub(crate) wallet_address: String,
    pub(crate) chain_id: ChainId,
    pub(crate) token_address: Option<String>,
    /// `None` when the pre-send snapshot could not be fetched
    pub(crate) initial_balance: Option<BalanceSnapshot>,
    /// Signed human amount, e.g. "-0.001"
    pub(crate) expected_change: String,
    pub(crate) tx_id: TxId,
    pub(crate) config: PollConfig,
}

impl PollJob {
    pub(crate) async fn run(self) -> PollOutcome {
        let lane = self.ticket.lane();
        let mut baseline = self.initial_balance.clone();
        let verify_request = VerifyBalanceChangeRequest {
            wallet_address: self.wallet_address.clone(),
            chain_id: self.chain_id,
            expected_change: self.expected_change.clone(),
            token_address: self.token_address.clone(),
        };

        for attempt in 1..=self.config.max_attempts {
            tokio::time::sleep(self.config.interval()).await;
            if self.ticket.is_cancelled() {
                return PollOutcome::Cancelled;
            }

            match self
                .api
                .get_balance(
                    &self.wallet_address,
                    self.chain_id,
                    self.token_address.as_deref(),
                )
                .await
            {
                Ok(balances) => match first_snapshot(&balances) {
                    None => {
                        tracing::debug!(%lane, tx_id = %self.tx_id, attempt, "Balance response carried no value");
                    }
                    Some(current) => match &baseline {
                        Some(initial) if *initial != current => {
                            return PollOutcome::Confirmed {
                                source: ConfirmationSource::BalanceChanged,
                                attempts: attempt,
                                balance: balances.into_iter().next(),
                            };
                        }
                        Some(_) => {}
                        None => {
                            tracing::debug!(
                                %lane,
                                tx_id = %self.tx_id,
                                "No pre-send balance, using first polled balance as baseline"
                            );
                            baseline = Some(current);
                        }
                    }
                }
                Err(e) => {
                    tracing::debug!(%lane, tx_id = %self.tx_id, attempt, error = %e, "Balance check failed");
                }
            }

            match self.api.verify_balance_change(&verify_request).await {
                Ok(true) => {
                    return PollOutcome::Confirmed {
                        source: ConfirmationSource::Verified,
                        attempts: attempt,
                        balance: None,
                    };
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::debug!(%lane, tx_id = %self.tx_id, attempt, error = %e, "Balance verification failed");
                }
            }
        }

        PollOutcome::TimedOut {
            attempts: self.config.max_attempts,
        }
    }
}
