//! Transfer coordinator
//!
//! Owns the send-and-confirm flow for a wallet session: validates and
//! normalizes the amount, calls the lane's send endpoint, then confirms the
//! transfer in the background by polling balances.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use carnival_core::constants::VERIFICATION_TIMEOUT_ADVISORY;
use carnival_core::{
    Address, BalanceSnapshot, ChainId, Lane, NormalizedAmount, PollConfig, SubmitError,
    TokenConfig, TxId,
};
use tokio::sync::{broadcast, watch};
use wallet_api_client::{first_snapshot, WalletApi, WalletBalance};

use crate::lane::{LaneSlot, LaneSpec, PollTicket};
use crate::poller::{PollJob, PollOutcome};
use crate::wallet::WalletCache;
use crate::{TransferEvent, TransferRequest, TransferState};

/// Capacity of the event channel; slow subscribers see `Lagged`
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Authenticated wallet the coordinator acts for
#[derive(Clone)]
pub struct Session {
    pub wallet_address: Address,
    /// Bearer token from the auth provider
    pub auth_token: String,
    pub chain_id: ChainId,
}

impl Session {
    pub fn new(wallet_address: impl Into<String>, auth_token: impl Into<String>, chain_id: ChainId) -> Self {
        Self {
            wallet_address: Address::new(wallet_address),
            auth_token: auth_token.into(),
            chain_id,
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("wallet_address", &self.wallet_address)
            .field("auth_token", &"<redacted>")
            .field("chain_id", &self.chain_id)
            .finish()
    }
}

/// Send-and-confirm coordinator with one independent lane per asset kind
#[derive(Clone)]
pub struct TransferCoordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    api: Arc<dyn WalletApi>,
    session: Session,
    poll: PollConfig,
    native: Arc<LaneSlot>,
    token: Arc<LaneSlot>,
    events: broadcast::Sender<TransferEvent>,
    wallet: Mutex<WalletCache>,
}

impl TransferCoordinator {
    pub fn new(
        api: Arc<dyn WalletApi>,
        session: Session,
        poll: PollConfig,
        token: TokenConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(CoordinatorInner {
                api,
                session,
                poll,
                native: Arc::new(LaneSlot::new(LaneSpec::native(), events.clone())),
                token: Arc::new(LaneSlot::new(LaneSpec::token(token), events.clone())),
                events,
                wallet: Mutex::new(WalletCache::default()),
            }),
        }
    }

    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    pub fn lane_spec(&self, lane: Lane) -> &LaneSpec {
        self.slot(lane).spec()
    }

    pub(crate) fn api(&self) -> &Arc<dyn WalletApi> {
        &self.inner.api
    }

    pub(crate) fn slot(&self, lane: Lane) -> &Arc<LaneSlot> {
        match lane {
            Lane::Native => &self.inner.native,
            Lane::Token => &self.inner.token,
        }
    }

    pub(crate) fn wallet_cache(&self) -> MutexGuard<'_, WalletCache> {
        self.inner.wallet.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Build a request from the session wallet on the session chain, using
    /// the lane's token decimals.
    pub fn request(
        &self,
        lane: Lane,
        to_address: impl Into<String>,
        human_amount: impl Into<String>,
    ) -> TransferRequest {
        let session = self.session();
        TransferRequest::new(
            session.wallet_address.as_str(),
            to_address,
            human_amount,
            session.chain_id,
        )
        .with_decimals(self.lane_spec(lane).decimals())
    }

    /// Current state of a lane
    pub fn state(&self, lane: Lane) -> TransferState {
        self.slot(lane).state()
    }

    /// Receiver that observes every state change of a lane
    pub fn watch_state(&self, lane: Lane) -> watch::Receiver<TransferState> {
        self.slot(lane).subscribe_state()
    }

    /// Latest known balance for a lane
    pub fn balance(&self, lane: Lane) -> Option<WalletBalance> {
        self.slot(lane).balance()
    }

    /// Subscribe to submission, confirmation and state-change events
    pub fn subscribe(&self) -> broadcast::Receiver<TransferEvent> {
        self.inner.events.subscribe()
    }

    /// Submit a transfer on `lane`.
    ///
    /// Returns as soon as the wallet API has accepted the send. Confirmation
    /// runs in the background and is reported through [`Self::subscribe`].
    /// Any earlier transfer on the same lane is cancelled.
    ///
    /// Once validation passes, the send runs on its own task. Dropping this
    /// future does not abandon the lane: the send still completes and its
    /// confirmation poll still starts.
    pub async fn submit_transfer(
        &self,
        lane: Lane,
        request: TransferRequest,
    ) -> Result<TxId, SubmitError> {
        let slot = self.slot(lane);

        let amount = request.validate()?;
        slot.spec().check_chain(request.chain_id)?;
        let ticket = slot.begin()?;

        tracing::info!(
            %lane,
            to = %request.to_address,
            amount = amount.human(),
            wei = %amount,
            chain_id = request.chain_id,
            "Submitting transfer"
        );

        let coordinator = self.clone();
        let send_ticket = ticket.clone();
        let sending = tokio::spawn(async move {
            coordinator.send_and_track(send_ticket, request, amount).await
        });

        match sending.await {
            Ok(result) => result,
            Err(e) => Err(fail(
                &ticket,
                SubmitError::NetworkError(format!("send task failed: {}", e)),
            )),
        }
    }

    async fn send_and_track(
        self,
        ticket: PollTicket,
        request: TransferRequest,
        amount: NormalizedAmount,
    ) -> Result<TxId, SubmitError> {
        let lane = ticket.lane();
        let spec = self.lane_spec(lane);

        let initial_balance = match self
            .inner
            .api
            .get_balance(
                request.from_address.as_str(),
                request.chain_id,
                spec.token_address(),
            )
            .await
        {
            Ok(balances) => first_snapshot(&balances),
            Err(e) => {
                tracing::debug!(%lane, error = %e, "Could not snapshot balance before send");
                None
            }
        };

        let sent = spec
            .send(
                self.inner.api.as_ref(),
                &self.inner.session.auth_token,
                &request,
                &amount,
            )
            .await;

        let tx_id = match sent {
            Ok(Some(tx_id)) => tx_id,
            Ok(None) => return Err(fail(&ticket, SubmitError::NoTransactionId)),
            Err(e) => return Err(fail(&ticket, SubmitError::from(e))),
        };

        let submitted = TransferEvent::Submitted {
            lane,
            tx_id: tx_id.clone(),
        };
        if !ticket.commit(
            TransferState::Submitted {
                tx_id: tx_id.clone(),
            },
            None,
            Some(submitted),
        ) {
            tracing::warn!(%lane, %tx_id, "Transfer closed while submitting, skipping confirmation");
            return Ok(tx_id);
        }
        tracing::info!(%lane, %tx_id, "Transfer submitted");

        self.start_confirmation(ticket, &request, tx_id.clone(), initial_balance);
        Ok(tx_id)
    }

    /// Close the transfer on a lane: cancel its poll and go back to `Idle`
    pub fn close(&self, lane: Lane) {
        tracing::debug!(%lane, "Closing transfer");
        self.slot(lane).reset();
    }

    /// Close both lanes (session end)
    pub fn close_all(&self) {
        for lane in Lane::ALL {
            self.close(lane);
        }
    }

    fn start_confirmation(
        &self,
        ticket: PollTicket,
        request: &TransferRequest,
        tx_id: TxId,
        initial_balance: Option<BalanceSnapshot>,
    ) {
        if !ticket.commit(
            TransferState::Verifying {
                tx_id: tx_id.clone(),
            },
            None,
            None,
        ) {
            return;
        }

        let job = PollJob {
            ticket: ticket.clone(),
            api: Arc::clone(&self.inner.api),
            wallet_address: request.from_address.to_string(),
            chain_id: request.chain_id,
            token_address: self
                .lane_spec(ticket.lane())
                .token_address()
                .map(str::to_string),
            initial_balance,
            expected_change: request.expected_change(),
            tx_id,
            config: self.inner.poll.clone(),
        };

        let coordinator = self.clone();
        let handle = tokio::spawn(async move { coordinator.confirm(job).await });
        ticket.attach(handle);
    }

    async fn confirm(self, job: PollJob) {
        let ticket = job.ticket.clone();
        let tx_id = job.tx_id.clone();
        let lane = ticket.lane();

        match job.run().await {
            PollOutcome::Confirmed {
                source,
                attempts,
                balance,
            } => {
                let event = TransferEvent::Confirmed {
                    lane,
                    tx_id: tx_id.clone(),
                    source,
                    attempts,
                };
                let state = TransferState::Confirmed {
                    tx_id: tx_id.clone(),
                };
                if ticket.commit(state, balance, Some(event)) {
                    tracing::info!(%lane, %tx_id, ?source, attempts, "Transfer confirmed");
                    self.refresh_wallet_data().await;
                }
            }
            PollOutcome::TimedOut { attempts } => {
                let advisory = VERIFICATION_TIMEOUT_ADVISORY.to_string();
                let event = TransferEvent::TimedOut {
                    lane,
                    tx_id: tx_id.clone(),
                    advisory: advisory.clone(),
                    attempts,
                };
                let state = TransferState::Unconfirmed {
                    tx_id: tx_id.clone(),
                    advisory,
                };
                if ticket.commit(state, None, Some(event)) {
                    tracing::warn!(%lane, %tx_id, attempts, "Transfer verification timed out");
                }
            }
            PollOutcome::Cancelled => {
                tracing::debug!(%lane, %tx_id, "Confirmation poll cancelled");
            }
        }
    }
}

/// Record a submission failure on the lane and hand the error back
fn fail(ticket: &PollTicket, err: SubmitError) -> SubmitError {
    tracing::warn!(lane = %ticket.lane(), error = %err, "Transfer submission failed");
    ticket.commit(
        TransferState::Failed {
            reason: err.to_string(),
        },
        None,
        None,
    );
    err
}
