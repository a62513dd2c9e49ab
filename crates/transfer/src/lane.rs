//! Transfer lanes
//!
//! A lane is one independent instance of the transfer state machine. The
//! native currency and the secondary token each get their own [`LaneSlot`],
//! parametrized by a [`LaneSpec`].
//!
//! Every mutation from a background poll goes through a [`PollTicket`]. A
//! ticket carries the generation it was issued for; once the lane moves on
//! (new submission or close) the generation changes and the ticket's writes
//! are dropped.

use std::sync::{Arc, Mutex, MutexGuard};

use carnival_core::constants::DEFAULT_DECIMALS;
use carnival_core::{ApiError, ChainId, Lane, NormalizedAmount, SubmitError, TokenConfig, TxId};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use wallet_api_client::{Recipient, SendTokenRequest, TokenTransferRequest, WalletApi, WalletBalance};

use crate::{TransferEvent, TransferRequest, TransferState};

/// Per-lane parameters: which endpoint sends, which balance is watched
#[derive(Debug, Clone)]
pub struct LaneSpec {
    lane: Lane,
    token: Option<TokenConfig>,
}

impl LaneSpec {
    pub fn native() -> Self {
        Self {
            lane: Lane::Native,
            token: None,
        }
    }

    pub fn token(config: TokenConfig) -> Self {
        Self {
            lane: Lane::Token,
            token: Some(config),
        }
    }

    pub fn lane(&self) -> Lane {
        self.lane
    }

    /// ERC-20 contract for balance and verify queries (`None` for native)
    pub fn token_address(&self) -> Option<&str> {
        self.token.as_ref().map(|t| t.address.as_str())
    }

    pub fn decimals(&self) -> u8 {
        self.token
            .as_ref()
            .map(|t| t.decimals)
            .unwrap_or(DEFAULT_DECIMALS)
    }

    pub fn is_available_on(&self, chain_id: ChainId) -> bool {
        self.token.as_ref().map_or(true, |t| t.chain_id == chain_id)
    }

    pub(crate) fn check_chain(&self, chain_id: ChainId) -> Result<(), SubmitError> {
        if self.is_available_on(chain_id) {
            Ok(())
        } else {
            Err(SubmitError::LaneUnavailable {
                lane: self.lane,
                chain_id,
            })
        }
    }

    /// Call the lane's send endpoint. `Ok(None)` means the API accepted the
    /// call but returned no usable transaction id.
    pub(crate) async fn send(
        &self,
        api: &dyn WalletApi,
        auth_token: &str,
        request: &TransferRequest,
        amount: &NormalizedAmount,
    ) -> Result<Option<TxId>, ApiError> {
        match self.lane {
            Lane::Native => {
                let body = SendTokenRequest {
                    from: request.from_address.to_string(),
                    chain_id: request.chain_id,
                    recipients: vec![Recipient {
                        address: request.to_address.to_string(),
                        quantity: amount.wei_string(),
                    }],
                };
                Ok(api.send_tokens(auth_token, &body).await?.first_tx_id())
            }
            Lane::Token => {
                let body = TokenTransferRequest {
                    to_address: request.to_address.to_string(),
                    amount: amount.wei_string(),
                    from_address: request.from_address.to_string(),
                };
                Ok(api.transfer_token(auth_token, &body).await?.tx_id())
            }
        }
    }
}

struct SlotInner {
    generation: u64,
    poll: Option<JoinHandle<()>>,
}

/// State holder for one lane.
///
/// The UI only reads (`state`, `subscribe_state`, `balance`); all writes come
/// from the coordinator.
pub(crate) struct LaneSlot {
    spec: LaneSpec,
    inner: Mutex<SlotInner>,
    state: watch::Sender<TransferState>,
    balance: watch::Sender<Option<WalletBalance>>,
    events: broadcast::Sender<TransferEvent>,
}

impl LaneSlot {
    pub(crate) fn new(spec: LaneSpec, events: broadcast::Sender<TransferEvent>) -> Self {
        Self {
            spec,
            inner: Mutex::new(SlotInner {
                generation: 0,
                poll: None,
            }),
            state: watch::Sender::new(TransferState::Idle),
            balance: watch::Sender::new(None),
            events,
        }
    }

    pub(crate) fn spec(&self) -> &LaneSpec {
        &self.spec
    }

    pub(crate) fn lane(&self) -> Lane {
        self.spec.lane
    }

    pub(crate) fn state(&self) -> TransferState {
        self.state.borrow().clone()
    }

    pub(crate) fn subscribe_state(&self) -> watch::Receiver<TransferState> {
        self.state.subscribe()
    }

    pub(crate) fn balance(&self) -> Option<WalletBalance> {
        self.balance.borrow().clone()
    }

    pub(crate) fn store_balance(&self, balance: Option<WalletBalance>) {
        self.balance.send_replace(balance);
    }

    fn lock(&self) -> MutexGuard<'_, SlotInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start a new transfer: cancel whatever the lane was doing and move to
    /// `Submitting`. Refused while another send call is in flight.
    pub(crate) fn begin(self: &Arc<Self>) -> Result<PollTicket, SubmitError> {
        let mut inner = self.lock();
        if matches!(*self.state.borrow(), TransferState::Submitting) {
            return Err(SubmitError::LaneBusy { lane: self.lane() });
        }
        inner.generation += 1;
        if let Some(handle) = inner.poll.take() {
            tracing::debug!(lane = %self.lane(), "Cancelling superseded confirmation poll");
            handle.abort();
        }
        self.publish(TransferState::Submitting, None);
        Ok(PollTicket {
            slot: Arc::clone(self),
            generation: inner.generation,
        })
    }

    /// Close the transfer: cancel the poll and return to `Idle`
    pub(crate) fn reset(&self) {
        let mut inner = self.lock();
        inner.generation += 1;
        if let Some(handle) = inner.poll.take() {
            handle.abort();
        }
        if !matches!(*self.state.borrow(), TransferState::Idle) {
            self.publish(TransferState::Idle, None);
        }
    }

    /// Publish a state (and optional signal). Caller holds the lock.
    fn publish(&self, state: TransferState, signal: Option<TransferEvent>) {
        self.state.send_replace(state.clone());
        // No subscribers is fine
        let _ = self.events.send(TransferEvent::StateChanged {
            lane: self.lane(),
            state,
        });
        if let Some(signal) = signal {
            let _ = self.events.send(signal);
        }
    }
}

/// Capability to mutate one lane for one transfer generation
#[derive(Clone)]
pub(crate) struct PollTicket {
    slot: Arc<LaneSlot>,
    generation: u64,
}

impl PollTicket {
    pub(crate) fn lane(&self) -> Lane {
        self.slot.lane()
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.slot.lock().generation != self.generation
    }

    /// Apply a transition if this ticket is still current.
    ///
    /// The generation check, state write, balance write and event emission
    /// happen under the lane lock, so a cancelled transfer can never write.
    pub(crate) fn commit(
        &self,
        state: TransferState,
        balance: Option<WalletBalance>,
        signal: Option<TransferEvent>,
    ) -> bool {
        let inner = self.slot.lock();
        if inner.generation != self.generation {
            tracing::debug!(
                lane = %self.lane(),
                state = state.as_str(),
                "Discarding transition from a cancelled transfer"
            );
            return false;
        }
        if let Some(balance) = balance {
            self.slot.balance.send_replace(Some(balance));
        }
        self.slot.publish(state, signal);
        true
    }

    /// Hand the poll task's handle to the lane so a later cancel can abort it
    pub(crate) fn attach(&self, handle: JoinHandle<()>) {
        let mut inner = self.slot.lock();
        if inner.generation == self.generation {
            inner.poll = Some(handle);
        } else {
            handle.abort();
        }
    }
}
