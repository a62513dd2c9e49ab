//! Scripted in-memory [`WalletApi`] for tests
//!
//! Each endpoint plays back a script of results. When a script runs out, its
//! last entry repeats.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use carnival_core::{ApiError, ChainId};
use wallet_api_client::{
    SendTokenRequest, SendTransactionResponse, TokenHolding, TokenTransferRequest,
    TokenTransferResponse, VerifyBalanceChangeRequest, WalletApi, WalletBalance,
};

type Scripted<T> = std::result::Result<T, ApiError>;

struct Script<T: Clone> {
    queue: VecDeque<Scripted<T>>,
    last: Scripted<T>,
}

impl<T: Clone> Script<T> {
    fn new(default: Scripted<T>) -> Self {
        Self {
            queue: VecDeque::new(),
            last: default,
        }
    }

    fn set(&mut self, items: impl IntoIterator<Item = Scripted<T>>) {
        self.queue = items.into_iter().collect();
    }

    fn next(&mut self) -> Scripted<T> {
        if let Some(item) = self.queue.pop_front() {
            self.last = item;
        }
        self.last.clone()
    }
}

/// Number of calls made per endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub send: usize,
    pub token_transfer: usize,
    pub balance: usize,
    pub verify: usize,
    pub tokens: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.send + self.token_transfer + self.balance + self.verify + self.tokens
    }
}

struct FakeState {
    send: Script<Vec<String>>,
    token_transfer: Script<TokenTransferResponse>,
    native_balance: Script<Option<String>>,
    token_balance: Script<Option<String>>,
    verify: Script<bool>,
    tokens: Script<Vec<TokenHolding>>,
    send_delay: Option<Duration>,
    calls: CallCounts,
    sent: Vec<SendTokenRequest>,
    token_sent: Vec<TokenTransferRequest>,
    verify_requests: Vec<VerifyBalanceChangeRequest>,
    auth_tokens: Vec<String>,
}

/// Fake wallet API.
///
/// Defaults: sends succeed with `0xtx`, balances are a constant `"1000"`,
/// verification answers `false`, the wallet holds no tokens.
pub struct FakeWalletApi {
    state: Mutex<FakeState>,
}

impl Default for FakeWalletApi {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeWalletApi {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                send: Script::new(Ok(vec!["0xtx".to_string()])),
                token_transfer: Script::new(Ok(TokenTransferResponse {
                    transaction_id: Some("0xtoken-tx".to_string()),
                    ..Default::default()
                })),
                native_balance: Script::new(Ok(Some("1000".to_string()))),
                token_balance: Script::new(Ok(Some("1000".to_string()))),
                verify: Script::new(Ok(false)),
                tokens: Script::new(Ok(Vec::new())),
                send_delay: None,
                calls: CallCounts::default(),
                sent: Vec::new(),
                token_sent: Vec::new(),
                verify_requests: Vec::new(),
                auth_tokens: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Transaction ids returned by successive native sends
    pub fn with_send_results(self, results: impl IntoIterator<Item = Scripted<Vec<String>>>) -> Self {
        self.lock().send.set(results);
        self
    }

    pub fn with_token_transfer_results(
        self,
        results: impl IntoIterator<Item = Scripted<TokenTransferResponse>>,
    ) -> Self {
        self.lock().token_transfer.set(results);
        self
    }

    /// Raw balance values returned by successive native balance queries
    pub fn with_native_balances(self, values: impl IntoIterator<Item = Scripted<Option<String>>>) -> Self {
        self.lock().native_balance.set(values);
        self
    }

    /// Raw balance values returned by successive token balance queries
    pub fn with_token_balances(self, values: impl IntoIterator<Item = Scripted<Option<String>>>) -> Self {
        self.lock().token_balance.set(values);
        self
    }

    pub fn with_verify_results(self, results: impl IntoIterator<Item = Scripted<bool>>) -> Self {
        self.lock().verify.set(results);
        self
    }

    /// Holdings returned by successive token list queries
    pub fn with_tokens(self, results: impl IntoIterator<Item = Scripted<Vec<TokenHolding>>>) -> Self {
        self.lock().tokens.set(results);
        self
    }

    pub fn set_tokens(&self, results: impl IntoIterator<Item = Scripted<Vec<TokenHolding>>>) {
        self.lock().tokens.set(results);
    }

    /// Make send calls take this long
    pub fn with_send_delay(self, delay: Duration) -> Self {
        self.lock().send_delay = Some(delay);
        self
    }

    /// Replace the native balance script mid-test
    pub fn set_native_balances(&self, values: impl IntoIterator<Item = Scripted<Option<String>>>) {
        self.lock().native_balance.set(values);
    }

    pub fn calls(&self) -> CallCounts {
        self.lock().calls
    }

    pub fn sent(&self) -> Vec<SendTokenRequest> {
        self.lock().sent.clone()
    }

    pub fn token_sent(&self) -> Vec<TokenTransferRequest> {
        self.lock().token_sent.clone()
    }

    pub fn verify_requests(&self) -> Vec<VerifyBalanceChangeRequest> {
        self.lock().verify_requests.clone()
    }

    pub fn auth_tokens(&self) -> Vec<String> {
        self.lock().auth_tokens.clone()
    }

    async fn delay_send(&self) {
        let delay = self.lock().send_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

/// A network-style failure for scripts
pub fn network_error() -> ApiError {
    ApiError::Unreachable {
        url: "http://fake-wallet-api".to_string(),
        message: "connection reset".to_string(),
    }
}

#[async_trait]
impl WalletApi for FakeWalletApi {
    async fn send_tokens(
        &self,
        auth_token: &str,
        request: &SendTokenRequest,
    ) -> Result<SendTransactionResponse, ApiError> {
        let result = {
            let mut state = self.lock();
            state.calls.send += 1;
            state.sent.push(request.clone());
            state.auth_tokens.push(auth_token.to_string());
            state.send.next()
        };
        self.delay_send().await;
        result.map(|transaction_ids| SendTransactionResponse { transaction_ids })
    }

    async fn transfer_token(
        &self,
        auth_token: &str,
        request: &TokenTransferRequest,
    ) -> Result<TokenTransferResponse, ApiError> {
        let result = {
            let mut state = self.lock();
            state.calls.token_transfer += 1;
            state.token_sent.push(request.clone());
            state.auth_tokens.push(auth_token.to_string());
            state.token_transfer.next()
        };
        self.delay_send().await;
        result
    }

    async fn get_balance(
        &self,
        _address: &str,
        chain_id: ChainId,
        token_address: Option<&str>,
    ) -> Result<Vec<WalletBalance>, ApiError> {
        let mut state = self.lock();
        state.calls.balance += 1;
        let value = match token_address {
            Some(_) => state.token_balance.next()?,
            None => state.native_balance.next()?,
        };
        Ok(value
            .map(|value| WalletBalance {
                chain_id: Some(chain_id),
                token_address: token_address.map(str::to_string),
                value: Some(value),
                ..Default::default()
            })
            .into_iter()
            .collect())
    }

    async fn verify_balance_change(
        &self,
        request: &VerifyBalanceChangeRequest,
    ) -> Result<bool, ApiError> {
        let mut state = self.lock();
        state.calls.verify += 1;
        state.verify_requests.push(request.clone());
        state.verify.next()
    }

    async fn get_tokens(&self, _address: &str, _chain_id: ChainId) -> Result<Vec<TokenHolding>, ApiError> {
        let mut state = self.lock();
        state.calls.tokens += 1;
        state.tokens.next()
    }
}
