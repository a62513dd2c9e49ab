//! Application state shared across API handlers

use std::sync::Arc;

use carnival_core::{Address, AppConfig, Chain, ChainId};
use thiserror::Error;
use tokio::sync::RwLock;
use transfer::{Session, TransferCoordinator};
use wallet_api_client::{WalletApi, WalletApiClient};

/// Errors raised by session handling
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("No wallet session is open")]
    NoSession,

    #[error("Invalid session: {reason}")]
    InvalidSession { reason: String },

    #[error("Unsupported chain {0}")]
    UnsupportedChain(ChainId),

    #[error("No shop address configured")]
    ShopUnavailable,
}

impl StateError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoSession => "no_session",
            Self::InvalidSession { .. } => "invalid_session",
            Self::UnsupportedChain(_) => "unsupported_chain",
            Self::ShopUnavailable => "shop_unavailable",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::NoSession => 401,
            Self::InvalidSession { .. } | Self::UnsupportedChain(_) => 400,
            Self::ShopUnavailable => 503,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    api: Arc<dyn WalletApi>,
    session: RwLock<Option<TransferCoordinator>>,
}

impl AppState {
    /// Create state backed by the HTTP wallet API client
    pub fn new(config: AppConfig) -> Result<Self, carnival_core::ApiError> {
        let client = WalletApiClient::new(&config.api)?;
        tracing::info!(base_url = client.base_url(), "Wallet API client created");
        Ok(Self::with_api(config, Arc::new(client)))
    }

    /// Create state with a specific wallet API implementation
    pub fn with_api(config: AppConfig, api: Arc<dyn WalletApi>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                session: RwLock::new(None),
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Open a session, replacing (and closing) any previous one
    pub async fn open_session(
        &self,
        token: &str,
        wallet_address: &str,
        chain_id: Option<ChainId>,
    ) -> Result<TransferCoordinator, StateError> {
        if token.trim().is_empty() {
            return Err(StateError::InvalidSession {
                reason: "token is empty".to_string(),
            });
        }
        if wallet_address.trim().is_empty() {
            return Err(StateError::InvalidSession {
                reason: "wallet address is empty".to_string(),
            });
        }
        let chain_id = chain_id.unwrap_or(self.inner.config.default_chain_id);
        if Chain::by_id(chain_id).is_none() {
            return Err(StateError::UnsupportedChain(chain_id));
        }

        let coordinator = TransferCoordinator::new(
            Arc::clone(&self.inner.api),
            Session::new(wallet_address.trim(), token, chain_id),
            self.inner.config.poll.clone(),
            self.inner.config.token.clone(),
        );

        let mut session = self.inner.session.write().await;
        if let Some(previous) = session.replace(coordinator.clone()) {
            previous.close_all();
        }
        tracing::info!(wallet = wallet_address, chain_id, "Wallet session opened");
        Ok(coordinator)
    }

    /// Close the session. Returns false if none was open.
    pub async fn close_session(&self) -> bool {
        match self.inner.session.write().await.take() {
            Some(coordinator) => {
                coordinator.close_all();
                tracing::info!("Wallet session closed");
                true
            }
            None => false,
        }
    }

    pub async fn coordinator(&self) -> Result<TransferCoordinator, StateError> {
        self.inner
            .session
            .read()
            .await
            .clone()
            .ok_or(StateError::NoSession)
    }

    /// Treasury that receives NFT purchase payments
    pub fn shop_address(&self) -> Result<Address, StateError> {
        self.inner
            .config
            .shop_address
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .map(Address::new)
            .ok_or(StateError::ShopUnavailable)
    }
}
