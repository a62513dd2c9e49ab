//! Error types for Carnival Wallet

use thiserror::Error;

use crate::Lane;

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Wallet API transport and response errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Wallet API unreachable at {url}: {message}")]
    Unreachable { url: String, message: String },

    #[error("Wallet API returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Wallet API request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Amount normalization errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("Amount is empty")]
    Empty,

    #[error("Amount must not be negative: {0}")]
    Negative(String),

    #[error("Invalid amount format: {0}")]
    Malformed(String),
}

/// Whether a submission error happened before or after touching the network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitErrorKind {
    /// Local validation, no network call made
    Validation,
    /// The send call itself failed or returned no id
    Submission,
}

/// Errors returned synchronously by `submit_transfer`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("The {lane} lane is not available on chain {chain_id}")]
    LaneUnavailable { lane: Lane, chain_id: u64 },

    #[error("A transfer is already being submitted on the {lane} lane")]
    LaneBusy { lane: Lane },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Transaction failed - no transaction ID returned")]
    NoTransactionId,
}

impl SubmitErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Submission => "submission",
        }
    }
}

impl SubmitError {
    pub fn kind(&self) -> SubmitErrorKind {
        match self {
            Self::InvalidAmount(_)
            | Self::MissingField { .. }
            | Self::LaneUnavailable { .. }
            | Self::LaneBusy { .. } => SubmitErrorKind::Validation,
            Self::NetworkError(_) | Self::NoTransactionId => SubmitErrorKind::Submission,
        }
    }

    /// Get an HTTP-friendly error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "invalid_amount",
            Self::MissingField { .. } => "missing_field",
            Self::LaneUnavailable { .. } => "lane_unavailable",
            Self::LaneBusy { .. } => "lane_busy",
            Self::NetworkError(_) => "network_error",
            Self::NoTransactionId => "no_transaction_id",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidAmount(_) | Self::MissingField { .. } => 400,
            Self::LaneUnavailable { .. } => 422,
            Self::LaneBusy { .. } => 409,
            Self::NetworkError(_) | Self::NoTransactionId => 502,
        }
    }
}

impl From<ApiError> for SubmitError {
    fn from(err: ApiError) -> Self {
        Self::NetworkError(err.to_string())
    }
}
