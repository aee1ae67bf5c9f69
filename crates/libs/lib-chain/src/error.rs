//! Errors raised while talking to the wallet provider or the contract.

use lib_core::AppError;
use thiserror::Error;

/// JSON-RPC code wallets use for "user rejected the request" (EIP-1193).
pub const USER_REJECTED_CODE: i64 = 4001;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ChainError {
    /// The wallet holder declined the request.
    #[error("User rejected the request: {0}")]
    UserRejected(String),

    /// The node or wallet answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The endpoint could not be reached or answered with a non-success HTTP status.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Wrong network: expected chain {expected}, wallet is on chain {actual}")]
    WrongNetwork { expected: u64, actual: u64 },

    /// A response could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("No wallet account available")]
    NoAccount,

    /// No RPC endpoint or contract address configured.
    #[error("Chain client not configured: {0}")]
    NotConfigured(String),

    /// The transaction was mined but reverted.
    #[error("Transaction {0} reverted")]
    Reverted(String),
}

impl ChainError {
    /// Classify a JSON-RPC error object. Rejections are recognised by code
    /// 4001 or by the `ACTION_REJECTED` marker some wallets put in the message.
    pub fn from_rpc(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        let lowered = message.to_lowercase();
        if code == USER_REJECTED_CODE
            || message.contains("ACTION_REJECTED")
            || lowered.contains("user rejected")
            || lowered.contains("user denied")
        {
            ChainError::UserRejected(message)
        } else {
            ChainError::Rpc { code, message }
        }
    }

    pub fn is_user_rejection(&self) -> bool {
        matches!(self, ChainError::UserRejected(_))
    }
}

impl From<ChainError> for AppError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::UserRejected(msg) => AppError::UserRejected(msg),
            ChainError::Rpc { .. } | ChainError::Transport(_) => AppError::Rpc(err.to_string()),
            ChainError::NoAccount => AppError::InvalidInput(err.to_string()),
            ChainError::NotConfigured(_) => AppError::Config(err.to_string()),
            ChainError::WrongNetwork { .. } | ChainError::Decode(_) | ChainError::Reverted(_) => {
                AppError::Chain(err.to_string())
            }
        }
    }
}
