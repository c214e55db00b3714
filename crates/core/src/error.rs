//! Error types for the round-trip arbitrage system

use thiserror::Error;

/// Main error type for the arbitrage system
#[derive(Error, Debug)]
pub enum ArbitrageError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request error: {0}")]
    Http(String),

    #[error("Quote service returned {status}: {body}")]
    QuoteService { status: u16, body: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Invalid mint: {0}")]
    InvalidMint(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Telegram error: {0}")]
    Telegram(String),
}

/// How the trade loop reacts to an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network or service hiccup, drop the current unit of work
    Transient,
    /// A signed transaction was rejected, skip the remaining legs
    Submission,
    /// Bad mint, key or user input
    InvalidInput,
    /// Stop the loop and alert the chat
    Fatal,
}

impl ArbitrageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ArbitrageError::Http(_)
            | ArbitrageError::QuoteService { .. }
            | ArbitrageError::Decode(_)
            | ArbitrageError::Serialization(_)
            | ArbitrageError::Rpc(_)
            | ArbitrageError::Telegram(_) => ErrorKind::Transient,
            ArbitrageError::Transaction(_) => ErrorKind::Submission,
            ArbitrageError::InvalidMint(_) | ArbitrageError::Wallet(_) => ErrorKind::InvalidInput,
            ArbitrageError::Config(_) => ErrorKind::Fatal,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Fatal
    }
}

impl From<reqwest::Error> for ArbitrageError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ArbitrageError::Decode(e.to_string())
        } else {
            ArbitrageError::Http(e.to_string())
        }
    }
}

impl From<solana_rpc_client_api::client_error::Error> for ArbitrageError {
    fn from(e: solana_rpc_client_api::client_error::Error) -> Self {
        ArbitrageError::Rpc(e.to_string())
    }
}

impl From<base64::DecodeError> for ArbitrageError {
    fn from(e: base64::DecodeError) -> Self {
        ArbitrageError::Decode(format!("base64: {}", e))
    }
}

impl From<bincode::Error> for ArbitrageError {
    fn from(e: bincode::Error) -> Self {
        ArbitrageError::Decode(format!("bincode: {}", e))
    }
}

/// Result type alias for arbitrage operations
pub type ArbitrageResult<T> = Result<T, ArbitrageError>;
