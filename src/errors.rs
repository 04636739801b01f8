use std::io;

use thiserror::Error;

/// Reasons a new transaction can be rejected before it reaches the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a description")]
    EmptyDescription,
    #[error("Please enter an amount")]
    MissingAmount,
    #[error("Please enter a valid amount")]
    InvalidAmount,
    #[error("No more transactions can be added")]
    IdsExhausted,
}

/// Error type that captures common ledger failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("Stored ledger could not be read: {0}")]
    Deserialization(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl LedgerError {
    /// Returns true for I/O failures that are worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            LedgerError::Io(err) => matches!(
                err.kind(),
                io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }
}

/// Failures raised while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
}
