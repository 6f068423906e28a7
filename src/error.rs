//! Error types for the property ledger.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("property not found: {0}")]
    PropertyNotFound(String),

    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("cannot transfer a property to its current owner")]
    NoOpTransfer,

    #[error("owner cannot rent a property to themselves")]
    SelfRental,

    #[error("account {actor} is not the owner of this property (owner: {owner})")]
    Unauthorized { actor: String, owner: String },

    #[error("property is not currently rented: {0}")]
    NotRented(String),

    #[error("chain is empty (genesis block missing)")]
    EmptyChain,

    #[error("account id already exists: {0}")]
    DuplicateAccountId(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("state lock poisoned")]
    LockPoisoned,
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
