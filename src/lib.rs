//! Tamper-evident ledger of property ownership events.
//!
//! Every creation, transfer and rental is mined as a Proof-of-Work block on a
//! locally verified hash chain before the property registry is updated.

pub mod api;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod registry;
pub mod service;
pub mod storage;
pub mod transaction;

pub use blockchain::{Block, Blockchain};
pub use config::Config;
pub use error::{ChainError, Result};
pub use service::PropertyService;
pub use transaction::Transaction;
