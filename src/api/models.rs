use crate::blockchain::{Block, ChainViolation};
use crate::error::{ChainError, Result};
use crate::registry::{Account, Property};
use crate::service::PropertyService;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};

/// Shared application state. A single mutex serializes every ledger and
/// registry access, so only one block is ever mined at a time.
pub struct AppState {
    service: Mutex<PropertyService>,
}

impl AppState {
    pub fn new(service: PropertyService) -> Self {
        Self {
            service: Mutex::new(service),
        }
    }

    pub fn service(&self) -> Result<MutexGuard<'_, PropertyService>> {
        self.service.lock().map_err(|_| ChainError::LockPoisoned)
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/* ---------- Chain API Models ---------- */

/// A block together with its derived hash, for explorers.
#[derive(Serialize)]
pub struct BlockView {
    #[serde(flatten)]
    pub block: Block,
    pub hash: String,
}

#[derive(Serialize)]
pub struct ChainResponse {
    pub length: usize,
    pub difficulty: u32,
    pub chain: Vec<BlockView>,
}

#[derive(Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub length: usize,
    pub difficulty: u32,
    pub violation: Option<ChainViolation>,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub height: usize,
    pub difficulty: u32,
    pub accounts: usize,
    pub properties: usize,
    pub last_block_timestamp: Option<i64>,
    pub last_interval_secs: Option<i64>,
}

/* ---------- Account API Models ---------- */

#[derive(Deserialize)]
pub struct NewAccountRequest {
    pub id: String,
    pub name: String,
}

#[derive(Serialize)]
pub struct AccountsResponse {
    pub count: usize,
    pub accounts: Vec<Account>,
}

/* ---------- Property API Models ---------- */

#[derive(Deserialize)]
pub struct NewPropertyRequest {
    pub owner: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize)]
pub struct TransferRequest {
    pub actor: String,
    pub new_owner: String,
}

#[derive(Deserialize)]
pub struct RentRequest {
    pub actor: String,
    pub renter: String,
}

#[derive(Deserialize)]
pub struct EndRentalRequest {
    pub actor: String,
}

#[derive(Serialize)]
pub struct PropertiesResponse {
    pub count: usize,
    pub properties: Vec<Property>,
}

/// Result of any operation that mined a block.
#[derive(Serialize)]
pub struct MinedResponse {
    pub mined_index: u64,
    pub hash: String,
    pub nonce: u64,
    pub property: Property,
}
