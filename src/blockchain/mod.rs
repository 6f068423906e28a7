pub mod block;
pub mod hasher;
pub mod model;

pub use block::Block;
pub use model::{Blockchain, ChainViolation, ViolationKind};

use chrono::Utc;

/// Default Proof-of-Work difficulty (number of leading zeros).
pub const DEFAULT_DIFFICULTY: u32 = 2;

/// Difficulty ceiling (keep low in dev to avoid long waits)
pub const DIFF_MAX: u32 = 6;

/// Hard ceiling: a hex SHA-256 digest has 64 characters.
pub const POW_DIFFICULTY_LIMIT: u32 = 64;

/// Current Unix timestamp (UTC, seconds).
pub fn now_ts() -> i64 {
    Utc::now().timestamp()
}
