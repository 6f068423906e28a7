use log::debug;
use serde::{Deserialize, Serialize};

use super::hasher::{self, ZERO_HASH};
use super::now_ts;
use crate::error::Result;
use crate::transaction::Transaction;

/// A single block in the ledger holding an ordered batch of transactions.
///
/// The block hash is derived, never stored: it is recomputed from
/// `{index, previous_hash, timestamp, transactions, nonce}` on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub previous_hash: String,
    pub timestamp: i64, // Unix timestamp (UTC)
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub nonce: u64, // Proof-of-Work nonce
}

impl Block {
    /// Create the genesis block candidate (first block in the chain), not mined yet.
    pub fn genesis() -> Self {
        Self::with_timestamp(0, ZERO_HASH.to_string(), vec![Transaction::genesis()], now_ts())
    }

    /// Create a new block (not mined yet). Call `mine()` to perform PoW.
    pub fn new(index: u64, previous_hash: String, transactions: Vec<Transaction>) -> Self {
        Self::with_timestamp(index, previous_hash, transactions, now_ts())
    }

    pub fn with_timestamp(
        index: u64,
        previous_hash: String,
        transactions: Vec<Transaction>,
        timestamp: i64,
    ) -> Self {
        Self {
            index,
            previous_hash,
            timestamp,
            transactions,
            nonce: 0,
        }
    }

    /// SHA-256 of the block's canonical serialization, as lowercase hex.
    pub fn hash(&self) -> Result<String> {
        hasher::digest(self)
    }

    /// Perform Proof-of-Work by finding a nonce that yields a hash
    /// starting with `difficulty` leading zeros (in hex).
    pub fn mine(&mut self, difficulty: u32) -> Result<String> {
        loop {
            let hash = self.hash()?;
            if hasher::meets_difficulty(&hash, difficulty) {
                debug!(
                    "mined block #{} (nonce={}, hash={})",
                    self.index, self.nonce, hash
                );
                return Ok(hash);
            }
            self.nonce = self.nonce.wrapping_add(1);
        }
    }

    /// Whether this block's hash satisfies the PoW difficulty.
    /// (Does NOT validate chain linkage.)
    pub fn meets_difficulty(&self, difficulty: u32) -> bool {
        match self.hash() {
            Ok(hash) => hasher::meets_difficulty(&hash, difficulty),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Block;
    use crate::blockchain::hasher::ZERO_HASH;
    use crate::transaction::Transaction;

    fn transfer(from: &str, to: &str) -> Transaction {
        Transaction::Transfer {
            property_id: "p-1".into(),
            from: from.into(),
            to: to.into(),
            timestamp: 1_700_000_060,
        }
    }

    #[test]
    fn genesis_layout() {
        let b = Block::genesis();
        assert_eq!(b.index, 0);
        assert_eq!(b.previous_hash, ZERO_HASH);
        assert_eq!(b.nonce, 0);
        assert_eq!(b.transactions, vec![Transaction::genesis()]);
    }

    #[test]
    fn hash_matches_reference_vector() {
        let b = Block::with_timestamp(
            0,
            ZERO_HASH.into(),
            vec![Transaction::genesis()],
            1_700_000_000,
        );
        assert_eq!(
            b.hash().unwrap(),
            "86fc837d711eef49838718cda0c9c25f50799bce573392beac4990b905d87470"
        );
    }

    #[test]
    fn mining_produces_leading_zeros() {
        let mut b = Block::with_timestamp(
            1,
            "86fc837d711eef49838718cda0c9c25f50799bce573392beac4990b905d87470".into(),
            vec![transfer("alice", "bob")],
            1_700_000_060,
        );
        let hash = b.mine(2).unwrap();
        assert_eq!(b.nonce, 85);
        assert_eq!(
            hash,
            "00163d474afdd5ff802df3d0f2d99123f8cf3c6d73daa103cdbcbcc5619bb3e0"
        );
        assert!(b.meets_difficulty(2));
    }

    #[test]
    fn zero_difficulty_accepts_first_nonce() {
        let mut b = Block::new(1, "prev".into(), vec![transfer("alice", "bob")]);
        b.mine(0).unwrap();
        assert_eq!(b.nonce, 0);
    }

    #[test]
    fn hash_changes_when_mutated() {
        let mut b = Block::new(2, "prev".into(), vec![transfer("alice", "bob")]);
        b.mine(2).unwrap();
        let old_hash = b.hash().unwrap();

        // Tampering: add a transaction after the fact
        b.transactions.push(transfer("bob", "carlos"));

        assert_ne!(old_hash, b.hash().unwrap());
    }
}
