use log::{info, warn};
use serde::Serialize;
use std::fmt;

use super::{Block, POW_DIFFICULTY_LIMIT};
use crate::error::{ChainError, Result};
use crate::storage::JsonStore;
use crate::transaction::Transaction;

/// Why a chain failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// `previous_hash` does not match the hash of the preceding block.
    BrokenLink,
    /// Block hash has fewer leading zeros than the difficulty requires.
    InsufficientWork,
}

/// First offending block found by [`Blockchain::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChainViolation {
    pub index: u64,
    pub kind: ViolationKind,
}

impl fmt::Display for ChainViolation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            ViolationKind::BrokenLink => write!(f, "block #{} has a broken link", self.index),
            ViolationKind::InsufficientWork => {
                write!(f, "block #{} does not meet the difficulty", self.index)
            }
        }
    }
}

/// Append-only chain of mined blocks with Proof-of-Work, optionally
/// persisted as a full snapshot after every append.
#[derive(Debug)]
pub struct Blockchain {
    chain: Vec<Block>,
    difficulty: u32,
    store: Option<JsonStore<Vec<Block>>>,
}

impl Blockchain {
    /// Load the persisted chain as-is (it is trusted, not re-verified) or
    /// mine and persist a fresh genesis block.
    pub fn open(difficulty: u32, store: JsonStore<Vec<Block>>) -> Result<Self> {
        let difficulty = clamp_difficulty(difficulty);
        if let Some(chain) = store.load()? {
            info!(
                "loaded chain with {} block(s) from {}",
                chain.len(),
                store.path().display()
            );
            if chain.is_empty() {
                warn!("persisted chain is empty");
            }
            return Ok(Self {
                chain,
                difficulty,
                store: Some(store),
            });
        }

        let bc = Self {
            chain: vec![mined_genesis(difficulty)?],
            difficulty,
            store: Some(store),
        };
        bc.persist()?;
        info!("created genesis block (difficulty={})", difficulty);
        Ok(bc)
    }

    /// Chain seeded with a genesis block that is never written to disk.
    pub fn in_memory(difficulty: u32) -> Result<Self> {
        let difficulty = clamp_difficulty(difficulty);
        Ok(Self {
            chain: vec![mined_genesis(difficulty)?],
            difficulty,
            store: None,
        })
    }

    /// Return the last block in the chain.
    pub fn last_block(&self) -> Result<&Block> {
        self.chain.last().ok_or(ChainError::EmptyChain)
    }

    /// Mine a new block carrying `transactions` and persist the chain with it.
    /// Blocks the calling thread while mining. If the write fails the block is
    /// dropped and the in-memory chain is left as it was.
    pub fn add_block(&mut self, transactions: Vec<Transaction>) -> Result<Block> {
        let index = self.chain.len() as u64;
        let previous_hash = self.last_block()?.hash()?;

        let mut block = Block::new(index, previous_hash, transactions);
        let hash = block.mine(self.difficulty)?;

        self.chain.push(block.clone());
        if let Err(err) = self.persist() {
            self.chain.pop();
            warn!("dropped block #{}: chain could not be persisted", block.index);
            return Err(err);
        }
        info!(
            "sealed block #{} (hash={}, nonce={}, txs={})",
            block.index,
            hash,
            block.nonce,
            block.transactions.len()
        );
        Ok(block)
    }

    /// Walk the chain from index 1 checking linkage and Proof-of-Work.
    /// The genesis block is not hash-checked.
    pub fn validate(&self) -> std::result::Result<(), ChainViolation> {
        for pair in self.chain.windows(2) {
            let (prev, current) = (&pair[0], &pair[1]);

            let linked = matches!(prev.hash(), Ok(h) if h == current.previous_hash);
            if !linked {
                return Err(ChainViolation {
                    index: current.index,
                    kind: ViolationKind::BrokenLink,
                });
            }

            if !current.meets_difficulty(self.difficulty) {
                return Err(ChainViolation {
                    index: current.index,
                    kind: ViolationKind::InsufficientWork,
                });
            }
        }
        Ok(())
    }

    pub fn is_chain_valid(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn get(&self, index: u64) -> Option<&Block> {
        usize::try_from(index).ok().and_then(|i| self.chain.get(i))
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    fn persist(&self) -> Result<()> {
        match &self.store {
            Some(store) => store.save(&self.chain),
            None => Ok(()),
        }
    }

    #[cfg(test)]
    pub(crate) fn chain_mut(&mut self) -> &mut Vec<Block> {
        &mut self.chain
    }
}

pub(crate) fn clamp_difficulty(difficulty: u32) -> u32 {
    if difficulty > POW_DIFFICULTY_LIMIT {
        warn!(
            "difficulty {} exceeds the digest length, using {}",
            difficulty, POW_DIFFICULTY_LIMIT
        );
        return POW_DIFFICULTY_LIMIT;
    }
    difficulty
}

fn mined_genesis(difficulty: u32) -> Result<Block> {
    let mut genesis = Block::genesis();
    genesis.mine(difficulty)?;
    Ok(genesis)
}
