//! Coordinates the ledger and the registries: every domain intent becomes a
//! mined transaction first and a registry mutation second.
//!
//! The chain doubles as a write-ahead log. A block is durable before the
//! registry is touched, so a crash in between leaves a mined transaction
//! that [`PropertyService::reconcile`] replays on the next start.

use log::{info, warn};

use crate::blockchain::{Block, Blockchain, ChainViolation, now_ts};
use crate::config::Config;
use crate::error::{ChainError, Result};
use crate::registry::property::new_property_id;
use crate::registry::{Account, AccountRegistry, HistoryEvent, Property, PropertyRegistry};
use crate::storage::{ACCOUNTS_FILE, CHAIN_FILE, JsonStore, PROPERTIES_FILE};
use crate::transaction::Transaction;

#[derive(Debug)]
pub struct PropertyService {
    blockchain: Blockchain,
    accounts: AccountRegistry,
    properties: PropertyRegistry,
}

impl PropertyService {
    pub fn new(
        blockchain: Blockchain,
        accounts: AccountRegistry,
        properties: PropertyRegistry,
    ) -> Self {
        Self {
            blockchain,
            accounts,
            properties,
        }
    }

    /// Open (or initialise) the three stores under `config.data_dir` and
    /// replay any mined transaction the registry has not applied yet.
    pub fn open(config: &Config) -> Result<Self> {
        let dir = &config.data_dir;
        let blockchain = Blockchain::open(config.difficulty, JsonStore::in_dir(dir, CHAIN_FILE)?)?;
        let accounts = AccountRegistry::open(JsonStore::in_dir(dir, ACCOUNTS_FILE)?)?;
        let properties = PropertyRegistry::open(JsonStore::in_dir(dir, PROPERTIES_FILE)?)?;

        let mut service = Self::new(blockchain, accounts, properties);
        let replayed = service.reconcile()?;
        if replayed > 0 {
            warn!("reconciled {} mined transaction(s) into the registry", replayed);
        }
        info!(
            "ledger ready: {} block(s), {} account(s), {} propert(ies) in {}",
            service.blockchain.len(),
            service.accounts.len(),
            service.properties.len(),
            dir.display()
        );
        Ok(service)
    }

    /// Non-persistent service with demo accounts.
    pub fn in_memory(difficulty: u32) -> Result<Self> {
        Ok(Self::new(
            Blockchain::in_memory(difficulty)?,
            AccountRegistry::in_memory(),
            PropertyRegistry::in_memory(),
        ))
    }

    /* -------------------- Domain operations -------------------- */

    /// Mine a `create_property` transaction, then register the property with
    /// its `created` entry pointing at that block.
    pub fn create_property(&mut self, owner: &str, title: &str, description: &str) -> Result<Property> {
        self.require_account(owner)?;
        let title = title.trim();
        if title.is_empty() {
            return Err(ChainError::InvalidInput("title must not be empty".into()));
        }

        let property_id = new_property_id();
        let timestamp = now_ts();
        let tx = Transaction::CreateProperty {
            property_id: property_id.clone(),
            owner: owner.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            timestamp,
        };
        let block = self.blockchain.add_block(vec![tx.clone()])?;
        self.apply(&tx, block.index);
        self.properties.save()?;

        info!("property {} created by {} in block #{}", property_id, owner, block.index);
        self.get_property(&property_id)
    }

    /// Transfer ownership from `actor` (who must be the owner) to `new_owner`.
    /// Clears any active rental.
    pub fn transfer_property(&mut self, actor: &str, property_id: &str, new_owner: &str) -> Result<Block> {
        let from = {
            let prop = self.property(property_id)?;
            ensure_owner(actor, prop)?;
            if new_owner == prop.owner {
                warn!("rejected transfer of {}: {} already owns it", property_id, new_owner);
                return Err(ChainError::NoOpTransfer);
            }
            prop.owner.clone()
        };
        self.require_account(new_owner)?;

        let tx = Transaction::Transfer {
            property_id: property_id.to_string(),
            from,
            to: new_owner.to_string(),
            timestamp: now_ts(),
        };
        let block = self.blockchain.add_block(vec![tx.clone()])?;
        self.apply(&tx, block.index);
        self.properties.save()?;
        info!("property {} transferred to {} in block #{}", property_id, new_owner, block.index);
        Ok(block)
    }

    /// Rent the property out to `renter`; ownership is unchanged. Renting an
    /// already rented property replaces the renter.
    pub fn rent_property(&mut self, actor: &str, property_id: &str, renter: &str) -> Result<Block> {
        let owner = {
            let prop = self.property(property_id)?;
            ensure_owner(actor, prop)?;
            if renter == prop.owner {
                warn!("rejected rental of {}: renter is the owner", property_id);
                return Err(ChainError::SelfRental);
            }
            prop.owner.clone()
        };
        self.require_account(renter)?;

        let tx = Transaction::Rent {
            property_id: property_id.to_string(),
            owner,
            renter: renter.to_string(),
            timestamp: now_ts(),
        };
        let block = self.blockchain.add_block(vec![tx.clone()])?;
        self.apply(&tx, block.index);
        self.properties.save()?;
        info!("property {} rented to {} in block #{}", property_id, renter, block.index);
        Ok(block)
    }

    /// End the active rental. Either the owner or the current renter may do so.
    pub fn end_rental(&mut self, actor: &str, property_id: &str) -> Result<Block> {
        let (owner, renter) = {
            let prop = self.property(property_id)?;
            let renter = prop
                .rented_to
                .clone()
                .ok_or_else(|| ChainError::NotRented(property_id.to_string()))?;
            if actor != prop.owner && actor != renter {
                warn!("rejected end of rental of {}: {} is neither owner nor renter", property_id, actor);
                return Err(ChainError::Unauthorized {
                    actor: actor.to_string(),
                    owner: prop.owner.clone(),
                });
            }
            (prop.owner.clone(), renter)
        };

        let tx = Transaction::EndRental {
            property_id: property_id.to_string(),
            owner,
            renter,
            timestamp: now_ts(),
        };
        let block = self.blockchain.add_block(vec![tx.clone()])?;
        self.apply(&tx, block.index);
        self.properties.save()?;
        info!("rental of property {} ended in block #{}", property_id, block.index);
        Ok(block)
    }

    pub fn create_account(&mut self, id: &str, name: &str) -> Result<Account> {
        self.accounts.create_account(id, name)
    }

    /* -------------------- Reconciliation -------------------- */

    /// Replay every mined transaction whose effect is missing from the
    /// registry. Returns how many were applied; persists when any were.
    pub fn reconcile(&mut self) -> Result<usize> {
        let mut pending = Vec::new();
        for block in self.blockchain.chain().iter().skip(1) {
            for tx in &block.transactions {
                if !self.is_applied(tx, block.index) {
                    pending.push((tx.clone(), block.index));
                }
            }
        }

        let mut replayed = 0;
        for (tx, index) in pending {
            if let Some(last) = self.recorded_after(&tx, index) {
                warn!(
                    "block #{} ({}) predates block #{} already recorded, skipping",
                    index,
                    tx.kind(),
                    last
                );
                continue;
            }
            if self.apply(&tx, index) {
                warn!("replayed {} from block #{}", tx.kind(), index);
                replayed += 1;
            }
        }
        if replayed > 0 {
            self.properties.save()?;
        }
        Ok(replayed)
    }

    fn is_applied(&self, tx: &Transaction, block_index: u64) -> bool {
        match tx {
            Transaction::Genesis { .. } => true,
            Transaction::CreateProperty { property_id, .. } => self.properties.contains(property_id),
            Transaction::Transfer { property_id, .. }
            | Transaction::Rent { property_id, .. }
            | Transaction::EndRental { property_id, .. } => self
                .properties
                .get(property_id)
                .is_some_and(|p| p.records_block(block_index)),
        }
    }

    /// The property's latest recorded block, when it is newer than `block_index`.
    fn recorded_after(&self, tx: &Transaction, block_index: u64) -> Option<u64> {
        let prop = self.properties.get(tx.property_id()?)?;
        prop.last_block_index().filter(|last| *last > block_index)
    }

    /// Apply a mined transaction to the in-memory registry. Does not persist.
    /// Returns `false` when the transaction targets an unknown property.
    fn apply(&mut self, tx: &Transaction, block_index: u64) -> bool {
        if let Transaction::CreateProperty {
            property_id,
            owner,
            title,
            description,
            timestamp,
        } = tx
        {
            let prop = Property::new(
                property_id.clone(),
                owner,
                title,
                description,
                *timestamp,
                Some(block_index),
            );
            self.properties.insert(prop);
            return true;
        }

        let Some(property_id) = tx.property_id() else {
            return false;
        };
        let Some(prop) = self.properties.get_mut(property_id) else {
            warn!(
                "block #{} references unknown property {}, skipping",
                block_index, property_id
            );
            return false;
        };

        match tx {
            Transaction::Transfer {
                from, to, timestamp, ..
            } => {
                prop.owner = to.clone();
                prop.rented_to = None;
                prop.history.push(HistoryEvent::Transfer {
                    from: from.clone(),
                    to: to.clone(),
                    timestamp: *timestamp,
                    block_index,
                });
            }
            Transaction::Rent {
                owner,
                renter,
                timestamp,
                ..
            } => {
                prop.rented_to = Some(renter.clone());
                prop.history.push(HistoryEvent::Rent {
                    owner: owner.clone(),
                    renter: renter.clone(),
                    timestamp: *timestamp,
                    block_index,
                });
            }
            Transaction::EndRental {
                owner,
                renter,
                timestamp,
                ..
            } => {
                prop.rented_to = None;
                prop.history.push(HistoryEvent::RentalEnded {
                    owner: owner.clone(),
                    renter: renter.clone(),
                    timestamp: *timestamp,
                    block_index,
                });
            }
            Transaction::Genesis { .. } | Transaction::CreateProperty { .. } => return false,
        }
        true
    }

    /* -------------------- Queries -------------------- */

    pub fn get_properties(&self) -> Vec<Property> {
        self.properties.list()
    }

    pub fn get_property(&self, id: &str) -> Result<Property> {
        self.property(id).cloned()
    }

    pub fn get_accounts(&self) -> Vec<Account> {
        self.accounts.list()
    }

    pub fn get_chain(&self) -> &[Block] {
        self.blockchain.chain()
    }

    pub fn is_chain_valid(&self) -> bool {
        self.blockchain.is_chain_valid()
    }

    pub fn validate_chain(&self) -> std::result::Result<(), ChainViolation> {
        self.blockchain.validate()
    }

    pub fn difficulty(&self) -> u32 {
        self.blockchain.difficulty()
    }

    pub fn blockchain(&self) -> &Blockchain {
        &self.blockchain
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    fn property(&self, id: &str) -> Result<&Property> {
        self.properties
            .get(id)
            .ok_or_else(|| ChainError::PropertyNotFound(id.to_string()))
    }

    fn require_account(&self, id: &str) -> Result<()> {
        if self.accounts.contains(id) {
            Ok(())
        } else {
            Err(ChainError::AccountNotFound(id.to_string()))
        }
    }

    #[cfg(test)]
    pub(crate) fn blockchain_mut(&mut self) -> &mut Blockchain {
        &mut self.blockchain
    }
}

fn ensure_owner(actor: &str, prop: &Property) -> Result<()> {
    if actor == prop.owner {
        Ok(())
    } else {
        warn!("rejected {} acting on {}: not the owner", actor, prop.id);
        Err(ChainError::Unauthorized {
            actor: actor.to_string(),
            owner: prop.owner.clone(),
        })
    }
}
