use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ChainError, Result};
use crate::storage::JsonStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
}

impl Account {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}

pub type AccountMap = BTreeMap<String, Account>;

/// Demo identities written on first run.
fn demo_accounts() -> AccountMap {
    [
        Account::new("alice", "Alice Demo"),
        Account::new("bob", "Bob Demo"),
        Account::new("carlos", "Carlos Demo"),
    ]
    .into_iter()
    .map(|a| (a.id.clone(), a))
    .collect()
}

/// Keyed account store.
#[derive(Debug)]
pub struct AccountRegistry {
    accounts: AccountMap,
    store: Option<JsonStore<AccountMap>>,
}

impl AccountRegistry {
    /// Load persisted accounts, or seed the demo identities and persist them.
    pub fn open(store: JsonStore<AccountMap>) -> Result<Self> {
        let accounts = match store.load()? {
            Some(accounts) => accounts,
            None => {
                let seeded = demo_accounts();
                store.save(&seeded)?;
                info!("seeded {} demo accounts", seeded.len());
                seeded
            }
        };
        Ok(Self {
            accounts,
            store: Some(store),
        })
    }

    /// Registry over the demo identities, never written to disk.
    pub fn in_memory() -> Self {
        Self {
            accounts: demo_accounts(),
            store: None,
        }
    }

    pub fn create_account(&mut self, id: &str, name: &str) -> Result<Account> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ChainError::InvalidInput("account id must not be empty".into()));
        }
        if self.accounts.contains_key(id) {
            warn!("rejected account creation: id {} already exists", id);
            return Err(ChainError::DuplicateAccountId(id.to_string()));
        }
        let account = Account::new(id, name.trim());
        self.accounts.insert(account.id.clone(), account.clone());
        self.save()?;
        info!("created account {}", account.id);
        Ok(account)
    }

    pub fn get(&self, id: &str) -> Option<&Account> {
        self.accounts.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.accounts.contains_key(id)
    }

    pub fn list(&self) -> Vec<Account> {
        self.accounts.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn save(&self) -> Result<()> {
        match &self.store {
            Some(store) => store.save(&self.accounts),
            None => Ok(()),
        }
    }
}
