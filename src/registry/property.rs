use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::blockchain::now_ts;
use crate::error::Result;
use crate::storage::JsonStore;

/// One entry of a property's append-only history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HistoryEvent {
    Created {
        owner: String,
        timestamp: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        block_index: Option<u64>,
    },
    Transfer {
        from: String,
        to: String,
        timestamp: i64,
        block_index: u64,
    },
    Rent {
        owner: String,
        renter: String,
        timestamp: i64,
        block_index: u64,
    },
    RentalEnded {
        owner: String,
        renter: String,
        timestamp: i64,
        block_index: u64,
    },
}

impl HistoryEvent {
    pub fn block_index(&self) -> Option<u64> {
        match self {
            HistoryEvent::Created { block_index, .. } => *block_index,
            HistoryEvent::Transfer { block_index, .. }
            | HistoryEvent::Rent { block_index, .. }
            | HistoryEvent::RentalEnded { block_index, .. } => Some(*block_index),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub title: String,
    pub description: String,
    pub owner: String,
    pub created_at: i64,
    #[serde(default)]
    pub rented_to: Option<String>,
    #[serde(default)]
    pub history: Vec<HistoryEvent>,
}

impl Property {
    /// Fresh property with a single `created` history entry.
    pub fn new(
        id: String,
        owner: &str,
        title: &str,
        description: &str,
        created_at: i64,
        block_index: Option<u64>,
    ) -> Self {
        Self {
            id,
            title: title.to_string(),
            description: description.to_string(),
            owner: owner.to_string(),
            created_at,
            rented_to: None,
            history: vec![HistoryEvent::Created {
                owner: owner.to_string(),
                timestamp: created_at,
                block_index,
            }],
        }
    }

    /// Whether some history entry was recorded by block `index`.
    pub fn records_block(&self, index: u64) -> bool {
        self.history.iter().any(|e| e.block_index() == Some(index))
    }

    /// Highest block index recorded in the history.
    pub fn last_block_index(&self) -> Option<u64> {
        self.history.iter().filter_map(HistoryEvent::block_index).max()
    }
}

pub fn new_property_id() -> String {
    Uuid::new_v4().to_string()
}

pub type PropertyMap = BTreeMap<String, Property>;

/// Keyed property store.
#[derive(Debug)]
pub struct PropertyRegistry {
    properties: PropertyMap,
    store: Option<JsonStore<PropertyMap>>,
}

impl PropertyRegistry {
    /// Load persisted properties, or start empty and persist the empty map.
    pub fn open(store: JsonStore<PropertyMap>) -> Result<Self> {
        let properties = match store.load()? {
            Some(properties) => properties,
            None => {
                let empty = PropertyMap::new();
                store.save(&empty)?;
                empty
            }
        };
        Ok(Self {
            properties,
            store: Some(store),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            properties: PropertyMap::new(),
            store: None,
        }
    }

    /// Register a new property owned by `owner` and persist. No ledger
    /// transaction is mined here.
    pub fn create_property(&mut self, owner: &str, title: &str, description: &str) -> Result<Property> {
        let prop = Property::new(new_property_id(), owner, title, description, now_ts(), None);
        self.insert(prop.clone());
        self.save()?;
        info!("registered property {} for {}", prop.id, prop.owner);
        Ok(prop)
    }

    /// Insert or replace a record; callers must `save()` afterwards.
    pub fn insert(&mut self, property: Property) {
        self.properties.insert(property.id.clone(), property);
    }

    pub fn get(&self, id: &str) -> Option<&Property> {
        self.properties.get(id)
    }

    /// Mutable access; callers must `save()` afterwards.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Property> {
        self.properties.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.properties.contains_key(id)
    }

    pub fn list(&self) -> Vec<Property> {
        self.properties.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn save(&self) -> Result<()> {
        match &self.store {
            Some(store) => store.save(&self.properties),
            None => Ok(()),
        }
    }
}
