pub mod account;
pub mod property;

pub use account::{Account, AccountMap, AccountRegistry};
pub use property::{HistoryEvent, Property, PropertyMap, PropertyRegistry};
