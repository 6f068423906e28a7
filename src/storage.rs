//! Snapshot file stores. Every save overwrites the whole file.

use log::debug;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub const CHAIN_FILE: &str = "chain.json";
pub const ACCOUNTS_FILE: &str = "accounts.json";
pub const PROPERTIES_FILE: &str = "properties.json";

/// A pretty-printed JSON file holding one `T`, written atomically through a
/// temporary sibling file.
#[derive(Debug, Clone)]
pub struct JsonStore<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    /// Store named `file_name` inside `data_dir`, creating the directory.
    pub fn in_dir<P: AsRef<Path>>(data_dir: P, file_name: &str) -> Result<Self> {
        fs::create_dir_all(&data_dir)?;
        Ok(Self::new(data_dir.as_ref().join(file_name)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// `Ok(None)` when nothing has been saved yet.
    pub fn load(&self) -> Result<Option<T>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = fs::read(&self.path)?;
        let value = serde_json::from_slice::<T>(&data)?;
        debug!("loaded {}", self.path.display());
        Ok(Some(value))
    }

    pub fn save(&self, value: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let data = serde_json::to_vec_pretty(value)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, data)?;
        fs::rename(&tmp_path, &self.path)?;
        debug!("saved {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::JsonStore;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn load_missing_is_none() {
        let dir = TempDir::new().unwrap();
        let store: JsonStore<Vec<u32>> = JsonStore::in_dir(dir.path(), "x.json").unwrap();
        assert!(!store.exists());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_overwrites_whole_snapshot() {
        let dir = TempDir::new().unwrap();
        let store: JsonStore<BTreeMap<String, u32>> =
            JsonStore::in_dir(dir.path().join("nested"), "map.json").unwrap();

        let mut first = BTreeMap::new();
        first.insert("a".to_string(), 1);
        first.insert("b".to_string(), 2);
        store.save(&first).unwrap();

        let mut second = BTreeMap::new();
        second.insert("c".to_string(), 3);
        store.save(&second).unwrap();

        assert_eq!(store.load().unwrap(), Some(second));
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store: JsonStore<Vec<u32>> = JsonStore::in_dir(dir.path(), "bad.json").unwrap();
        std::fs::write(store.path(), b"not json").unwrap();
        assert!(store.load().is_err());
    }
}
