//! In-memory key-value repository.
//!
//! Used by tests and ephemeral sessions that should leave nothing on disk.

use super::kv_repo::{KvRepository, RepoResult};
use std::cell::RefCell;
use std::collections::BTreeMap;

/// `BTreeMap`-backed store. Single-threaded by construction.
#[derive(Debug, Default)]
pub struct MemoryKvRepository {
    values: RefCell<BTreeMap<String, String>>,
}

impl MemoryKvRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store pre-populated with `pairs`.
    pub fn seeded<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let values = pairs
            .into_iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Self {
            values: RefCell::new(values),
        }
    }

    /// Copy of every stored pair, ordered by key.
    pub fn dump(&self) -> BTreeMap<String, String> {
        self.values.borrow().clone()
    }
}

impl KvRepository for MemoryKvRepository {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
