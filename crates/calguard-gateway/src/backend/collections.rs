use async_trait::async_trait;
use dashmap::{DashMap, DashSet};

use calguard_core::Result;

use super::CountOracle;

/// In-memory index of collections per owner key
/// (`principals/users/<uid>` -> {collection name...}).
#[derive(Default)]
pub struct CollectionIndex {
    owners: DashMap<String, DashSet<String>>,
}

impl CollectionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the collection already existed.
    pub fn insert(&self, owner_key: &str, collection: &str) -> bool {
        self.owners
            .entry(owner_key.to_string())
            .or_insert_with(DashSet::new)
            .insert(collection.to_string())
    }

    pub fn remove(&self, owner_key: &str, collection: &str) -> bool {
        let Some(set) = self.owners.get(owner_key) else {
            return false;
        };
        let removed = set.remove(collection).is_some();
        if set.is_empty() {
            drop(set);
            self.owners.remove_if(owner_key, |_, s| s.is_empty());
        }
        removed
    }

    pub fn count(&self, owner_key: &str) -> u64 {
        self.owners.get(owner_key).map(|s| s.len() as u64).unwrap_or(0)
    }
}

#[async_trait]
impl CountOracle for CollectionIndex {
    async fn count_owned_collections(&self, owner_key: &str) -> Result<u64> {
        Ok(self.count(owner_key))
    }
}
