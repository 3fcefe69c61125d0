use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;

use calguard_core::Result;

use super::SettingsLookup;

/// Integer settings keyed by `(namespace, key)`.
#[derive(Default)]
pub struct SettingsStore {
    values: DashMap<(String, String), i64>,
}

impl SettingsStore {
    pub fn from_config(settings: &HashMap<String, HashMap<String, i64>>) -> Self {
        let values = DashMap::new();
        for (ns, keys) in settings {
            for (key, v) in keys {
                values.insert((ns.clone(), key.clone()), *v);
            }
        }
        Self { values }
    }

    pub fn set(&self, namespace: &str, key: &str, value: i64) {
        self.values
            .insert((namespace.to_string(), key.to_string()), value);
    }

    pub fn get(&self, namespace: &str, key: &str) -> Option<i64> {
        self.values
            .get(&(namespace.to_string(), key.to_string()))
            .map(|v| *v)
    }
}

#[async_trait]
impl SettingsLookup for SettingsStore {
    async fn get_int(&self, namespace: &str, key: &str, default: i64) -> Result<i64> {
        Ok(self.get(namespace, key).unwrap_or(default))
    }
}
