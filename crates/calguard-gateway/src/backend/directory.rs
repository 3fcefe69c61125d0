use async_trait::async_trait;
use dashmap::DashSet;

use calguard_core::{Actor, Result};

use super::ActorResolver;

/// Known actors, seeded from config.
#[derive(Default)]
pub struct ActorDirectory {
    actors: DashSet<String>,
}

impl ActorDirectory {
    pub fn new<I, S>(uids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let actors = DashSet::new();
        for uid in uids {
            actors.insert(uid.into());
        }
        Self { actors }
    }

    pub fn add(&self, uid: impl Into<String>) -> bool {
        self.actors.insert(uid.into())
    }

    pub fn remove(&self, uid: &str) -> bool {
        self.actors.remove(uid).is_some()
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}

#[async_trait]
impl ActorResolver for ActorDirectory {
    async fn resolve(&self, actor_id: &str) -> Result<Option<Actor>> {
        Ok(self.actors.contains(actor_id).then(|| Actor::new(actor_id)))
    }
}
