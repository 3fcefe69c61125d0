//! Collaborator contracts consumed by the creation guard, plus in-memory
//! reference implementations.
//!
//! The guard only sees the traits. Hosts with a real user store, shared
//! counter backend or database swap in their own implementations.

pub mod collections;
pub mod directory;
pub mod settings;
pub mod sliding_window;

use std::time::Duration;

use async_trait::async_trait;

use calguard_core::{Actor, RateLimitSpec, Result};

pub use collections::CollectionIndex;
pub use directory::ActorDirectory;
pub use settings::SettingsStore;
pub use sliding_window::SlidingWindowLimiter;

/// Maps an opaque actor id to an actor record.
#[async_trait]
pub trait ActorResolver: Send + Sync {
    /// `Ok(None)` means unauthenticated or unknown.
    async fn resolve(&self, actor_id: &str) -> Result<Option<Actor>>;
}

/// Outcome of registering one attempt with a rate limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    Exceeded { retry_after: Duration },
}

/// Rolling-window attempt counter.
///
/// Implementations must make the record-and-compare step atomic per
/// `(spec.action, actor)` so concurrent attempts cannot both slip under the
/// threshold.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn register_request(&self, spec: &RateLimitSpec, actor: &Actor) -> Result<Admission>;
}

/// Counts top-level collections owned by a principal.
#[async_trait]
pub trait CountOracle: Send + Sync {
    async fn count_owned_collections(&self, owner_key: &str) -> Result<u64>;
}

/// Integer settings lookup.
#[async_trait]
pub trait SettingsLookup: Send + Sync {
    async fn get_int(&self, namespace: &str, key: &str, default: i64) -> Result<i64>;
}
