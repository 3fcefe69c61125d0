//! Rate-limit constants and the collection ceiling.
//!
//! The two `RateLimitSpec`s are fixed properties of the guard; only the
//! collection ceiling comes from configuration.

use std::time::Duration;

/// Settings namespace holding the collection ceiling.
pub const SETTINGS_NAMESPACE: &str = "dav";
/// Settings key holding the collection ceiling.
pub const MAX_COLLECTIONS_KEY: &str = "maximum_calendars";
/// Ceiling used when the setting is absent.
pub const DEFAULT_MAX_COLLECTIONS: i64 = 30;
/// Sentinel stored in settings to disable the ceiling.
pub const UNLIMITED_SENTINEL: i64 = -1;

pub(crate) const PRINCIPAL_PREFIX: &str = "principals/users/";

/// Rolling-window limit for one creation category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSpec {
    pub action: &'static str,
    pub max_count: u32,
    pub window_secs: u64,
}

impl RateLimitSpec {
    pub const COLLECTION_CREATION: RateLimitSpec = RateLimitSpec {
        action: "create-collection",
        max_count: 10,
        window_secs: 3600,
    };

    pub const ITEM_CREATION: RateLimitSpec = RateLimitSpec {
        action: "create-item",
        max_count: 50,
        window_secs: 300,
    };

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

/// Absolute ceiling on collections an actor may own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionCeiling {
    Unlimited,
    Limit(u32),
}

impl CollectionCeiling {
    /// Interpret a raw integer setting.
    ///
    /// `-1` disables the ceiling. Other negative values are a misconfiguration
    /// and reject every creation.
    pub fn from_setting(raw: i64) -> Self {
        match raw {
            UNLIMITED_SENTINEL => CollectionCeiling::Unlimited,
            n if n < 0 => {
                tracing::warn!(
                    value = n,
                    "{SETTINGS_NAMESPACE}.{MAX_COLLECTIONS_KEY} is negative; treating as 0"
                );
                CollectionCeiling::Limit(0)
            }
            n => CollectionCeiling::Limit(u32::try_from(n).unwrap_or(u32::MAX)),
        }
    }

    /// Whether an actor owning `count` collections may not create another.
    pub fn is_reached(self, count: u64) -> bool {
        match self {
            CollectionCeiling::Unlimited => false,
            CollectionCeiling::Limit(n) => count >= u64::from(n),
        }
    }

    /// Raw value for logs; `-1` when unlimited.
    pub fn as_setting(self) -> i64 {
        match self {
            CollectionCeiling::Unlimited => UNLIMITED_SENTINEL,
            CollectionCeiling::Limit(n) => i64::from(n),
        }
    }
}

impl Default for CollectionCeiling {
    fn default() -> Self {
        CollectionCeiling::from_setting(DEFAULT_MAX_COLLECTIONS)
    }
}
