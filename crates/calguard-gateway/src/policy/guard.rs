use std::sync::Arc;
use std::time::{Duration, Instant};

use calguard_core::limits::{DEFAULT_MAX_COLLECTIONS, MAX_COLLECTIONS_KEY, SETTINGS_NAMESPACE};
use calguard_core::{
    classify, Actor, CollectionCeiling, CreationCategory, GuardError, RateLimitSpec,
    ResourcePath, Result,
};

use crate::backend::{Admission, ActorResolver, CountOracle, RateLimiter, SettingsLookup};
use crate::obs::GuardMetrics;

const TOO_MANY_COLLECTIONS: &str = "Too many calendars created";
const TOO_MANY_ITEMS: &str = "Too many calendar objects created";
const COLLECTION_LIMIT_REACHED: &str = "Calendar limit reached";

/// Gate run by the host immediately before a new resource is bound.
///
/// Holds no mutable state of its own; construct once and share via `Arc`.
/// Attempts are metered, not successes: an admitted attempt stays in the
/// actor's window even if the host's creation later fails.
pub struct CreationGuard {
    resolver: Arc<dyn ActorResolver>,
    limiter: Arc<dyn RateLimiter>,
    oracle: Arc<dyn CountOracle>,
    settings: Arc<dyn SettingsLookup>,
    metrics: Option<Arc<GuardMetrics>>,
}

impl CreationGuard {
    pub fn new(
        resolver: Arc<dyn ActorResolver>,
        limiter: Arc<dyn RateLimiter>,
        oracle: Arc<dyn CountOracle>,
        settings: Arc<dyn SettingsLookup>,
    ) -> Self {
        Self {
            resolver,
            limiter,
            oracle,
            settings,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<GuardMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Parse `raw` and run [`CreationGuard::check`].
    pub async fn check_raw(&self, raw: &str, actor_id: Option<&str>) -> Result<()> {
        self.check(&ResourcePath::parse(raw), actor_id).await
    }

    /// Allow or veto a creation at `path` by `actor_id`.
    ///
    /// Unauthenticated or unknown actors and unclassified paths always pass.
    /// Collaborator failures propagate unchanged.
    pub async fn check(&self, path: &ResourcePath, actor_id: Option<&str>) -> Result<()> {
        let Some(actor_id) = actor_id else {
            return Ok(());
        };
        let Some(actor) = self.resolver.resolve(actor_id).await? else {
            return Ok(());
        };

        let category = classify(path);
        let started = Instant::now();
        let res = match category {
            CreationCategory::CollectionCreation => self.check_collection(&actor).await,
            CreationCategory::ItemCreation => self.check_item(&actor).await,
            CreationCategory::Unclassified => return Ok(()),
        };

        match &res {
            Ok(()) => {
                tracing::debug!(actor = %actor.uid(), path = %path.as_str(), category = category.as_str(), "creation admitted")
            }
            Err(e) if !e.is_veto() => {
                tracing::error!(actor = %actor.uid(), category = category.as_str(), error = %e, "creation guard collaborator failed")
            }
            Err(_) => {}
        }
        self.record(category, &res, started.elapsed());
        res
    }

    async fn check_collection(&self, actor: &Actor) -> Result<()> {
        self.register(&RateLimitSpec::COLLECTION_CREATION, actor, TOO_MANY_COLLECTIONS)
            .await?;

        let raw = self
            .settings
            .get_int(SETTINGS_NAMESPACE, MAX_COLLECTIONS_KEY, DEFAULT_MAX_COLLECTIONS)
            .await?;
        let ceiling = CollectionCeiling::from_setting(raw);
        if ceiling == CollectionCeiling::Unlimited {
            return Ok(());
        }

        let owned = self
            .oracle
            .count_owned_collections(&actor.owner_key())
            .await?;
        if ceiling.is_reached(owned) {
            tracing::warn!(
                actor = %actor.uid(),
                limit = ceiling.as_setting(),
                owned,
                "Maximum number of calendars/subscriptions reached"
            );
            return Err(GuardError::quota_exceeded(COLLECTION_LIMIT_REACHED));
        }
        Ok(())
    }

    async fn check_item(&self, actor: &Actor) -> Result<()> {
        self.register(&RateLimitSpec::ITEM_CREATION, actor, TOO_MANY_ITEMS)
            .await
    }

    async fn register(&self, spec: &RateLimitSpec, actor: &Actor, message: &str) -> Result<()> {
        match self.limiter.register_request(spec, actor).await? {
            Admission::Admitted => Ok(()),
            Admission::Exceeded { retry_after } => {
                let retry_after_secs = ceil_secs(retry_after);
                tracing::info!(
                    actor = %actor.uid(),
                    action = spec.action,
                    max = spec.max_count,
                    window_secs = spec.window_secs,
                    retry_after_secs,
                    "creation rate limit exceeded"
                );
                Err(GuardError::rate_limited(message, Some(retry_after_secs)))
            }
        }
    }

    fn record(&self, category: CreationCategory, res: &Result<()>, elapsed: Duration) {
        let Some(m) = &self.metrics else { return };
        let outcome = match res {
            Ok(()) => "allowed",
            Err(GuardError::RateLimited { .. }) => "rate_limited",
            Err(GuardError::QuotaExceeded { .. }) => "quota_exceeded",
            Err(_) => "error",
        };
        let cat = category.as_str();
        m.decisions.inc(&[("category", cat), ("outcome", outcome)]);
        m.check_duration.observe(&[("category", cat)], elapsed);
    }
}

/// Whole seconds, rounded up, at least 1.
fn ceil_secs(d: Duration) -> u64 {
    let secs = d.as_secs() + u64::from(d.subsec_nanos() > 0);
    secs.max(1)
}
