//! Shared application state for the calguard gateway.
//!
//! Wires the in-memory collaborators into a `CreationGuard` built from config.
//! Startup errors are returned, not panicked.

use std::sync::Arc;

use calguard_core::error::Result;

use crate::backend::{ActorDirectory, CollectionIndex, SettingsStore, SlidingWindowLimiter};
use crate::config::GatewayConfig;
use crate::obs::GuardMetrics;
use crate::policy::CreationGuard;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    guard: CreationGuard,
    limiter: Arc<SlidingWindowLimiter>,
    collections: Arc<CollectionIndex>,
    metrics: Arc<GuardMetrics>,
}

impl AppState {
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        cfg.validate()?;

        let directory = Arc::new(ActorDirectory::new(cfg.directory.actors.iter().cloned()));
        let limiter = Arc::new(SlidingWindowLimiter::new());
        let collections = Arc::new(CollectionIndex::new());
        let settings = Arc::new(SettingsStore::from_config(&cfg.settings));
        let metrics = Arc::new(GuardMetrics::default());

        let guard = CreationGuard::new(
            directory.clone(),
            limiter.clone(),
            collections.clone(),
            settings,
        )
        .with_metrics(Arc::clone(&metrics));

        if directory.is_empty() {
            tracing::warn!("directory.actors is empty; every request is treated as unauthenticated");
        }

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                guard,
                limiter,
                collections,
                metrics,
            }),
        })
    }

    pub fn mount(&self) -> &str {
        &self.inner.cfg.gateway.mount
    }

    pub fn guard(&self) -> &CreationGuard {
        &self.inner.guard
    }

    pub fn limiter(&self) -> Arc<SlidingWindowLimiter> {
        Arc::clone(&self.inner.limiter)
    }

    pub fn collections(&self) -> Arc<CollectionIndex> {
        Arc::clone(&self.inner.collections)
    }

    pub fn metrics(&self) -> Arc<GuardMetrics> {
        Arc::clone(&self.inner.metrics)
    }
}
