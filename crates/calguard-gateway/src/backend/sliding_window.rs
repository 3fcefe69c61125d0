//! In-process sliding-log rate limiter.
//!
//! One log of attempt instants per `(action, actor uid)`. An attempt is
//! admitted while fewer than `max_count` admitted attempts lie inside the
//! trailing window, and is recorded only when admitted, so a locked-out actor
//! regains capacity as soon as its oldest attempt ages out.
//!
//! Each key's compare-and-record step runs under the DashMap shard write lock,
//! which linearizes concurrent attempts by the same actor.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::task::JoinHandle;

use calguard_core::{Actor, RateLimitSpec, Result};

use super::{Admission, RateLimiter};

#[derive(Debug)]
struct AttemptLog {
    window: Duration,
    hits: VecDeque<Instant>,
}

impl AttemptLog {
    fn new(window: Duration) -> Self {
        Self {
            window,
            hits: VecDeque::new(),
        }
    }

    fn evict(&mut self, now: Instant) {
        while let Some(&oldest) = self.hits.front() {
            if now.saturating_duration_since(oldest) < self.window {
                break;
            }
            self.hits.pop_front();
        }
    }
}

#[derive(Debug, Default)]
pub struct SlidingWindowLimiter {
    logs: DashMap<(String, String), AttemptLog>,
}

impl SlidingWindowLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an attempt at an explicit instant.
    pub fn register_at(&self, spec: &RateLimitSpec, actor: &Actor, now: Instant) -> Admission {
        let key = (spec.action.to_string(), actor.uid().to_string());
        let mut log = self
            .logs
            .entry(key)
            .or_insert_with(|| AttemptLog::new(spec.window()));
        log.window = spec.window();
        log.evict(now);

        if log.hits.len() >= spec.max_count as usize {
            let retry_after = match log.hits.front() {
                Some(&oldest) => log
                    .window
                    .saturating_sub(now.saturating_duration_since(oldest)),
                None => log.window,
            };
            return Admission::Exceeded { retry_after };
        }

        log.hits.push_back(now);
        Admission::Admitted
    }

    /// Attempts currently inside the window for `(action, uid)`.
    pub fn attempts(&self, action: &str, uid: &str, now: Instant) -> usize {
        self.logs
            .get_mut(&(action.to_string(), uid.to_string()))
            .map(|mut log| {
                log.evict(now);
                log.hits.len()
            })
            .unwrap_or(0)
    }

    /// Drop keys whose window has fully elapsed. Returns how many were removed.
    pub fn prune(&self, now: Instant) -> usize {
        let before = self.logs.len();
        self.logs.retain(|_, log| {
            log.evict(now);
            !log.hits.is_empty()
        });
        before.saturating_sub(self.logs.len())
    }

    pub fn tracked_keys(&self) -> usize {
        self.logs.len()
    }

    /// Run [`SlidingWindowLimiter::prune`] every `every` until the task is aborted.
    pub fn spawn_pruner(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(every);
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tick.tick().await;
                let removed = self.prune(Instant::now());
                if removed > 0 {
                    tracing::debug!(removed, remaining = self.tracked_keys(), "pruned idle rate-limit windows");
                }
            }
        })
    }
}

#[async_trait]
impl RateLimiter for SlidingWindowLimiter {
    async fn register_request(&self, spec: &RateLimitSpec, actor: &Actor) -> Result<Admission> {
        Ok(self.register_at(spec, actor, Instant::now()))
    }
}
