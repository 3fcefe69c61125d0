//! Creation guard behavior against recording collaborators.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use calguard_core::{Actor, GuardError, RateLimitSpec, Result};
use calguard_gateway::backend::{
    ActorDirectory, ActorResolver, Admission, CollectionIndex, CountOracle, RateLimiter,
    SettingsLookup, SettingsStore, SlidingWindowLimiter,
};
use calguard_gateway::obs::GuardMetrics;
use calguard_gateway::policy::CreationGuard;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Resolve(String),
    Register {
        action: &'static str,
        max: u32,
        window: u64,
        uid: String,
    },
    Setting {
        namespace: String,
        key: String,
        default: i64,
    },
    Count(String),
}

struct Fake {
    known: Vec<&'static str>,
    exceed: Option<&'static str>,
    owned: u64,
    max: Option<i64>,
    oracle_down: bool,
    resolver_down: bool,
    calls: Mutex<Vec<Call>>,
}

impl Fake {
    fn new() -> Self {
        Self {
            known: vec!["u1"],
            exceed: None,
            owned: 0,
            max: None,
            oracle_down: false,
            resolver_down: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn push(&self, c: Call) {
        self.calls.lock().unwrap().push(c);
    }

    fn count_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Count(_)))
            .count()
    }

    fn register_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Register { .. }))
            .collect()
    }

    fn into_guard(self) -> (Arc<Fake>, CreationGuard) {
        let fake = Arc::new(self);
        let guard = CreationGuard::new(fake.clone(), fake.clone(), fake.clone(), fake.clone());
        (fake, guard)
    }
}

#[async_trait]
impl ActorResolver for Fake {
    async fn resolve(&self, actor_id: &str) -> Result<Option<Actor>> {
        self.push(Call::Resolve(actor_id.to_string()));
        if self.resolver_down {
            return Err(GuardError::Unavailable("user backend down".into()));
        }
        let known = self.known.iter().any(|k| *k == actor_id);
        Ok(known.then(|| Actor::new(actor_id)))
    }
}

#[async_trait]
impl RateLimiter for Fake {
    async fn register_request(&self, spec: &RateLimitSpec, actor: &Actor) -> Result<Admission> {
        self.push(Call::Register {
            action: spec.action,
            max: spec.max_count,
            window: spec.window_secs,
            uid: actor.uid().to_string(),
        });
        if self.exceed == Some(spec.action) {
            return Ok(Admission::Exceeded {
                retry_after: std::time::Duration::from_secs(42),
            });
        }
        Ok(Admission::Admitted)
    }
}

#[async_trait]
impl CountOracle for Fake {
    async fn count_owned_collections(&self, owner_key: &str) -> Result<u64> {
        self.push(Call::Count(owner_key.to_string()));
        if self.oracle_down {
            return Err(GuardError::Unavailable("calendar backend down".into()));
        }
        Ok(self.owned)
    }
}

#[async_trait]
impl SettingsLookup for Fake {
    async fn get_int(&self, namespace: &str, key: &str, default: i64) -> Result<i64> {
        self.push(Call::Setting {
            namespace: namespace.to_string(),
            key: key.to_string(),
            default,
        });
        Ok(self.max.unwrap_or(default))
    }
}

#[tokio::test]
async fn absent_actor_is_never_metered() {
    let (fake, guard) = Fake::new().into_guard();

    guard.check_raw("calendars/foo/cal", None).await.unwrap();
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn unresolved_actor_is_never_metered() {
    let (fake, guard) = Fake::new().into_guard();

    guard.check_raw("calendars/foo/cal", Some("ghost")).await.unwrap();
    assert_eq!(fake.calls(), vec![Call::Resolve("ghost".into())]);
}

#[tokio::test]
async fn unrelated_paths_pass_without_collaborators() {
    let (fake, guard) = Fake::new().into_guard();

    for p in [
        "foo/bar",
        "calendars/alice",
        "calendars/alice/work/a/b",
        "addressbooks/alice/contacts",
        "/calendars/alice/work",
        "",
    ] {
        guard.check_raw(p, Some("u1")).await.unwrap();
    }
    assert!(fake.calls().iter().all(|c| matches!(c, Call::Resolve(_))));
}

#[tokio::test]
async fn collection_creation_registers_once() {
    let mut fake = Fake::new();
    fake.max = Some(12);
    let (fake, guard) = fake.into_guard();

    guard.check_raw("calendars/alice/work", Some("u1")).await.unwrap();

    assert_eq!(
        fake.register_calls(),
        vec![Call::Register {
            action: "create-collection",
            max: 10,
            window: 3600,
            uid: "u1".into(),
        }]
    );
}

#[tokio::test]
async fn collection_rate_limit_short_circuits_quota() {
    let mut fake = Fake::new();
    fake.exceed = Some("create-collection");
    let (fake, guard) = fake.into_guard();

    let err = guard
        .check_raw("calendars/alice/work", Some("u1"))
        .await
        .expect_err("must be rate limited");

    match &err {
        GuardError::RateLimited {
            message,
            retry_after_secs,
        } => {
            assert_eq!(message, "Too many calendars created");
            assert_eq!(*retry_after_secs, Some(42));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(fake.count_calls(), 0);
    assert!(!fake
        .calls()
        .iter()
        .any(|c| matches!(c, Call::Setting { .. })));
}

#[tokio::test]
async fn collection_limit_reached() {
    let mut fake = Fake::new();
    fake.owned = 12;
    fake.max = Some(12);
    let (fake, guard) = fake.into_guard();

    let err = guard
        .check_raw("calendars/alice/work", Some("u1"))
        .await
        .expect_err("must hit quota");

    assert!(
        matches!(&err, GuardError::QuotaExceeded { message } if message == "Calendar limit reached")
    );
    assert_eq!(err.client_code().http_status(), 429);
    assert!(fake
        .calls()
        .contains(&Call::Count("principals/users/u1".into())));
}

#[tokio::test]
async fn collection_below_limit_passes() {
    let mut fake = Fake::new();
    fake.owned = 11;
    fake.max = Some(12);
    let (_fake, guard) = fake.into_guard();

    guard.check_raw("calendars/alice/work", Some("u1")).await.unwrap();
}

#[tokio::test]
async fn ceiling_lookup_uses_dav_maximum_calendars_default_30() {
    let mut fake = Fake::new();
    fake.owned = 30;
    let (fake, guard) = fake.into_guard();

    let err = guard
        .check_raw("calendars/alice/work", Some("u1"))
        .await
        .unwrap_err();
    assert!(matches!(err, GuardError::QuotaExceeded { .. }));
    assert!(fake.calls().contains(&Call::Setting {
        namespace: "dav".into(),
        key: "maximum_calendars".into(),
        default: 30,
    }));
}

#[tokio::test]
async fn unlimited_ceiling_never_rejects() {
    let mut fake = Fake::new();
    fake.owned = 1_000_000;
    fake.max = Some(-1);
    let (_fake, guard) = fake.into_guard();

    guard.check_raw("calendars/alice/work", Some("u1")).await.unwrap();
}

#[tokio::test]
async fn quota_applies_to_first_creation() {
    let mut fake = Fake::new();
    fake.owned = 0;
    fake.max = Some(0);
    let (fake, guard) = fake.into_guard();

    let err = guard
        .check_raw("calendars/alice/work", Some("u1"))
        .await
        .unwrap_err();
    assert!(matches!(err, GuardError::QuotaExceeded { .. }));
    assert_eq!(fake.count_calls(), 1);
}

#[tokio::test]
async fn rate_limit_registers_before_count() {
    let mut fake = Fake::new();
    fake.max = Some(5);
    let (fake, guard) = fake.into_guard();

    guard.check_raw("calendars/alice/work", Some("u1")).await.unwrap();

    let calls = fake.calls();
    let reg = calls
        .iter()
        .position(|c| matches!(c, Call::Register { .. }))
        .unwrap();
    let count = calls
        .iter()
        .position(|c| matches!(c, Call::Count(_)))
        .unwrap();
    assert!(reg < count);
}

#[tokio::test]
async fn item_creation_registers_without_count() {
    let mut fake = Fake::new();
    fake.owned = 999;
    fake.max = Some(1);
    let (fake, guard) = fake.into_guard();

    guard
        .check_raw("calendars/alice/work/event1.ics", Some("u1"))
        .await
        .unwrap();

    assert_eq!(
        fake.register_calls(),
        vec![Call::Register {
            action: "create-item",
            max: 50,
            window: 300,
            uid: "u1".into(),
        }]
    );
    assert_eq!(fake.count_calls(), 0);
}

#[tokio::test]
async fn item_rate_limit_has_its_own_message() {
    let mut fake = Fake::new();
    fake.exceed = Some("create-item");
    let (_fake, guard) = fake.into_guard();

    let err = guard
        .check_raw("calendars/alice/work/event1.ics", Some("u1"))
        .await
        .unwrap_err();
    assert!(
        matches!(&err, GuardError::RateLimited { message, .. } if message == "Too many calendar objects created")
    );
    assert_ne!(err.to_string(), "Too many calendars created");
}

#[tokio::test]
async fn collaborator_failures_propagate() {
    let mut fake = Fake::new();
    fake.oracle_down = true;
    let (_fake, guard) = fake.into_guard();
    let err = guard
        .check_raw("calendars/alice/work", Some("u1"))
        .await
        .unwrap_err();
    assert!(matches!(err, GuardError::Unavailable(_)));
    assert!(!err.is_veto());

    let mut fake = Fake::new();
    fake.resolver_down = true;
    let (_fake, guard) = fake.into_guard();
    let err = guard.check_raw("foo/bar", Some("u1")).await.unwrap_err();
    assert!(matches!(err, GuardError::Unavailable(_)));
}

#[tokio::test]
async fn decisions_are_counted() {
    let mut fake = Fake::new();
    fake.exceed = Some("create-item");
    let fake = Arc::new(fake);
    let metrics = Arc::new(GuardMetrics::default());
    let guard = CreationGuard::new(fake.clone(), fake.clone(), fake.clone(), fake.clone())
        .with_metrics(metrics.clone());

    guard.check_raw("calendars/a/b", Some("u1")).await.unwrap();
    let _ = guard.check_raw("calendars/a/b/c.ics", Some("u1")).await;
    guard.check_raw("foo/bar", Some("u1")).await.unwrap();

    assert_eq!(
        metrics
            .decisions
            .get(&[("category", "collection"), ("outcome", "allowed")]),
        1
    );
    assert_eq!(
        metrics
            .decisions
            .get(&[("category", "item"), ("outcome", "rate_limited")]),
        1
    );
    assert_eq!(metrics.check_duration.count(&[("category", "unclassified")]), 0);
}

fn in_memory(max: i64) -> (Arc<CollectionIndex>, CreationGuard) {
    let collections = Arc::new(CollectionIndex::new());
    let settings = Arc::new(SettingsStore::default());
    settings.set("dav", "maximum_calendars", max);
    let guard = CreationGuard::new(
        Arc::new(ActorDirectory::new(["alice"])),
        Arc::new(SlidingWindowLimiter::new()),
        collections.clone(),
        settings,
    );
    (collections, guard)
}

#[tokio::test]
async fn eleventh_collection_within_the_hour_is_rate_limited() {
    let (_collections, guard) = in_memory(-1);

    for i in 0..10 {
        guard
            .check_raw(&format!("calendars/alice/cal{i}"), Some("alice"))
            .await
            .unwrap();
    }
    let err = guard
        .check_raw("calendars/alice/cal10", Some("alice"))
        .await
        .unwrap_err();
    assert!(matches!(err, GuardError::RateLimited { .. }));

    // item window is independent of the collection window
    guard
        .check_raw("calendars/alice/cal0/e.ics", Some("alice"))
        .await
        .unwrap();
}

#[tokio::test]
async fn in_memory_quota_tracks_owned_collections() {
    let (collections, guard) = in_memory(2);
    let owner = Actor::new("alice").owner_key();

    guard.check_raw("calendars/alice/a", Some("alice")).await.unwrap();
    collections.insert(&owner, "a");
    guard.check_raw("calendars/alice/b", Some("alice")).await.unwrap();
    collections.insert(&owner, "b");

    let err = guard
        .check_raw("calendars/alice/c", Some("alice"))
        .await
        .unwrap_err();
    assert!(matches!(err, GuardError::QuotaExceeded { .. }));

    collections.remove(&owner, "a");
    guard.check_raw("calendars/alice/c", Some("alice")).await.unwrap();
}
