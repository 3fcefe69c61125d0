//! Development bind handler.
//!
//! Stands in for the resource server's create machinery so the binary can be
//! exercised end to end: collection creations are recorded in the in-memory
//! index, deletions remove them. Item bodies are not stored.
//!
//! An actor may only create or delete inside its own calendar home; the index
//! is keyed by the actor's owner key, the same key the guard counts against.

use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};

use calguard_core::{classify, Actor, CreationCategory, ResourcePath};

use crate::app_state::AppState;
use crate::transport::bind_hook::{actor_id, is_creating, mount_relative};

pub async fn dev_bind(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> StatusCode {
    let Some(rel) = mount_relative(uri.path(), state.mount()) else {
        return StatusCode::NOT_FOUND;
    };
    let path = ResourcePath::parse(rel);
    let category = classify(&path);

    let mutating = is_creating(&method) || method == Method::DELETE;
    if !mutating || category == CreationCategory::Unclassified {
        return if is_creating(&method) {
            StatusCode::FORBIDDEN
        } else {
            StatusCode::NOT_FOUND
        };
    }

    let (home, name) = home_and_collection(&path);
    let Some(actor) = actor_id(&headers).filter(|id| id == home).map(Actor::new) else {
        tracing::debug!(path = %path.as_str(), home, "bind outside the actor's calendar home");
        return StatusCode::FORBIDDEN;
    };
    let owner = actor.owner_key();

    match (category, method == Method::DELETE) {
        (CreationCategory::CollectionCreation, false) => {
            if state.collections().insert(&owner, name) {
                tracing::info!(owner = %owner, collection = name, "collection created");
                StatusCode::CREATED
            } else {
                StatusCode::METHOD_NOT_ALLOWED
            }
        }
        (CreationCategory::CollectionCreation, true) => {
            if state.collections().remove(&owner, name) {
                StatusCode::NO_CONTENT
            } else {
                StatusCode::NOT_FOUND
            }
        }
        (CreationCategory::ItemCreation, false) => StatusCode::CREATED,
        _ => StatusCode::NOT_FOUND,
    }
}

/// Calendar-home segment and collection segment of a classified path.
fn home_and_collection(path: &ResourcePath) -> (&str, &str) {
    let mut segs = path.segments().skip(1);
    let home = segs.next().unwrap_or_default();
    let name = segs.next().unwrap_or_default();
    (home, name)
}
