use axum::extract::{Request, State};
use axum::http::{HeaderMap, Method};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::app_state::AppState;

use super::response::GuardRejection;

/// Header carrying the authenticated actor id, set by the upstream auth layer.
pub const ACTOR_HEADER: &str = "x-actor-id";

/// Methods that bind a new resource into the tree.
pub fn is_creating(method: &Method) -> bool {
    matches!(method.as_str(), "PUT" | "MKCOL" | "MKCALENDAR")
}

/// Strip the mount prefix, yielding the tree-relative path.
///
/// `None` when `path` lies outside the mount. Nothing else is normalized.
pub fn mount_relative<'a>(path: &'a str, mount: &str) -> Option<&'a str> {
    if mount == "/" {
        return path.strip_prefix('/');
    }
    let rest = path.strip_prefix(mount)?;
    if rest.is_empty() {
        return Some("");
    }
    rest.strip_prefix('/')
}

/// Actor id from [`ACTOR_HEADER`].
///
/// A non-UTF-8 value counts as absent, which makes the request unauthenticated
/// as far as the guard is concerned.
pub fn actor_id(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(ACTOR_HEADER)?;
    match raw.to_str() {
        Ok(id) => Some(id.to_string()),
        Err(_) => {
            tracing::debug!(
                header = ACTOR_HEADER,
                len = raw.len(),
                "actor header is not valid UTF-8; treating request as unauthenticated"
            );
            None
        }
    }
}

/// Middleware: run the creation guard before the inner handler binds anything.
pub async fn before_bind(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if !is_creating(req.method()) {
        return next.run(req).await;
    }
    let Some(rel) = mount_relative(req.uri().path(), state.mount()) else {
        return next.run(req).await;
    };
    let rel = rel.to_string();
    let actor_id = actor_id(req.headers());

    if let Err(e) = state.guard().check_raw(&rel, actor_id.as_deref()).await {
        tracing::debug!(path = %rel, code = e.client_code().as_str(), "bind vetoed");
        return GuardRejection(e).into_response();
    }
    next.run(req).await
}
