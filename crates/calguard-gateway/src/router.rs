use axum::extract::State;
use axum::middleware;
use axum::routing::get;
use axum::Router;

use crate::app_state::AppState;
use crate::services::dev_bind;
use crate::transport::before_bind;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .fallback(dev_bind)
        .layer(middleware::from_fn_with_state(state.clone(), before_bind))
        .with_state(state)
}

async fn metrics(State(state): State<AppState>) -> String {
    state.metrics().render()
}
