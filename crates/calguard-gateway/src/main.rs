//! calguard gateway
//!
//! - Resource tree mounted under `gateway.mount` (default `/dav`)
//! - Creation guard in front of PUT / MKCOL / MKCALENDAR
//! - Prometheus text metrics on `/metrics`

use std::net::SocketAddr;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

use calguard_gateway::{app_state, config, router};

const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "calguard.yaml".to_string());
    let cfg = config::load_from_file(&path)?;
    let listen: SocketAddr = cfg.gateway.listen.parse()?;

    let state = app_state::AppState::new(cfg)?;
    let pruner = state.limiter().spawn_pruner(PRUNE_INTERVAL);
    let app = router::build_router(state);

    tracing::info!(%listen, config = %path, "calguard-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen).await?;

    let served = axum::serve(listener, app).await;
    pruner.abort();
    served?;
    Ok(())
}
