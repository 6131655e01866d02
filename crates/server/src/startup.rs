use std::net::{Ipv4Addr, SocketAddr};

use axum::Router;
use common::utils::logging::init_logging;
use configs::AppConfig;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes;
use crate::seed::seed_demo;
use crate::state::AppState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

pub fn build_app(state: AppState) -> Router {
    routes::build_router(state, build_cors())
}

/// Public entry: seed demo data and serve on the configured address.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    let cfg = AppConfig::load_and_validate()?;
    init_logging(cfg.logging.json);

    let state = AppState::new();
    seed_demo(&state);

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, "starting development backend");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, build_app(state)).await?;
    Ok(())
}

/// Server bound to an ephemeral localhost port.
pub struct RunningServer {
    /// API base, including the `/api` prefix.
    pub base_url: String,
    pub addr: SocketAddr,
    pub handle: JoinHandle<()>,
}

impl Drop for RunningServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Serve `state` in the background; used by tests and embedders.
pub async fn spawn_local(state: AppState) -> anyhow::Result<RunningServer> {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await?;
    let addr = listener.local_addr()?;
    let app = build_app(state);
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "development backend stopped");
        }
    });
    let base_url = format!("http://{}:{}/api", addr.ip(), addr.port());
    Ok(RunningServer { base_url, addr, handle })
}
