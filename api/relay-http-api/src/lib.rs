use std::sync::Arc;

use axum::{Router, routing::any};
use log::info;
use relay_app::Application;

pub mod report;
pub mod response;

#[derive(Clone)]
pub struct AppState {
    pub app: Arc<Application>,
}

pub fn router(app: Arc<Application>) -> Router {
    Router::new()
        .route("/", any(report::submit_report))
        .with_state(AppState { app })
}

pub async fn serve(
    app: Arc<Application>,
    addr: &str,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Report relay listening on {}", listener.local_addr()?);
    axum::serve(listener, router(app))
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Report relay shut down gracefully");
    Ok(())
}
