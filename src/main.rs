use std::sync::Arc;

use log::{error, info};
use relay_app::{
    build_application,
    config::RelayConfig,
    ports::authorization::{AcceptAllKeys, KeyAuthorizationPort, StaticKeyList},
};
use relay_email_lettre::LettreMailAdapter;

mod logs;

const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
const DEFAULT_HTTP_PORT: u16 = 8080;

/// Picks the key policy from `RELAY_KEYS`. A list that is set but names no
/// key would reject every report, so it is refused.
fn key_authorizer(
    keys: Option<String>,
) -> Result<Arc<dyn KeyAuthorizationPort + Send + Sync + 'static>, String> {
    match keys {
        Some(list) if !list.is_empty() => {
            let keys = StaticKeyList::parse(&list);
            if keys.is_empty() {
                return Err(format!("RELAY_KEYS={:?} contains no keys", list));
            }
            info!("Accepting reports from {} configured keys", keys.len());
            Ok(Arc::new(keys))
        }
        _ => Ok(Arc::new(AcceptAllKeys)),
    }
}

fn http_addr() -> String {
    let host = std::env::var("RELAY_HTTP_HOST").unwrap_or_else(|_| DEFAULT_HTTP_HOST.to_string());
    let port = match std::env::var("RELAY_HTTP_PORT") {
        Ok(port) => port
            .parse::<u16>()
            .expect("RELAY_HTTP_PORT must be a valid u16"),
        Err(_) => DEFAULT_HTTP_PORT,
    };
    format!("{}:{}", host, port)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received. Preparing graceful exit...");
}

#[tokio::main]
async fn main() {
    if dotenvy::dotenv().is_err() {
        eprintln!("No .env file loaded, using process environment");
    }

    logs::init_logger();

    let config = Arc::new(RelayConfig::from_env());
    info!(
        "Relaying reports to {} over {} as {} {}",
        config.destination,
        config.transport,
        config.identity,
        relay_app::VERSION
    );

    let mailer = Arc::new(LettreMailAdapter::from_env().expect("Failed to set up mail transports"));
    let authorizer = match key_authorizer(std::env::var("RELAY_KEYS").ok()) {
        Ok(authorizer) => authorizer,
        Err(e) => {
            error!("Invalid key configuration: {}", e);
            std::process::exit(1);
        }
    };
    let app = Arc::new(build_application(config, authorizer, mailer));

    if let Err(e) = relay_http_api::serve(app, &http_addr(), shutdown_signal()).await {
        error!("HTTP server stopped with error: {}", e);
        std::process::exit(1);
    }
}
