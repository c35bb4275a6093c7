//! Server initialization and main run loop

use super::loader::load_config;
use super::providers::build_orchestrator;
use crate::api::{api_router, AppState};
use crate::search::RemoteSearchClient;
use anyhow::{Context, Result};
use axum::http::HeaderValue;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Run the HTTP server until Ctrl+C or SIGTERM
pub async fn run() -> Result<()> {
    info!("Starting PCOS Care server v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config().context("Failed to load configuration")?;
    info!("Configuration loaded");

    let mut state = AppState::default();

    // Chat needs an LLM provider; search and the page work without one
    match build_orchestrator(&config) {
        Ok(orchestrator) => {
            info!(
                agents = orchestrator.registry().len(),
                "Agent orchestration enabled"
            );
            state = state.with_orchestrator(orchestrator);
        }
        Err(e) => warn!("Chat disabled: {:#}", e),
    }

    match RemoteSearchClient::from_config(&config.search)? {
        Some(client) => {
            info!(max_results = client.max_results(), "Research search enabled");
            state = state.with_search(Arc::new(client));
        }
        None => warn!("Research search disabled: search.api_url is not set"),
    }

    let app = api_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.server.cors_origins));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("PCOS Care shutdown complete");
    Ok(())
}

/// CORS for the configured origins; `*` allows any origin
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

/// Resolve when the process receives Ctrl+C or SIGTERM
pub async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received SIGTERM signal");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    async fn preflight(origins: &[String], origin: &str) -> Option<HeaderValue> {
        let app = api_router(AppState::default()).layer(cors_layer(origins));
        let response = app
            .oneshot(
                Request::get("/health")
                    .header(header::ORIGIN, origin)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .cloned()
    }

    #[tokio::test]
    async fn test_wildcard_cors() {
        let allowed = preflight(&["*".to_string()], "https://anywhere.example").await;
        assert!(allowed.is_some());
    }

    #[tokio::test]
    async fn test_listed_cors_origins() {
        let origins = vec!["https://care.example".to_string(), "bad\norigin".to_string()];
        let allowed = preflight(&origins, "https://care.example").await;
        assert_eq!(allowed.unwrap(), "https://care.example");

        let denied = preflight(&origins, "https://other.example").await;
        assert!(denied.is_none());
    }
}
