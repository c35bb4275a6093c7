//! Web API module
//!
//! Provides:
//! - `/`: the search/preview page
//! - `/health`: liveness and version
//! - `/api/search`: research search, forwarded to the remote API
//! - `/api/chat`: one agent pass in a fresh conversation

pub mod chat;
pub mod health;
pub mod search;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use pcos_core::Orchestrator;
use serde::Serialize;
use std::sync::Arc;

use crate::search::SearchBackend;

pub use chat::chat_routes;
pub use health::health_routes;
pub use search::search_routes;

/// Embedded search/preview page
const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Shared handler state
#[derive(Clone, Default)]
pub struct AppState {
    /// `None` when no LLM provider is configured; `/api/chat` answers 503
    pub orchestrator: Option<Arc<Orchestrator>>,
    /// `None` when no search API is configured; `/api/search` answers 503
    pub search: Option<Arc<dyn SearchBackend>>,
}

impl AppState {
    /// Set the orchestrator
    #[must_use]
    pub fn with_orchestrator(mut self, orchestrator: Arc<Orchestrator>) -> Self {
        self.orchestrator = Some(orchestrator);
        self
    }

    /// Set the search backend
    #[must_use]
    pub fn with_search(mut self, search: Arc<dyn SearchBackend>) -> Self {
        self.search = Some(search);
        self
    }
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Handler error: status plus message
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Create the application router with all endpoints
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .merge(health_routes())
        .merge(search_routes())
        .merge(chat_routes())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_index_page() {
        let response = api_router(AppState::default())
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("/api/search"));
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = api_router(AppState::default())
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
