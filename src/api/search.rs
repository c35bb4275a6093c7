//! Research search endpoint

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{ApiError, AppState};
use crate::search::SearchResult;

/// Results returned when the request does not ask for a count
const DEFAULT_LIMIT: usize = 10;

/// Search request
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Search response
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}

async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(ApiError::bad_request("query must not be empty"));
    }
    let backend = state
        .search
        .ok_or_else(|| ApiError::unavailable("search API is not configured"))?;

    let limit = request.limit.unwrap_or(DEFAULT_LIMIT).max(1);
    match backend.search(query.to_string(), limit).await {
        Ok(results) => Ok(Json(SearchResponse { results })),
        Err(e) => {
            warn!(error = %e, "Search failed");
            Err(ApiError::bad_gateway("search service unavailable"))
        }
    }
}

/// Search routes
pub fn search_routes() -> Router<AppState> {
    Router::new().route("/api/search", post(search))
}
