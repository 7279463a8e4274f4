use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use tokio::time::timeout;
use tracing::error;

use crate::models::builder::SearchResponse;
use crate::search;
use crate::state::AppState;

use super::HttpError;

const GENERIC_FAILURE: &str = "Failed to process search";

pub fn router() -> Router<AppState> {
    Router::new().route("/search", post(run_search))
}

#[derive(Debug, Deserialize)]
struct SearchRequest {
    query: String,
    limit: Option<usize>,
}

/// The whole request chain runs under one wall-clock budget, not per-call
/// timeouts: pagination can issue several sequential upstream calls.
async fn run_search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, HttpError> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(HttpError::new(
            StatusCode::BAD_REQUEST,
            "Field 'query' must not be empty".to_string(),
        ));
    }

    let requested_limit = request.limit.unwrap_or(state.search.default_limit);
    if requested_limit == 0 {
        return Err(HttpError::new(
            StatusCode::BAD_REQUEST,
            "limit must be positive".to_string(),
        ));
    }
    let limit = requested_limit.min(state.search.max_limit);
    assert!(limit > 0, "Search limit must be positive");

    let budget = state.search.budget();
    match timeout(budget, search::execute(&state, query, limit)).await {
        Ok(Ok(response)) => {
            assert!(
                response.builders.len() <= limit,
                "Pipeline returned more builders than requested"
            );
            Ok(Json(response))
        }
        Ok(Err(err)) => {
            error!("Search pipeline failed: {err}");
            Err(HttpError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                GENERIC_FAILURE.to_string(),
            ))
        }
        Err(_elapsed) => {
            error!(budget_ms = budget.as_millis() as u64, "Search exceeded budget");
            Err(HttpError::new(
                StatusCode::GATEWAY_TIMEOUT,
                GENERIC_FAILURE.to_string(),
            ))
        }
    }
}
