use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::state::AppState;

mod builder;
mod search;

pub fn router(state: AppState) -> Router {
    assert!(
        state.start_time.elapsed() < Duration::from_secs(86_400),
        "Application uptime exceeds 24 hours before router creation"
    );

    // Configure CORS for the chat frontend
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([ACCEPT, AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    let api_router = Router::new()
        .merge(search::router())
        .merge(builder::router())
        .with_state(state.clone());

    Router::new()
        .route("/health", get(health_live))
        .route("/health/ready", get(health_ready))
        .nest("/api", api_router)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_live(State(state): State<AppState>) -> Result<Json<HealthResponse>, HttpError> {
    let uptime = state.start_time.elapsed().as_secs();
    assert!(
        uptime <= 31_536_000,
        "Uptime exceeds one year without restart"
    );
    let response = HealthResponse {
        status: "live",
        uptime_seconds: uptime,
    };
    Ok(Json(response))
}

async fn health_ready(State(state): State<AppState>) -> Result<Json<ReadyResponse>, HttpError> {
    let budget_ms = u64::try_from(state.search.budget().as_millis()).map_err(|_| {
        HttpError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Search budget exceeds bounds".to_string(),
        )
    })?;

    let response = ReadyResponse {
        status: "ready",
        page_size: state.page_size,
        search_budget_ms: budget_ms,
        default_limit: state.search.default_limit,
        max_limit: state.search.max_limit,
    };
    Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_seconds: u64,
}

#[derive(Debug, Serialize)]
struct ReadyResponse {
    status: &'static str,
    page_size: u32,
    search_budget_ms: u64,
    default_limit: usize,
    max_limit: usize,
}

#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, message: String) -> Self {
        assert!(status != StatusCode::OK, "Error status cannot be 200");
        assert!(!message.is_empty(), "Error message cannot be empty");
        Self { status, message }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        info!("HTTP error: {}", self.message);
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}
