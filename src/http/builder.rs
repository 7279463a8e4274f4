use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use tracing::error;

use crate::models::builder::BuilderView;
use crate::state::AppState;

use super::HttpError;

const GENERIC_FAILURE: &str = "Failed to fetch builder details";

pub fn router() -> Router<AppState> {
    Router::new().route("/builder/{id}", get(get_builder))
}

async fn get_builder(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<BuilderView>, HttpError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(HttpError::new(
            StatusCode::BAD_REQUEST,
            "Builder ID is required".to_string(),
        ));
    }

    let passport = state.talent.fetch_passport(id).await.map_err(|err| {
        error!(%id, "Builder detail lookup failed: {err}");
        let status = if err.is_not_found() {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::BAD_GATEWAY
        };
        HttpError::new(status, GENERIC_FAILURE.to_string())
    })?;

    Ok(Json(BuilderView::from(passport)))
}
