//! Health check
//!
//! - GET /api/health - `{"status":"ok"}` when the database answers,
//!   503 `DATABASE_UNAVAILABLE` otherwise

use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::middleware::{ApiError, AppState};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    if let Err(e) = state.pool.ping().await {
        tracing::warn!("Health check failed: {:#}", e);
        return Err(ApiError::database_unavailable("Database unavailable"));
    }
    Ok(Json(HealthResponse { status: "ok" }))
}
