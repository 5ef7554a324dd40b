use axum::{Json, extract::State};

use fanhub_types::api::{ApiResponse, HealthStatus};

use crate::error::AppResult;
use crate::state::AppState;

/// GET /health: also proves the database answers.
pub async fn health(State(state): State<AppState>) -> AppResult<Json<ApiResponse<HealthStatus>>> {
    state.db(|db| db.ping()).await?;
    Ok(Json(ApiResponse::ok(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })))
}
