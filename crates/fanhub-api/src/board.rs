use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;

use fanhub_types::api::{ApiResponse, Claims, CreatePostRequest};
use fanhub_types::models::BoardMessage;

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;
use crate::validation;

const MAX_POST_CHARS: usize = 500;

#[derive(Debug, Deserialize)]
pub struct BoardQuery {
    pub limit: Option<u32>,
    /// Cursor: the id of the oldest post from the previous page.
    pub before: Option<i64>,
}

pub async fn list_posts(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<BoardQuery>,
) -> AppResult<Json<ApiResponse<Vec<BoardMessage>>>> {
    let limit = validation::limit(query.limit, 50, 200);
    let before = query.before;
    let rows = state.db(move |db| db.list_board_messages(limit, before)).await?;
    Ok(Json(ApiResponse::ok(rows.into_iter().map(|r| r.into_model()).collect())))
}

pub async fn create_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<CreatePostRequest>,
) -> AppResult<impl IntoResponse> {
    let content = validation::text("Content", &req.content, MAX_POST_CHARS)?;
    let row = state
        .db(move |db| db.insert_board_message(&claims.username, &content))
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(row.into_model()))))
}

pub async fn delete_post(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    if !state.db(move |db| db.delete_board_message(id)).await? {
        return Err(AppError::NotFound(format!("Message {id} not found")));
    }
    Ok(Json(ApiResponse::done("Message deleted")))
}
