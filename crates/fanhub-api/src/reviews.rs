use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use tracing::info;

use fanhub_types::api::{AdminReviewRequest, ApiResponse, Claims, ReviewStatusRequest, SubmitReviewRequest};
use fanhub_types::models::{ReviewStats, ReviewStatus, WorkReview};

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;
use crate::validation;

const MAX_REVIEW_CHARS: usize = 2000;
const DEFAULT_LIMIT: u32 = 50;
const MAX_LIMIT: u32 = 200;

#[derive(Debug, Deserialize)]
pub struct ReviewQuery {
    pub status: Option<ReviewStatus>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct PublicReviewQuery {
    pub limit: Option<u32>,
}

/// Validated review fields, ready for insert.
struct NewReview {
    username: String,
    rating: u8,
    content: String,
    tags: Vec<String>,
    status: ReviewStatus,
}

impl NewReview {
    fn validate(username: String, rating: i64, content: &str, tags: Vec<String>, status: ReviewStatus) -> AppResult<Self> {
        Ok(Self {
            username,
            rating: validation::rating(rating)?,
            content: validation::text("Content", content, MAX_REVIEW_CHARS)?,
            tags: validation::tags(tags)?,
            status,
        })
    }

    async fn insert(self, state: &AppState) -> AppResult<WorkReview> {
        let row = state
            .db(move |db| db.insert_review(&self.username, self.rating, &self.content, &self.tags, self.status))
            .await?;
        Ok(row.into_model())
    }
}

/// POST /api/work-review: user submission, always starts pending.
pub async fn submit(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<SubmitReviewRequest>,
) -> AppResult<impl IntoResponse> {
    let review = NewReview::validate(claims.username, req.rating, &req.content, req.tags, ReviewStatus::Pending)?
        .insert(&state)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(review, "Review submitted for moderation")),
    ))
}

/// GET /api/work-review: approved reviews only.
pub async fn list_approved(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PublicReviewQuery>,
) -> AppResult<Json<ApiResponse<Vec<WorkReview>>>> {
    let limit = validation::limit(query.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let rows = state
        .db(move |db| db.list_reviews(Some(ReviewStatus::Approved), limit))
        .await?;
    Ok(Json(ApiResponse::ok(rows.into_iter().map(|r| r.into_model()).collect())))
}

pub async fn stats(State(state): State<AppState>) -> AppResult<Json<ApiResponse<ReviewStats>>> {
    let stats = state.db(|db| db.review_stats()).await?;
    Ok(Json(ApiResponse::ok(stats)))
}

/// GET /api/admin/work-review
pub async fn admin_list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ReviewQuery>,
) -> AppResult<Json<ApiResponse<Vec<WorkReview>>>> {
    let limit = validation::limit(query.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let status = query.status;
    let rows = state.db(move |db| db.list_reviews(status, limit)).await?;
    Ok(Json(ApiResponse::ok(rows.into_iter().map(|r| r.into_model()).collect())))
}

/// POST /api/admin/work-review: defaults to the caller as author, approved.
pub async fn admin_create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<AdminReviewRequest>,
) -> AppResult<impl IntoResponse> {
    let username = match req.username {
        Some(name) => validation::username(&name)?,
        None => claims.username,
    };
    let status = req.status.unwrap_or(ReviewStatus::Approved);
    let review = NewReview::validate(username, req.rating, &req.content, req.tags, status)?
        .insert(&state)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(review))))
}

/// PUT /api/admin/work-review/{id}/status
pub async fn set_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<ReviewStatusRequest>,
) -> AppResult<Json<ApiResponse<WorkReview>>> {
    let status = req.status;
    let row = state
        .db(move |db| db.set_review_status(id, status))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Review {id} not found")))?;

    info!("'{}' set review {} to {}", claims.username, id, status.as_str());
    Ok(Json(ApiResponse::ok(row.into_model())))
}

/// DELETE /api/admin/work-review/{id}
pub async fn admin_delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    if !state.db(move |db| db.delete_review(id)).await? {
        return Err(AppError::NotFound(format!("Review {id} not found")));
    }
    Ok(Json(ApiResponse::done("Review deleted")))
}
