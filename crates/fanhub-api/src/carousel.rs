use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use fanhub_types::api::{ApiResponse, CreateCarouselRequest, UpdateCarouselRequest};
use fanhub_types::models::CarouselImage;

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;
use crate::validation;

const MAX_TITLE_CHARS: usize = 100;

async fn list(state: AppState, active_only: bool) -> AppResult<Json<ApiResponse<Vec<CarouselImage>>>> {
    let rows = state.db(move |db| db.list_carousel_images(active_only)).await?;
    Ok(Json(ApiResponse::ok(rows.into_iter().map(|r| r.into_model()).collect())))
}

/// GET /api/carousel: what the home page shows.
pub async fn list_active(State(state): State<AppState>) -> AppResult<Json<ApiResponse<Vec<CarouselImage>>>> {
    list(state, true).await
}

/// GET /api/admin/carousel
pub async fn list_all(State(state): State<AppState>) -> AppResult<Json<ApiResponse<Vec<CarouselImage>>>> {
    list(state, false).await
}

pub async fn create(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateCarouselRequest>,
) -> AppResult<impl IntoResponse> {
    let title = validation::text("Title", &req.title, MAX_TITLE_CHARS)?;
    let image_url = validation::image_url(&req.image_url)?;
    let display_order = req.display_order.unwrap_or(0);
    let active = req.active.unwrap_or(true);

    let row = state
        .db(move |db| db.insert_carousel_image(&title, &image_url, display_order, active))
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(row.into_model()))))
}

pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateCarouselRequest>,
) -> AppResult<Json<ApiResponse<CarouselImage>>> {
    let title = req
        .title
        .map(|t| validation::text("Title", &t, MAX_TITLE_CHARS))
        .transpose()?;
    let image_url = req.image_url.map(|u| validation::image_url(&u)).transpose()?;
    let (display_order, active) = (req.display_order, req.active);

    let row = state
        .db(move |db| {
            db.update_carousel_image(id, title.as_deref(), image_url.as_deref(), display_order, active)
        })
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Carousel image {id} not found")))?;
    Ok(Json(ApiResponse::ok(row.into_model())))
}

pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    if !state.db(move |db| db.delete_carousel_image(id)).await? {
        return Err(AppError::NotFound(format!("Carousel image {id} not found")));
    }
    Ok(Json(ApiResponse::done("Carousel image deleted")))
}
