use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;

use fanhub_types::api::{ApiResponse, Claims, CreateAdminRequest};
use fanhub_types::models::{AdminProfile, Role, UserProfile};

use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::password::hash_password;
use crate::state::{AppState, blocking};
use crate::validation;

/// GET /api/admin/users
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<ApiResponse<Vec<UserProfile>>>> {
    let rows = state.db(|db| db.list_users()).await?;
    let users = rows.into_iter().map(|r| r.into_model()).collect();
    Ok(Json(ApiResponse::ok(users)))
}

/// GET /api/admin/accounts
pub async fn list_admins(State(state): State<AppState>) -> AppResult<Json<ApiResponse<Vec<AdminProfile>>>> {
    let rows = state.db(|db| db.list_admins()).await?;
    let admins = rows.into_iter().map(|r| r.into_model()).collect();
    Ok(Json(ApiResponse::ok(admins)))
}

/// POST /api/admin/accounts (superadmin only)
pub async fn create_admin(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<CreateAdminRequest>,
) -> AppResult<impl IntoResponse> {
    if claims.role != Role::SuperAdmin {
        return Err(AppError::Forbidden("Only a superadmin can create admin accounts".into()));
    }

    let username = validation::username(&req.username)?;
    validation::password(&req.password)?;
    let role = req.role.unwrap_or(Role::Admin);
    if !role.is_admin() {
        return Err(AppError::BadRequest("Role must be admin or superadmin".into()));
    }
    if state.auth.is_default_account(&username) {
        return Err(AppError::Conflict("Username already taken".into()));
    }

    let name = username.clone();
    let password = req.password;
    let row = blocking({
        let state = state.clone();
        move || {
            let hash = hash_password(&password)?;
            if state.db.create_admin(&name, &hash, role.as_str())?.is_none() {
                return Ok(Err(AppError::Conflict("Username already taken".into())));
            }
            let row = state
                .db
                .get_admin_by_username(&name)?
                .ok_or_else(|| anyhow::anyhow!("admin '{}' vanished after insert", name))?;
            Ok(Ok(row))
        }
    })
    .await??;

    info!("'{}' created {} account '{}'", claims.username, role, username);
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(row.into_model()))))
}
