use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::{info, warn};

use fanhub_types::api::{ApiResponse, AuthUser, Claims, LoginRequest, LoginResponse, RegisterRequest};
use fanhub_types::models::Role;

use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::password::{hash_password, verify_password};
use crate::state::{AppState, AppStateInner, blocking};
use crate::token::create_token;
use crate::validation;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Which steps of the login chain a login endpoint may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginScope {
    Any,
    AdminOnly,
}

/// Resolves credentials through the fallback chain; the first match wins:
/// default admin, default test user, `admins` table, `users` table.
/// A known username with the wrong password falls through to the next step.
pub fn resolve_login(
    state: &AppStateInner,
    username: &str,
    password: &str,
    scope: LoginScope,
) -> anyhow::Result<Option<AuthUser>> {
    let auth = &state.auth;

    if let Some(acc) = &auth.default_admin {
        if acc.username == username && verify_password(password, &acc.password_hash)? {
            return Ok(Some(AuthUser { username: acc.username.clone(), role: acc.role }));
        }
    }

    if scope == LoginScope::Any {
        if let Some(acc) = &auth.default_user {
            if acc.username == username && verify_password(password, &acc.password_hash)? {
                return Ok(Some(AuthUser { username: acc.username.clone(), role: acc.role }));
            }
        }
    }

    if let Some(admin) = state.db.get_admin_by_username(username)? {
        if verify_password(password, &admin.password)? {
            let role = admin.role();
            return Ok(Some(AuthUser { username: admin.username, role }));
        }
    }

    if scope == LoginScope::Any {
        if let Some(user) = state.db.get_user_by_username(username)? {
            if verify_password(password, &user.password)? {
                return Ok(Some(AuthUser { username: user.username, role: Role::User }));
            }
        }
    }

    Ok(None)
}

async fn login_with_scope(state: AppState, req: LoginRequest, scope: LoginScope) -> AppResult<impl IntoResponse> {
    let username = req.username.trim().to_string();
    if username.is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest("Username and password are required".into()));
    }

    let chain_state = state.clone();
    let chain_username = username.clone();
    let user = blocking(move || resolve_login(&chain_state, &chain_username, &req.password, scope))
        .await?
        .ok_or_else(|| {
            warn!("Rejected login for '{}' ({:?})", username, scope);
            AppError::Unauthorized(INVALID_CREDENTIALS.into())
        })?;

    let token = create_token(&state.auth.jwt_secret, &user.username, user.role, state.auth.token_ttl)?;
    info!("'{}' logged in as {}", user.username, user.role);

    Ok(Json(ApiResponse::ok_with_message(
        LoginResponse { token, user },
        "Login successful",
    )))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    login_with_scope(state, req, LoginScope::Any).await
}

pub async fn admin_login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    login_with_scope(state, req, LoginScope::AdminOnly).await
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    let username = validation::username(&req.username)?;
    validation::password(&req.password)?;

    if state.auth.is_default_account(&username) {
        return Err(AppError::Conflict("Username already taken".into()));
    }

    let name = username.clone();
    let sex = req.sex;
    let password = req.password;
    blocking({
        let state = state.clone();
        move || {
            let hash = hash_password(&password)?;
            match state.db.create_user(&name, &hash, sex.map(|s| s.as_str()))? {
                Some(_) => Ok(Ok(())),
                None => Ok(Err(AppError::Conflict("Username already taken".into()))),
            }
        }
    })
    .await??;

    let token = create_token(&state.auth.jwt_secret, &username, Role::User, state.auth.token_ttl)?;
    info!("Registered user '{}'", username);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(
            LoginResponse {
                token,
                user: AuthUser { username, role: Role::User },
            },
            "Registration successful",
        )),
    ))
}

pub async fn me(Extension(claims): Extension<Claims>) -> Json<ApiResponse<AuthUser>> {
    Json(ApiResponse::ok(AuthUser {
        username: claims.username,
        role: claims.role,
    }))
}
