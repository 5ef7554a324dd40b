use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use tracing::debug;

use fanhub_types::api::{AdminChatRequest, ApiResponse, Claims, UserChatRequest};
use fanhub_types::models::{ChatMessage, ChatUser, SenderRole};

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;
use crate::validation;

const MAX_CONTENT_CHARS: usize = 1000;
const DEFAULT_LIMIT: u32 = 50;
const MAX_LIMIT: u32 = 200;

#[derive(Debug, Deserialize)]
pub struct AdminChatQuery {
    /// Narrow the view to one user's conversation.
    pub user: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ConversationQuery {
    pub limit: Option<u32>,
}

/// POST /api/admin-chat/send
pub async fn admin_send(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<AdminChatRequest>,
) -> AppResult<impl IntoResponse> {
    let content = validation::text("Content", &req.content, MAX_CONTENT_CHARS)?;
    let receiver = req.receiver.trim().to_string();
    if receiver.is_empty() {
        return Err(AppError::BadRequest("Receiver must not be empty".into()));
    }

    let is_default_user = state
        .auth
        .default_user
        .as_ref()
        .is_some_and(|acc| acc.username == receiver);

    let sender = claims.username;
    let row = state
        .db(move |db| {
            if !is_default_user && !db.user_exists(&receiver)? {
                return Ok(Err(AppError::NotFound(format!("User '{receiver}' not found"))));
            }
            Ok(Ok(db.insert_chat_message(&sender, &receiver, SenderRole::Admin, &content)?))
        })
        .await??;

    debug!("Admin '{}' -> '{}' (message {})", row.sender, row.receiver, row.id);
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(row.into_model()))))
}

/// GET /api/admin-chat/messages
///
/// Reading one user's conversation marks that user's messages as read.
pub async fn admin_messages(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AdminChatQuery>,
) -> AppResult<Json<ApiResponse<Vec<ChatMessage>>>> {
    let limit = validation::limit(query.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let user = query.user.map(|u| u.trim().to_string()).filter(|u| !u.is_empty());

    let rows = state
        .db(move |db| {
            if let Some(user) = &user {
                db.mark_conversation_read(user, SenderRole::Admin)?;
            }
            db.admin_chat_messages(user.as_deref(), limit)
        })
        .await?;

    Ok(Json(ApiResponse::ok(rows.into_iter().map(|r| r.into_model()).collect())))
}

/// POST /api/user-chat/send
pub async fn user_send(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<UserChatRequest>,
) -> AppResult<impl IntoResponse> {
    if SenderRole::from(claims.role) != SenderRole::User {
        return Err(AppError::Forbidden("Admins reply through the admin chat".into()));
    }
    let content = validation::text("Content", &req.content, MAX_CONTENT_CHARS)?;

    let named = req.receiver.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
    let check_receiver = named.is_some();
    let receiver = named.unwrap_or_else(|| state.support_admin.clone());
    let is_default_admin = state
        .auth
        .default_admin
        .as_ref()
        .is_some_and(|acc| acc.username == receiver);

    let sender = claims.username;
    let row = state
        .db(move |db| {
            if check_receiver && !is_default_admin && !db.admin_exists(&receiver)? {
                return Ok(Err(AppError::NotFound(format!("Admin '{receiver}' not found"))));
            }
            Ok(Ok(db.insert_chat_message(&sender, &receiver, SenderRole::User, &content)?))
        })
        .await??;

    debug!("User '{}' -> '{}' (message {})", row.sender, row.receiver, row.id);
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(row.into_model()))))
}

/// GET /api/user-chat/messages/{user}
///
/// Users may only read their own conversation; admins may read any.
pub async fn user_messages(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(user): ApiPath<String>,
    ApiQuery(query): ApiQuery<ConversationQuery>,
) -> AppResult<Json<ApiResponse<Vec<ChatMessage>>>> {
    let is_self = claims.username == user;
    if !is_self && !claims.role.is_admin() {
        return Err(AppError::Forbidden("Cannot read another user's conversation".into()));
    }

    let limit = validation::limit(query.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let rows = state
        .db(move |db| {
            if is_self {
                db.mark_conversation_read(&user, SenderRole::User)?;
            }
            db.conversation(&user, limit)
        })
        .await?;

    Ok(Json(ApiResponse::ok(rows.into_iter().map(|r| r.into_model()).collect())))
}

/// GET /api/chat/users
pub async fn chat_users(State(state): State<AppState>) -> AppResult<Json<ApiResponse<Vec<ChatUser>>>> {
    let rows = state.db(|db| db.chat_users()).await?;
    Ok(Json(ApiResponse::ok(rows.into_iter().map(|r| r.into_model()).collect())))
}
