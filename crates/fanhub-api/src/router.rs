use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::middleware::{require_admin, require_auth};
use crate::state::AppState;
use crate::{accounts, auth, board, carousel, chat, health, reviews};

/// All routes, without transport layers (CORS, tracing); the binary adds those.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health))
        .route("/api/login", post(auth::login))
        .route("/api/register", post(auth::register))
        .route("/api/admin/login", post(auth::admin_login))
        .route("/api/carousel", get(carousel::list_active))
        .route("/api/work-review", get(reviews::list_approved))
        .route("/api/work-review/stats", get(reviews::stats))
        .route("/api/user/message", get(board::list_posts));

    let user_routes = Router::new()
        .route("/api/me", get(auth::me))
        .route("/api/user/message", post(board::create_post))
        .route("/api/work-review", post(reviews::submit))
        .route("/api/user-chat/send", post(chat::user_send))
        .route("/api/user-chat/messages/{user}", get(chat::user_messages))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let admin_routes = Router::new()
        .route("/api/admin/users", get(accounts::list_users))
        .route(
            "/api/admin/accounts",
            get(accounts::list_admins).post(accounts::create_admin),
        )
        .route(
            "/api/admin/carousel",
            get(carousel::list_all).post(carousel::create),
        )
        .route(
            "/api/admin/carousel/{id}",
            put(carousel::update).delete(carousel::delete),
        )
        .route(
            "/api/admin/work-review",
            get(reviews::admin_list).post(reviews::admin_create),
        )
        .route("/api/admin/work-review/{id}", delete(reviews::admin_delete))
        .route("/api/admin/work-review/{id}/status", put(reviews::set_status))
        .route("/api/admin/message/{id}", delete(board::delete_post))
        .route("/api/admin-chat/send", post(chat::admin_send))
        .route("/api/admin-chat/messages", get(chat::admin_messages))
        .route("/api/chat/users", get(chat::chat_users))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(admin_routes)
        .with_state(state)
}
