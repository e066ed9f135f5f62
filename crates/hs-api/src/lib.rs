//! # hs-api
//!
//! The web routing and orchestration layer for Hemsaye.

pub mod chat;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod policy;
pub mod seed;
pub mod state;
pub mod ws;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Uploads land in memory before the media store sees them; mirrors the
/// frontend's cap on archive images.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Builds the full HTTP surface: the JSON API under `/api`, stored images
/// under `/uploads`, and the salon socket at `/ws`.
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/init", get(handlers::init))
        .route("/login", post(handlers::login))
        .route("/register", post(handlers::register))
        .route("/users", get(handlers::list_users))
        .route(
            "/users/{nickname}",
            put(handlers::update_user).delete(handlers::remove_user),
        )
        .route("/users/{nickname}/avatar", post(handlers::upload_avatar))
        .route("/ranks", get(handlers::list_ranks).post(handlers::mint_rank))
        .route(
            "/messages",
            get(handlers::list_messages).delete(handlers::clear_messages),
        )
        .route(
            "/archives",
            get(handlers::list_archives).post(handlers::create_archive),
        )
        .route("/archives/{id}", delete(handlers::delete_archive))
        .route(
            "/theories",
            get(handlers::list_theories).post(handlers::create_theory),
        )
        .route("/theories/{id}/like", post(handlers::like_theory))
        .route("/theories/{id}/reply", post(handlers::reply_theory));

    Router::new()
        .nest("/api", api)
        .route("/ws", get(ws::upgrade))
        .nest_service("/uploads", ServeDir::new(&state.uploads_dir))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors_policy())
        .with_state(state)
}
