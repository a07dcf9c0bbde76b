//! Route modules for Blog Book Server

pub mod articles;
pub mod books;
pub mod health;

use axum::{routing::get, Router};

use crate::state::AppState;

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/v1/health", get(health::health_check))
        .nest("/api/v1/books", books::router())
        .nest("/api/v1/articles", articles::router())
        .with_state(state)
}
