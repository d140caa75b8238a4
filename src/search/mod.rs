pub mod catalog;
pub mod debounce;
pub(crate) mod dto;
pub mod handlers;

use axum::{routing::post, Router};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/logs/:id/meals/:meal/query", post(handlers::query))
        .route("/logs/:id/meals/:meal/select", post(handlers::select))
        .route("/logs/:id/meals/:meal/commit", post(handlers::commit))
}
