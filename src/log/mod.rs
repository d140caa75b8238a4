pub(crate) mod dto;
pub mod handlers;
pub mod store;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/logs", post(handlers::create_log))
        .route(
            "/logs/:id",
            get(handlers::get_log).delete(handlers::delete_log),
        )
        .route("/logs/:id/clear", post(handlers::clear_log))
        .route("/logs/:id/progress", get(handlers::get_progress))
        .route(
            "/logs/:id/meals/:meal/items/:index",
            patch(handlers::update_quantity).delete(handlers::delete_item),
        )
        .route("/logs/:id/submit", post(handlers::submit_log))
}
