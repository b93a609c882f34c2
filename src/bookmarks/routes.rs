use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use super::handler;
use crate::handler::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list_bookmarks))
        .route("/", post(handler::create_bookmark))
        .route("/:bookmark_id", get(handler::get_bookmark))
        .route("/:bookmark_id", patch(handler::update_bookmark))
        .route("/:bookmark_id", delete(handler::delete_bookmark))
}
