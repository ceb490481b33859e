//! Route definitions for the `/companions` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::companions;
use crate::state::AppState;

/// Routes mounted at `/companions`.
///
/// ```text
/// GET    /                         -> list
/// POST   /                         -> create
/// GET    /quota                    -> quota
/// POST   /generate-variants        -> generate_variants
/// GET    /{id}                     -> get_by_id
/// PUT    /{id}                     -> update
/// DELETE /{id}                     -> delete
/// PUT    /{id}/avatar              -> select_avatar
/// POST   /{id}/regenerate-avatar   -> regenerate_avatar
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(companions::list).post(companions::create))
        .route("/quota", get(companions::quota))
        .route("/generate-variants", post(companions::generate_variants))
        .route(
            "/{id}",
            get(companions::get_by_id)
                .put(companions::update)
                .delete(companions::delete),
        )
        .route("/{id}/avatar", put(companions::select_avatar))
        .route("/{id}/regenerate-avatar", post(companions::regenerate_avatar))
}
