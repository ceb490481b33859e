//! Route definitions for the `/missions` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::missions;
use crate::state::AppState;

/// Routes mounted at `/missions`.
///
/// ```text
/// GET  /                                    -> list
/// GET  /completed                           -> completed
/// POST /{mission_id}/execute                -> execute
/// GET  /{mission_id}/cooldown/{companion_id} -> cooldown
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(missions::list))
        .route("/completed", get(missions::completed))
        .route("/{mission_id}/execute", post(missions::execute))
        .route(
            "/{mission_id}/cooldown/{companion_id}",
            get(missions::cooldown),
        )
}
