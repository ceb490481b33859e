//! Route definitions for the `/chat` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::chat;
use crate::state::AppState;

/// Routes mounted at `/chat`.
///
/// ```text
/// POST   /{companion_id}          -> send
/// GET    /{companion_id}/history  -> history
/// DELETE /{companion_id}/history  -> clear_history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{companion_id}", post(chat::send))
        .route(
            "/{companion_id}/history",
            get(chat::history).delete(chat::clear_history),
        )
}
