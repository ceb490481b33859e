//! Route definitions for the `/payments` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::payments;
use crate::state::AppState;

/// Routes mounted at `/payments`.
///
/// ```text
/// GET  /           -> list
/// GET  /balance    -> balance
/// GET  /packages   -> packages
/// POST /checkout   -> checkout
/// POST /webhook    -> webhook (public, signature-verified)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(payments::list))
        .route("/balance", get(payments::balance))
        .route("/packages", get(payments::packages))
        .route("/checkout", post(payments::checkout))
        .route("/webhook", post(payments::webhook))
}
