pub mod auth;
pub mod chat;
pub mod companions;
pub mod health;
pub mod missions;
pub mod payments;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Everything except register, login, packages and the payment webhook
/// requires a Bearer token.
///
/// ```text
/// /auth/register                                   register (public)
/// /auth/login                                      login (public)
/// /auth/me                                         profile and balance
/// /auth/refresh                                    fresh token for a valid one
/// /auth/logout                                     client-side sign-out (public)
///
/// /companions                                      list, create
/// /companions/quota                                generation quota
/// /companions/generate-variants                    preview avatars (POST)
/// /companions/{id}                                 get, update, delete
/// /companions/{id}/avatar                          select avatar (PUT)
/// /companions/{id}/regenerate-avatar               new variants (POST)
///
/// /missions                                        active catalog
/// /missions/completed                              completion history
/// /missions/{mission_id}/execute                   execute (POST)
/// /missions/{mission_id}/cooldown/{companion_id}   cooldown state
///
/// /payments                                        own payments
/// /payments/balance                                current balance
/// /payments/packages                               NTG packages (public)
/// /payments/checkout                               open checkout (POST)
/// /payments/webhook                                provider webhook (public)
///
/// /chat/{companion_id}                             send message (POST)
/// /chat/{companion_id}/history                     history, clear (DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/companions", companions::router())
        .nest("/missions", missions::router())
        .nest("/payments", payments::router())
        .nest("/chat", chat::router())
}
