//! Handlers for the `/chat` resource.
//!
//! A turn is split around the provider call: the user message is stored
//! first, the provider (or the local responder) is called with no
//! transaction open, then the reply and parameter effects are written in
//! one transaction.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tama_core::chat::{analyze_sentiment, Emotion, MAX_HISTORY_MESSAGES};
use tama_core::error::CoreError;
use tama_core::params::{CompanionParams, ParamEffect};
use tama_core::status::CompanionStatus;
use tama_core::types::DbId;
use tama_db::engine::chat as engine;
use tama_db::models::chat::ChatMessage;
use tama_db::repositories::{ChatRepo, CompanionRepo};
use tama_providers::fallback::converse_or_fallback;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, max = 2000, message = "must be 1 to 2000 characters"))]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub session_id: String,
    pub emotion: Emotion,
    pub params_updated: ParamEffect,
    pub params: CompanionParams,
    pub status: CompanionStatus,
    pub message_count: i64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/chat/{companion_id}
pub async fn send(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(companion_id): Path<DbId>,
    Json(input): Json<SendMessageRequest>,
) -> AppResult<Json<DataResponse<ChatReply>>> {
    input.validate()?;
    let message = input.message.trim();
    if message.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "message: must not be blank".into(),
        )));
    }

    let new_session_ref = format!("sess_{}", uuid::Uuid::new_v4().simple());
    let start = engine::begin_turn(
        &state.pool,
        auth.account_id,
        companion_id,
        &new_session_ref,
        message,
    )
    .await?;

    let reply = converse_or_fallback(
        state.providers.conversation.as_ref(),
        message,
        &start.session.session_ref,
        start.companion.agent_ref.as_deref(),
        start.companion.energy,
        state.providers.timeout,
    )
    .await;

    let turn = engine::complete_turn(
        &state.pool,
        auth.account_id,
        &start.session,
        analyze_sentiment(message),
        &reply.text,
        reply.emotion,
    )
    .await?;

    tracing::debug!(
        account_id = auth.account_id,
        companion_id,
        message_count = turn.message_count,
        emotion = reply.emotion.as_str(),
        "Chat turn completed",
    );

    Ok(Json(DataResponse {
        data: ChatReply {
            response: reply.text,
            session_id: start.session.session_ref,
            emotion: reply.emotion,
            params_updated: turn.effect,
            params: turn.companion.params(),
            status: turn.companion.status(),
            message_count: turn.message_count,
        },
    }))
}

/// GET /api/v1/chat/{companion_id}/history
///
/// The most recent messages, oldest first. Empty when no session exists.
pub async fn history(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(companion_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ChatMessage>>>> {
    ensure_owned(&state, companion_id, auth.account_id).await?;

    let messages = match ChatRepo::find_session(&state.pool, auth.account_id, companion_id).await? {
        Some(session) => {
            ChatRepo::recent_messages(&state.pool, session.id, MAX_HISTORY_MESSAGES).await?
        }
        None => Vec::new(),
    };
    Ok(Json(DataResponse { data: messages }))
}

/// DELETE /api/v1/chat/{companion_id}/history
pub async fn clear_history(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(companion_id): Path<DbId>,
) -> AppResult<StatusCode> {
    ensure_owned(&state, companion_id, auth.account_id).await?;
    let deleted = ChatRepo::delete_session(&state.pool, auth.account_id, companion_id).await?;
    tracing::info!(account_id = auth.account_id, companion_id, deleted, "Chat history cleared");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn ensure_owned(state: &AppState, companion_id: DbId, account_id: DbId) -> AppResult<()> {
    CompanionRepo::find_owned(&state.pool, companion_id, account_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Companion",
            id: companion_id,
        }))?;
    Ok(())
}
