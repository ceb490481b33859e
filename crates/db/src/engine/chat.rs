//! Chat turn persistence.
//!
//! A turn is split in two so the conversation provider is never called
//! while a row lock is held: [`begin_turn`] stores the user message, the
//! caller obtains a reply, then [`complete_turn`] applies the parameter
//! effect and stores the reply atomically.

use sqlx::PgPool;
use tama_core::chat::{self, Emotion, Sentiment};
use tama_core::error::CoreError;
use tama_core::params::ParamEffect;
use tama_core::types::DbId;

use super::retry::with_retry;
use super::EngineResult;
use crate::models::chat::{ChatMessage, ChatSession, ROLE_ASSISTANT, ROLE_USER};
use crate::models::companion::Companion;
use crate::repositories::{ChatRepo, CompanionRepo};

/// State captured when a turn starts.
#[derive(Debug, Clone)]
pub struct TurnStart {
    pub companion: Companion,
    pub session: ChatSession,
}

/// State after a turn completes.
#[derive(Debug, Clone)]
pub struct TurnResult {
    pub companion: Companion,
    pub effect: ParamEffect,
    pub message_count: i64,
    pub reply: ChatMessage,
}

fn companion_not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Companion",
        id,
    }
}

/// Ensure the session exists and record the user's message.
///
/// `new_session_ref` is only used when no session exists yet.
pub async fn begin_turn(
    pool: &PgPool,
    account_id: DbId,
    companion_id: DbId,
    new_session_ref: &str,
    message: &str,
) -> EngineResult<TurnStart> {
    let companion = CompanionRepo::find_owned(pool, companion_id, account_id)
        .await?
        .ok_or_else(|| companion_not_found(companion_id))?;
    let session =
        ChatRepo::get_or_create_session(pool, account_id, companion_id, new_session_ref).await?;
    ChatRepo::insert_message(pool, session.id, ROLE_USER, message, None).await?;
    Ok(TurnStart { companion, session })
}

/// Count the message, apply its effect, and store the reply.
pub async fn complete_turn(
    pool: &PgPool,
    account_id: DbId,
    session: &ChatSession,
    sentiment: Sentiment,
    reply: &str,
    emotion: Emotion,
) -> EngineResult<TurnResult> {
    with_retry("complete_chat_turn", || {
        complete_once(pool, account_id, session, sentiment, reply, emotion)
    })
    .await
}

async fn complete_once(
    pool: &PgPool,
    account_id: DbId,
    session: &ChatSession,
    sentiment: Sentiment,
    reply: &str,
    emotion: Emotion,
) -> EngineResult<TurnResult> {
    let mut tx = pool.begin().await?;

    let companion = CompanionRepo::lock_owned(&mut tx, session.companion_id, account_id)
        .await?
        .ok_or_else(|| companion_not_found(session.companion_id))?;
    // The session may have been cleared or purged while the provider was
    // answering. The turn then opens a fresh session under the same ref.
    let (session_id, message_count) =
        match ChatRepo::increment_message_count(&mut tx, session.id).await? {
            Some(count) => (session.id, count),
            None => {
                let fresh = ChatRepo::get_or_create_session(
                    &mut *tx,
                    account_id,
                    companion.id,
                    &session.session_ref,
                )
                .await?;
                tracing::info!(
                    account_id,
                    companion_id = companion.id,
                    old_session_id = session.id,
                    session_id = fresh.id,
                    "Chat session vanished mid-turn, reopened",
                );
                let count = ChatRepo::increment_message_count(&mut tx, fresh.id)
                    .await?
                    .ok_or_else(|| {
                        CoreError::Internal(format!("chat session {} not writable", fresh.id))
                    })?;
                (fresh.id, count)
            }
        };

    let effect = chat::message_effect(sentiment, message_count);
    let params = companion.params().with_effect(effect);
    let companion = CompanionRepo::update_params(&mut tx, companion.id, &params).await?;

    let reply = ChatRepo::insert_message(
        &mut *tx,
        session_id,
        ROLE_ASSISTANT,
        reply,
        Some(emotion.as_str()),
    )
    .await?;

    tx.commit().await?;

    Ok(TurnResult {
        companion,
        effect,
        message_count,
        reply,
    })
}
