//! Chat session and message models.

use serde::Serialize;
use sqlx::FromRow;
use tama_core::types::{DbId, Timestamp};

pub const ROLE_USER: &str = "user";
pub const ROLE_ASSISTANT: &str = "assistant";

/// A row from `chat_sessions`, one per (account, companion).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChatSession {
    pub id: DbId,
    pub account_id: DbId,
    pub companion_id: DbId,
    /// Opaque reference handed to the conversation provider.
    pub session_ref: String,
    pub message_count: i64,
    pub created_at: Timestamp,
    pub last_active_at: Timestamp,
}

/// A row from `chat_messages`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChatMessage {
    pub id: DbId,
    pub session_id: DbId,
    pub role: String,
    pub content: String,
    pub emotion: Option<String>,
    pub created_at: Timestamp,
}
