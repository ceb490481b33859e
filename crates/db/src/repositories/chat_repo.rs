//! Repository for `chat_sessions` and `chat_messages`.

use sqlx::PgPool;
use tama_core::types::{DbId, Timestamp};

use crate::models::chat::{ChatMessage, ChatSession};

const SESSION_COLUMNS: &str =
    "id, account_id, companion_id, session_ref, message_count, created_at, last_active_at";

const MESSAGE_COLUMNS: &str = "id, session_id, role, content, emotion, created_at";

pub struct ChatRepo;

impl ChatRepo {
    /// Return the session for (account, companion), creating it on first use.
    ///
    /// `session_ref` is only used when the row is created.
    pub async fn get_or_create_session<'e, E>(
        executor: E,
        account_id: DbId,
        companion_id: DbId,
        session_ref: &str,
    ) -> Result<ChatSession, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO chat_sessions (account_id, companion_id, session_ref)
             VALUES ($1, $2, $3)
             ON CONFLICT (account_id, companion_id)
             DO UPDATE SET last_active_at = NOW()
             RETURNING {SESSION_COLUMNS}"
        );
        sqlx::query_as::<_, ChatSession>(&query)
            .bind(account_id)
            .bind(companion_id)
            .bind(session_ref)
            .fetch_one(executor)
            .await
    }

    pub async fn find_session(
        pool: &PgPool,
        account_id: DbId,
        companion_id: DbId,
    ) -> Result<Option<ChatSession>, sqlx::Error> {
        let query = format!(
            "SELECT {SESSION_COLUMNS} FROM chat_sessions WHERE account_id = $1 AND companion_id = $2"
        );
        sqlx::query_as::<_, ChatSession>(&query)
            .bind(account_id)
            .bind(companion_id)
            .fetch_optional(pool)
            .await
    }

    /// Bump the user-message counter and activity time. Returns the new
    /// count, or `None` if the session no longer exists.
    pub async fn increment_message_count(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        session_id: DbId,
    ) -> Result<Option<i64>, sqlx::Error> {
        let row: Option<(i64,)> = sqlx::query_as(
            "UPDATE chat_sessions
             SET message_count = message_count + 1, last_active_at = NOW()
             WHERE id = $1
             RETURNING message_count",
        )
        .bind(session_id)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(row.map(|(count,)| count))
    }

    pub async fn insert_message<'e, E>(
        executor: E,
        session_id: DbId,
        role: &str,
        content: &str,
        emotion: Option<&str>,
    ) -> Result<ChatMessage, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO chat_messages (session_id, role, content, emotion)
             VALUES ($1, $2, $3, $4)
             RETURNING {MESSAGE_COLUMNS}"
        );
        sqlx::query_as::<_, ChatMessage>(&query)
            .bind(session_id)
            .bind(role)
            .bind(content)
            .bind(emotion)
            .fetch_one(executor)
            .await
    }

    /// The newest `limit` messages of a session, returned oldest first.
    pub async fn recent_messages(
        pool: &PgPool,
        session_id: DbId,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, sqlx::Error> {
        let query = format!(
            "SELECT {MESSAGE_COLUMNS} FROM (
                SELECT {MESSAGE_COLUMNS} FROM chat_messages
                WHERE session_id = $1
                ORDER BY id DESC
                LIMIT $2
             ) recent
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, ChatMessage>(&query)
            .bind(session_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Delete the session for (account, companion); messages cascade.
    pub async fn delete_session(
        pool: &PgPool,
        account_id: DbId,
        companion_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM chat_sessions WHERE account_id = $1 AND companion_id = $2")
                .bind(account_id)
                .bind(companion_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete sessions idle since before `cutoff`. Returns the number removed.
    pub async fn delete_idle_before(pool: &PgPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM chat_sessions WHERE last_active_at < $1")
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
