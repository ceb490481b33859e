//! Repository for the `companions` table.

use sqlx::PgPool;
use tama_core::params::CompanionParams;
use tama_core::types::DbId;

use crate::models::companion::{Companion, CreateCompanion, UpdateCompanion};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, account_id, name, style, avatar_url, agent_ref, scene_ref, \
                       energy, mood, bond, created_at, updated_at";

/// Provides CRUD operations for companions plus parameter writes.
///
/// Every lookup that serves a user request is scoped by `account_id` so a
/// companion owned by someone else reads as missing.
pub struct CompanionRepo;

impl CompanionRepo {
    /// Insert a companion with initial parameters (column defaults).
    pub async fn insert(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        input: &CreateCompanion,
    ) -> Result<Companion, sqlx::Error> {
        let query = format!(
            "INSERT INTO companions (account_id, name, style, avatar_url, agent_ref, scene_ref)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Companion>(&query)
            .bind(input.account_id)
            .bind(&input.name)
            .bind(&input.style)
            .bind(&input.avatar_url)
            .bind(&input.agent_ref)
            .bind(&input.scene_ref)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find a companion owned by `account_id`.
    pub async fn find_owned(
        pool: &PgPool,
        id: DbId,
        account_id: DbId,
    ) -> Result<Option<Companion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM companions WHERE id = $1 AND account_id = $2");
        sqlx::query_as::<_, Companion>(&query)
            .bind(id)
            .bind(account_id)
            .fetch_optional(pool)
            .await
    }

    /// Lock a companion owned by `account_id` for the rest of the transaction.
    pub async fn lock_owned(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        account_id: DbId,
    ) -> Result<Option<Companion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM companions WHERE id = $1 AND account_id = $2 FOR UPDATE"
        );
        sqlx::query_as::<_, Companion>(&query)
            .bind(id)
            .bind(account_id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// List an account's companions, newest first.
    pub async fn list_by_account(
        pool: &PgPool,
        account_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Companion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM companions
             WHERE account_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Companion>(&query)
            .bind(account_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count an account's live companions.
    pub async fn count_by_account<'e, E>(executor: E, account_id: DbId) -> Result<i64, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM companions WHERE account_id = $1")
            .bind(account_id)
            .fetch_one(executor)
            .await?;
        Ok(count)
    }

    /// Persist new parameter values. The caller has already clamped them.
    pub async fn update_params(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        params: &CompanionParams,
    ) -> Result<Companion, sqlx::Error> {
        let query = format!(
            "UPDATE companions SET energy = $2, mood = $3, bond = $4
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Companion>(&query)
            .bind(id)
            .bind(params.energy)
            .bind(params.mood)
            .bind(params.bond)
            .fetch_one(&mut **tx)
            .await
    }

    /// Update name and/or avatar. Only non-`None` fields are applied.
    ///
    /// Returns `None` if no companion with the given `id` belongs to `account_id`.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        account_id: DbId,
        input: &UpdateCompanion,
    ) -> Result<Option<Companion>, sqlx::Error> {
        let query = format!(
            "UPDATE companions SET
                name = COALESCE($3, name),
                avatar_url = COALESCE($4, avatar_url)
             WHERE id = $1 AND account_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Companion>(&query)
            .bind(id)
            .bind(account_id)
            .bind(&input.name)
            .bind(&input.avatar_url)
            .fetch_optional(pool)
            .await
    }

    /// Delete a companion. History and chat rows cascade.
    pub async fn delete(pool: &PgPool, id: DbId, account_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM companions WHERE id = $1 AND account_id = $2")
            .bind(id)
            .bind(account_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
