//! Repository for the append-only `mission_completions` table.

use sqlx::PgPool;
use tama_core::types::{DbId, Ntg, Timestamp};

use crate::models::mission::{CompletionWithMission, MissionCompletion};

const COLUMNS: &str = "id, account_id, companion_id, mission_id, cost_ntg, completed_at";

pub struct CompletionRepo;

impl CompletionRepo {
    /// Timestamp of the most recent completion for the triple, if any.
    ///
    /// Rows sharing the same timestamp are interchangeable here.
    pub async fn latest_for_triple<'e, E>(
        executor: E,
        account_id: DbId,
        companion_id: DbId,
        mission_id: DbId,
    ) -> Result<Option<Timestamp>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let row: Option<(Timestamp,)> = sqlx::query_as(
            "SELECT completed_at FROM mission_completions
             WHERE account_id = $1 AND companion_id = $2 AND mission_id = $3
             ORDER BY completed_at DESC
             LIMIT 1",
        )
        .bind(account_id)
        .bind(companion_id)
        .bind(mission_id)
        .fetch_optional(executor)
        .await?;
        Ok(row.map(|(at,)| at))
    }

    /// Append a completion record.
    pub async fn insert(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        account_id: DbId,
        companion_id: DbId,
        mission_id: DbId,
        cost_ntg: Ntg,
        completed_at: Timestamp,
    ) -> Result<MissionCompletion, sqlx::Error> {
        let query = format!(
            "INSERT INTO mission_completions (account_id, companion_id, mission_id, cost_ntg, completed_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MissionCompletion>(&query)
            .bind(account_id)
            .bind(companion_id)
            .bind(mission_id)
            .bind(cost_ntg)
            .bind(completed_at)
            .fetch_one(&mut **tx)
            .await
    }

    /// Most recent completions across all of an account's companions.
    pub async fn list_recent_for_account(
        pool: &PgPool,
        account_id: DbId,
        limit: i64,
    ) -> Result<Vec<CompletionWithMission>, sqlx::Error> {
        sqlx::query_as::<_, CompletionWithMission>(
            "SELECT mc.id, mc.mission_id, m.name AS mission_name, m.mission_type,
                    mc.companion_id, c.name AS companion_name, mc.cost_ntg, mc.completed_at
             FROM mission_completions mc
             JOIN missions m ON m.id = mc.mission_id
             JOIN companions c ON c.id = mc.companion_id
             WHERE mc.account_id = $1
             ORDER BY mc.completed_at DESC, mc.id DESC
             LIMIT $2",
        )
        .bind(account_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Number of completions recorded for the triple.
    pub async fn count_for_triple(
        pool: &PgPool,
        account_id: DbId,
        companion_id: DbId,
        mission_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM mission_completions
             WHERE account_id = $1 AND companion_id = $2 AND mission_id = $3",
        )
        .bind(account_id)
        .bind(companion_id)
        .bind(mission_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }
}
