//! Repository for the `missions` catalog.

use sqlx::PgPool;
use tama_core::types::DbId;

use crate::models::mission::Mission;

const COLUMNS: &str =
    "id, name, description, mission_type, cost_ntg, cooldown_seconds, is_active, created_at";

/// Read-only access to the seeded mission catalog.
pub struct MissionRepo;

impl MissionRepo {
    /// All active missions, cheapest first.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Mission>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM missions WHERE is_active = TRUE ORDER BY cost_ntg ASC, id ASC"
        );
        sqlx::query_as::<_, Mission>(&query).fetch_all(pool).await
    }

    /// Find an active mission. Inactive missions read as missing.
    pub async fn find_active<'e, E>(executor: E, id: DbId) -> Result<Option<Mission>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM missions WHERE id = $1 AND is_active = TRUE");
        sqlx::query_as::<_, Mission>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a mission by its catalog name, active or not.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Mission>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM missions WHERE name = $1");
        sqlx::query_as::<_, Mission>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }
}
