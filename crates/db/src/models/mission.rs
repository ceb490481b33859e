//! Mission catalog and completion history models.

use serde::Serialize;
use sqlx::FromRow;
use tama_core::error::CoreError;
use tama_core::mission::{MissionSpec, MissionType};
use tama_core::types::{DbId, Ntg, Timestamp};

/// A catalog row from the `missions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Mission {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub mission_type: String,
    pub cost_ntg: Ntg,
    pub cooldown_seconds: i64,
    pub is_active: bool,
    pub created_at: Timestamp,
}

impl Mission {
    /// The subset of the row the execution planner consumes.
    pub fn spec(&self) -> Result<MissionSpec, CoreError> {
        Ok(MissionSpec {
            mission_type: self.mission_type.parse::<MissionType>()?,
            cost_ntg: self.cost_ntg,
            cooldown_seconds: self.cooldown_seconds,
        })
    }
}

/// A row from `mission_completions`. Append-only.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MissionCompletion {
    pub id: DbId,
    pub account_id: DbId,
    pub companion_id: DbId,
    pub mission_id: DbId,
    pub cost_ntg: Ntg,
    pub completed_at: Timestamp,
}

/// Completion joined with mission and companion names for history listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CompletionWithMission {
    pub id: DbId,
    pub mission_id: DbId,
    pub mission_name: String,
    pub mission_type: String,
    pub companion_id: DbId,
    pub companion_name: String,
    pub cost_ntg: Ntg,
    pub completed_at: Timestamp,
}
