//! Companion entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tama_core::params::CompanionParams;
use tama_core::status::{classify, CompanionStatus};
use tama_core::types::{DbId, Timestamp};

/// A companion row from the `companions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Companion {
    pub id: DbId,
    pub account_id: DbId,
    pub name: String,
    pub style: String,
    pub avatar_url: Option<String>,
    pub agent_ref: Option<String>,
    pub scene_ref: Option<String>,
    pub energy: i32,
    pub mood: i32,
    pub bond: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Companion {
    pub fn params(&self) -> CompanionParams {
        CompanionParams {
            energy: self.energy,
            mood: self.mood,
            bond: self.bond,
        }
    }

    /// Derived on every call; never persisted.
    pub fn status(&self) -> CompanionStatus {
        classify(self.energy, self.mood)
    }
}

/// Companion plus its derived status, as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct CompanionView {
    #[serde(flatten)]
    pub companion: Companion,
    pub status: CompanionStatus,
}

impl From<Companion> for CompanionView {
    fn from(companion: Companion) -> Self {
        let status = companion.status();
        Self { companion, status }
    }
}

/// DTO for inserting a companion. Parameters take their initial values.
#[derive(Debug, Clone)]
pub struct CreateCompanion {
    pub account_id: DbId,
    pub name: String,
    pub style: String,
    pub avatar_url: Option<String>,
    pub agent_ref: Option<String>,
    pub scene_ref: Option<String>,
}

/// DTO for updating a companion. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCompanion {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}
