//! Handlers for the `/missions` resource.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tama_core::cooldown::minutes_remaining;
use tama_core::mission::COMPLETION_HISTORY_LIMIT;
use tama_core::params::{CompanionParams, ParamEffect};
use tama_core::status::CompanionStatus;
use tama_core::types::{DbId, Ntg, Timestamp};
use tama_db::engine::mission as engine;
use tama_db::models::mission::{CompletionWithMission, Mission};
use tama_db::repositories::{CompletionRepo, MissionRepo};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// A catalog entry with the effect its type applies.
#[derive(Debug, Serialize)]
pub struct MissionView {
    #[serde(flatten)]
    pub mission: Mission,
    pub effect: ParamEffect,
}

#[derive(Debug, Deserialize)]
pub struct ExecuteMissionRequest {
    pub companion_id: DbId,
}

#[derive(Debug, Serialize)]
pub struct ExecuteMissionResponse {
    pub success: bool,
    pub mission_id: DbId,
    pub companion_id: DbId,
    pub new_balance: Ntg,
    pub updated_params: CompanionParams,
    pub effect: ParamEffect,
    pub status: CompanionStatus,
    pub completed_at: Timestamp,
}

#[derive(Debug, Serialize)]
pub struct CooldownResponse {
    pub eligible: bool,
    pub seconds_remaining: i64,
    pub seconds_remaining_minutes: i64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/missions
///
/// Active catalog, cheapest first.
pub async fn list(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<MissionView>>>> {
    let missions = MissionRepo::list_active(&state.pool).await?;
    let data = missions
        .into_iter()
        .map(|mission| {
            let effect = mission.spec()?.mission_type.effect();
            Ok(MissionView { mission, effect })
        })
        .collect::<AppResult<Vec<_>>>()?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/missions/completed
pub async fn completed(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<CompletionWithMission>>>> {
    let completions =
        CompletionRepo::list_recent_for_account(&state.pool, auth.account_id, COMPLETION_HISTORY_LIMIT)
            .await?;
    Ok(Json(DataResponse { data: completions }))
}

/// POST /api/v1/missions/{mission_id}/execute
pub async fn execute(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(mission_id): Path<DbId>,
    Json(input): Json<ExecuteMissionRequest>,
) -> AppResult<Json<DataResponse<ExecuteMissionResponse>>> {
    let outcome = engine::execute_mission(
        &state.pool,
        auth.account_id,
        input.companion_id,
        mission_id,
        Utc::now(),
    )
    .await?;

    Ok(Json(DataResponse {
        data: ExecuteMissionResponse {
            success: true,
            mission_id: outcome.mission_id,
            companion_id: outcome.companion_id,
            new_balance: outcome.new_balance,
            updated_params: outcome.params,
            effect: outcome.effect,
            status: outcome.status,
            completed_at: outcome.completion.completed_at,
        },
    }))
}

/// GET /api/v1/missions/{mission_id}/cooldown/{companion_id}
pub async fn cooldown(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((mission_id, companion_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<CooldownResponse>>> {
    let cooldown = engine::check_cooldown(
        &state.pool,
        auth.account_id,
        companion_id,
        mission_id,
        Utc::now(),
    )
    .await?;

    Ok(Json(DataResponse {
        data: CooldownResponse {
            eligible: cooldown.eligible,
            seconds_remaining: cooldown.seconds_remaining,
            seconds_remaining_minutes: minutes_remaining(cooldown.seconds_remaining),
        },
    }))
}
