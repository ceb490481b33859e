//! Mission execution: cooldown check, debit, effect, and completion record
//! in a single transaction.

use serde::Serialize;
use sqlx::PgPool;
use tama_core::cooldown::{self, CooldownState};
use tama_core::error::CoreError;
use tama_core::mission::{plan_execution, MissionError};
use tama_core::params::{CompanionParams, ParamEffect};
use tama_core::status::CompanionStatus;
use tama_core::types::{DbId, Ntg, Timestamp};

use super::ledger::debit_locked;
use super::retry::with_retry;
use super::EngineResult;
use crate::models::mission::MissionCompletion;
use crate::repositories::{AccountRepo, CompanionRepo, CompletionRepo, MissionRepo};

/// Result of a successful mission execution.
#[derive(Debug, Clone, Serialize)]
pub struct MissionOutcome {
    pub mission_id: DbId,
    pub companion_id: DbId,
    pub new_balance: Ntg,
    pub params: CompanionParams,
    pub effect: ParamEffect,
    pub status: CompanionStatus,
    pub completion: MissionCompletion,
}

/// Execute `mission_id` for `companion_id` on behalf of `account_id`.
///
/// Either every effect is persisted (debit, parameter update, completion
/// record) or none is. Concurrent executions for the same account serialize
/// on the account row lock, so at most one of them passes the cooldown
/// check.
pub async fn execute_mission(
    pool: &PgPool,
    account_id: DbId,
    companion_id: DbId,
    mission_id: DbId,
    now: Timestamp,
) -> EngineResult<MissionOutcome> {
    with_retry("execute_mission", || {
        execute_once(pool, account_id, companion_id, mission_id, now)
    })
    .await
}

async fn execute_once(
    pool: &PgPool,
    account_id: DbId,
    companion_id: DbId,
    mission_id: DbId,
    now: Timestamp,
) -> EngineResult<MissionOutcome> {
    let mut tx = pool.begin().await?;

    let mission = MissionRepo::find_active(&mut *tx, mission_id)
        .await?
        .ok_or(MissionError::MissionNotFound(mission_id))?;
    let spec = mission.spec()?;

    let account = AccountRepo::lock(&mut tx, account_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Account",
            id: account_id,
        })?;
    let companion = CompanionRepo::lock_owned(&mut tx, companion_id, account_id)
        .await?
        .ok_or(MissionError::CompanionNotFound(companion_id))?;

    let last_completed =
        CompletionRepo::latest_for_triple(&mut *tx, account_id, companion_id, mission_id).await?;

    let plan = plan_execution(
        &spec,
        account.balance_ntg,
        companion.params(),
        last_completed,
        now,
    )?;

    let new_balance = debit_locked(&mut tx, &account, spec.cost_ntg).await?;
    let updated = CompanionRepo::update_params(&mut tx, companion_id, &plan.params).await?;
    let completion = CompletionRepo::insert(
        &mut tx,
        account_id,
        companion_id,
        mission_id,
        spec.cost_ntg,
        now,
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        account_id,
        companion_id,
        mission_id,
        mission_type = %spec.mission_type,
        cost_ntg = spec.cost_ntg,
        new_balance,
        "Mission completed",
    );

    Ok(MissionOutcome {
        mission_id,
        companion_id,
        new_balance,
        params: updated.params(),
        effect: plan.effect,
        status: updated.status(),
        completion,
    })
}

/// Cooldown state for the triple, after checking the mission is active and
/// the companion belongs to the account.
pub async fn check_cooldown(
    pool: &PgPool,
    account_id: DbId,
    companion_id: DbId,
    mission_id: DbId,
    now: Timestamp,
) -> EngineResult<CooldownState> {
    let mission = MissionRepo::find_active(pool, mission_id)
        .await?
        .ok_or(MissionError::MissionNotFound(mission_id))?;
    CompanionRepo::find_owned(pool, companion_id, account_id)
        .await?
        .ok_or(MissionError::CompanionNotFound(companion_id))?;

    let last_completed =
        CompletionRepo::latest_for_triple(pool, account_id, companion_id, mission_id).await?;
    Ok(cooldown::evaluate(
        last_completed,
        mission.cooldown_seconds,
        now,
    ))
}
