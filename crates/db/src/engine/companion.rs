//! Companion creation under the slot cap and generation quota.

use sqlx::PgPool;
use tama_core::error::CoreError;
use tama_core::quota::{self, QuotaDecision, QuotaError, QuotaStatus, GENERATION_COST_NTG};
use tama_core::types::{DbId, Ntg};

use super::ledger::debit_locked;
use super::retry::with_retry;
use super::EngineResult;
use crate::models::companion::{Companion, CreateCompanion};
use crate::repositories::{AccountRepo, CompanionRepo};

/// Result of a successful creation.
#[derive(Debug, Clone)]
pub struct CreationOutcome {
    pub companion: Companion,
    pub decision: QuotaDecision,
    /// Balance after any generation charge.
    pub balance: Ntg,
}

fn account_not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Account",
        id,
    }
}

/// Read-only quota view for the account.
pub async fn quota_status(pool: &PgPool, account_id: DbId) -> EngineResult<QuotaStatus> {
    let account = AccountRepo::find_by_id(pool, account_id)
        .await?
        .ok_or_else(|| account_not_found(account_id))?;
    let count = CompanionRepo::count_by_account(pool, account_id).await?;
    Ok(quota::quota_status(account.quota(), count))
}

/// Fail fast before doing expensive provider work.
///
/// Advisory only: [`create_companion`] re-checks everything under lock.
pub async fn precheck(pool: &PgPool, account_id: DbId) -> EngineResult<()> {
    let status = quota_status(pool, account_id).await?;
    if !status.slot_available {
        return Err(QuotaError::SlotLimit {
            max_companions: status.max_companions,
        }
        .into());
    }
    if !status.can_generate {
        return Err(QuotaError::Denied {
            required: GENERATION_COST_NTG,
            available: status.current_balance,
        }
        .into());
    }
    Ok(())
}

/// Insert a companion, spending the free generation or debiting its cost.
///
/// The slot check, quota consumption, and insert share one transaction: a
/// failure at any step leaves the free-generation flag and balance as they
/// were.
pub async fn create_companion(
    pool: &PgPool,
    input: &CreateCompanion,
) -> EngineResult<CreationOutcome> {
    with_retry("create_companion", || create_once(pool, input)).await
}

async fn create_once(pool: &PgPool, input: &CreateCompanion) -> EngineResult<CreationOutcome> {
    let account_id = input.account_id;
    let mut tx = pool.begin().await?;

    let account = AccountRepo::lock(&mut tx, account_id)
        .await?
        .ok_or_else(|| account_not_found(account_id))?;

    let count = CompanionRepo::count_by_account(&mut *tx, account_id).await?;
    quota::check_slot(count)?;

    let mut account_quota = account.quota();
    let decision = account_quota.consume();
    let balance = match decision {
        QuotaDecision::UsedFree => {
            AccountRepo::mark_free_generation_used(&mut tx, account_id).await?;
            account.balance_ntg
        }
        QuotaDecision::UsedPaid => debit_locked(&mut tx, &account, GENERATION_COST_NTG).await?,
        QuotaDecision::Denied => {
            return Err(QuotaError::Denied {
                required: GENERATION_COST_NTG,
                available: account.balance_ntg,
            }
            .into());
        }
    };

    let companion = CompanionRepo::insert(&mut tx, input).await?;
    tx.commit().await?;

    tracing::info!(
        account_id,
        companion_id = companion.id,
        generation = decision.label(),
        balance,
        "Companion created",
    );

    Ok(CreationOutcome {
        companion,
        decision,
        balance,
    })
}
