//! Payment settlement: the only path by which purchased NTG reaches a
//! balance.

use sqlx::PgPool;
use tama_core::error::CoreError;
use tama_core::payment::{PaymentStatus, Transition, WebhookOutcome};
use tama_core::types::{DbId, Ntg};

use super::ledger::credit_locked;
use super::retry::with_retry;
use super::EngineResult;
use crate::models::payment::Payment;
use crate::repositories::PaymentRepo;

/// What a settlement attempt did.
#[derive(Debug, Clone)]
pub enum Settlement {
    /// Status written; `credited` is the new balance when NTG was granted.
    Applied {
        payment: Payment,
        credited: Option<Ntg>,
    },
    /// Already terminal. Nothing was written.
    Unchanged(Payment),
    /// No payment carries the reference.
    Unknown,
}

/// Apply a verified webhook outcome to the payment behind `checkout_ref`.
///
/// Idempotent: only a `pending` payment moves, so a redelivered success
/// credits exactly once.
pub async fn settle_by_checkout_ref(
    pool: &PgPool,
    checkout_ref: &str,
    outcome: WebhookOutcome,
) -> EngineResult<Settlement> {
    with_retry("settle_payment", || settle_once(pool, checkout_ref, outcome)).await
}

async fn settle_once(
    pool: &PgPool,
    checkout_ref: &str,
    outcome: WebhookOutcome,
) -> EngineResult<Settlement> {
    let mut tx = pool.begin().await?;
    let Some(payment) = PaymentRepo::lock_by_checkout_ref(&mut tx, checkout_ref).await? else {
        tracing::warn!(checkout_ref, "Webhook for unknown checkout reference");
        return Ok(Settlement::Unknown);
    };
    let settlement = apply(&mut tx, payment, outcome.target_status()).await?;
    tx.commit().await?;
    Ok(settlement)
}

/// Move a pending payment to `failed`, e.g. when checkout creation fails.
pub async fn mark_failed(pool: &PgPool, payment_id: DbId) -> EngineResult<Settlement> {
    with_retry("mark_payment_failed", || mark_failed_once(pool, payment_id)).await
}

async fn mark_failed_once(pool: &PgPool, payment_id: DbId) -> EngineResult<Settlement> {
    let mut tx = pool.begin().await?;
    let payment = PaymentRepo::lock_by_id(&mut tx, payment_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Payment",
            id: payment_id,
        })?;
    let settlement = apply(&mut tx, payment, PaymentStatus::Failed).await?;
    tx.commit().await?;
    Ok(settlement)
}

async fn apply(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    payment: Payment,
    target: PaymentStatus,
) -> EngineResult<Settlement> {
    let current = payment.status()?;
    match current.transition(target) {
        Ok(Transition::Apply) => {
            let updated = PaymentRepo::set_status(tx, payment.id, target).await?;
            let credited = if target == PaymentStatus::Completed {
                Some(credit_locked(tx, payment.account_id, payment.amount_ntg).await?)
            } else {
                None
            };
            tracing::info!(
                payment_id = payment.id,
                account_id = payment.account_id,
                status = target.as_str(),
                amount_ntg = payment.amount_ntg,
                "Payment settled",
            );
            Ok(Settlement::Applied {
                payment: updated,
                credited,
            })
        }
        Ok(Transition::NoOp) => Ok(Settlement::Unchanged(payment)),
        Err(err) => {
            tracing::warn!(payment_id = payment.id, error = %err, "Ignoring payment transition");
            Ok(Settlement::Unchanged(payment))
        }
    }
}
