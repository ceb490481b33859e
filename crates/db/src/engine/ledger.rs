//! Ledger operations against persisted balances.
//!
//! The pool-level [`debit`] and [`credit`] each run in their own
//! transaction. The `*_locked` variants are building blocks for engine
//! operations that already hold the account row lock.

use sqlx::PgPool;
use tama_core::error::CoreError;
use tama_core::ledger::{self, InsufficientFunds};
use tama_core::types::{DbId, Ntg};

use super::retry::with_retry;
use super::EngineResult;
use crate::models::account::Account;
use crate::repositories::AccountRepo;

fn account_not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Account",
        id,
    }
}

/// Debit within a transaction that has locked `account`.
pub(crate) async fn debit_locked(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    account: &Account,
    amount: Ntg,
) -> EngineResult<Ntg> {
    ledger::debit(account.balance_ntg, amount)?;
    let new_balance = AccountRepo::debit(tx, account.id, amount)
        .await?
        .ok_or(InsufficientFunds {
            required: amount,
            available: account.balance_ntg,
        })?;
    Ok(new_balance)
}

/// Credit within an open transaction.
pub(crate) async fn credit_locked(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    account_id: DbId,
    amount: Ntg,
) -> EngineResult<Ntg> {
    ledger::validate_amount(amount)?;
    let new_balance = AccountRepo::credit(tx, account_id, amount)
        .await?
        .ok_or_else(|| account_not_found(account_id))?;
    Ok(new_balance)
}

/// Atomically remove `amount` from the account balance.
///
/// Fails with `InsufficientFunds` and leaves the balance unchanged when it
/// does not cover `amount`.
pub async fn debit(pool: &PgPool, account_id: DbId, amount: Ntg) -> EngineResult<Ntg> {
    ledger::validate_amount(amount)?;
    with_retry("ledger_debit", || debit_once(pool, account_id, amount)).await
}

async fn debit_once(pool: &PgPool, account_id: DbId, amount: Ntg) -> EngineResult<Ntg> {
    let mut tx = pool.begin().await?;
    let account = AccountRepo::lock(&mut tx, account_id)
        .await?
        .ok_or_else(|| account_not_found(account_id))?;
    let new_balance = debit_locked(&mut tx, &account, amount).await?;
    tx.commit().await?;
    Ok(new_balance)
}

/// Atomically add `amount` to the account balance.
pub async fn credit(pool: &PgPool, account_id: DbId, amount: Ntg) -> EngineResult<Ntg> {
    with_retry("ledger_credit", || credit_once(pool, account_id, amount)).await
}

async fn credit_once(pool: &PgPool, account_id: DbId, amount: Ntg) -> EngineResult<Ntg> {
    let mut tx = pool.begin().await?;
    let new_balance = credit_locked(&mut tx, account_id, amount).await?;
    tx.commit().await?;
    Ok(new_balance)
}

/// Current balance.
pub async fn balance(pool: &PgPool, account_id: DbId) -> EngineResult<Ntg> {
    let account = AccountRepo::find_by_id(pool, account_id)
        .await?
        .ok_or_else(|| account_not_found(account_id))?;
    Ok(account.balance_ntg)
}
