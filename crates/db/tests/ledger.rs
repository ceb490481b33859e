//! Ledger operations against persisted balances.

use assert_matches::assert_matches;
use sqlx::PgPool;
use tama_core::error::CoreError;
use tama_core::ledger::{InsufficientFunds, INITIAL_BALANCE};
use tama_db::engine::{ledger, EngineError};
use tama_db::models::account::CreateAccount;
use tama_db::repositories::AccountRepo;

async fn new_account(pool: &PgPool, name: &str) -> i64 {
    AccountRepo::create(
        pool,
        &CreateAccount {
            username: name.to_string(),
            email: format!("{name}@example.com"),
            password_hash: "hash".to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_new_account_starts_with_initial_balance(pool: PgPool) {
    let id = new_account(&pool, "alice").await;
    assert_eq!(ledger::balance(&pool, id).await.unwrap(), INITIAL_BALANCE);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_debit_and_credit(pool: PgPool) {
    let id = new_account(&pool, "alice").await;

    assert_eq!(ledger::debit(&pool, id, 30).await.unwrap(), 70);
    assert_eq!(ledger::credit(&pool, id, 500).await.unwrap(), 570);
    assert_eq!(ledger::debit(&pool, id, 570).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_insufficient_debit_leaves_balance(pool: PgPool) {
    let id = new_account(&pool, "alice").await;

    let result = ledger::debit(&pool, id, 101).await;
    assert_matches!(
        result,
        Err(EngineError::InsufficientFunds(InsufficientFunds {
            required: 101,
            available: 100
        }))
    );
    assert_eq!(ledger::balance(&pool, id).await.unwrap(), 100);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_negative_amounts_rejected(pool: PgPool) {
    let id = new_account(&pool, "alice").await;

    assert_matches!(
        ledger::debit(&pool, id, -5).await,
        Err(EngineError::Core(CoreError::Validation(_)))
    );
    assert_matches!(
        ledger::credit(&pool, id, -5).await,
        Err(EngineError::Core(CoreError::Validation(_)))
    );
    assert_eq!(ledger::balance(&pool, id).await.unwrap(), 100);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_account(pool: PgPool) {
    assert_matches!(
        ledger::credit(&pool, 999_999, 10).await,
        Err(EngineError::Core(CoreError::NotFound { entity: "Account", .. }))
    );
}

/// Concurrent debits never drive the balance below zero.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_debits_stay_non_negative(pool: PgPool) {
    let id = new_account(&pool, "alice").await;

    let attempts = (0..5).map(|_| ledger::debit(&pool, id, 30));
    let results = futures::future::join_all(attempts).await;

    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(succeeded, 3);
    assert_eq!(ledger::balance(&pool, id).await.unwrap(), 10);
}
