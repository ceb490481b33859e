//! Companion creation: slot cap, free generation, paid generation, rollback.

use assert_matches::assert_matches;
use sqlx::PgPool;
use tama_core::quota::{QuotaDecision, QuotaError};
use tama_db::engine::companion::{create_companion, precheck, quota_status};
use tama_db::engine::EngineError;
use tama_db::models::account::{Account, CreateAccount};
use tama_db::models::companion::CreateCompanion;
use tama_db::repositories::{AccountRepo, CompanionRepo};

async fn new_account(pool: &PgPool) -> Account {
    AccountRepo::create(
        pool,
        &CreateAccount {
            username: "creator".to_string(),
            email: "creator@example.com".to_string(),
            password_hash: "hash".to_string(),
        },
    )
    .await
    .unwrap()
}

fn companion_input(account_id: i64, name: &str, style: &str) -> CreateCompanion {
    CreateCompanion {
        account_id,
        name: name.to_string(),
        style: style.to_string(),
        avatar_url: Some("https://example.com/a.png".to_string()),
        agent_ref: None,
        scene_ref: None,
    }
}

async fn reload(pool: &PgPool, id: i64) -> Account {
    AccountRepo::find_by_id(pool, id).await.unwrap().unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_first_creation_is_free(pool: PgPool) {
    let account = new_account(&pool).await;

    let outcome = create_companion(&pool, &companion_input(account.id, "Mochi", "anime"))
        .await
        .unwrap();

    assert_eq!(outcome.decision, QuotaDecision::UsedFree);
    assert_eq!(outcome.balance, 100);
    assert_eq!(
        (outcome.companion.energy, outcome.companion.mood, outcome.companion.bond),
        (100, 100, 0)
    );
    let stored = reload(&pool, account.id).await;
    assert!(stored.free_generation_used);
    assert_eq!(stored.balance_ntg, 100);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_second_creation_is_paid_then_denied(pool: PgPool) {
    let account = new_account(&pool).await;
    create_companion(&pool, &companion_input(account.id, "One", "anime"))
        .await
        .unwrap();

    let paid = create_companion(&pool, &companion_input(account.id, "Two", "fantasy"))
        .await
        .unwrap();
    assert_eq!(paid.decision, QuotaDecision::UsedPaid);
    assert_eq!(paid.balance, 0);

    let denied = create_companion(&pool, &companion_input(account.id, "Three", "cyberpunk")).await;
    assert_matches!(
        denied,
        Err(EngineError::Quota(QuotaError::Denied {
            required: 100,
            available: 0
        }))
    );
    assert_eq!(CompanionRepo::count_by_account(&pool, account.id).await.unwrap(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_slot_limit_touches_nothing(pool: PgPool) {
    let account = new_account(&pool).await;
    sqlx::query("UPDATE accounts SET balance_ntg = 1000 WHERE id = $1")
        .bind(account.id)
        .execute(&pool)
        .await
        .unwrap();
    for name in ["A1", "A2", "A3"] {
        create_companion(&pool, &companion_input(account.id, name, "anime"))
            .await
            .unwrap();
    }
    let before = reload(&pool, account.id).await;
    assert_eq!(before.balance_ntg, 800);

    let result = create_companion(&pool, &companion_input(account.id, "A4", "anime")).await;

    assert_matches!(
        result,
        Err(EngineError::Quota(QuotaError::SlotLimit { max_companions: 3 }))
    );
    assert_eq!(reload(&pool, account.id).await.balance_ntg, 800);
}

/// A failing insert rolls back quota consumption.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_failed_insert_restores_free_generation(pool: PgPool) {
    let account = new_account(&pool).await;

    let result = create_companion(&pool, &companion_input(account.id, "Bad", "steampunk")).await;

    assert_matches!(result, Err(EngineError::Database(_)));
    let stored = reload(&pool, account.id).await;
    assert!(!stored.free_generation_used);
    assert_eq!(stored.balance_ntg, 100);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_quota_status_and_precheck(pool: PgPool) {
    let account = new_account(&pool).await;

    let status = quota_status(&pool, account.id).await.unwrap();
    assert!(status.has_free_generation);
    assert!(status.can_generate);
    assert!(status.slot_available);
    assert_eq!(status.companion_count, 0);
    precheck(&pool, account.id).await.unwrap();

    create_companion(&pool, &companion_input(account.id, "One", "anime"))
        .await
        .unwrap();
    sqlx::query("UPDATE accounts SET balance_ntg = 20 WHERE id = $1")
        .bind(account.id)
        .execute(&pool)
        .await
        .unwrap();

    let status = quota_status(&pool, account.id).await.unwrap();
    assert!(!status.has_free_generation);
    assert!(!status.can_generate);
    assert_matches!(
        precheck(&pool, account.id).await,
        Err(EngineError::Quota(QuotaError::Denied { .. }))
    );
}
