//! Chat turn persistence: message counting, parameter effects, history.

use assert_matches::assert_matches;
use sqlx::PgPool;
use tama_core::chat::{Emotion, Sentiment};
use tama_core::error::CoreError;
use tama_db::engine::chat::{begin_turn, complete_turn};
use tama_db::engine::EngineError;
use tama_db::models::account::CreateAccount;
use tama_db::models::chat::{ROLE_ASSISTANT, ROLE_USER};
use tama_db::models::companion::{Companion, CreateCompanion};
use tama_db::repositories::{AccountRepo, ChatRepo, CompanionRepo};

async fn setup(pool: &PgPool) -> Companion {
    let account = AccountRepo::create(
        pool,
        &CreateAccount {
            username: "talker".to_string(),
            email: "talker@example.com".to_string(),
            password_hash: "hash".to_string(),
        },
    )
    .await
    .unwrap();
    let mut tx = pool.begin().await.unwrap();
    let companion = CompanionRepo::insert(
        &mut tx,
        &CreateCompanion {
            account_id: account.id,
            name: "Mochi".to_string(),
            style: "anime".to_string(),
            avatar_url: None,
            agent_ref: None,
            scene_ref: None,
        },
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();
    sqlx::query("UPDATE companions SET mood = 50 WHERE id = $1")
        .bind(companion.id)
        .execute(pool)
        .await
        .unwrap();
    companion
}

async fn turn(pool: &PgPool, companion: &Companion, message: &str, sentiment: Sentiment) -> i64 {
    let start = begin_turn(pool, companion.account_id, companion.id, "sess_new", message)
        .await
        .unwrap();
    complete_turn(
        pool,
        companion.account_id,
        &start.session,
        sentiment,
        "reply",
        Emotion::Happy,
    )
    .await
    .unwrap()
    .message_count
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_turn_applies_effect_and_stores_both_messages(pool: PgPool) {
    let companion = setup(&pool).await;

    let start = begin_turn(&pool, companion.account_id, companion.id, "sess_1", "I love you")
        .await
        .unwrap();
    let result = complete_turn(
        &pool,
        companion.account_id,
        &start.session,
        Sentiment::Positive,
        "Aww!",
        Emotion::Happy,
    )
    .await
    .unwrap();

    assert_eq!(result.message_count, 1);
    assert_eq!((result.companion.energy, result.companion.mood), (99, 52));
    assert_eq!(result.reply.emotion.as_deref(), Some("happy"));

    let history = ChatRepo::recent_messages(&pool, start.session.id, 50)
        .await
        .unwrap();
    let roles: Vec<&str> = history.iter().map(|m| m.role.as_str()).collect();
    assert_eq!(roles, [ROLE_USER, ROLE_ASSISTANT]);
    assert_eq!(history[0].content, "I love you");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_session_is_reused_and_bond_grows_every_tenth(pool: PgPool) {
    let companion = setup(&pool).await;

    let mut last = 0;
    for i in 0..10 {
        last = turn(&pool, &companion, &format!("message {i}"), Sentiment::Neutral).await;
    }
    assert_eq!(last, 10);

    let stored = CompanionRepo::find_owned(&pool, companion.id, companion.account_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!((stored.energy, stored.bond), (90, 1));

    let session = ChatRepo::find_session(&pool, companion.account_id, companion.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.session_ref, "sess_new");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_foreign_companion_rejected(pool: PgPool) {
    let companion = setup(&pool).await;

    let result = begin_turn(&pool, companion.account_id + 1000, companion.id, "s", "hi").await;

    assert_matches!(
        result,
        Err(EngineError::Core(CoreError::NotFound { entity: "Companion", .. }))
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_history_window_and_idle_cleanup(pool: PgPool) {
    let companion = setup(&pool).await;
    for i in 0..3 {
        turn(&pool, &companion, &format!("m{i}"), Sentiment::Neutral).await;
    }
    let session = ChatRepo::find_session(&pool, companion.account_id, companion.id)
        .await
        .unwrap()
        .unwrap();

    let window = ChatRepo::recent_messages(&pool, session.id, 2).await.unwrap();
    assert_eq!(window.len(), 2);
    assert_eq!(window[0].content, "m2");
    assert_eq!(window[1].role, ROLE_ASSISTANT);

    let removed = ChatRepo::delete_idle_before(&pool, chrono::Utc::now() + chrono::Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(removed, 1);
    assert!(ChatRepo::find_session(&pool, companion.account_id, companion.id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_turn_survives_history_cleared_mid_reply(pool: PgPool) {
    let companion = setup(&pool).await;

    let start = begin_turn(&pool, companion.account_id, companion.id, "sess_1", "hello")
        .await
        .unwrap();
    let deleted = ChatRepo::delete_session(&pool, companion.account_id, companion.id)
        .await
        .unwrap();
    assert!(deleted);

    let result = complete_turn(
        &pool,
        companion.account_id,
        &start.session,
        Sentiment::Positive,
        "Hi!",
        Emotion::Happy,
    )
    .await
    .unwrap();

    assert_eq!(result.message_count, 1);
    assert_eq!((result.companion.energy, result.companion.mood), (99, 52));

    let session = ChatRepo::find_session(&pool, companion.account_id, companion.id)
        .await
        .unwrap()
        .unwrap();
    assert_ne!(session.id, start.session.id);
    assert_eq!(session.session_ref, "sess_1");
    assert_eq!(result.reply.session_id, session.id);

    let history = ChatRepo::recent_messages(&pool, session.id, 50).await.unwrap();
    let roles: Vec<&str> = history.iter().map(|m| m.role.as_str()).collect();
    assert_eq!(roles, [ROLE_ASSISTANT]);
}
