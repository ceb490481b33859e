//! HTTP-level tests for registration, login and the profile endpoint.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, get_auth, post_json, post_json_auth, register, PASSWORD};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_returns_token_and_starting_balance(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = json!({
        "username": "mika",
        "email": "mika@example.com",
        "password": PASSWORD,
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert_eq!(json["token_type"], "bearer");
    assert_eq!(json["expires_in"], 1800);
    assert_eq!(json["account"]["username"], "mika");
    assert_eq!(json["account"]["balance_ntg"], 100);
    assert_eq!(json["account"]["free_generation_used"], false);
    assert!(json["account"].get("password_hash").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_rejects_duplicates(pool: PgPool) {
    register(common::build_test_app(pool.clone()), "mika").await;

    let same_username = json!({
        "username": "MIKA",
        "email": "other@example.com",
        "password": PASSWORD,
    });
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/auth/register",
        same_username,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let same_email = json!({
        "username": "other",
        "email": "mika@example.com",
        "password": PASSWORD,
    });
    let response =
        post_json(common::build_test_app(pool), "/api/v1/auth/register", same_email).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_validates_input(pool: PgPool) {
    let cases = [
        json!({ "username": "ab", "email": "ab@example.com", "password": PASSWORD }),
        json!({ "username": "valid", "email": "not-an-email", "password": PASSWORD }),
        json!({ "username": "valid", "email": "v@example.com", "password": "short" }),
    ];
    for body in cases {
        let response =
            post_json(common::build_test_app(pool.clone()), "/api/v1/auth/register", body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_success(pool: PgPool) {
    let account = register(common::build_test_app(pool.clone()), "mika").await;

    let body = json!({ "email": "mika@example.com", "password": PASSWORD });
    let response = post_json(common::build_test_app(pool), "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert_eq!(json["account"]["id"], account.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_failures_are_indistinguishable(pool: PgPool) {
    register(common::build_test_app(pool.clone()), "mika").await;

    let wrong_password = json!({ "email": "mika@example.com", "password": "incorrect-password" });
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/auth/login",
        wrong_password,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let first = body_json(response).await;

    let unknown_email = json!({ "email": "ghost@example.com", "password": PASSWORD });
    let response =
        post_json(common::build_test_app(pool), "/api/v1/auth/login", unknown_email).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let second = body_json(response).await;

    assert_eq!(first["error"], second["error"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_me_returns_profile(pool: PgPool) {
    let account = register(common::build_test_app(pool.clone()), "mika").await;

    let response = get_auth(common::build_test_app(pool), "/api/v1/auth/me", &account.token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], account.id);
    assert_eq!(json["data"]["email"], "mika@example.com");
    assert_eq!(json["data"]["balance_ntg"], 100);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_protected_routes_require_token(pool: PgPool) {
    let response = get(common::build_test_app(pool.clone()), "/api/v1/auth/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(
        common::build_test_app(pool),
        "/api/v1/companions",
        "not-a-jwt",
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_refresh_issues_working_token(pool: PgPool) {
    let account = register(common::build_test_app(pool.clone()), "mika").await;

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/auth/refresh",
        json!({}),
        &account.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["token_type"], "bearer");
    assert_eq!(json["expires_in"], 1800);
    assert_eq!(json["account"]["id"], account.id);
    let fresh = json["access_token"].as_str().unwrap();
    assert_ne!(fresh, account.token);

    let response = get_auth(common::build_test_app(pool.clone()), "/api/v1/auth/me", fresh).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response =
        post_json(common::build_test_app(pool), "/api/v1/auth/refresh", json!({})).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_logout_is_acknowledged(pool: PgPool) {
    let response = post_json(common::build_test_app(pool), "/api/v1/auth/logout", json!({})).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
