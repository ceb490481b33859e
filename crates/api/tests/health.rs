mod common;

use axum::http::StatusCode;
use common::{body_json, get};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_reports_ok_with_database(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["db_healthy"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_reports_local_providers(pool: PgPool) {
    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/health").await).await;

    assert_eq!(
        json["providers"],
        serde_json::json!({ "images": "local", "conversation": "local", "payments": "local" })
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_route_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/nonexistent").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn responses_carry_request_id(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health").await;
    assert!(response.headers().contains_key("x-request-id"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn oversized_body_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "message": "x".repeat(128 * 1024) });
    let response = common::post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
