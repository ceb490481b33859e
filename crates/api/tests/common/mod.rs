#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

use tama_api::auth::jwt::JwtConfig;
use tama_api::config::{ProviderConfig, ServerConfig};
use tama_api::providers::{ProviderModes, Providers};
use tama_api::router::build_app_router;
use tama_api::state::AppState;
use tama_providers::{
    ChargeRequest, Checkout, LocalPaymentProvider, LocalResponder, PaymentProvider,
    PlaceholderImageProvider, ProviderError, WebhookEvent,
};

pub const WEBHOOK_SECRET: &str = "whsec_test_secret";
pub const PASSWORD: &str = "correct-horse-battery";

/// Build a test `ServerConfig` with safe defaults and no provider keys.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        frontend_url: "http://localhost:3000".to_string(),
        chat_session_ttl_hours: 72,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 30,
        },
        providers: ProviderConfig {
            sd_api_url: "http://images.invalid".to_string(),
            sd_api_key: None,
            conversation_api_url: "http://chat.invalid".to_string(),
            conversation_api_key: None,
            conversation_workspace_id: None,
            stripe_api_url: "http://payments.invalid".to_string(),
            stripe_secret_key: None,
            stripe_webhook_secret: WEBHOOK_SECRET.to_string(),
            timeout_secs: 2,
        },
    }
}

/// Local, deterministic providers.
pub fn local_providers() -> Providers {
    Providers {
        images: Arc::new(PlaceholderImageProvider),
        conversation: Arc::new(LocalResponder),
        payments: Arc::new(LocalPaymentProvider::new(WEBHOOK_SECRET.to_string())),
        timeout: Duration::from_secs(2),
        modes: ProviderModes::default(),
    }
}

/// A payment provider whose checkout always fails.
pub struct DownPayments;

#[async_trait]
impl PaymentProvider for DownPayments {
    async fn create_charge(&self, _: &ChargeRequest) -> Result<Checkout, ProviderError> {
        Err(ProviderError::Api {
            status: 503,
            body: "unavailable".into(),
        })
    }

    fn verify_webhook(&self, _: &[u8], _: &str) -> Result<WebhookEvent, ProviderError> {
        Err(ProviderError::InvalidSignature("down".into()))
    }
}

/// The application with the production middleware stack and local providers.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, local_providers())
}

pub fn build_test_app_with(pool: PgPool, providers: Providers) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        providers,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

fn json_request(method: &str, uri: &str, body: &Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, empty_request("GET", uri, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, empty_request("GET", uri, Some(token))).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, json_request("POST", uri, &body, None)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, json_request("POST", uri, &body, Some(token))).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, json_request("PUT", uri, &body, Some(token))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, empty_request("DELETE", uri, Some(token))).await
}

/// POST a raw body with an optional `Stripe-Signature` header.
pub async fn post_webhook(app: Router, payload: &[u8], signature: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/v1/payments/webhook")
        .header("content-type", "application/json");
    if let Some(signature) = signature {
        builder = builder.header("stripe-signature", signature);
    }
    send(app, builder.body(Body::from(payload.to_vec())).unwrap()).await
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A registered account: its id and a valid access token.
pub struct TestAccount {
    pub id: i64,
    pub token: String,
}

/// Register `username` through the API.
pub async fn register(app: Router, username: &str) -> TestAccount {
    let body = json!({
        "username": username,
        "email": format!("{username}@example.com"),
        "password": PASSWORD,
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    TestAccount {
        id: json["account"]["id"].as_i64().unwrap(),
        token: json["access_token"].as_str().unwrap().to_string(),
    }
}

/// Create a companion through the API and return its id.
pub async fn create_companion(app: Router, token: &str, name: &str) -> i64 {
    let body = json!({ "name": name, "style": "anime" });
    let response = post_json_auth(app, "/api/v1/companions", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["companion"]["id"]
        .as_i64()
        .unwrap()
}

pub async fn set_balance(pool: &PgPool, account_id: i64, balance: i64) {
    sqlx::query("UPDATE accounts SET balance_ntg = $2 WHERE id = $1")
        .bind(account_id)
        .bind(balance)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn mission_id(pool: &PgPool, name: &str) -> i64 {
    tama_db::repositories::MissionRepo::find_by_name(pool, name)
        .await
        .unwrap()
        .unwrap()
        .id
}
