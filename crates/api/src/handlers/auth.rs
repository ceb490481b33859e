//! Handlers for the `/auth` resource (register, login, me).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tama_core::error::CoreError;
use tama_db::models::account::{Account, AccountResponse, CreateAccount};
use tama_db::repositories::AccountRepo;
use validator::Validate;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "must be 3 to 50 characters"))]
    pub username: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful authentication response returned by register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub account: AccountResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create an account with the starting balance and return a token.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    input.validate()?;
    let username = input.username.trim();
    let email = input.email.trim();

    if AccountRepo::find_by_username(&state.pool, username)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "Username already taken".into(),
        )));
    }
    if AccountRepo::find_by_email(&state.pool, email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "Email already registered".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    // The unique indexes still guard a concurrent registration (409 via sqlx).
    let account = AccountRepo::create(
        &state.pool,
        &CreateAccount {
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
        },
    )
    .await?;

    tracing::info!(account_id = account.id, "Account registered");

    Ok((StatusCode::CREATED, Json(issue_token(&state, account)?)))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let account = AccountRepo::find_by_email(&state.pool, input.email.trim())
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into())))?;

    let password_valid = verify_password(&input.password, &account.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::debug!(account_id = account.id, "Login rejected");
        return Err(AppError::Core(CoreError::Unauthorized(
            INVALID_CREDENTIALS.into(),
        )));
    }

    tracing::info!(account_id = account.id, "Account logged in");

    Ok(Json(issue_token(&state, account)?))
}

/// GET /api/v1/auth/me
pub async fn me(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<AccountResponse>>> {
    let account = AccountRepo::find_by_id(&state.pool, auth.account_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Account",
            id: auth.account_id,
        }))?;
    Ok(Json(DataResponse {
        data: account.into(),
    }))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a still-valid token for a fresh one with a full lifetime.
pub async fn refresh(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<AuthResponse>> {
    let account = AccountRepo::find_by_id(&state.pool, auth.account_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Account no longer exists".into()))
        })?;
    tracing::debug!(account_id = account.id, "Access token refreshed");
    Ok(Json(issue_token(&state, account)?))
}

/// POST /api/v1/auth/logout
///
/// Tokens are stateless, so there is nothing to revoke; clients drop the
/// token. Kept so clients have a uniform sign-out call.
pub async fn logout() -> StatusCode {
    StatusCode::NO_CONTENT
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn issue_token(state: &AppState, account: Account) -> AppResult<AuthResponse> {
    let access_token = generate_access_token(account.id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    Ok(AuthResponse {
        access_token,
        token_type: "bearer",
        expires_in: state.config.jwt.expires_in_secs(),
        account: account.into(),
    })
}
