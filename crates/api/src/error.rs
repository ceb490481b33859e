use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};
use tama_core::error::CoreError;
use tama_core::ledger::InsufficientFunds;
use tama_core::mission::MissionError;
use tama_core::quota::QuotaError;
use tama_db::engine::EngineError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and the typed domain failures, and adds
/// HTTP-specific variants. Implements [`IntoResponse`] to produce
/// consistent JSON error responses:
///
/// ```json
/// { "error": "...", "code": "ON_COOLDOWN", "details": { "seconds_remaining": 1200 } }
/// ```
///
/// `details` is present only for domain errors that carry structured data.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `tama_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Mission(#[from] MissionError),

    #[error(transparent)]
    Quota(#[from] QuotaError),

    #[error(transparent)]
    InsufficientFunds(#[from] InsufficientFunds),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The payment provider rejected or failed a checkout.
    #[error("Payment provider error: {0}")]
    PaymentProvider(String),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Mission(e) => Self::Mission(e),
            EngineError::Quota(e) => Self::Quota(e),
            EngineError::InsufficientFunds(e) => Self::InsufficientFunds(e),
            EngineError::Core(e) => Self::Core(e),
            EngineError::Database(e) => Self::Database(e),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Core(tama_core::validation::from_validation_errors(errors))
    }
}

type ErrorParts = (StatusCode, &'static str, String, Option<Value>);

fn internal() -> ErrorParts {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
        None,
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details): ErrorParts = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                    None,
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone(), None),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone(), None)
                }
                CoreError::Forbidden(msg) => {
                    (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone(), None)
                }
                CoreError::Transient(msg) => {
                    tracing::warn!(error = %msg, "Transient failure");
                    (StatusCode::SERVICE_UNAVAILABLE, "TRANSIENT", msg.clone(), None)
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            // --- Domain rejections (expected; not logged as faults) ---
            AppError::Mission(err) => {
                let message = err.to_string();
                match err {
                    MissionError::MissionNotFound(_) => {
                        (StatusCode::NOT_FOUND, "MISSION_NOT_FOUND", message, None)
                    }
                    MissionError::CompanionNotFound(_) => {
                        (StatusCode::NOT_FOUND, "COMPANION_NOT_FOUND", message, None)
                    }
                    MissionError::OnCooldown { seconds_remaining } => (
                        StatusCode::CONFLICT,
                        "ON_COOLDOWN",
                        message,
                        Some(json!({ "seconds_remaining": seconds_remaining })),
                    ),
                    MissionError::InsufficientBalance {
                        required,
                        available,
                    } => (
                        StatusCode::PAYMENT_REQUIRED,
                        "INSUFFICIENT_BALANCE",
                        message,
                        Some(json!({ "required": required, "available": available })),
                    ),
                }
            }
            AppError::Quota(err) => {
                let message = err.to_string();
                match err {
                    QuotaError::Denied {
                        required,
                        available,
                    } => (
                        StatusCode::PAYMENT_REQUIRED,
                        "QUOTA_DENIED",
                        message,
                        Some(json!({ "required": required, "available": available })),
                    ),
                    QuotaError::SlotLimit { max_companions } => (
                        StatusCode::CONFLICT,
                        "SLOT_LIMIT",
                        message,
                        Some(json!({ "max_companions": max_companions })),
                    ),
                }
            }
            AppError::InsufficientFunds(err) => (
                StatusCode::PAYMENT_REQUIRED,
                "INSUFFICIENT_BALANCE",
                err.to_string(),
                Some(json!({ "required": err.required, "available": err.available })),
            ),

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::PaymentProvider(msg) => {
                tracing::error!(error = %msg, "Payment provider failure");
                (
                    StatusCode::BAD_GATEWAY,
                    "PAYMENT_PROVIDER_ERROR",
                    "Payment provider is unavailable".to_string(),
                    None,
                )
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None)
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(details) = details {
            body["details"] = details;
        }

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> ErrorParts {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
            None,
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                        None,
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            internal()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}
