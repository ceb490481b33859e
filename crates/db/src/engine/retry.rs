//! Bounded retry for transactions that lose a concurrency race.

use std::future::Future;
use std::time::Duration;

use tama_core::error::CoreError;

use super::{EngineError, EngineResult};

/// Total attempts, including the first.
pub const MAX_ATTEMPTS: u32 = 3;

/// Linear backoff step between attempts.
const BACKOFF_STEP: Duration = Duration::from_millis(25);

/// PostgreSQL `serialization_failure`.
const SQLSTATE_SERIALIZATION_FAILURE: &str = "40001";
/// PostgreSQL `deadlock_detected`.
const SQLSTATE_DEADLOCK_DETECTED: &str = "40P01";

/// True for errors that a fresh attempt of the same transaction may avoid.
pub fn is_retryable(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => matches!(
            db_err.code().as_deref(),
            Some(SQLSTATE_SERIALIZATION_FAILURE) | Some(SQLSTATE_DEADLOCK_DETECTED)
        ),
        _ => false,
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the
/// attempt budget runs out. Exhaustion surfaces as [`CoreError::Transient`].
pub async fn with_retry<T, F, Fut>(operation: &'static str, mut op: F) -> EngineResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = EngineResult<T>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Err(EngineError::Database(ref err)) if is_retryable(err) => {
                if attempt >= MAX_ATTEMPTS {
                    tracing::warn!(operation, attempt, error = %err, "Retry budget exhausted");
                    return Err(EngineError::Core(CoreError::Transient(format!(
                        "{operation} conflicted with a concurrent update; try again"
                    ))));
                }
                tracing::debug!(operation, attempt, error = %err, "Retrying after conflict");
                tokio::time::sleep(BACKOFF_STEP * attempt).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}
