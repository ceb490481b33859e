//! Periodic cleanup of idle chat sessions.
//!
//! Deletes sessions (and, by cascade, their messages) whose last activity
//! is older than the configured TTL. Runs on a fixed interval.

use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use tama_db::repositories::ChatRepo;
use tokio_util::sync::CancellationToken;

/// How often the cleanup job runs.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

/// Run the retention loop until `cancel` is triggered.
pub async fn run(pool: PgPool, ttl_hours: i64, cancel: CancellationToken) {
    tracing::info!(
        ttl_hours,
        interval_secs = CLEANUP_INTERVAL.as_secs(),
        "Chat session retention job started"
    );

    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Chat session retention job stopping");
                break;
            }
            _ = interval.tick() => {
                purge_idle(&pool, ttl_hours).await;
            }
        }
    }
}

/// One cleanup pass. Returns the number of sessions deleted.
pub async fn purge_idle(pool: &PgPool, ttl_hours: i64) -> u64 {
    let cutoff = Utc::now() - chrono::Duration::hours(ttl_hours);
    match ChatRepo::delete_idle_before(pool, cutoff).await {
        Ok(deleted) => {
            if deleted > 0 {
                tracing::info!(deleted, "Chat session retention: purged idle sessions");
            } else {
                tracing::debug!("Chat session retention: nothing to purge");
            }
            deleted
        }
        Err(e) => {
            tracing::error!(error = %e, "Chat session retention: cleanup failed");
            0
        }
    }
}
