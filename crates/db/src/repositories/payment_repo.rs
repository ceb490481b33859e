//! Repository for the `payments` table.

use sqlx::PgPool;
use tama_core::payment::PaymentStatus;
use tama_core::types::{DbId, Ntg};

use crate::models::payment::Payment;

const COLUMNS: &str = "id, account_id, amount_usd, amount_ntg, status, checkout_ref, \
                       completed_at, created_at, updated_at";

pub struct PaymentRepo;

impl PaymentRepo {
    /// Insert a `pending` payment with no checkout reference yet.
    pub async fn create_pending(
        pool: &PgPool,
        account_id: DbId,
        amount_usd: i64,
        amount_ntg: Ntg,
    ) -> Result<Payment, sqlx::Error> {
        let query = format!(
            "INSERT INTO payments (account_id, amount_usd, amount_ntg)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(account_id)
            .bind(amount_usd)
            .bind(amount_ntg)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payments WHERE id = $1");
        sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Attach the provider's checkout reference to a payment.
    pub async fn set_checkout_ref(
        pool: &PgPool,
        id: DbId,
        checkout_ref: &str,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!(
            "UPDATE payments SET checkout_ref = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .bind(checkout_ref)
            .fetch_optional(pool)
            .await
    }

    /// Lock a payment by id for the rest of the transaction.
    pub async fn lock_by_id(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payments WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Lock a payment by its provider checkout reference.
    pub async fn lock_by_checkout_ref(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        checkout_ref: &str,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payments WHERE checkout_ref = $1 FOR UPDATE");
        sqlx::query_as::<_, Payment>(&query)
            .bind(checkout_ref)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Write a new status. `completed_at` is stamped on completion.
    pub async fn set_status(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        status: PaymentStatus,
    ) -> Result<Payment, sqlx::Error> {
        let query = format!(
            "UPDATE payments SET
                status = $2,
                completed_at = CASE WHEN $2 = 'completed' THEN NOW() ELSE completed_at END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    /// An account's payments, newest first.
    pub async fn list_by_account(
        pool: &PgPool,
        account_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Payment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM payments
             WHERE account_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(account_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
