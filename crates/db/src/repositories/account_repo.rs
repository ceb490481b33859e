//! Repository for the `accounts` table.

use sqlx::PgPool;
use tama_core::types::{DbId, Ntg};

use crate::models::account::{Account, CreateAccount};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, email, password_hash, balance_ntg, free_generation_used, \
                       created_at, updated_at";

/// Provides account lookups and guarded balance mutations.
pub struct AccountRepo;

impl AccountRepo {
    /// Insert a new account, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateAccount) -> Result<Account, sqlx::Error> {
        let query = format!(
            "INSERT INTO accounts (username, email, password_hash)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .fetch_one(pool)
            .await
    }

    /// Find an account by internal ID.
    pub async fn find_by_id<'e, E>(executor: E, id: DbId) -> Result<Option<Account>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE id = $1");
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find an account by email (case-insensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Account>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE LOWER(email) = LOWER($1)");
        sqlx::query_as::<_, Account>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find an account by username (case-insensitive).
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Account>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE LOWER(username) = LOWER($1)");
        sqlx::query_as::<_, Account>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Lock an account row for the rest of the transaction.
    pub async fn lock(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<Option<Account>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Subtract `amount` only if the balance covers it.
    ///
    /// Returns the new balance, or `None` when the account is missing or the
    /// balance is insufficient. Never leaves a negative balance.
    pub async fn debit(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        amount: Ntg,
    ) -> Result<Option<Ntg>, sqlx::Error> {
        let row: Option<(Ntg,)> = sqlx::query_as(
            "UPDATE accounts SET balance_ntg = balance_ntg - $2
             WHERE id = $1 AND balance_ntg >= $2
             RETURNING balance_ntg",
        )
        .bind(id)
        .bind(amount)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(row.map(|(balance,)| balance))
    }

    /// Add `amount` to the balance. Returns the new balance, or `None` if
    /// the account does not exist.
    pub async fn credit(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        amount: Ntg,
    ) -> Result<Option<Ntg>, sqlx::Error> {
        let row: Option<(Ntg,)> = sqlx::query_as(
            "UPDATE accounts SET balance_ntg = balance_ntg + $2
             WHERE id = $1
             RETURNING balance_ntg",
        )
        .bind(id)
        .bind(amount)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(row.map(|(balance,)| balance))
    }

    /// Flip the free-generation flag. Returns `false` if it was already used.
    pub async fn mark_free_generation_used(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE accounts SET free_generation_used = TRUE
             WHERE id = $1 AND free_generation_used = FALSE",
        )
        .bind(id)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
