//! Account entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tama_core::quota::AccountQuota;
use tama_core::types::{DbId, Ntg, Timestamp};

/// Full account row from the `accounts` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`AccountResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub balance_ntg: Ntg,
    pub free_generation_used: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Account {
    pub fn quota(&self) -> AccountQuota {
        AccountQuota {
            free_generation_used: self.free_generation_used,
            balance: self.balance_ntg,
        }
    }
}

/// Safe account representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct AccountResponse {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub balance_ntg: Ntg,
    pub free_generation_used: bool,
    pub created_at: Timestamp,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            email: account.email,
            balance_ntg: account.balance_ntg,
            free_generation_used: account.free_generation_used,
            created_at: account.created_at,
        }
    }
}

/// DTO for creating a new account. Balance and quota take column defaults.
#[derive(Debug, Deserialize)]
pub struct CreateAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}
