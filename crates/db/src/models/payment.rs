//! Payment entity model.

use serde::Serialize;
use sqlx::FromRow;
use tama_core::error::CoreError;
use tama_core::payment::PaymentStatus;
use tama_core::types::{DbId, Ntg, Timestamp};

/// A row from the `payments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Payment {
    pub id: DbId,
    pub account_id: DbId,
    /// USD cents.
    pub amount_usd: i64,
    pub amount_ntg: Ntg,
    pub status: String,
    pub checkout_ref: Option<String>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Payment {
    pub fn status(&self) -> Result<PaymentStatus, CoreError> {
        self.status.parse()
    }
}
