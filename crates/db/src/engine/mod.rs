//! Transactional application of domain decisions.
//!
//! Each operation opens one transaction, locks the rows it depends on,
//! asks `tama_core` for a decision against that snapshot, writes the result,
//! and commits. Any error before commit drops the transaction, which rolls
//! every write back.
//!
//! Lock order is account -> companion, or payment -> account. No operation
//! takes them in the reverse order.

pub mod chat;
pub mod companion;
pub mod ledger;
pub mod mission;
pub mod payment;
pub mod retry;

use tama_core::error::CoreError;
use tama_core::ledger::InsufficientFunds;
use tama_core::mission::MissionError;
use tama_core::quota::QuotaError;

/// Failure of an engine operation.
///
/// Domain variants (`Mission`, `Quota`, `InsufficientFunds`) are expected
/// outcomes for the caller to render; `Database` is a fault.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Mission(#[from] MissionError),

    #[error(transparent)]
    Quota(#[from] QuotaError),

    #[error(transparent)]
    InsufficientFunds(#[from] InsufficientFunds),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
