//! Payment lifecycle and the NTG package catalog.

use std::str::FromStr;

use serde::Serialize;

use crate::error::CoreError;
use crate::types::Ntg;

/// Minimum checkout amount in USD cents.
pub const MIN_CHECKOUT_USD_CENTS: i64 = 99;

// Checkout Session events. Their `data.object.id` is the session id stored
// as `checkout_ref`.

/// Session finished. Paid unless `payment_status` says `unpaid`.
pub const EVENT_SESSION_COMPLETED: &str = "checkout.session.completed";
/// A delayed payment method settled.
pub const EVENT_ASYNC_SUCCEEDED: &str = "checkout.session.async_payment_succeeded";
/// A delayed payment method failed.
pub const EVENT_ASYNC_FAILED: &str = "checkout.session.async_payment_failed";
/// The session expired before payment.
pub const EVENT_SESSION_EXPIRED: &str = "checkout.session.expired";

/// `payment_status` of a completed session whose payment is still in flight.
pub const PAYMENT_STATUS_UNPAID: &str = "unpaid";

// ---------------------------------------------------------------------------
// Status state machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

/// What the caller should do after validating a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Write the new status (and credit, for completion).
    Apply,
    /// Already in the target state; write nothing.
    NoOp,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Validate `self -> target`.
    ///
    /// Only `pending -> completed` and `pending -> failed` apply. Repeating
    /// the terminal state already reached is a no-op; anything else is a
    /// conflict.
    pub fn transition(self, target: PaymentStatus) -> Result<Transition, CoreError> {
        match (self, target) {
            (Self::Pending, Self::Completed | Self::Failed) => Ok(Transition::Apply),
            (current, target) if current == target && current.is_terminal() => {
                Ok(Transition::NoOp)
            }
            (current, target) => Err(CoreError::Conflict(format!(
                "Payment cannot move from {} to {}",
                current.as_str(),
                target.as_str()
            ))),
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(CoreError::Internal(format!(
                "Unknown payment status '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Packages
// ---------------------------------------------------------------------------

/// A purchasable NTG bundle.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct NtgPackage {
    /// Price in USD cents.
    pub amount_usd: i64,
    /// NTG granted, bonus included.
    pub amount_ntg: Ntg,
    pub bonus: Ntg,
}

pub const NTG_PACKAGES: [NtgPackage; 5] = [
    NtgPackage { amount_usd: 99, amount_ntg: 100, bonus: 0 },
    NtgPackage { amount_usd: 499, amount_ntg: 550, bonus: 50 },
    NtgPackage { amount_usd: 999, amount_ntg: 1200, bonus: 200 },
    NtgPackage { amount_usd: 1999, amount_ntg: 2600, bonus: 600 },
    NtgPackage { amount_usd: 4999, amount_ntg: 7000, bonus: 2000 },
];

/// The catalog package priced at `amount_usd` that grants `amount_ntg`.
///
/// Checkout accepts only catalog pairs, so the amount credited on
/// settlement is always one the customer was charged for.
pub fn find_package(amount_usd: i64, amount_ntg: Ntg) -> Option<NtgPackage> {
    NTG_PACKAGES
        .iter()
        .copied()
        .find(|pkg| pkg.amount_usd == amount_usd && pkg.amount_ntg == amount_ntg)
}

// ---------------------------------------------------------------------------
// Webhook events
// ---------------------------------------------------------------------------

/// The payment outcome carried by a verified webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    Succeeded,
    Failed,
}

impl WebhookOutcome {
    /// Map a provider event to an outcome.
    ///
    /// Unrelated event types yield `None`, as does a completed session whose
    /// payment has not settled yet; the async events decide those.
    pub fn from_event(event_type: &str, payment_status: Option<&str>) -> Option<Self> {
        match event_type {
            EVENT_SESSION_COMPLETED if payment_status == Some(PAYMENT_STATUS_UNPAID) => None,
            EVENT_SESSION_COMPLETED | EVENT_ASYNC_SUCCEEDED => Some(Self::Succeeded),
            EVENT_ASYNC_FAILED | EVENT_SESSION_EXPIRED => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn target_status(self) -> PaymentStatus {
        match self {
            Self::Succeeded => PaymentStatus::Completed,
            Self::Failed => PaymentStatus::Failed,
        }
    }
}
