//! Generation quota: one free avatar generation per account, then paid.
//!
//! Companion creation is gated twice: first by the slot cap (no state is
//! touched when it fails), then by quota consumption.

use serde::Serialize;

use crate::ledger;
use crate::types::Ntg;

/// NTG charged for a generation once the free entitlement is spent.
pub const GENERATION_COST_NTG: Ntg = 100;

/// Maximum live companions per account.
pub const MAX_COMPANIONS: i64 = 3;

/// Avatar variants produced per generation.
pub const VARIANT_COUNT: usize = 4;

/// Outcome of [`AccountQuota::consume`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    UsedFree,
    UsedPaid,
    Denied,
}

impl QuotaDecision {
    /// Label reported to clients for a successful consumption.
    pub fn label(self) -> &'static str {
        match self {
            Self::UsedFree => "free",
            Self::UsedPaid => "paid",
            Self::Denied => "denied",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuotaError {
    #[error("Maximum of {max_companions} companions allowed")]
    SlotLimit { max_companions: i64 },

    #[error("Generation requires {required} NTG, available {available}")]
    Denied { required: Ntg, available: Ntg },
}

/// The quota-relevant slice of an account, as read under lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountQuota {
    pub free_generation_used: bool,
    pub balance: Ntg,
}

impl AccountQuota {
    pub fn can_generate(&self) -> bool {
        !self.free_generation_used || ledger::has_sufficient_balance(self.balance, GENERATION_COST_NTG)
    }

    /// Spend the free entitlement if available, else debit the generation cost.
    ///
    /// `Denied` leaves the state untouched.
    pub fn consume(&mut self) -> QuotaDecision {
        if !self.free_generation_used {
            self.free_generation_used = true;
            return QuotaDecision::UsedFree;
        }
        match ledger::debit(self.balance, GENERATION_COST_NTG) {
            Ok(new_balance) => {
                self.balance = new_balance;
                QuotaDecision::UsedPaid
            }
            Err(_) => QuotaDecision::Denied,
        }
    }
}

/// Reject creation when the account already holds the maximum.
pub fn check_slot(existing_companions: i64) -> Result<(), QuotaError> {
    if existing_companions >= MAX_COMPANIONS {
        return Err(QuotaError::SlotLimit {
            max_companions: MAX_COMPANIONS,
        });
    }
    Ok(())
}

/// Read-only view returned by the quota endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct QuotaStatus {
    pub has_free_generation: bool,
    pub generation_cost_ntg: Ntg,
    pub current_balance: Ntg,
    pub can_afford: bool,
    pub can_generate: bool,
    pub companion_count: i64,
    pub max_companions: i64,
    pub slot_available: bool,
}

pub fn quota_status(quota: AccountQuota, companion_count: i64) -> QuotaStatus {
    QuotaStatus {
        has_free_generation: !quota.free_generation_used,
        generation_cost_ntg: GENERATION_COST_NTG,
        current_balance: quota.balance,
        can_afford: ledger::has_sufficient_balance(quota.balance, GENERATION_COST_NTG),
        can_generate: quota.can_generate(),
        companion_count,
        max_companions: MAX_COMPANIONS,
        slot_available: check_slot(companion_count).is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quota(free_generation_used: bool, balance: Ntg) -> AccountQuota {
        AccountQuota {
            free_generation_used,
            balance,
        }
    }

    #[test]
    fn free_entitlement_is_used_once() {
        let mut q = quota(false, 250);
        assert_eq!(q.consume(), QuotaDecision::UsedFree);
        assert!(q.free_generation_used);
        assert_eq!(q.balance, 250);
        assert_eq!(q.consume(), QuotaDecision::UsedPaid);
        assert_eq!(q.balance, 150);
    }

    #[test]
    fn second_consume_denied_without_funds() {
        let mut q = quota(false, 40);
        assert_eq!(q.consume(), QuotaDecision::UsedFree);
        assert_eq!(q.consume(), QuotaDecision::Denied);
        assert_eq!(q, quota(true, 40));
    }

    #[test]
    fn can_generate_rules() {
        assert!(quota(false, 0).can_generate());
        assert!(quota(true, 100).can_generate());
        assert!(!quota(true, 99).can_generate());
    }

    #[test]
    fn slot_cap() {
        assert!(check_slot(0).is_ok());
        assert!(check_slot(2).is_ok());
        assert_eq!(
            check_slot(3),
            Err(QuotaError::SlotLimit { max_companions: 3 })
        );
    }

    #[test]
    fn status_view() {
        let status = quota_status(quota(true, 120), 3);
        assert!(!status.has_free_generation);
        assert!(status.can_afford);
        assert!(status.can_generate);
        assert!(!status.slot_available);
        assert_eq!(status.max_companions, 3);
    }
}
