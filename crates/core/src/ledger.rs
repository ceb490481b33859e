//! Balance arithmetic for the NTG ledger.
//!
//! These functions operate on a balance value the caller has already locked
//! (or is about to write with a guarded `UPDATE`). They never allow a
//! negative result.

use crate::error::CoreError;
use crate::types::Ntg;

/// Starting balance granted to every new account.
pub const INITIAL_BALANCE: Ntg = 100;

/// Returned by [`debit`] when the balance cannot cover the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Insufficient funds: required {required}, available {available}")]
pub struct InsufficientFunds {
    pub required: Ntg,
    pub available: Ntg,
}

/// Reject negative amounts before they reach the ledger.
pub fn validate_amount(amount: Ntg) -> Result<(), CoreError> {
    if amount < 0 {
        return Err(CoreError::Validation(format!(
            "Amount must be non-negative, got {amount}"
        )));
    }
    Ok(())
}

/// True iff `balance` covers `amount`.
pub fn has_sufficient_balance(balance: Ntg, amount: Ntg) -> bool {
    balance >= amount
}

/// Compute the balance after removing `amount`.
///
/// Leaves nothing mutated on failure; the caller keeps the old balance.
pub fn debit(balance: Ntg, amount: Ntg) -> Result<Ntg, InsufficientFunds> {
    if amount < 0 || !has_sufficient_balance(balance, amount) {
        return Err(InsufficientFunds {
            required: amount,
            available: balance,
        });
    }
    Ok(balance - amount)
}

/// Compute the balance after adding `amount`.
pub fn credit(balance: Ntg, amount: Ntg) -> Result<Ntg, CoreError> {
    validate_amount(amount)?;
    balance
        .checked_add(amount)
        .ok_or_else(|| CoreError::Validation("Balance overflow".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn sufficient_balance_is_inclusive() {
        assert!(has_sufficient_balance(50, 50));
        assert!(has_sufficient_balance(51, 50));
        assert!(!has_sufficient_balance(49, 50));
    }

    #[test]
    fn debit_reduces_balance() {
        assert_eq!(debit(100, 50), Ok(50));
        assert_eq!(debit(50, 50), Ok(0));
    }

    #[test]
    fn debit_rejects_overdraft() {
        assert_eq!(
            debit(10, 50),
            Err(InsufficientFunds {
                required: 50,
                available: 10
            })
        );
    }

    #[test]
    fn debit_rejects_negative_amount() {
        assert!(debit(10, -5).is_err());
    }

    #[test]
    fn credit_adds_amount() {
        assert_eq!(credit(0, 100).unwrap(), 100);
        assert_eq!(credit(7, 0).unwrap(), 7);
    }

    #[test]
    fn credit_rejects_negative_and_overflow() {
        assert_matches!(credit(10, -1), Err(CoreError::Validation(_)));
        assert_matches!(credit(Ntg::MAX, 1), Err(CoreError::Validation(_)));
    }

    #[test]
    fn balance_never_negative_over_mixed_sequence() {
        let ops: [(bool, Ntg); 8] = [
            (false, 60),
            (false, 60),
            (true, 15),
            (false, 55),
            (false, 1),
            (true, 0),
            (false, 0),
            (false, 1_000),
        ];
        let mut balance = INITIAL_BALANCE;
        for (is_credit, amount) in ops {
            let before = balance;
            balance = if is_credit {
                credit(balance, amount).unwrap()
            } else {
                debit(balance, amount).unwrap_or(before)
            };
            assert!(balance >= 0, "balance went negative after {amount}");
        }
        assert_eq!(balance, 0);
    }
}
