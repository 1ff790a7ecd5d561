//! # Invariant Checker
//!
//! Runs on every tentative post-state before it is allowed to commit. A
//! failure here aborts the whole invocation; nothing is written.
//!
//! Post-state invariants:
//!
//! 1. `balance >= 0` (by type) and the counters are consistent with it.
//! 2. `balance == total_deposited - total_withdrawn`.
//! 3. A persisted record is never `Uninitialized`.
//! 4. A closed vault holds nothing.
//! 5. `authority` is not the zero identity unless the vault is closed.
//!
//! Transition invariants, checked against the pre-state when there is one:
//! the address never changes, the audit counters never decrease, the nonce
//! advances by exactly one, and nothing about the balance changes once the
//! vault is closed.

use crate::account::{VaultAccount, VaultState};
use crate::error::VaultError;

/// `a + b`, failing closed on overflow.
pub fn checked_add(a: u64, b: u64) -> Result<u64, VaultError> {
    a.checked_add(b).ok_or(VaultError::ArithmeticOverflow)
}

/// `a - b`, failing closed on underflow.
pub fn checked_sub(a: u64, b: u64) -> Result<u64, VaultError> {
    a.checked_sub(b).ok_or(VaultError::ArithmeticOverflow)
}

/// Check the invariants that every persisted record must satisfy.
pub fn check_account(account: &VaultAccount) -> Result<(), VaultError> {
    let net = account
        .total_deposited
        .checked_sub(account.total_withdrawn)
        .ok_or(VaultError::InvariantViolation(
            "total_withdrawn exceeds total_deposited",
        ))?;
    if account.balance != net {
        return Err(VaultError::InvariantViolation(
            "balance != total_deposited - total_withdrawn",
        ));
    }

    if account.state == VaultState::Uninitialized {
        return Err(VaultError::InvariantViolation(
            "persisted record is uninitialized",
        ));
    }

    if account.state == VaultState::Closed && account.balance != 0 {
        return Err(VaultError::InvariantViolation("closed vault holds a balance"));
    }

    if account.state != VaultState::Closed && account.authority.is_zero() {
        return Err(VaultError::InvariantViolation("live vault has no authority"));
    }

    if account.pending_authority.is_some_and(|p| p.is_zero()) {
        return Err(VaultError::InvariantViolation(
            "pending authority is the zero identity",
        ));
    }

    Ok(())
}

/// Check `next` on its own and as the successor of `prev`.
pub fn check_transition(prev: Option<&VaultAccount>, next: &VaultAccount) -> Result<(), VaultError> {
    check_account(next)?;

    let Some(prev) = prev else {
        if next.balance != 0 || next.total_deposited != 0 || next.total_withdrawn != 0 {
            return Err(VaultError::InvariantViolation(
                "new vault does not start empty",
            ));
        }
        return Ok(());
    };

    if next.address != prev.address {
        return Err(VaultError::InvariantViolation("address changed"));
    }
    if next.total_deposited < prev.total_deposited || next.total_withdrawn < prev.total_withdrawn {
        return Err(VaultError::InvariantViolation("audit counter decreased"));
    }
    if next.nonce != checked_add(prev.nonce, 1)? {
        return Err(VaultError::InvariantViolation("nonce did not advance by one"));
    }
    if prev.state == VaultState::Closed
        && (next.balance != prev.balance
            || next.total_deposited != prev.total_deposited
            || next.total_withdrawn != prev.total_withdrawn)
    {
        return Err(VaultError::InvariantViolation(
            "balance changed on a closed vault",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Pubkey;

    fn active() -> VaultAccount {
        VaultAccount::new(
            Pubkey::new([1u8; 32]),
            Pubkey::new([2u8; 32]),
            Pubkey::new([3u8; 32]),
            u64::MAX,
        )
    }

    #[test]
    fn fresh_account_passes() {
        assert!(check_transition(None, &active()).is_ok());
    }

    #[test]
    fn balance_must_match_counters() {
        let mut acct = active();
        acct.total_deposited = 100;
        acct.balance = 90;
        assert!(matches!(
            check_account(&acct),
            Err(VaultError::InvariantViolation(_))
        ));
        acct.total_withdrawn = 10;
        assert!(check_account(&acct).is_ok());
    }

    #[test]
    fn withdrawn_beyond_deposited_is_a_violation() {
        let mut acct = active();
        acct.total_withdrawn = 1;
        assert!(check_account(&acct).is_err());
    }

    #[test]
    fn live_vault_needs_an_authority() {
        let mut acct = active();
        acct.authority = Pubkey::ZERO;
        assert!(check_account(&acct).is_err());
        acct.state = VaultState::Closed;
        assert!(check_account(&acct).is_ok());
    }

    #[test]
    fn closed_vault_must_be_empty() {
        let mut acct = active();
        acct.state = VaultState::Closed;
        acct.total_deposited = 5;
        acct.balance = 5;
        assert!(check_account(&acct).is_err());
    }

    #[test]
    fn nonce_must_advance_by_exactly_one() {
        let prev = active();
        let mut next = prev.clone();
        assert!(check_transition(Some(&prev), &next).is_err());
        next.nonce = prev.nonce + 1;
        assert!(check_transition(Some(&prev), &next).is_ok());
        next.nonce = prev.nonce + 2;
        assert!(check_transition(Some(&prev), &next).is_err());
    }

    #[test]
    fn counters_never_decrease() {
        let mut prev = active();
        prev.total_deposited = 10;
        prev.balance = 10;
        let mut next = prev.clone();
        next.nonce += 1;
        next.total_deposited = 5;
        next.balance = 5;
        assert!(matches!(
            check_transition(Some(&prev), &next),
            Err(VaultError::InvariantViolation("audit counter decreased"))
        ));
    }

    #[test]
    fn address_is_immutable() {
        let prev = active();
        let mut next = prev.clone();
        next.nonce += 1;
        next.address = Pubkey::new([9u8; 32]);
        assert!(check_transition(Some(&prev), &next).is_err());
    }

    #[test]
    fn checked_helpers_fail_closed() {
        assert!(matches!(
            checked_add(u64::MAX, 1),
            Err(VaultError::ArithmeticOverflow)
        ));
        assert!(matches!(checked_sub(0, 1), Err(VaultError::ArithmeticOverflow)));
        assert_eq!(checked_add(2, 3).unwrap(), 5);
    }
}
