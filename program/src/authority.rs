//! # Authority Model
//!
//! Who may invoke what. Every mutating operation names exactly one
//! principal whose signature it needs:
//!
//! | Operation          | Required signer                      |
//! |--------------------|--------------------------------------|
//! | `Initialize`       | the authority being bound            |
//! | `AcceptTransfer`   | the pending (proposed) authority     |
//! | everything else    | the vault's current authority        |
//!
//! Initialize is the bootstrap case: there is no prior authority, so the
//! new one has to prove it consented. Authority transfer is split in two so
//! a mistyped successor cannot lock the vault: the successor has to sign
//! before anything changes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::account::{VaultAccount, VaultState};
use crate::crypto::Pubkey;
use crate::error::VaultError;
use crate::instruction::Operation;

/// The identities that approved the current invocation.
///
/// Built either from verified signatures
/// ([`SignedInvocation::verify`](crate::instruction::SignedInvocation::verify))
/// or directly by a runtime that has already checked them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerSet {
    signers: BTreeSet<Pubkey>,
}

impl SignerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, signer: Pubkey) -> bool {
        self.signers.insert(signer)
    }

    pub fn contains(&self, key: &Pubkey) -> bool {
        self.signers.contains(key)
    }

    pub fn len(&self) -> usize {
        self.signers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signers.is_empty()
    }
}

impl FromIterator<Pubkey> for SignerSet {
    fn from_iter<I: IntoIterator<Item = Pubkey>>(iter: I) -> Self {
        Self {
            signers: iter.into_iter().collect(),
        }
    }
}

impl From<Pubkey> for SignerSet {
    fn from(signer: Pubkey) -> Self {
        std::iter::once(signer).collect()
    }
}

/// The principal whose signature `operation` needs against `account`.
///
/// `account` is `None` when no record exists yet; only Initialize can name
/// a signer then.
pub fn required_signer(
    operation: &Operation,
    account: Option<&VaultAccount>,
) -> Result<Pubkey, VaultError> {
    match (operation, account) {
        (Operation::Initialize { authority, .. }, _) => Ok(*authority),
        (Operation::AcceptTransfer, Some(acct)) => {
            acct.pending_authority.ok_or(VaultError::NoPendingTransfer)
        }
        (_, Some(acct)) => Ok(acct.authority),
        (_, None) => Err(VaultError::InvalidState {
            current: VaultState::Uninitialized,
            expected: "an initialized account",
        }),
    }
}

/// Gate an operation behind its required signer.
pub fn authorize(
    operation: &Operation,
    account: Option<&VaultAccount>,
    signers: &SignerSet,
) -> Result<(), VaultError> {
    let required = required_signer(operation, account)?;
    if required.is_zero() || !signers.contains(&required) {
        return Err(VaultError::Unauthorized { required });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(b: u8) -> Pubkey {
        Pubkey::new([b; 32])
    }

    fn account(authority: Pubkey) -> VaultAccount {
        VaultAccount::new(key(0xAA), authority, key(0xBB), u64::MAX)
    }

    #[test]
    fn initialize_requires_the_new_authority() {
        let op = Operation::Initialize {
            authority: key(1),
            mint: key(9),
            max_deposit: u64::MAX,
        };
        assert!(authorize(&op, None, &SignerSet::from(key(1))).is_ok());
        assert!(matches!(
            authorize(&op, None, &SignerSet::from(key(2))),
            Err(VaultError::Unauthorized { required }) if required == key(1)
        ));
    }

    #[test]
    fn privileged_operations_require_current_authority() {
        let acct = account(key(1));
        for op in [
            Operation::Deposit { amount: 1 },
            Operation::Withdraw { amount: 1 },
            Operation::Pause,
            Operation::Resume,
            Operation::Close,
            Operation::ProposeTransfer {
                new_authority: key(2),
            },
            Operation::CancelTransfer,
        ] {
            assert!(authorize(&op, Some(&acct), &SignerSet::from(key(1))).is_ok());
            assert!(authorize(&op, Some(&acct), &SignerSet::from(key(3))).is_err());
        }
    }

    #[test]
    fn extra_signers_do_not_hurt() {
        let acct = account(key(1));
        let signers: SignerSet = [key(1), key(2), key(3)].into_iter().collect();
        assert!(authorize(&Operation::Pause, Some(&acct), &signers).is_ok());
    }

    #[test]
    fn accept_requires_pending_authority_not_current() {
        let mut acct = account(key(1));
        assert!(matches!(
            authorize(&Operation::AcceptTransfer, Some(&acct), &SignerSet::from(key(1))),
            Err(VaultError::NoPendingTransfer)
        ));

        acct.pending_authority = Some(key(2));
        assert!(authorize(&Operation::AcceptTransfer, Some(&acct), &SignerSet::from(key(2))).is_ok());
        assert!(authorize(&Operation::AcceptTransfer, Some(&acct), &SignerSet::from(key(1))).is_err());
    }

    #[test]
    fn zero_identity_never_authorizes() {
        let op = Operation::Initialize {
            authority: Pubkey::ZERO,
            mint: key(9),
            max_deposit: u64::MAX,
        };
        assert!(authorize(&op, None, &SignerSet::from(Pubkey::ZERO)).is_err());
    }

    #[test]
    fn missing_account_is_invalid_state() {
        assert!(matches!(
            authorize(&Operation::Pause, None, &SignerSet::from(key(1))),
            Err(VaultError::InvalidState {
                current: VaultState::Uninitialized,
                ..
            })
        ));
    }
}
