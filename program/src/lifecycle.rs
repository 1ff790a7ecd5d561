//! # Vault State Machine
//!
//! ```text
//!                 Initialize
//!  Uninitialized ───────────► Active ◄──── Resume ────┐
//!                             │  │ Deposit/Withdraw   │
//!                             │  └──────── Pause ───► Paused
//!                             │                       │
//!                             └──── Close ──► Closed ◄┘ Close
//! ```
//!
//! | From           | Operation        | To      | Guard                         |
//! |----------------|------------------|---------|-------------------------------|
//! | Uninitialized  | Initialize       | Active  | no valid record exists        |
//! | Active         | Deposit          | Active  | `0 < amount < max_deposit`    |
//! | Active         | Withdraw         | Active  | `0 < amount <= balance`       |
//! | Active         | Pause            | Paused  |                               |
//! | Paused         | Resume           | Active  |                               |
//! | Active, Paused | Close            | Closed  | `balance == 0`                |
//! | Active, Paused | Propose/Accept/Cancel transfer | same | see `authority`   |
//!
//! [`execute`] is pure: it takes the current record (if any), the
//! invocation and the signer set, and returns the record to commit or the
//! reason not to. It performs no I/O and never mutates its input, so a
//! rejected invocation has nothing to roll back.

use crate::account::{VaultAccount, VaultState};
use crate::authority::{authorize, SignerSet};
use crate::config::UNINITIALIZED_NONCE;
use crate::error::VaultError;
use crate::events::VaultEvent;
use crate::instruction::{Invocation, Operation};
use crate::invariants::{check_transition, checked_add, checked_sub};

/// A validated post-state and what happened to produce it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub account: VaultAccount,
    pub event: VaultEvent,
}

/// Run one invocation against `current`.
///
/// `current` must be the record stored at `invocation.address`.
///
/// Order of checks: lifecycle precondition (double Initialize, any other
/// operation on a missing account, anything on a closed vault),
/// authorization, nonce, the transition's own guards, and finally the
/// invariant checker on the tentative post-state.
pub fn execute(
    current: Option<&VaultAccount>,
    invocation: &Invocation,
    signers: &SignerSet,
) -> Result<Transition, VaultError> {
    let operation = &invocation.operation;

    match (operation, current) {
        (Operation::Initialize { .. }, Some(_)) => return Err(VaultError::AlreadyInitialized),
        (Operation::Initialize { .. }, None) => {}
        (_, None) => {
            return Err(VaultError::InvalidState {
                current: VaultState::Uninitialized,
                expected: "an initialized account",
            })
        }
        (_, Some(acct)) if acct.is_closed() => {
            return Err(VaultError::InvalidState {
                current: VaultState::Closed,
                expected: "Active or Paused",
            })
        }
        (_, Some(_)) => {}
    }

    authorize(operation, current, signers)?;

    let expected_nonce = current.map_or(UNINITIALIZED_NONCE, |acct| acct.nonce);
    if invocation.nonce != expected_nonce {
        return Err(VaultError::StaleNonce {
            expected: expected_nonce,
            provided: invocation.nonce,
        });
    }

    let transition = match current {
        None => initialize(invocation)?,
        Some(acct) => apply(acct, operation)?,
    };

    check_transition(current, &transition.account)?;
    Ok(transition)
}

fn initialize(invocation: &Invocation) -> Result<Transition, VaultError> {
    let Operation::Initialize {
        authority,
        mint,
        max_deposit,
    } = &invocation.operation
    else {
        return Err(VaultError::InvalidState {
            current: VaultState::Uninitialized,
            expected: "an initialized account",
        });
    };

    if *max_deposit == 0 {
        return Err(VaultError::InvalidAmount);
    }

    let mut account = VaultAccount::new(invocation.address, *authority, *mint, *max_deposit);
    account.nonce = checked_add(UNINITIALIZED_NONCE, 1)?;

    Ok(Transition {
        account,
        event: VaultEvent::Initialized {
            authority: *authority,
            mint: *mint,
            max_deposit: *max_deposit,
        },
    })
}

fn apply(current: &VaultAccount, operation: &Operation) -> Result<Transition, VaultError> {
    let mut next = current.clone();

    let event = match operation {
        Operation::Initialize { .. } => return Err(VaultError::AlreadyInitialized),

        Operation::Deposit { amount } => {
            require_state(current, &[VaultState::Active], "Active")?;
            let amount = *amount;
            if amount == 0 {
                return Err(VaultError::InvalidAmount);
            }
            if amount >= current.max_deposit {
                return Err(VaultError::ExceededMaxDeposit {
                    amount,
                    max_deposit: current.max_deposit,
                });
            }
            next.balance = checked_add(current.balance, amount)?;
            next.total_deposited = checked_add(current.total_deposited, amount)?;
            VaultEvent::Deposited {
                amount,
                balance: next.balance,
            }
        }

        Operation::Withdraw { amount } => {
            require_state(current, &[VaultState::Active], "Active")?;
            let amount = *amount;
            if amount == 0 {
                return Err(VaultError::InvalidAmount);
            }
            if amount > current.balance {
                return Err(VaultError::InsufficientBalance {
                    requested: amount,
                    available: current.balance,
                });
            }
            next.balance = checked_sub(current.balance, amount)?;
            next.total_withdrawn = checked_add(current.total_withdrawn, amount)?;
            VaultEvent::Withdrawn {
                amount,
                balance: next.balance,
            }
        }

        Operation::Pause => {
            require_state(current, &[VaultState::Active], "Active")?;
            next.state = VaultState::Paused;
            VaultEvent::Paused
        }

        Operation::Resume => {
            require_state(current, &[VaultState::Paused], "Paused")?;
            next.state = VaultState::Active;
            VaultEvent::Resumed
        }

        Operation::Close => {
            require_live(current)?;
            if current.balance != 0 {
                return Err(VaultError::NonZeroBalance {
                    balance: current.balance,
                });
            }
            next.state = VaultState::Closed;
            next.pending_authority = None;
            VaultEvent::Closed
        }

        Operation::ProposeTransfer { new_authority } => {
            require_live(current)?;
            if new_authority.is_zero() {
                return Err(VaultError::InvalidAuthority("zero identity"));
            }
            if *new_authority == current.authority {
                return Err(VaultError::InvalidAuthority("already the authority"));
            }
            next.pending_authority = Some(*new_authority);
            VaultEvent::TransferProposed {
                current: current.authority,
                proposed: *new_authority,
            }
        }

        Operation::AcceptTransfer => {
            require_live(current)?;
            let proposed = current
                .pending_authority
                .ok_or(VaultError::NoPendingTransfer)?;
            next.authority = proposed;
            next.pending_authority = None;
            VaultEvent::TransferAccepted {
                previous: current.authority,
                authority: proposed,
            }
        }

        Operation::CancelTransfer => {
            require_live(current)?;
            let proposed = current
                .pending_authority
                .ok_or(VaultError::NoPendingTransfer)?;
            next.pending_authority = None;
            VaultEvent::TransferCancelled { proposed }
        }
    };

    next.nonce = checked_add(current.nonce, 1)?;
    Ok(Transition {
        account: next,
        event,
    })
}

fn require_state(
    account: &VaultAccount,
    allowed: &[VaultState],
    expected: &'static str,
) -> Result<(), VaultError> {
    if allowed.contains(&account.state) {
        Ok(())
    } else {
        Err(VaultError::InvalidState {
            current: account.state,
            expected,
        })
    }
}

fn require_live(account: &VaultAccount) -> Result<(), VaultError> {
    require_state(
        account,
        &[VaultState::Active, VaultState::Paused],
        "Active or Paused",
    )
}
