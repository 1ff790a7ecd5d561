//! # Invocation Processor
//!
//! One invocation, one account, one pass:
//!
//! ```text
//! read region ─► decode ─► lifecycle::execute ─► encode ─► write region
//!                  │              │                 │
//!                  └──── any error: return, region untouched ────┘
//! ```
//!
//! The account bytes are read exactly once and written at most once, after
//! every check has passed. A rejected invocation leaves storage
//! byte-for-byte as it found it.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::account::VaultAccount;
use crate::authority::SignerSet;
use crate::crypto::Pubkey;
use crate::error::{DecodeError, ProcessError, VaultError};
use crate::events::Receipt;
use crate::instruction::{Invocation, SignedInvocation};
use crate::lifecycle::{execute, Transition};
use crate::store::AccountStore;

/// Apply `invocation` to its vault, approved by `signers`.
///
/// `signers` is trusted as given: callers that receive invocations off the
/// wire should go through [`process_signed`] instead.
pub fn process<S: AccountStore + ?Sized>(
    store: &mut S,
    invocation: &Invocation,
    signers: &SignerSet,
) -> Result<Receipt, ProcessError> {
    let address = invocation.address;
    let operation = invocation.operation.tag();

    match commit(store, invocation, signers) {
        Ok(transition) => {
            info!(
                address = %address,
                operation = %operation,
                nonce = transition.account.nonce,
                state = %transition.account.state,
                balance = transition.account.balance,
                "invocation committed"
            );
            Ok(Receipt {
                address,
                operation,
                nonce: transition.account.nonce,
                event: transition.event,
                processed_at: Utc::now(),
            })
        }
        Err(kind) => {
            warn!(
                address = %address,
                operation = %operation,
                kind = kind.kind(),
                error = %kind,
                "invocation rejected"
            );
            Err(ProcessError::new(address, operation, kind))
        }
    }
}

/// Verify the signatures on `signed`, then [`process`] it with the
/// resulting signer set.
pub fn process_signed<S: AccountStore + ?Sized>(
    store: &mut S,
    signed: &SignedInvocation,
) -> Result<Receipt, ProcessError> {
    let invocation = &signed.invocation;
    let signers = signed.verify().map_err(|kind| {
        warn!(
            address = %invocation.address,
            operation = %invocation.operation.tag(),
            kind = kind.kind(),
            "signature verification failed"
        );
        ProcessError::new(invocation.address, invocation.operation.tag(), kind)
    })?;
    process(store, invocation, &signers)
}

/// Read and decode the vault at `address`. `Ok(None)` if it was never
/// initialized.
///
/// A record whose own address differs from the key it is stored under is
/// rejected as undecodable.
pub fn load<S: AccountStore + ?Sized>(
    store: &S,
    address: &Pubkey,
) -> Result<Option<VaultAccount>, VaultError> {
    let bytes = store.get(address)?;
    debug!(address = %address, found = bytes.is_some(), "account region read");
    match VaultAccount::try_load(bytes.as_deref().unwrap_or_default())? {
        Some(acct) if acct.address != *address => Err(DecodeError::InvalidField {
            field: "address",
            value: acct.address.to_string(),
        }
        .into()),
        loaded => Ok(loaded),
    }
}

fn commit<S: AccountStore + ?Sized>(
    store: &mut S,
    invocation: &Invocation,
    signers: &SignerSet,
) -> Result<Transition, VaultError> {
    let current = load(&*store, &invocation.address)?;
    let transition = execute(current.as_ref(), invocation, signers)?;

    let encoded = transition.account.encode()?;
    store.set(&invocation.address, &encoded)?;
    debug!(
        address = %invocation.address,
        bytes = encoded.len(),
        "account region written"
    );

    Ok(transition)
}
