//! # Errors
//!
//! Every failure is terminal for the invocation that hit it. The processor
//! never retries and never persists a partial result; retrying is the
//! caller's business.

use thiserror::Error;

use crate::account::VaultState;
use crate::crypto::Pubkey;
use crate::instruction::OperationTag;

// ---------------------------------------------------------------------------
// DecodeError
// ---------------------------------------------------------------------------

/// Malformed persisted data.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Fewer bytes than the layout needs.
    #[error("truncated record: expected {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },

    /// Discriminator, version or length does not belong to this schema.
    #[error("schema mismatch: {tag} expected {expected}, found {found}")]
    SchemaMismatch {
        tag: &'static str,
        expected: String,
        found: String,
    },

    /// Layout is right but the trailing checksum is not. Usually a torn write.
    #[error("checksum mismatch: record is corrupt")]
    ChecksumMismatch,

    /// A field holds a value outside its domain.
    #[error("invalid field {field}: {value}")]
    InvalidField { field: &'static str, value: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

/// Failures of the backing account store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("invalid store key: {0}")]
    InvalidKey(String),
}

// ---------------------------------------------------------------------------
// VaultError
// ---------------------------------------------------------------------------

/// Why an operation was rejected.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The signer set does not contain the principal this operation needs.
    #[error("unauthorized: {required} did not sign")]
    Unauthorized { required: Pubkey },

    /// The operation is not legal from the account's current state.
    #[error("invalid state: account is {current}, operation requires {expected}")]
    InvalidState {
        current: VaultState,
        expected: &'static str,
    },

    #[error("account already initialized")]
    AlreadyInitialized,

    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    /// A post-condition failed on the tentative post-state.
    #[error("invariant violation: {0}")]
    InvariantViolation(&'static str),

    #[error("insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: u64, available: u64 },

    #[error("cannot close: balance is {balance}")]
    NonZeroBalance { balance: u64 },

    #[error("invalid amount: must be greater than zero")]
    InvalidAmount,

    #[error("deposit of {amount} is not below the per-deposit cap of {max_deposit}")]
    ExceededMaxDeposit { amount: u64, max_deposit: u64 },

    #[error("invalid authority: {0}")]
    InvalidAuthority(&'static str),

    #[error("no authority transfer is pending")]
    NoPendingTransfer,

    /// The invocation was built against a different account version.
    #[error("stale nonce: account is at {expected}, invocation carries {provided}")]
    StaleNonce { expected: u64, provided: u64 },

    #[error("invalid signature")]
    InvalidSignature,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl VaultError {
    /// Stable snake_case name of the error kind, for logs and audit lines.
    pub fn kind(&self) -> &'static str {
        match self {
            VaultError::Decode(DecodeError::Truncated { .. }) => "truncated",
            VaultError::Decode(DecodeError::SchemaMismatch { .. }) => "schema_mismatch",
            VaultError::Decode(DecodeError::ChecksumMismatch) => "checksum_mismatch",
            VaultError::Decode(DecodeError::InvalidField { .. }) => "invalid_field",
            VaultError::Decode(DecodeError::Serialization(_)) => "serialization",
            VaultError::Unauthorized { .. } => "unauthorized",
            VaultError::InvalidState { .. } => "invalid_state",
            VaultError::AlreadyInitialized => "already_initialized",
            VaultError::ArithmeticOverflow => "arithmetic_overflow",
            VaultError::InvariantViolation(_) => "invariant_violation",
            VaultError::InsufficientBalance { .. } => "insufficient_balance",
            VaultError::NonZeroBalance { .. } => "non_zero_balance",
            VaultError::InvalidAmount => "invalid_amount",
            VaultError::ExceededMaxDeposit { .. } => "exceeded_max_deposit",
            VaultError::InvalidAuthority(_) => "invalid_authority",
            VaultError::NoPendingTransfer => "no_pending_transfer",
            VaultError::StaleNonce { .. } => "stale_nonce",
            VaultError::InvalidSignature => "invalid_signature",
            VaultError::Store(_) => "store",
        }
    }
}

// ---------------------------------------------------------------------------
// ProcessError
// ---------------------------------------------------------------------------

/// A rejected invocation, tagged with what was attempted and where.
///
/// This is what operators reconcile against, so the address and operation
/// are carried verbatim alongside the error kind.
#[derive(Debug, Error)]
#[error("{operation} on vault {address} failed: {kind}")]
pub struct ProcessError {
    pub address: Pubkey,
    pub operation: OperationTag,
    #[source]
    pub kind: VaultError,
}

impl ProcessError {
    pub fn new(address: Pubkey, operation: OperationTag, kind: VaultError) -> Self {
        Self {
            address,
            operation,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_error_names_address_operation_and_kind() {
        let address = Pubkey::new([9u8; 32]);
        let err = ProcessError::new(
            address,
            OperationTag::Withdraw,
            VaultError::InsufficientBalance {
                requested: 150,
                available: 100,
            },
        );
        let msg = err.to_string();
        assert!(msg.contains("withdraw"));
        assert!(msg.contains(&address.to_string()));
        assert!(msg.contains("insufficient balance"));
        assert_eq!(err.kind.kind(), "insufficient_balance");
    }

    #[test]
    fn decode_errors_keep_their_kind() {
        let err: VaultError = DecodeError::ChecksumMismatch.into();
        assert_eq!(err.kind(), "checksum_mismatch");
        let err: VaultError = DecodeError::Truncated {
            expected: 182,
            found: 10,
        }
        .into();
        assert_eq!(err.kind(), "truncated");
    }
}
