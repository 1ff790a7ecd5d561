//! # Operations & Invocations
//!
//! An [`Invocation`] names a vault, the nonce the caller believes the vault
//! is at, and the [`Operation`] to apply. Signers approve an invocation by
//! signing its [`signable_bytes`](Invocation::signable_bytes); the
//! processor never infers who signed from ambient context.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::authority::SignerSet;
use crate::config::SIGNING_DOMAIN;
use crate::crypto::{verify_all, Pubkey, SignatureEntry, VaultKeypair};
use crate::error::VaultError;

/// A state-changing request against one vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Create the vault. `authority` must sign.
    Initialize {
        authority: Pubkey,
        mint: Pubkey,
        max_deposit: u64,
    },
    Deposit {
        amount: u64,
    },
    Withdraw {
        amount: u64,
    },
    Pause,
    Resume,
    Close,
    /// First half of an authority transfer. Signed by the current authority.
    ProposeTransfer {
        new_authority: Pubkey,
    },
    /// Second half. Signed by the proposed authority.
    AcceptTransfer,
    /// Withdraw a pending proposal. Signed by the current authority.
    CancelTransfer,
}

/// Field-less name of an [`Operation`], for logs and error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationTag {
    Initialize,
    Deposit,
    Withdraw,
    Pause,
    Resume,
    Close,
    ProposeTransfer,
    AcceptTransfer,
    CancelTransfer,
}

impl OperationTag {
    fn code(self) -> u8 {
        match self {
            OperationTag::Initialize => 0,
            OperationTag::Deposit => 1,
            OperationTag::Withdraw => 2,
            OperationTag::Pause => 3,
            OperationTag::Resume => 4,
            OperationTag::Close => 5,
            OperationTag::ProposeTransfer => 6,
            OperationTag::AcceptTransfer => 7,
            OperationTag::CancelTransfer => 8,
        }
    }
}

impl fmt::Display for OperationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationTag::Initialize => "initialize",
            OperationTag::Deposit => "deposit",
            OperationTag::Withdraw => "withdraw",
            OperationTag::Pause => "pause",
            OperationTag::Resume => "resume",
            OperationTag::Close => "close",
            OperationTag::ProposeTransfer => "propose_transfer",
            OperationTag::AcceptTransfer => "accept_transfer",
            OperationTag::CancelTransfer => "cancel_transfer",
        };
        write!(f, "{}", name)
    }
}

impl Operation {
    pub fn tag(&self) -> OperationTag {
        match self {
            Operation::Initialize { .. } => OperationTag::Initialize,
            Operation::Deposit { .. } => OperationTag::Deposit,
            Operation::Withdraw { .. } => OperationTag::Withdraw,
            Operation::Pause => OperationTag::Pause,
            Operation::Resume => OperationTag::Resume,
            Operation::Close => OperationTag::Close,
            Operation::ProposeTransfer { .. } => OperationTag::ProposeTransfer,
            Operation::AcceptTransfer => OperationTag::AcceptTransfer,
            Operation::CancelTransfer => OperationTag::CancelTransfer,
        }
    }
}

// ---------------------------------------------------------------------------
// Invocation
// ---------------------------------------------------------------------------

/// One operation addressed to one vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    pub address: Pubkey,
    /// The account nonce this invocation was built against. 0 for Initialize.
    pub nonce: u64,
    pub operation: Operation,
}

impl Invocation {
    pub fn new(address: Pubkey, nonce: u64, operation: Operation) -> Self {
        Self {
            address,
            nonce,
            operation,
        }
    }

    /// Canonical bytes that signers approve.
    ///
    /// Layout: domain tag, 0x00, address (32), nonce (8 LE), operation code
    /// (1), then the operation's arguments in declaration order. Integers
    /// are little-endian, identities raw.
    pub fn signable_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(SIGNING_DOMAIN.len() + 1 + 32 + 8 + 1 + 72);

        buf.extend_from_slice(SIGNING_DOMAIN);
        buf.push(0x00);
        buf.extend_from_slice(self.address.as_bytes());
        buf.extend_from_slice(&self.nonce.to_le_bytes());
        buf.push(self.operation.tag().code());

        match &self.operation {
            Operation::Initialize {
                authority,
                mint,
                max_deposit,
            } => {
                buf.extend_from_slice(authority.as_bytes());
                buf.extend_from_slice(mint.as_bytes());
                buf.extend_from_slice(&max_deposit.to_le_bytes());
            }
            Operation::Deposit { amount } | Operation::Withdraw { amount } => {
                buf.extend_from_slice(&amount.to_le_bytes());
            }
            Operation::ProposeTransfer { new_authority } => {
                buf.extend_from_slice(new_authority.as_bytes());
            }
            Operation::Pause
            | Operation::Resume
            | Operation::Close
            | Operation::AcceptTransfer
            | Operation::CancelTransfer => {}
        }

        buf
    }

    /// Sign with each keypair, producing a submittable invocation.
    pub fn sign(self, keypairs: &[&VaultKeypair]) -> SignedInvocation {
        let message = self.signable_bytes();
        let signatures = keypairs
            .iter()
            .map(|kp| SignatureEntry::sign(kp, &message))
            .collect();
        SignedInvocation {
            invocation: self,
            signatures,
        }
    }
}

/// An invocation together with its signatures, as it arrives off the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedInvocation {
    pub invocation: Invocation,
    pub signatures: Vec<SignatureEntry>,
}

impl SignedInvocation {
    /// Verify every signature and return who signed.
    pub fn verify(&self) -> Result<SignerSet, VaultError> {
        let message = self.invocation.signable_bytes();
        verify_all(&message, &self.signatures).map_err(|_| VaultError::InvalidSignature)?;
        Ok(self.signatures.iter().map(|entry| entry.signer).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deposit(amount: u64, nonce: u64) -> Invocation {
        Invocation::new(Pubkey::new([5u8; 32]), nonce, Operation::Deposit { amount })
    }

    #[test]
    fn signable_bytes_cover_amount_and_nonce() {
        let base = deposit(100, 3).signable_bytes();
        assert_ne!(base, deposit(101, 3).signable_bytes());
        assert_ne!(base, deposit(100, 4).signable_bytes());
        assert!(base.starts_with(SIGNING_DOMAIN));
    }

    #[test]
    fn deposit_and_withdraw_sign_differently() {
        let addr = Pubkey::new([5u8; 32]);
        let d = Invocation::new(addr, 1, Operation::Deposit { amount: 10 });
        let w = Invocation::new(addr, 1, Operation::Withdraw { amount: 10 });
        assert_ne!(d.signable_bytes(), w.signable_bytes());
    }

    #[test]
    fn signed_invocation_yields_signer_set() {
        let kp = VaultKeypair::generate();
        let signed = deposit(100, 1).sign(&[&kp]);
        let signers = signed.verify().unwrap();
        assert!(signers.contains(&kp.pubkey()));
        assert_eq!(signers.len(), 1);
    }

    #[test]
    fn tampered_invocation_fails_verification() {
        let kp = VaultKeypair::generate();
        let mut signed = deposit(100, 1).sign(&[&kp]);
        signed.invocation.operation = Operation::Deposit { amount: 1_000_000 };
        assert!(matches!(signed.verify(), Err(VaultError::InvalidSignature)));
    }

    #[test]
    fn unsigned_invocation_has_empty_signer_set() {
        let signed = deposit(100, 1).sign(&[]);
        assert!(signed.verify().unwrap().is_empty());
    }

    #[test]
    fn tags_display_in_snake_case() {
        assert_eq!(OperationTag::ProposeTransfer.to_string(), "propose_transfer");
        assert_eq!(Operation::Close.tag(), OperationTag::Close);
    }
}
