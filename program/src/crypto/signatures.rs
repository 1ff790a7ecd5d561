//! # Signature Verification
//!
//! Invocations arrive with zero or more `(signer, signature)` pairs. Every
//! pair must verify against the same signable bytes; a single bad entry
//! rejects the whole batch and we do not say which one.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::keys::{Pubkey, Signature, VaultKeypair};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature verification failed")]
    VerificationFailed,
}

/// One signer's approval of an invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureEntry {
    pub signer: Pubkey,
    pub signature: Signature,
}

impl SignatureEntry {
    /// Sign `message` with `keypair` and pair the result with its public key.
    pub fn sign(keypair: &VaultKeypair, message: &[u8]) -> Self {
        Self {
            signer: keypair.pubkey(),
            signature: keypair.sign(message),
        }
    }
}

/// Verify every entry against `message`.
///
/// Sequential: invocations carry one or two signatures.
pub fn verify_all(message: &[u8], entries: &[SignatureEntry]) -> Result<(), SignatureError> {
    for entry in entries {
        if !entry.signature.verify(&entry.signer, message) {
            return Err(SignatureError::VerificationFailed);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_valid_entries_pass() {
        let entries: Vec<_> = (0..3)
            .map(|_| SignatureEntry::sign(&VaultKeypair::generate(), b"withdraw 10"))
            .collect();
        assert!(verify_all(b"withdraw 10", &entries).is_ok());
    }

    #[test]
    fn one_bad_entry_fails_the_batch() {
        let kp1 = VaultKeypair::generate();
        let kp2 = VaultKeypair::generate();
        let mut bad = SignatureEntry::sign(&kp2, b"withdraw 10");
        bad.signer = kp1.pubkey();
        let entries = vec![SignatureEntry::sign(&kp1, b"withdraw 10"), bad];
        assert_eq!(
            verify_all(b"withdraw 10", &entries),
            Err(SignatureError::VerificationFailed)
        );
    }

    #[test]
    fn empty_batch_is_vacuously_valid() {
        assert!(verify_all(b"anything", &[]).is_ok());
    }
}
