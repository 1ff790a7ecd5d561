//! # Cryptographic Primitives
//!
//! Thin, typed wrappers around ed25519-dalek.

pub mod keys;
pub mod signatures;

pub use keys::{KeyError, Pubkey, Signature, VaultKeypair};
pub use signatures::{verify_all, SignatureEntry};
