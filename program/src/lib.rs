// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # GeniusVault: Custody Account State Machine
//!
//! The ledger-agnostic core of the GeniusVault program: everything a
//! deposit/custody program has to get right regardless of which runtime
//! schedules it. The runtime is assumed to give us exactly one thing:
//! exclusive access to an account's storage for the duration of one
//! invocation. Everything else lives here.
//!
//! ## Architecture
//!
//! ```text
//! crypto      — Ed25519 identities and signatures
//! account     — VaultAccount record and its fixed binary layout
//! authority   — SignerSet and the per-operation authority rule
//! instruction — Operations, invocations, signable bytes
//! lifecycle   — Uninitialized → Active ⇄ Paused → Closed transitions
//! invariants  — Post-state checks run before every commit
//! events      — Audit events and receipts
//! store       — AccountStore trait, in-memory and sled backends
//! processor   — read once → validate → write once
//! ```
//!
//! ## Design Principles
//!
//! 1. The transition function is pure: `(state, operation, signers) →
//!    new state | error`. No locks, no I/O, no clocks.
//! 2. All balance arithmetic is checked. Wrapping arithmetic and money do
//!    not mix.
//! 3. States are enum variants, not boolean flags.
//! 4. Nothing is persisted unless every check passed. There is no partial
//!    commit to roll back.

pub mod account;
pub mod authority;
pub mod config;
pub mod crypto;
pub mod error;
pub mod events;
pub mod instruction;
pub mod invariants;
pub mod lifecycle;
pub mod processor;
pub mod store;

pub use account::{derive_vault_address, VaultAccount, VaultState};
pub use authority::SignerSet;
pub use crypto::{Pubkey, Signature, VaultKeypair};
pub use error::{DecodeError, ProcessError, StoreError, VaultError};
pub use events::{Receipt, VaultEvent};
pub use instruction::{Invocation, Operation, OperationTag, SignedInvocation};
pub use processor::{load, process, process_signed};
pub use store::{AccountStore, MemoryStore, SledStore};
