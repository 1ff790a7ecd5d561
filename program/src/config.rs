//! # Program Configuration & Constants
//!
//! Every magic number in the vault program lives here. The persisted
//! layout constants are load-bearing: changing any of them orphans every
//! record already written, so bump [`SCHEMA_VERSION`] instead of editing
//! in place.

// ---------------------------------------------------------------------------
// Account Layout
// ---------------------------------------------------------------------------

/// Seed hashed into the 8-byte account discriminator. The discriminator is
/// the first 8 bytes of `SHA-256("account:VaultAccount")`, so records of a
/// different type (or from a different program) are rejected on read.
pub const ACCOUNT_DISCRIMINATOR_SEED: &[u8] = b"account:VaultAccount";

/// Discriminator length in bytes.
pub const DISCRIMINATOR_LENGTH: usize = 8;

/// Current persisted schema version. Written right after the discriminator.
pub const SCHEMA_VERSION: u8 = 1;

/// Length of the fixed record body (everything between the version byte and
/// the checksum).
///
/// 4 identities × 32 bytes + state tag (1) + 5 × u64 counters.
pub const RECORD_BODY_LENGTH: usize = 4 * 32 + 1 + 5 * 8;

/// Trailing checksum length. The first 4 bytes of BLAKE3 over the header and
/// body. Catches torn writes; not an authentication tag.
pub const CHECKSUM_LENGTH: usize = 4;

/// Total encoded length of a [`VaultAccount`](crate::account::VaultAccount).
pub const ACCOUNT_LENGTH: usize = DISCRIMINATOR_LENGTH + 1 + RECORD_BODY_LENGTH + CHECKSUM_LENGTH;

// ---------------------------------------------------------------------------
// Addressing & Signing
// ---------------------------------------------------------------------------

/// Seed for deterministic vault addresses.
pub const VAULT_SEED: &[u8] = b"genius-vault";

/// Domain separator prepended to every signable invocation so a signature
/// over a vault operation can never be replayed as some other message.
pub const SIGNING_DOMAIN: &[u8] = b"genius-vault:invocation:v1";

/// Ed25519 public key length.
pub const PUBKEY_LENGTH: usize = 32;

/// Ed25519 signature length.
pub const SIGNATURE_LENGTH: usize = 64;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Per-deposit cap applied when Initialize does not supply one. Deposits
/// must be strictly below the cap.
pub const DEFAULT_MAX_DEPOSIT: u64 = u64::MAX;

/// Nonce of an account that has never been written.
pub const UNINITIALIZED_NONCE: u64 = 0;
