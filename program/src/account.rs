//! # Vault Account Schema
//!
//! The persisted record of one vault and its fixed binary layout.
//!
//! ## Layout
//!
//! | Offset | Length | Field                                         |
//! |--------|--------|-----------------------------------------------|
//! | 0      | 8      | discriminator (`SHA-256("account:VaultAccount")[..8]`) |
//! | 8      | 1      | schema version                                |
//! | 9      | 169    | body (bincode, fixed-width little-endian)     |
//! | 178    | 4      | checksum (`BLAKE3(bytes[..178])[..4]`)        |
//!
//! The body is a struct of fixed-size fields only, so bincode's default
//! fixint encoding yields the same length for every account and the same
//! bytes for the same logical state. The optional pending authority is
//! stored as the zero identity when absent.
//!
//! Storage that is empty or entirely zero is an *uninitialized* account,
//! which is how ledgers hand out freshly allocated space. Anything else that
//! fails to decode is foreign or corrupt, and is reported rather than
//! silently treated as free.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::config::{
    ACCOUNT_DISCRIMINATOR_SEED, ACCOUNT_LENGTH, CHECKSUM_LENGTH, DISCRIMINATOR_LENGTH,
    RECORD_BODY_LENGTH, SCHEMA_VERSION, VAULT_SEED,
};
use crate::crypto::Pubkey;
use crate::error::DecodeError;

// ---------------------------------------------------------------------------
// VaultState
// ---------------------------------------------------------------------------

/// Lifecycle state of a vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VaultState {
    /// No valid record exists. Never persisted.
    Uninitialized,
    /// Accepting deposits and withdrawals.
    Active,
    /// Frozen by the authority; only Resume, Close and authority transfer apply.
    Paused,
    /// Terminal. No balance-affecting operation succeeds.
    Closed,
}

impl VaultState {
    fn to_tag(self) -> u8 {
        match self {
            VaultState::Uninitialized => 0,
            VaultState::Active => 1,
            VaultState::Paused => 2,
            VaultState::Closed => 3,
        }
    }

    /// Persisted states only; `Uninitialized` is the absence of a record.
    fn from_tag(tag: u8) -> Result<Self, DecodeError> {
        match tag {
            1 => Ok(VaultState::Active),
            2 => Ok(VaultState::Paused),
            3 => Ok(VaultState::Closed),
            other => Err(DecodeError::InvalidField {
                field: "state",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for VaultState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VaultState::Uninitialized => write!(f, "Uninitialized"),
            VaultState::Active => write!(f, "Active"),
            VaultState::Paused => write!(f, "Paused"),
            VaultState::Closed => write!(f, "Closed"),
        }
    }
}

// ---------------------------------------------------------------------------
// VaultAccount
// ---------------------------------------------------------------------------

/// The persisted state of one vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultAccount {
    /// Account key. Fixed at Initialize.
    pub address: Pubkey,
    /// Principal allowed to invoke privileged operations.
    pub authority: Pubkey,
    /// Proposed successor awaiting `AcceptTransfer`.
    pub pending_authority: Option<Pubkey>,
    /// Asset this vault custodies.
    pub mint: Pubkey,
    pub state: VaultState,
    /// Largest single deposit accepted.
    pub max_deposit: u64,
    pub balance: u64,
    /// Never decreases.
    pub total_deposited: u64,
    /// Never decreases.
    pub total_withdrawn: u64,
    /// Incremented by every committed operation.
    pub nonce: u64,
}

/// Fixed-width on-disk body. Kept separate from [`VaultAccount`] so the
/// public type can use `Option` and enums without affecting the layout.
#[derive(Serialize, Deserialize)]
struct RecordBody {
    address: [u8; 32],
    authority: [u8; 32],
    pending_authority: [u8; 32],
    mint: [u8; 32],
    state: u8,
    max_deposit: u64,
    balance: u64,
    total_deposited: u64,
    total_withdrawn: u64,
    nonce: u64,
}

impl VaultAccount {
    /// A freshly initialized vault: Active, empty, nonce 1.
    pub fn new(address: Pubkey, authority: Pubkey, mint: Pubkey, max_deposit: u64) -> Self {
        Self {
            address,
            authority,
            pending_authority: None,
            mint,
            state: VaultState::Active,
            max_deposit,
            balance: 0,
            total_deposited: 0,
            total_withdrawn: 0,
            nonce: 1,
        }
    }

    /// Serialize to the fixed layout. Deterministic: equal accounts always
    /// encode to identical bytes.
    pub fn encode(&self) -> Result<Vec<u8>, DecodeError> {
        let body = RecordBody {
            address: self.address.to_bytes(),
            authority: self.authority.to_bytes(),
            pending_authority: self.pending_authority.unwrap_or(Pubkey::ZERO).to_bytes(),
            mint: self.mint.to_bytes(),
            state: self.state.to_tag(),
            max_deposit: self.max_deposit,
            balance: self.balance,
            total_deposited: self.total_deposited,
            total_withdrawn: self.total_withdrawn,
            nonce: self.nonce,
        };
        let body_bytes =
            bincode::serialize(&body).map_err(|e| DecodeError::Serialization(e.to_string()))?;
        if body_bytes.len() != RECORD_BODY_LENGTH {
            return Err(DecodeError::Serialization(format!(
                "body encoded to {} bytes, layout requires {}",
                body_bytes.len(),
                RECORD_BODY_LENGTH
            )));
        }

        let mut out = Vec::with_capacity(ACCOUNT_LENGTH);
        out.extend_from_slice(&account_discriminator());
        out.push(SCHEMA_VERSION);
        out.extend_from_slice(&body_bytes);
        let checksum = record_checksum(&out);
        out.extend_from_slice(&checksum);
        Ok(out)
    }

    /// Parse the fixed layout.
    ///
    /// Checks run outermost first: length for the discriminator, the
    /// discriminator itself, the full length, the version, the checksum,
    /// then the body fields.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() < DISCRIMINATOR_LENGTH {
            return Err(DecodeError::Truncated {
                expected: ACCOUNT_LENGTH,
                found: bytes.len(),
            });
        }

        let expected_disc = account_discriminator();
        if bytes[..DISCRIMINATOR_LENGTH] != expected_disc {
            return Err(DecodeError::SchemaMismatch {
                tag: "discriminator",
                expected: hex::encode(expected_disc),
                found: hex::encode(&bytes[..DISCRIMINATOR_LENGTH]),
            });
        }

        if bytes.len() < ACCOUNT_LENGTH {
            return Err(DecodeError::Truncated {
                expected: ACCOUNT_LENGTH,
                found: bytes.len(),
            });
        }
        if bytes.len() > ACCOUNT_LENGTH {
            return Err(DecodeError::SchemaMismatch {
                tag: "length",
                expected: ACCOUNT_LENGTH.to_string(),
                found: bytes.len().to_string(),
            });
        }

        let version = bytes[DISCRIMINATOR_LENGTH];
        if version != SCHEMA_VERSION {
            return Err(DecodeError::SchemaMismatch {
                tag: "version",
                expected: SCHEMA_VERSION.to_string(),
                found: version.to_string(),
            });
        }

        let checked_len = ACCOUNT_LENGTH - CHECKSUM_LENGTH;
        if record_checksum(&bytes[..checked_len]) != bytes[checked_len..] {
            return Err(DecodeError::ChecksumMismatch);
        }

        let body: RecordBody = bincode::deserialize(&bytes[DISCRIMINATOR_LENGTH + 1..checked_len])
            .map_err(|e| DecodeError::Serialization(e.to_string()))?;

        let pending = Pubkey::new(body.pending_authority);
        Ok(Self {
            address: Pubkey::new(body.address),
            authority: Pubkey::new(body.authority),
            pending_authority: (!pending.is_zero()).then_some(pending),
            mint: Pubkey::new(body.mint),
            state: VaultState::from_tag(body.state)?,
            max_deposit: body.max_deposit,
            balance: body.balance,
            total_deposited: body.total_deposited,
            total_withdrawn: body.total_withdrawn,
            nonce: body.nonce,
        })
    }

    /// Decode stored bytes, treating empty or zeroed storage as no account.
    pub fn try_load(bytes: &[u8]) -> Result<Option<Self>, DecodeError> {
        if is_uninitialized(bytes) {
            return Ok(None);
        }
        Self::decode(bytes).map(Some)
    }

    /// `true` once the account no longer accepts balance-affecting operations.
    pub fn is_closed(&self) -> bool {
        self.state == VaultState::Closed
    }
}

/// First 8 bytes of `SHA-256("account:VaultAccount")`.
pub fn account_discriminator() -> [u8; DISCRIMINATOR_LENGTH] {
    let digest = Sha256::digest(ACCOUNT_DISCRIMINATOR_SEED);
    let mut out = [0u8; DISCRIMINATOR_LENGTH];
    out.copy_from_slice(&digest[..DISCRIMINATOR_LENGTH]);
    out
}

/// `true` for storage no record has ever been written to.
pub fn is_uninitialized(bytes: &[u8]) -> bool {
    bytes.iter().all(|b| *b == 0)
}

fn record_checksum(bytes: &[u8]) -> [u8; CHECKSUM_LENGTH] {
    let hash = blake3::hash(bytes);
    let mut out = [0u8; CHECKSUM_LENGTH];
    out.copy_from_slice(&hash.as_bytes()[..CHECKSUM_LENGTH]);
    out
}

/// Deterministic vault address for an `(authority, mint)` pair.
///
/// `BLAKE3(VAULT_SEED || authority || mint)`. The result is a hash, not a
/// curve point, so no keypair can ever sign as the vault itself.
pub fn derive_vault_address(authority: &Pubkey, mint: &Pubkey) -> Pubkey {
    let mut hasher = blake3::Hasher::new();
    hasher.update(VAULT_SEED);
    hasher.update(authority.as_bytes());
    hasher.update(mint.as_bytes());
    Pubkey::new(*hasher.finalize().as_bytes())
}
