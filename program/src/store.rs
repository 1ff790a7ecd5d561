//! # Account Storage
//!
//! The processor sees storage only through [`AccountStore`]: one opaque byte
//! region per vault address, read once and written at most once per
//! invocation. Two backends ship with the crate:
//!
//! | Backend         | Use                                       |
//! |-----------------|-------------------------------------------|
//! | [`MemoryStore`] | tests, benches, embedding in a host       |
//! | [`SledStore`]   | the node's persistent on-disk store       |
//!
//! ## Sled Layout
//!
//! | Tree     | Key                  | Value                       |
//! |----------|----------------------|-----------------------------|
//! | `vaults` | vault address (32B)  | encoded `VaultAccount` record |
//!
//! Values are stored exactly as [`VaultAccount::encode`](crate::VaultAccount::encode)
//! produced them; the store never interprets them.

use sled::{Db, Tree};
use std::collections::BTreeMap;
use std::path::Path;

use crate::crypto::Pubkey;
use crate::error::StoreError;

/// Name of the sled tree holding vault records.
const VAULTS_TREE: &str = "vaults";

/// Byte-region storage keyed by vault address.
pub trait AccountStore {
    /// The stored bytes for `address`, or `None` if nothing was ever written.
    fn get(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replace the bytes for `address`.
    fn set(&mut self, address: &Pubkey, data: &[u8]) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-memory store. Ordered so that iteration is deterministic.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    regions: BTreeMap<Pubkey, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn addresses(&self) -> Vec<Pubkey> {
        self.regions.keys().copied().collect()
    }
}

impl AccountStore for MemoryStore {
    fn get(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.regions.get(address).cloned())
    }

    fn set(&mut self, address: &Pubkey, data: &[u8]) -> Result<(), StoreError> {
        self.regions.insert(*address, data.to_vec());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SledStore
// ---------------------------------------------------------------------------

/// Persistent store backed by sled.
///
/// Cloning is cheap and clones share the same underlying database.
#[derive(Debug, Clone)]
pub struct SledStore {
    db: Db,
    vaults: Tree,
}

impl SledStore {
    /// Open or create a store at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// A store that is discarded when dropped.
    pub fn open_temporary() -> Result<Self, StoreError> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> Result<Self, StoreError> {
        let vaults = db.open_tree(VAULTS_TREE)?;
        Ok(Self { db, vaults })
    }

    /// Number of stored vault records.
    pub fn len(&self) -> usize {
        self.vaults.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vaults.is_empty()
    }

    /// All stored vault addresses, in key order.
    pub fn addresses(&self) -> Result<Vec<Pubkey>, StoreError> {
        self.vaults
            .iter()
            .keys()
            .map(|key| {
                let key = key?;
                Pubkey::try_from_slice(&key).map_err(|_| StoreError::InvalidKey(hex::encode(&key)))
            })
            .collect()
    }
}

impl AccountStore for SledStore {
    fn get(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.vaults.get(address.as_bytes())?.map(|v| v.to_vec()))
    }

    fn set(&mut self, address: &Pubkey, data: &[u8]) -> Result<(), StoreError> {
        self.vaults.insert(address.as_bytes(), data)?;
        self.db.flush()?;
        Ok(())
    }
}
