//! Subcommand implementations.
//!
//! Kept free of argument parsing and printing so each one can be driven
//! against a temporary store in tests.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

use genius_vault::config::UNINITIALIZED_NONCE;
use genius_vault::{
    derive_vault_address, load, process_signed, Invocation, Operation, Pubkey, Receipt, SledStore,
    VaultAccount, VaultKeypair,
};

/// Output of `keygen` and `address`.
#[derive(Debug, Serialize)]
pub struct KeyInfo {
    pub pubkey: Pubkey,
    pub hex: String,
}

impl From<Pubkey> for KeyInfo {
    fn from(pubkey: Pubkey) -> Self {
        Self {
            hex: pubkey.to_hex(),
            pubkey,
        }
    }
}

/// Generate a keypair and write its secret (hex) to `out`.
pub fn keygen(out: &Path) -> Result<KeyInfo> {
    if out.exists() {
        bail!("refusing to overwrite existing key file {}", out.display());
    }

    let keypair = VaultKeypair::generate();
    fs::write(out, keypair.to_hex())
        .with_context(|| format!("failed to write key to {}", out.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(out, fs::Permissions::from_mode(0o600))
            .with_context(|| format!("failed to restrict permissions on {}", out.display()))?;
    }

    tracing::info!(pubkey = %keypair.pubkey(), path = %out.display(), "keypair generated");
    Ok(keypair.pubkey().into())
}

pub fn read_keypair(path: &Path) -> Result<VaultKeypair> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read key file {}", path.display()))?;
    VaultKeypair::from_hex(&contents)
        .with_context(|| format!("{} does not hold a hex-encoded secret key", path.display()))
}

pub fn open_store(data_dir: &Path) -> Result<SledStore> {
    fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;
    let store = SledStore::open(data_dir)
        .with_context(|| format!("failed to open vault database at {}", data_dir.display()))?;
    tracing::debug!(path = %data_dir.display(), vaults = store.len(), "vault database opened");
    Ok(store)
}

/// Create a vault bound to `key` and `mint`, at its derived address.
pub fn init(
    store: &mut SledStore,
    key: &VaultKeypair,
    mint: Pubkey,
    max_deposit: u64,
) -> Result<Receipt> {
    let address = derive_vault_address(&key.pubkey(), &mint);
    submit(
        store,
        key,
        address,
        Operation::Initialize {
            authority: key.pubkey(),
            mint,
            max_deposit,
        },
    )
}

/// Sign `operation` against the vault's current nonce and run it.
pub fn submit(
    store: &mut SledStore,
    key: &VaultKeypair,
    address: Pubkey,
    operation: Operation,
) -> Result<Receipt> {
    let nonce = load(&*store, &address)
        .with_context(|| format!("failed to read vault {}", address))?
        .map_or(UNINITIALIZED_NONCE, |acct| acct.nonce);

    let signed = Invocation::new(address, nonce, operation).sign(&[key]);
    let receipt = process_signed(store, &signed)?;
    Ok(receipt)
}

/// One vault, or every vault in the store.
pub fn show(store: &SledStore, vault: Option<Pubkey>) -> Result<Vec<VaultAccount>> {
    let addresses = match vault {
        Some(address) => vec![address],
        None => store.addresses()?,
    };

    let mut accounts = Vec::with_capacity(addresses.len());
    for address in addresses {
        match load(store, &address).with_context(|| format!("failed to read vault {}", address))? {
            Some(acct) => accounts.push(acct),
            None if vault.is_some() => bail!("no vault at {}", address),
            None => {}
        }
    }
    Ok(accounts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use genius_vault::{VaultEvent, VaultState};

    fn temp_store() -> SledStore {
        SledStore::open_temporary().expect("temp store")
    }

    #[test]
    fn keygen_writes_a_loadable_key_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.hex");

        let info = keygen(&path).unwrap();
        let loaded = read_keypair(&path).unwrap();
        assert_eq!(loaded.pubkey(), info.pubkey);

        assert!(keygen(&path).is_err());
    }

    #[test]
    fn garbage_key_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.hex");
        fs::write(&path, "not hex").unwrap();
        assert!(read_keypair(&path).is_err());
    }

    #[test]
    fn init_deposit_and_show() {
        let mut store = temp_store();
        let key = VaultKeypair::from_seed(&[5u8; 32]);
        let mint = Pubkey::new([0x4D; 32]);

        let receipt = init(&mut store, &key, mint, 1_000).unwrap();
        let address = receipt.address;
        assert_eq!(address, derive_vault_address(&key.pubkey(), &mint));

        let receipt = submit(&mut store, &key, address, Operation::Deposit { amount: 250 }).unwrap();
        assert_eq!(
            receipt.event,
            VaultEvent::Deposited {
                amount: 250,
                balance: 250
            }
        );

        let accounts = show(&store, None).unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].balance, 250);
        assert_eq!(accounts[0].state, VaultState::Active);
    }

    #[test]
    fn rejected_submit_surfaces_the_vault_error() {
        let mut store = temp_store();
        let key = VaultKeypair::from_seed(&[6u8; 32]);
        let receipt = init(&mut store, &key, Pubkey::new([1u8; 32]), 1_000).unwrap();

        let err = submit(
            &mut store,
            &key,
            receipt.address,
            Operation::Withdraw { amount: 1 },
        )
        .unwrap_err();
        assert!(err.to_string().contains("insufficient balance"));
    }

    #[test]
    fn show_missing_vault_fails() {
        let store = temp_store();
        assert!(show(&store, Some(Pubkey::new([8u8; 32]))).is_err());
        assert!(show(&store, None).unwrap().is_empty());
    }
}
