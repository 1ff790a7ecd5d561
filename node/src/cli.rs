//! # CLI Interface
//!
//! Command-line surface of the `genius-vault` operator binary, built with
//! `clap` derive. Global options select the data directory and log format;
//! every subcommand maps to one vault operation or a read-only query.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use genius_vault::config::DEFAULT_MAX_DEPOSIT;
use genius_vault::Pubkey;

/// GeniusVault operator CLI.
///
/// Keeps vault records in a local sled database and applies signed
/// invocations to them through the vault processor.
#[derive(Parser, Debug)]
#[command(
    name = "genius-vault",
    about = "GeniusVault custody account operator CLI",
    version,
    propagate_version = true
)]
pub struct GeniusVaultCli {
    /// Directory holding the vault database. Created if missing.
    #[arg(
        long,
        short = 'd',
        global = true,
        env = "GENIUS_VAULT_DATA_DIR",
        default_value = "./genius-vault-data"
    )]
    pub data_dir: PathBuf,

    /// Log output format: `pretty` or `json`.
    #[arg(long, global = true, env = "GENIUS_VAULT_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate an Ed25519 keypair and write the secret key (hex) to a file.
    Keygen(KeygenArgs),
    /// Print the vault address derived from an authority and a mint.
    Address(AddressArgs),
    /// Create a vault. The key file's identity becomes its authority.
    Init(InitArgs),
    /// Deposit into an active vault.
    Deposit(AmountArgs),
    /// Withdraw from an active vault.
    Withdraw(AmountArgs),
    /// Pause an active vault.
    Pause(VaultArgs),
    /// Resume a paused vault.
    Resume(VaultArgs),
    /// Close an empty vault.
    Close(VaultArgs),
    /// Propose a new authority. Signed by the current authority.
    ProposeTransfer(ProposeArgs),
    /// Accept a pending proposal. Signed by the proposed authority.
    AcceptTransfer(VaultArgs),
    /// Withdraw a pending proposal. Signed by the current authority.
    CancelTransfer(VaultArgs),
    /// Print one vault, or every vault in the database.
    Show(ShowArgs),
}

#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Where to write the hex-encoded secret key. Refuses to overwrite.
    #[arg(long, short = 'o')]
    pub out: PathBuf,
}

#[derive(Args, Debug)]
pub struct AddressArgs {
    /// Authority identity (hex or base58).
    #[arg(long)]
    pub authority: Pubkey,

    /// Mint identity (hex or base58).
    #[arg(long)]
    pub mint: Pubkey,
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Secret key file of the new authority.
    #[arg(long, short = 'k', env = "GENIUS_VAULT_KEY")]
    pub key: PathBuf,

    /// Mint identity (hex or base58) of the custodied asset.
    #[arg(long)]
    pub mint: Pubkey,

    /// Per-deposit cap; each deposit must be strictly below it.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPOSIT)]
    pub max_deposit: u64,
}

/// Vault address plus the signing key.
#[derive(Args, Debug)]
pub struct VaultArgs {
    /// Vault address (hex or base58).
    #[arg(long, short = 'v')]
    pub vault: Pubkey,

    /// Secret key file of the required signer.
    #[arg(long, short = 'k', env = "GENIUS_VAULT_KEY")]
    pub key: PathBuf,
}

#[derive(Args, Debug)]
pub struct AmountArgs {
    #[command(flatten)]
    pub target: VaultArgs,

    #[arg(long, short = 'a')]
    pub amount: u64,
}

#[derive(Args, Debug)]
pub struct ProposeArgs {
    #[command(flatten)]
    pub target: VaultArgs,

    /// Proposed authority identity (hex or base58).
    #[arg(long)]
    pub new_authority: Pubkey,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Vault to print. Omit to list every stored vault.
    #[arg(long, short = 'v')]
    pub vault: Option<Pubkey>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        GeniusVaultCli::command().debug_assert();
    }

    #[test]
    fn parses_deposit_with_hex_address() {
        let vault = "aa".repeat(32);
        let cli = GeniusVaultCli::try_parse_from([
            "genius-vault",
            "--data-dir",
            "/tmp/gv",
            "deposit",
            "--vault",
            vault.as_str(),
            "--key",
            "auth.hex",
            "--amount",
            "100",
        ])
        .unwrap();

        match cli.command {
            Commands::Deposit(args) => {
                assert_eq!(args.amount, 100);
                assert_eq!(args.target.vault, Pubkey::new([0xAA; 32]));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn rejects_malformed_address() {
        let res = GeniusVaultCli::try_parse_from([
            "genius-vault",
            "pause",
            "--vault",
            "not-an-address",
            "--key",
            "auth.hex",
        ]);
        assert!(res.is_err());
    }
}
