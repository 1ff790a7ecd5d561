// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # GeniusVault Operator CLI
//!
//! Entry point for the `genius-vault` binary. Parses CLI arguments,
//! initializes logging, opens the local vault database and dispatches to
//! one subcommand.
//!
//! - `keygen`, `address` — key material and address derivation (no database)
//! - `init`, `deposit`, `withdraw`, `pause`, `resume`, `close` — lifecycle
//! - `propose-transfer`, `accept-transfer`, `cancel-transfer` — authority
//! - `show` — read-only account dump
//!
//! Results are printed to stdout as pretty JSON; logs go to stderr.

mod cli;
mod commands;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use genius_vault::{derive_vault_address, Operation};

use cli::{Commands, GeniusVaultCli, VaultArgs};
use logging::LogFormat;

fn main() -> Result<()> {
    let cli = GeniusVaultCli::parse();
    logging::init_logging(
        logging::DEFAULT_FILTER,
        LogFormat::from_str_lossy(&cli.log_format),
    );

    match cli.command {
        Commands::Keygen(args) => print_json(&commands::keygen(&args.out)?),
        Commands::Address(args) => {
            let address = derive_vault_address(&args.authority, &args.mint);
            print_json(&commands::KeyInfo::from(address))
        }
        Commands::Init(args) => {
            let key = commands::read_keypair(&args.key)?;
            let mut store = commands::open_store(&cli.data_dir)?;
            print_json(&commands::init(&mut store, &key, args.mint, args.max_deposit)?)
        }
        Commands::Deposit(args) => submit(
            &cli.data_dir,
            &args.target,
            Operation::Deposit {
                amount: args.amount,
            },
        ),
        Commands::Withdraw(args) => submit(
            &cli.data_dir,
            &args.target,
            Operation::Withdraw {
                amount: args.amount,
            },
        ),
        Commands::Pause(args) => submit(&cli.data_dir, &args, Operation::Pause),
        Commands::Resume(args) => submit(&cli.data_dir, &args, Operation::Resume),
        Commands::Close(args) => submit(&cli.data_dir, &args, Operation::Close),
        Commands::ProposeTransfer(args) => submit(
            &cli.data_dir,
            &args.target,
            Operation::ProposeTransfer {
                new_authority: args.new_authority,
            },
        ),
        Commands::AcceptTransfer(args) => submit(&cli.data_dir, &args, Operation::AcceptTransfer),
        Commands::CancelTransfer(args) => submit(&cli.data_dir, &args, Operation::CancelTransfer),
        Commands::Show(args) => {
            let store = commands::open_store(&cli.data_dir)?;
            print_json(&commands::show(&store, args.vault)?)
        }
    }
}

fn submit(data_dir: &std::path::Path, target: &VaultArgs, operation: Operation) -> Result<()> {
    let key = commands::read_keypair(&target.key)?;
    let mut store = commands::open_store(data_dir)?;
    let receipt = commands::submit(&mut store, &key, target.vault, operation)?;
    print_json(&receipt)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
