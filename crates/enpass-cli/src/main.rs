//! Command-line reader for Enpass 6 vaults
//!
//! Unlocks a vault with a passphrase (and optional key-file) and prints
//! entries as text or JSON. Logs go to stderr; stdout only carries results.

mod output;
mod passphrase;

use anyhow::Context;
use clap::{Parser, Subcommand};
use enpass_params::VaultConfig;
use enpass_storage_sqlite::VaultSession;
use output::EntryExport;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "enpass-cli")]
#[command(about = "Read entries from an Enpass 6 vault", long_about = None)]
struct Cli {
    /// Vault database file (vault.enpassdb)
    #[arg(long)]
    vault: PathBuf,

    /// Key-file combined with the passphrase
    #[arg(short, long)]
    key_file: Option<PathBuf>,

    /// PBKDF2 iterations
    #[arg(short, long)]
    rounds: Option<u32>,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Include passwords and TOTP seeds in list and search output
    #[arg(long, global = true)]
    show_passwords: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// List all entries
    List,

    /// Print the password of the entry with this exact title (any case)
    Get {
        /// Entry title
        name: String,
    },

    /// List entries whose title contains NAME (any case)
    Search {
        /// Part of the title
        name: String,
    },

    /// Print the raw SQLCipher key of the vault
    Key,
}

impl Cli {
    /// Defaults, then the config file, then command-line flags
    fn vault_config(&self) -> anyhow::Result<VaultConfig> {
        let mut config = match &self.config {
            Some(path) => VaultConfig::from_json_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => VaultConfig::default(),
        };
        if let Some(key_file) = &self.key_file {
            config.key_file = Some(key_file.clone());
        }
        if let Some(rounds) = self.rounds {
            config.pbkdf2_rounds = rounds;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = cli.vault_config()?;
    debug!(
        "Opening {} ({} rounds, compatibility {})",
        cli.vault.display(),
        config.pbkdf2_rounds,
        config.cipher_compatibility
    );

    let passphrase = passphrase::read_passphrase(config.key_file.is_some())?;
    let session = VaultSession::open(&cli.vault, &passphrase, &config)?;
    let code = run(&cli, &session)?;
    session.close()?;
    Ok(code)
}

fn run(cli: &Cli, session: &VaultSession) -> anyhow::Result<ExitCode> {
    match &cli.command {
        Commands::List => {
            let records = session.entries()?;
            print_entries(cli, &records)?;
        }
        Commands::Search { name } => {
            let records = session.search_entries(name)?;
            print_entries(cli, &records)?;
        }
        Commands::Get { name } => {
            let Some(record) = session.get_entry(name)? else {
                eprintln!("{}: not found", name);
                return Ok(ExitCode::FAILURE);
            };
            if cli.json {
                let export = EntryExport::from_record(&record, true);
                println!("{}", serde_json::to_string_pretty(&export)?);
            } else {
                let password = record
                    .password()
                    .with_context(|| format!("failed to decrypt password of {}", record.title()))?;
                println!("{}", password.unwrap_or_default());
            }
        }
        Commands::Key => {
            let key = session.database_key()?;
            if cli.json {
                println!("{}", serde_json::json!({ "key": key.as_hex() }));
            } else {
                println!("{}", key.to_pragma_literal().as_str());
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_entries(cli: &Cli, records: &[enpass_storage_sqlite::Record]) -> anyhow::Result<()> {
    let exports: Vec<EntryExport> = records
        .iter()
        .map(|r| EntryExport::from_record(r, cli.show_passwords))
        .collect();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&exports)?);
    } else {
        for export in &exports {
            println!("{}", export.to_line());
        }
    }
    Ok(())
}
