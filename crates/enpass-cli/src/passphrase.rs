//! Passphrase acquisition via ENPASS_PASSWORD or a TTY prompt

use anyhow::{bail, Context};
use std::io::IsTerminal;
use zeroize::Zeroizing;

/// Environment variable holding the vault passphrase
pub const PASSWORD_ENV_VAR: &str = "ENPASS_PASSWORD";

/// Get the vault passphrase
///
/// Priority:
/// 1. `ENPASS_PASSWORD` if set and non-empty
/// 2. Interactive prompt on stderr, input hidden
///
/// An empty prompted passphrase is only accepted when a key-file is used.
pub fn read_passphrase(key_file_in_use: bool) -> anyhow::Result<Zeroizing<String>> {
    if let Some(passphrase) = from_env_value(std::env::var(PASSWORD_ENV_VAR).ok()) {
        return Ok(passphrase);
    }

    if !std::io::stdin().is_terminal() {
        bail!(
            "No passphrase provided. Set {} or run interactively.",
            PASSWORD_ENV_VAR
        );
    }

    eprint!("Vault passphrase: ");
    let passphrase = Zeroizing::new(
        rpassword::read_password().context("failed to read passphrase")?,
    );
    if passphrase.is_empty() && !key_file_in_use {
        bail!("empty passphrase not allowed without a key file");
    }
    Ok(passphrase)
}

fn from_env_value(value: Option<String>) -> Option<Zeroizing<String>> {
    value.filter(|v| !v.is_empty()).map(Zeroizing::new)
}
