//! Vault open configuration
//!
//! Loaded from an optional JSON file and overridden by command-line flags.
//! The passphrase is never part of the configuration.

use crate::format::{CIPHER_COMPATIBILITY, DEFAULT_PBKDF2_ROUNDS};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// SQLCipher accepts compatibility modes 1 through 4
const SUPPORTED_COMPATIBILITY: std::ops::RangeInclusive<u32> = 1..=4;

/// Parameters used to derive the database key and unlock a vault
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// PBKDF2-HMAC-SHA512 iteration count
    pub pbkdf2_rounds: u32,
    /// SQLCipher compatibility mode
    pub cipher_compatibility: u32,
    /// Optional key-file combined with the passphrase
    pub key_file: Option<PathBuf>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            pbkdf2_rounds: DEFAULT_PBKDF2_ROUNDS,
            cipher_compatibility: CIPHER_COMPATIBILITY,
            key_file: None,
        }
    }
}

impl VaultConfig {
    /// Config with a key-file and default parameters
    pub fn with_key_file<P: AsRef<Path>>(key_file: P) -> Self {
        Self {
            key_file: Some(key_file.as_ref().to_path_buf()),
            ..Self::default()
        }
    }

    /// Load and validate a JSON config file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read(path)?;
        let config: Self = serde_json::from_slice(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values are usable
    pub fn validate(&self) -> Result<()> {
        if self.pbkdf2_rounds == 0 {
            return Err(Error::InvalidConfig(
                "pbkdf2_rounds must be at least 1".to_string(),
            ));
        }
        if !SUPPORTED_COMPATIBILITY.contains(&self.cipher_compatibility) {
            return Err(Error::InvalidConfig(format!(
                "unsupported cipher_compatibility {} (expected 1-4)",
                self.cipher_compatibility
            )));
        }
        Ok(())
    }
}
