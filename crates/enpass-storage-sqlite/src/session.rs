//! Unlocked vault session

use crate::encryption::DatabaseKey;
use crate::kdf::KeyDerivation;
use crate::record::Record;
use crate::{Database, Repository, Result};
use enpass_params::VaultConfig;
use std::fmt;
use std::path::Path;

/// One unlocked vault
///
/// Opening derives the key (reading the key-file and the salt once), keys
/// the connection and verifies it. Records returned by queries own their
/// data and stay usable after the session is closed.
pub struct VaultSession {
    kdf: KeyDerivation,
    db: Database,
}

impl VaultSession {
    /// Unlock the vault at `path`
    pub fn open<P: AsRef<Path>>(path: P, passphrase: &str, config: &VaultConfig) -> Result<Self> {
        config.validate()?;

        let path = path.as_ref();
        let kdf = KeyDerivation::new(
            path,
            passphrase,
            config.key_file.as_deref(),
            config.pbkdf2_rounds,
        );
        let db = Database::open(path, kdf.database_key()?, config.cipher_compatibility)?;

        tracing::info!("Vault unlocked: {}", path.display());
        Ok(Self { kdf, db })
    }

    /// All live entries
    pub fn entries(&self) -> Result<Vec<Record>> {
        Repository::new(&self.db).entries()
    }

    /// Entry with exactly this title, ignoring case
    pub fn get_entry(&self, name: &str) -> Result<Option<Record>> {
        Repository::new(&self.db).get_entry(name)
    }

    /// Entries whose title contains `name`, ignoring case
    pub fn search_entries(&self, name: &str) -> Result<Vec<Record>> {
        Repository::new(&self.db).search_entries(name)
    }

    /// Raw SQLCipher key of this vault
    pub fn database_key(&self) -> Result<&DatabaseKey> {
        self.kdf.database_key()
    }

    /// Vault path
    pub fn path(&self) -> &Path {
        self.kdf.vault_path()
    }

    /// Close the underlying connection
    pub fn close(self) -> Result<()> {
        tracing::debug!("Closing vault: {}", self.kdf.vault_path().display());
        self.db.close()
    }
}

impl fmt::Debug for VaultSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultSession").field("kdf", &self.kdf).finish()
    }
}
