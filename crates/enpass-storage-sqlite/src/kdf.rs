//! Database key derivation
//!
//! The SQLCipher key of a vault is PBKDF2-HMAC-SHA512 over the master secret
//! and the salt stored in the first 16 bytes of the vault file. The master
//! secret is the UTF-8 passphrase, followed by the decoded key-file payload
//! when a key-file is used.
//!
//! The full 64-byte digest is hex-encoded and the first 64 hex characters are
//! used as the raw key. Requesting a 32-byte digest directly is not the same
//! operation and must not replace the truncation.

use crate::encryption::DatabaseKey;
use crate::{Error, Result};
use enpass_params::{DERIVED_KEY_HEX_LEN, KEY_FILE_PREFIX_LEN, KEY_FILE_SUFFIX_LEN, SALT_LEN};
use once_cell::unsync::OnceCell;
use sha2::Sha512;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

/// SHA-512 output length, the PBKDF2 digest length used by Enpass
const DIGEST_LEN: usize = 64;

/// Passphrase bytes, optionally followed by key-file bytes
pub struct MasterSecret(Zeroizing<Vec<u8>>);

impl MasterSecret {
    /// Build from passphrase bytes and an optional decoded key-file payload
    pub fn new(passphrase: &[u8], key_file_bytes: Option<&[u8]>) -> Self {
        let extra = key_file_bytes.map_or(0, <[u8]>::len);
        let mut secret = Zeroizing::new(Vec::with_capacity(passphrase.len() + extra));
        secret.extend_from_slice(passphrase);
        if let Some(bytes) = key_file_bytes {
            secret.extend_from_slice(bytes);
        }
        Self(secret)
    }

    /// Get secret bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for MasterSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MasterSecret([REDACTED; {}])", self.0.len())
    }
}

/// Extract the key bytes from key-file contents (`<key>HEX</key>`)
pub fn parse_key_file(contents: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let framing = KEY_FILE_PREFIX_LEN + KEY_FILE_SUFFIX_LEN;
    if contents.len() < framing {
        return Err(Error::KeyFile(format!(
            "key file is {} bytes, expected at least {}",
            contents.len(),
            framing
        )));
    }

    let payload = &contents[KEY_FILE_PREFIX_LEN..contents.len() - KEY_FILE_SUFFIX_LEN];
    hex::decode(payload)
        .map(Zeroizing::new)
        .map_err(|e| Error::KeyFile(format!("key payload is not valid hex: {}", e)))
}

/// Read and decode a key-file
pub fn read_key_file<P: AsRef<Path>>(path: P) -> Result<Zeroizing<Vec<u8>>> {
    let contents = Zeroizing::new(std::fs::read(path)?);
    parse_key_file(&contents)
}

/// Read the salt header of a vault file
pub fn read_salt<P: AsRef<Path>>(path: P) -> Result<[u8; SALT_LEN]> {
    let mut salt = [0u8; SALT_LEN];
    File::open(path)?.read_exact(&mut salt)?;
    Ok(salt)
}

/// Derive the raw SQLCipher key
///
/// Pure function of its inputs.
pub fn derive_database_key(master: &MasterSecret, salt: &[u8], rounds: u32) -> Result<DatabaseKey> {
    if rounds == 0 {
        return Err(Error::InvalidParameter(
            "PBKDF2 rounds must be at least 1".to_string(),
        ));
    }

    let mut digest = Zeroizing::new([0u8; DIGEST_LEN]);
    pbkdf2::pbkdf2_hmac::<Sha512>(master.as_bytes(), salt, rounds, &mut digest[..]);

    let digest_hex = Zeroizing::new(hex::encode(&digest[..]));
    DatabaseKey::from_hex(&digest_hex[..DERIVED_KEY_HEX_LEN])
}

/// Per-session key derivation with memoized results
///
/// The key-file and the vault salt are read at most once. Later calls return
/// the cached values even if the files have changed or disappeared.
pub struct KeyDerivation {
    vault_path: PathBuf,
    passphrase: Zeroizing<Vec<u8>>,
    key_file: Option<PathBuf>,
    rounds: u32,
    master_secret: OnceCell<MasterSecret>,
    database_key: OnceCell<DatabaseKey>,
}

impl KeyDerivation {
    /// Create key derivation for a vault
    pub fn new<P: AsRef<Path>>(
        vault_path: P,
        passphrase: &str,
        key_file: Option<&Path>,
        rounds: u32,
    ) -> Self {
        Self {
            vault_path: vault_path.as_ref().to_path_buf(),
            passphrase: Zeroizing::new(passphrase.as_bytes().to_vec()),
            key_file: key_file.map(Path::to_path_buf),
            rounds,
            master_secret: OnceCell::new(),
            database_key: OnceCell::new(),
        }
    }

    /// Vault the key is derived for
    pub fn vault_path(&self) -> &Path {
        &self.vault_path
    }

    /// PBKDF2 iteration count
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Master secret, reading the key-file on first access
    pub fn master_secret(&self) -> Result<&MasterSecret> {
        self.master_secret.get_or_try_init(|| {
            let key_bytes = match &self.key_file {
                Some(path) => Some(read_key_file(path)?),
                None => None,
            };
            Ok(MasterSecret::new(&self.passphrase, key_bytes.as_deref().map(Vec::as_slice)))
        })
    }

    /// Database key, reading the salt and running PBKDF2 on first access
    pub fn database_key(&self) -> Result<&DatabaseKey> {
        self.database_key.get_or_try_init(|| {
            let master = self.master_secret()?;
            let salt = read_salt(&self.vault_path)?;
            tracing::debug!(
                "Deriving database key ({} rounds, key file: {})",
                self.rounds,
                self.key_file.is_some()
            );
            derive_database_key(master, &salt, self.rounds)
        })
    }
}

impl fmt::Debug for KeyDerivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyDerivation")
            .field("vault_path", &self.vault_path)
            .field("key_file", &self.key_file)
            .field("rounds", &self.rounds)
            .field("derived", &self.database_key.get().is_some())
            .finish()
    }
}
