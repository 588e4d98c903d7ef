//! Builders for encrypted vault files used in tests
//!
//! Writes a real SQLCipher database in the Enpass 6 layout. The chosen salt
//! is passed with the raw key (`x'<key><salt>'`), so SQLCipher stores it as
//! the first 16 bytes of the file exactly as Enpass does.

use crate::database::execute_pragma;
use crate::kdf::{derive_database_key, MasterSecret};
use crate::security::FieldCipher;
use crate::Result;
use enpass_params::{FieldKind, CIPHER_COMPATIBILITY, FIELD_KEY_LEN, FIELD_NONCE_LEN, SALT_LEN};
use rusqlite::{params, Connection};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Default fixture salt
pub const FIXTURE_SALT: [u8; SALT_LEN] = [
    0x5e, 0x11, 0xa7, 0x02, 0x9c, 0x3b, 0x48, 0xd0, 0x71, 0xee, 0x26, 0x85, 0x4f, 0xb9, 0x13, 0x6a,
];

/// Low round count so tests stay fast
pub const FIXTURE_ROUNDS: u32 = 16;

const SCHEMA: &str = r#"
    CREATE TABLE item (
        uuid TEXT PRIMARY KEY,
        title TEXT,
        subtitle TEXT,
        category TEXT,
        key BLOB,
        trashed INTEGER DEFAULT 0
    );
    CREATE TABLE itemfield (
        item_uuid TEXT,
        label TEXT,
        type TEXT,
        value TEXT,
        hash TEXT
    );
"#;

const IDENTITY_SCHEMA: &str = r#"
    CREATE TABLE Identity (
        ID INTEGER PRIMARY KEY,
        Version INTEGER,
        Signature TEXT,
        Info BLOB
    );
    INSERT INTO Identity (Version, Signature) VALUES (6, 'enpass');
"#;

/// Item to write into a fixture vault
#[derive(Debug, Clone)]
pub struct FixtureItem {
    /// Title
    pub title: String,
    /// Hyphenated uuid
    pub uuid: String,
    /// Plaintext password, encrypted on write
    pub password: Option<String>,
    /// TOTP seed, stored as is
    pub totp: Option<String>,
    /// Write with the nonce cleared, as Enpass does on delete
    pub deleted: bool,
    /// Extra password rows written after the first one
    pub extra_passwords: Vec<String>,
}

impl FixtureItem {
    /// Item with no secret fields
    pub fn new(title: &str, uuid: &str) -> Self {
        Self {
            title: title.to_string(),
            uuid: uuid.to_string(),
            password: None,
            totp: None,
            deleted: false,
            extra_passwords: Vec::new(),
        }
    }

    /// Set password
    pub fn password(mut self, password: &str) -> Self {
        self.password = Some(password.to_string());
        self
    }

    /// Set TOTP seed
    pub fn totp(mut self, seed: &str) -> Self {
        self.totp = Some(seed.to_string());
        self
    }

    /// Mark as deleted
    pub fn deleted(mut self) -> Self {
        self.deleted = true;
        self
    }

    /// Add a second password row for the same item
    pub fn extra_password(mut self, password: &str) -> Self {
        self.extra_passwords.push(password.to_string());
        self
    }

    /// Deterministic key blob (key || nonce) derived from the uuid
    pub fn key_blob(&self) -> Vec<u8> {
        let key = Sha256::digest(format!("key:{}", self.uuid).as_bytes());
        let nonce = Sha256::digest(format!("nonce:{}", self.uuid).as_bytes());
        let mut blob = Vec::with_capacity(FIELD_KEY_LEN + FIELD_NONCE_LEN);
        blob.extend_from_slice(&key[..FIELD_KEY_LEN]);
        blob.extend_from_slice(&nonce[..FIELD_NONCE_LEN]);
        blob
    }
}

/// Encrypted vault builder
#[derive(Debug, Clone)]
pub struct VaultFixture {
    passphrase: String,
    key_file_bytes: Option<Vec<u8>>,
    salt: [u8; SALT_LEN],
    rounds: u32,
    identity_table: bool,
    items: Vec<FixtureItem>,
}

impl VaultFixture {
    /// Empty vault for a passphrase
    pub fn new(passphrase: &str) -> Self {
        Self {
            passphrase: passphrase.to_string(),
            key_file_bytes: None,
            salt: FIXTURE_SALT,
            rounds: FIXTURE_ROUNDS,
            identity_table: true,
            items: Vec::new(),
        }
    }

    /// Combine the passphrase with decoded key-file bytes
    pub fn key_file_bytes(mut self, bytes: &[u8]) -> Self {
        self.key_file_bytes = Some(bytes.to_vec());
        self
    }

    /// Set salt
    pub fn with_salt(mut self, salt: [u8; SALT_LEN]) -> Self {
        self.salt = salt;
        self
    }

    /// Set PBKDF2 rounds
    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }

    /// Leave out the verification table
    pub fn without_identity_table(mut self) -> Self {
        self.identity_table = false;
        self
    }

    /// Add an item
    pub fn item(mut self, item: FixtureItem) -> Self {
        self.items.push(item);
        self
    }

    /// Passphrase
    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }

    /// Salt
    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    /// PBKDF2 rounds
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Write the vault to `path` (an empty or missing file)
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let master = MasterSecret::new(self.passphrase.as_bytes(), self.key_file_bytes.as_deref());
        let key = derive_database_key(&master, &self.salt, self.rounds)?;

        let conn = Connection::open(path)?;
        execute_pragma(
            &conn,
            &format!("PRAGMA key = \"x'{}{}'\";", key.as_hex(), hex::encode(self.salt)),
        )?;
        execute_pragma(
            &conn,
            &format!("PRAGMA cipher_compatibility = {};", CIPHER_COMPATIBILITY),
        )?;
        conn.execute_batch(SCHEMA)?;
        if self.identity_table {
            conn.execute_batch(IDENTITY_SCHEMA)?;
        }

        for item in &self.items {
            self.insert_item(&conn, item)?;
        }

        conn.close().map_err(|(_, e)| e)?;
        Ok(())
    }

    fn insert_item(&self, conn: &Connection, item: &FixtureItem) -> Result<()> {
        let blob = item.key_blob();
        let cipher = FieldCipher::from_key_blob(&blob)?;
        let stored_key = if item.deleted {
            blob[..FIELD_KEY_LEN].to_vec()
        } else {
            blob
        };

        conn.execute(
            "INSERT INTO item (uuid, title, category, key, trashed) VALUES (?1, ?2, 'login', ?3, ?4)",
            params![item.uuid, item.title, stored_key, item.deleted],
        )?;

        // Non-secret fields must not leak into the projection.
        conn.execute(
            "INSERT INTO itemfield (item_uuid, label, type, value, hash) VALUES (?1, 'Username', 'username', 'user@example.com', '')",
            params![item.uuid],
        )?;

        let passwords = item.password.iter().chain(item.extra_passwords.iter());
        for password in passwords {
            let value = cipher.seal(&item.uuid, password.as_bytes())?;
            let hash = hex::encode(Sha256::digest(password.as_bytes()));
            conn.execute(
                "INSERT INTO itemfield (item_uuid, label, type, value, hash) VALUES (?1, 'Password', ?2, ?3, ?4)",
                params![item.uuid, FieldKind::Password.as_str(), value, hash],
            )?;
        }

        if let Some(seed) = &item.totp {
            conn.execute(
                "INSERT INTO itemfield (item_uuid, label, type, value, hash) VALUES (?1, 'TOTP', ?2, ?3, '')",
                params![item.uuid, FieldKind::Totp.as_str(), seed],
            )?;
        }

        Ok(())
    }
}

/// Key-file contents wrapping `key_bytes` (`<key>HEX</key>`)
pub fn key_file_contents(key_bytes: &[u8]) -> Vec<u8> {
    format!("<key>{}</key>", hex::encode(key_bytes)).into_bytes()
}
