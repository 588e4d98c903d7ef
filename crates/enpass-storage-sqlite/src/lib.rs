//! Read-only access to Enpass 6 vaults
//!
//! An Enpass 6 vault is a SQLCipher database. Opening one takes two steps:
//!
//! - **Key derivation**: PBKDF2-HMAC-SHA512 over the passphrase (plus the
//!   optional key-file payload) and the 16-byte salt at the start of the
//!   vault file yields the raw SQLCipher key.
//! - **Unlock**: the key is applied with SQLCipher 3 compatibility and
//!   verified by reading the `Identity` table.
//!
//! Entries are read through a fixed projection of the `item` and
//! `itemfield` tables. Password fields are AES-256-GCM encrypted per item
//! and decrypted lazily; TOTP seeds are returned as stored.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod database;
pub mod encryption;
pub mod error;
#[cfg(any(test, feature = "test-helpers"))]
pub mod fixtures;
pub mod kdf;
pub mod models;
pub mod record;
pub mod repository;
pub mod security;
pub mod session;

pub use database::Database;
pub use encryption::DatabaseKey;
pub use error::{Error, Result};
pub use kdf::{derive_database_key, parse_key_file, read_salt, KeyDerivation, MasterSecret};
pub use models::{FieldValue, RawRow};
pub use record::Record;
pub use repository::Repository;
pub use security::FieldCipher;
pub use session::VaultSession;

pub use enpass_params::VaultConfig;
