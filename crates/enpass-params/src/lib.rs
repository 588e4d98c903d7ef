//! Enpass vault format parameters and configuration
//!
//! This crate provides the constants describing the on-disk vault format
//! (salt header, key derivation defaults, SQLCipher compatibility mode,
//! key-file framing, field layout) and the serializable configuration used
//! when opening a vault.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod field;
pub mod format;

pub use config::VaultConfig;
pub use field::FieldKind;
pub use format::{
    CIPHER_COMPATIBILITY, DEFAULT_PBKDF2_ROUNDS, DERIVED_KEY_HEX_LEN, FIELD_KEY_LEN,
    FIELD_NONCE_LEN, FIELD_TAG_LEN, KEY_FILE_PREFIX_LEN, KEY_FILE_SUFFIX_LEN, SALT_LEN,
    VERIFICATION_TABLE,
};

/// Error types for parameter operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Config file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON for [`VaultConfig`]
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Config values out of range
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Unknown item field type
    #[error("Unknown field kind: {0}")]
    UnknownFieldKind(String),
}

/// Result type for parameter operations
pub type Result<T> = std::result::Result<T, Error>;
