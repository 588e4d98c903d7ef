//! Error types

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unlock handshake failed
    #[error(
        "Unlock failed: the password or key file cannot decrypt the database, \
         or it is not a valid Enpass 6 encrypted database"
    )]
    Unlock,

    /// Key-file framing or hex payload is malformed
    #[error("Invalid key file: {0}")]
    KeyFile(String),

    /// Field ciphertext, tag or header failed authentication
    #[error("Field authentication failed for item {uuid}")]
    FieldAuthentication {
        /// Item the field belongs to
        uuid: String,
    },

    /// Stored field data is malformed
    #[error("Invalid field data: {0}")]
    InvalidField(String),

    /// Caller-supplied parameter out of range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error after unlock
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Config error
    #[error("Config error: {0}")]
    Params(#[from] enpass_params::Error),
}

impl Error {
    /// Whether this error means the vault could not be unlocked with the given credentials
    pub fn is_unlock_failure(&self) -> bool {
        matches!(self, Error::Unlock | Error::KeyFile(_))
    }
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
