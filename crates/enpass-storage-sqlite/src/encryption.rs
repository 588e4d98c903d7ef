//! Database encryption key

use crate::{Error, Result};
use enpass_params::DERIVED_KEY_HEX_LEN;
use std::fmt;
use zeroize::Zeroizing;

/// Raw SQLCipher key: 64 lowercase hex characters (32 bytes)
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseKey(Zeroizing<String>);

impl DatabaseKey {
    /// Create from a hex string, checking length and alphabet
    pub fn from_hex(hex_key: &str) -> Result<Self> {
        if hex_key.len() != DERIVED_KEY_HEX_LEN {
            return Err(Error::InvalidParameter(format!(
                "database key must be {} hex characters, got {}",
                DERIVED_KEY_HEX_LEN,
                hex_key.len()
            )));
        }
        if !hex_key.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::InvalidParameter(
                "database key must be hexadecimal".to_string(),
            ));
        }
        Ok(Self(Zeroizing::new(hex_key.to_ascii_lowercase())))
    }

    /// Get hex key
    pub fn as_hex(&self) -> &str {
        &self.0
    }

    /// SQLCipher raw key literal (`x'...'`)
    pub fn to_pragma_literal(&self) -> Zeroizing<String> {
        Zeroizing::new(format!("x'{}'", self.as_hex()))
    }
}

impl fmt::Debug for DatabaseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DatabaseKey([REDACTED])")
    }
}
