//! Item field kinds stored in the `itemfield` table

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of secret field joined onto an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Password field (AES-256-GCM encrypted)
    Password,
    /// TOTP seed field
    Totp,
}

impl FieldKind {
    /// Value of the `itemfield.type` discriminator column
    pub const fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Password => "password",
            FieldKind::Totp => "totp",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "password" => Ok(FieldKind::Password),
            "totp" => Ok(FieldKind::Totp),
            other => Err(Error::UnknownFieldKind(other.to_string())),
        }
    }
}
