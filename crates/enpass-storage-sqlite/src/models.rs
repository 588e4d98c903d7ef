//! Database models

use enpass_params::FIELD_KEY_LEN;
use rusqlite::Row;
use std::fmt;
use zeroize::Zeroizing;

/// Secret field joined onto an item (`itemfield.value`, `itemfield.hash`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValue {
    /// Stored value (hex ciphertext + tag for passwords)
    pub value: String,
    /// Stored hash column
    pub hash: Option<String>,
}

impl FieldValue {
    fn from_columns(value: Option<String>, hash: Option<String>) -> Option<Self> {
        value.map(|value| Self { value, hash })
    }
}

/// One row of the item projection
#[derive(Clone)]
pub struct RawRow {
    /// Item title
    pub title: String,
    /// Item uuid (hyphenated)
    pub uuid: String,
    /// Item key blob: 32-byte field key followed by the nonce
    pub key: Zeroizing<Vec<u8>>,
    /// Password field, if the item has one
    pub password: Option<FieldValue>,
    /// TOTP field, if the item has one
    pub totp: Option<FieldValue>,
}

impl RawRow {
    /// Map a projection row by column name
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            title: row.get::<_, Option<String>>("title")?.unwrap_or_default(),
            uuid: row.get("uuid")?,
            key: Zeroizing::new(row.get::<_, Option<Vec<u8>>>("key")?.unwrap_or_default()),
            password: FieldValue::from_columns(
                row.get("password_value")?,
                row.get("password_value_hash")?,
            ),
            totp: FieldValue::from_columns(row.get("totp_value")?, row.get("totp_value_hash")?),
        })
    }

    /// Whether the row is a live entry
    ///
    /// Deleting an item clears the nonce from its key blob; only rows with
    /// bytes after the 32-byte field key are live.
    pub fn is_live(&self) -> bool {
        self.key.len() > FIELD_KEY_LEN
    }

    /// Nonce section of the key blob (empty for deleted rows)
    pub fn nonce(&self) -> &[u8] {
        self.key.get(FIELD_KEY_LEN..).unwrap_or(&[])
    }
}

impl fmt::Debug for RawRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawRow")
            .field("title", &self.title)
            .field("uuid", &self.uuid)
            .field("key", &"[REDACTED]")
            .field("live", &self.is_live())
            .field("password", &self.password.is_some())
            .field("totp", &self.totp.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_with_key(key: Vec<u8>) -> RawRow {
        RawRow {
            title: "Bank".to_string(),
            uuid: "0f8fad5b-d9cb-469f-a165-70867728950e".to_string(),
            key: Zeroizing::new(key),
            password: None,
            totp: None,
        }
    }

    #[test]
    fn test_live_row_has_nonce() {
        let row = row_with_key(vec![1u8; 44]);
        assert!(row.is_live());
        assert_eq!(row.nonce().len(), 12);
    }

    #[test]
    fn test_cleared_nonce_is_deleted() {
        assert!(!row_with_key(vec![1u8; 32]).is_live());
        assert!(!row_with_key(Vec::new()).is_live());
        assert!(row_with_key(Vec::new()).nonce().is_empty());
    }

    #[test]
    fn test_field_value_requires_value_column() {
        assert!(FieldValue::from_columns(None, Some("abc".to_string())).is_none());
        let field = FieldValue::from_columns(Some("00".to_string()), None).unwrap();
        assert_eq!(field.value, "00");
    }

    #[test]
    fn test_debug_redacts_key() {
        let debug = format!("{:?}", row_with_key(vec![0xab; 44]));
        assert!(!debug.contains("171"));
        assert!(debug.contains("REDACTED"));
    }
}
