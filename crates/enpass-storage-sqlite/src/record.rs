//! Credential records with lazily decrypted passwords

use crate::models::{FieldValue, RawRow};
use crate::security::{item_header, FieldCipher};
use crate::{Error, Result};
use enpass_params::FIELD_KEY_LEN;
use once_cell::unsync::OnceCell;
use std::fmt;
use zeroize::Zeroizing;

/// One live credential entry
///
/// Owns its key material and encrypted field values; it holds no reference
/// to the session it came from. The password is decrypted on first access
/// and cached for the lifetime of the record.
pub struct Record {
    key: Zeroizing<[u8; FIELD_KEY_LEN]>,
    nonce: Vec<u8>,
    title: String,
    uuid: String,
    header: String,
    password_field: Option<FieldValue>,
    totp_field: Option<FieldValue>,
    password: OnceCell<Option<Zeroizing<String>>>,
}

impl Record {
    /// Build a record from a live row
    pub fn from_raw(row: RawRow) -> Result<Self> {
        if !row.is_live() {
            return Err(Error::InvalidField(format!(
                "item {} is deleted and has no nonce",
                row.uuid
            )));
        }

        let mut key = Zeroizing::new([0u8; FIELD_KEY_LEN]);
        key.copy_from_slice(&row.key[..FIELD_KEY_LEN]);

        Ok(Self {
            key,
            nonce: row.nonce().to_vec(),
            header: item_header(&row.uuid),
            title: row.title,
            uuid: row.uuid,
            password_field: row.password,
            totp_field: row.totp,
            password: OnceCell::new(),
        })
    }

    /// Item title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Item uuid (hyphenated)
    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    /// Uuid without hyphens, authenticated as associated data
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Per-item AES-256 key
    pub fn key(&self) -> &[u8; FIELD_KEY_LEN] {
        &self.key
    }

    /// Per-item GCM nonce
    pub fn nonce(&self) -> &[u8] {
        &self.nonce
    }

    /// Whether the item has a password field
    pub fn has_password(&self) -> bool {
        self.password_field.is_some()
    }

    /// Plaintext password, `None` if the item has no password field
    ///
    /// Decrypts on first call; later calls return the cached value. A failed
    /// decryption is not cached and only affects this field.
    pub fn password(&self) -> Result<Option<&str>> {
        let password = self.password.get_or_try_init(|| -> Result<_> {
            let Some(field) = &self.password_field else {
                return Ok(None);
            };

            let cipher = FieldCipher::new(&self.key[..], &self.nonce)?;
            let plaintext = cipher.open(&self.uuid, &field.value)?;
            let text = std::str::from_utf8(&plaintext).map_err(|e| {
                Error::InvalidField(format!("password of item {} is not UTF-8: {}", self.uuid, e))
            })?;
            Ok(Some(Zeroizing::new(text.to_string())))
        })?;

        Ok(password.as_ref().map(|p| p.as_str()))
    }

    /// Stored hash of the password field
    pub fn password_hash(&self) -> Option<&str> {
        self.password_field.as_ref()?.hash.as_deref()
    }

    /// TOTP seed as stored, without decryption
    pub fn totp_seed(&self) -> Option<&str> {
        self.totp_field.as_ref().map(|f| f.value.as_str())
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("title", &self.title)
            .field("uuid", &self.uuid)
            .field("key", &"[REDACTED]")
            .field("has_password", &self.has_password())
            .field("has_totp", &self.totp_field.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enpass_params::FIELD_NONCE_LEN;

    const UUID: &str = "6ba7b810-9dad-11d1-80b4-00c04fd430c8";

    fn key_blob() -> Vec<u8> {
        let mut blob = vec![0x11u8; FIELD_KEY_LEN];
        blob.extend_from_slice(&[0x22u8; FIELD_NONCE_LEN]);
        blob
    }

    fn sealed_password(plaintext: &str) -> String {
        FieldCipher::from_key_blob(&key_blob())
            .unwrap()
            .seal(UUID, plaintext.as_bytes())
            .unwrap()
    }

    fn raw(password: Option<String>, totp: Option<&str>) -> RawRow {
        RawRow {
            title: "Bank".to_string(),
            uuid: UUID.to_string(),
            key: Zeroizing::new(key_blob()),
            password: password.map(|value| FieldValue {
                value,
                hash: Some("cafe".to_string()),
            }),
            totp: totp.map(|value| FieldValue {
                value: value.to_string(),
                hash: None,
            }),
        }
    }

    #[test]
    fn test_record_attributes() {
        let record = Record::from_raw(raw(None, Some("JBSWY3DPEHPK3PXP"))).unwrap();
        assert_eq!(record.title(), "Bank");
        assert_eq!(record.uuid(), UUID);
        assert_eq!(record.header(), "6ba7b8109dad11d180b400c04fd430c8");
        assert_eq!(record.key(), &[0x11u8; FIELD_KEY_LEN]);
        assert_eq!(record.nonce(), &[0x22u8; FIELD_NONCE_LEN]);
        assert_eq!(record.totp_seed(), Some("JBSWY3DPEHPK3PXP"));
    }

    #[test]
    fn test_password_decrypts_and_caches() {
        let record = Record::from_raw(raw(Some(sealed_password("s3cret!")), None)).unwrap();
        assert!(record.password.get().is_none());

        assert_eq!(record.password().unwrap(), Some("s3cret!"));
        assert!(record.password.get().is_some());
        assert_eq!(record.password().unwrap(), Some("s3cret!"));
        assert_eq!(record.password_hash(), Some("cafe"));
    }

    #[test]
    fn test_missing_password_field_is_none() {
        let record = Record::from_raw(raw(None, None)).unwrap();
        assert!(!record.has_password());
        assert_eq!(record.password().unwrap(), None);
        assert_eq!(record.password_hash(), None);
        assert_eq!(record.totp_seed(), None);
    }

    #[test]
    fn test_tampered_password_fails_without_caching() {
        let mut sealed = sealed_password("s3cret!");
        let first = if sealed.starts_with('0') { "1" } else { "0" };
        sealed.replace_range(0..1, first);

        let record = Record::from_raw(raw(Some(sealed), Some("seed"))).unwrap();
        assert!(matches!(
            record.password(),
            Err(Error::FieldAuthentication { .. })
        ));
        assert!(record.password.get().is_none());

        // Other fields are unaffected.
        assert_eq!(record.totp_seed(), Some("seed"));
    }

    #[test]
    fn test_non_utf8_password_is_invalid() {
        let sealed = FieldCipher::from_key_blob(&key_blob())
            .unwrap()
            .seal(UUID, &[0xff, 0xfe])
            .unwrap();
        let record = Record::from_raw(raw(Some(sealed), None)).unwrap();
        assert!(matches!(record.password(), Err(Error::InvalidField(_))));
    }

    #[test]
    fn test_short_nonce_fails_on_access() {
        let mut row = raw(Some(sealed_password("pw")), None);
        row.key.truncate(FIELD_KEY_LEN + 4);
        let record = Record::from_raw(row).unwrap();
        assert!(matches!(record.password(), Err(Error::InvalidField(_))));
    }

    #[test]
    fn test_deleted_row_is_rejected() {
        let mut row = raw(None, None);
        row.key.truncate(FIELD_KEY_LEN);
        assert!(Record::from_raw(row).is_err());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let record = Record::from_raw(raw(Some(sealed_password("topsecret")), None)).unwrap();
        record.password().unwrap();
        let debug = format!("{:?}", record);
        assert!(!debug.contains("topsecret"));
        assert!(debug.contains("Bank"));
    }
}
