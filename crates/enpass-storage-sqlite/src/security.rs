//! Field-level AES-256-GCM
//!
//! Every item carries its own key blob: a 32-byte AES-256 key followed by a
//! 12-byte GCM nonce. Secret field values are stored as lowercase hex of the
//! ciphertext (same length as the plaintext) followed by the 16-byte tag. The
//! item uuid without hyphens, hex-decoded, is the associated data.

use crate::{Error, Result};
use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use enpass_params::{FIELD_KEY_LEN, FIELD_NONCE_LEN, FIELD_TAG_LEN};
use std::fmt;
use zeroize::Zeroizing;

/// Item uuid with hyphens stripped
pub fn item_header(uuid: &str) -> String {
    uuid.replace('-', "")
}

/// Associated data bytes for an item
pub fn decode_header(uuid: &str) -> Result<Vec<u8>> {
    hex::decode(item_header(uuid))
        .map_err(|e| Error::InvalidField(format!("item uuid {} is not hex: {}", uuid, e)))
}

/// Per-item field cipher
pub struct FieldCipher {
    key: Zeroizing<[u8; FIELD_KEY_LEN]>,
    nonce: [u8; FIELD_NONCE_LEN],
}

impl FieldCipher {
    /// Create from key and nonce slices
    pub fn new(key: &[u8], nonce: &[u8]) -> Result<Self> {
        if key.len() != FIELD_KEY_LEN {
            return Err(Error::InvalidField(format!(
                "field key is {} bytes, expected {}",
                key.len(),
                FIELD_KEY_LEN
            )));
        }
        if nonce.len() != FIELD_NONCE_LEN {
            return Err(Error::InvalidField(format!(
                "field nonce is {} bytes, expected {}",
                nonce.len(),
                FIELD_NONCE_LEN
            )));
        }

        let mut key_bytes = Zeroizing::new([0u8; FIELD_KEY_LEN]);
        key_bytes.copy_from_slice(key);
        let mut nonce_bytes = [0u8; FIELD_NONCE_LEN];
        nonce_bytes.copy_from_slice(nonce);

        Ok(Self {
            key: key_bytes,
            nonce: nonce_bytes,
        })
    }

    /// Create from an item `key` blob (key || nonce)
    pub fn from_key_blob(blob: &[u8]) -> Result<Self> {
        if blob.len() < FIELD_KEY_LEN {
            return Err(Error::InvalidField(format!(
                "item key blob is {} bytes, expected {}",
                blob.len(),
                FIELD_KEY_LEN + FIELD_NONCE_LEN
            )));
        }
        let (key, nonce) = blob.split_at(FIELD_KEY_LEN);
        Self::new(key, nonce)
    }

    fn cipher(&self) -> Result<Aes256Gcm> {
        Aes256Gcm::new_from_slice(&self.key[..])
            .map_err(|_| Error::InvalidField("invalid field key length".to_string()))
    }

    /// Decrypt and authenticate a stored field value
    pub fn open(&self, uuid: &str, value_hex: &str) -> Result<Zeroizing<Vec<u8>>> {
        // Format: hex([ciphertext(variable)][tag(16)])
        let sealed = hex::decode(value_hex)
            .map_err(|e| Error::InvalidField(format!("field value of item {} is not hex: {}", uuid, e)))?;
        if sealed.len() < FIELD_TAG_LEN {
            return Err(Error::InvalidField(format!(
                "field value of item {} is shorter than the authentication tag",
                uuid
            )));
        }

        let aad = decode_header(uuid)?;
        let plaintext = self
            .cipher()?
            .decrypt(
                Nonce::from_slice(&self.nonce),
                Payload {
                    msg: &sealed,
                    aad: &aad,
                },
            )
            .map_err(|_| {
                tracing::warn!("Field authentication failed for item {}", uuid);
                Error::FieldAuthentication {
                    uuid: uuid.to_string(),
                }
            })?;

        Ok(Zeroizing::new(plaintext))
    }

    /// Encrypt a field value in the stored format
    #[cfg(any(test, feature = "test-helpers"))]
    pub fn seal(&self, uuid: &str, plaintext: &[u8]) -> Result<String> {
        let aad = decode_header(uuid)?;
        let sealed = self
            .cipher()?
            .encrypt(
                Nonce::from_slice(&self.nonce),
                Payload {
                    msg: plaintext,
                    aad: &aad,
                },
            )
            .map_err(|_| Error::InvalidField("AES-256-GCM encryption failed".to_string()))?;
        Ok(hex::encode(sealed))
    }
}

impl fmt::Debug for FieldCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldCipher")
            .field("key", &"[REDACTED]")
            .field("nonce", &hex::encode(self.nonce))
            .finish()
    }
}
