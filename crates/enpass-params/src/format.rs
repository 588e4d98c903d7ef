//! On-disk format constants of an Enpass 6 vault
//!
//! An Enpass vault is a SQLCipher database. The first [`SALT_LEN`] bytes of
//! the file are the SQLCipher salt, which doubles as the PBKDF2 salt for the
//! database key. Each item row carries its own AES-256-GCM key and nonce.

/// Length of the salt header at the start of the vault file
pub const SALT_LEN: usize = 16;

/// Default PBKDF2-HMAC-SHA512 iteration count
pub const DEFAULT_PBKDF2_ROUNDS: u32 = 100_000;

/// Hex characters of the PBKDF2 digest used as the raw SQLCipher key (32 bytes)
pub const DERIVED_KEY_HEX_LEN: usize = 64;

/// SQLCipher compatibility mode of Enpass 6 vaults
pub const CIPHER_COMPATIBILITY: u32 = 3;

/// Table read once after keying to verify the key
pub const VERIFICATION_TABLE: &str = "Identity";

/// Leading framing bytes of a key-file (`<key>`)
pub const KEY_FILE_PREFIX_LEN: usize = 5;

/// Trailing framing bytes of a key-file (`</key>`)
pub const KEY_FILE_SUFFIX_LEN: usize = 6;

/// Per-item AES-256-GCM key length at the head of the `key` blob
pub const FIELD_KEY_LEN: usize = 32;

/// Per-item GCM nonce length following the key in the `key` blob
pub const FIELD_NONCE_LEN: usize = 12;

/// GCM authentication tag length appended to every field value
pub const FIELD_TAG_LEN: usize = 16;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_key_is_256_bits() {
        assert_eq!(DERIVED_KEY_HEX_LEN / 2, 32);
        assert_eq!(DERIVED_KEY_HEX_LEN / 2, FIELD_KEY_LEN);
    }

    #[test]
    fn test_key_file_framing_matches_xml_tags() {
        assert_eq!(KEY_FILE_PREFIX_LEN, "<key>".len());
        assert_eq!(KEY_FILE_SUFFIX_LEN, "</key>".len());
    }
}
