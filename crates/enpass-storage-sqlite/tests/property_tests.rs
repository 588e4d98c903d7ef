//! Property-based tests for key derivation and field decryption
//!
//! Uses proptest to verify invariants across randomized inputs

use enpass_storage_sqlite::fixtures::key_file_contents;
use enpass_storage_sqlite::{derive_database_key, parse_key_file, Error, FieldCipher, MasterSecret};
use proptest::prelude::*;

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Passphrase (0-64 chars)
fn passphrase_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 !@#$%^&*]{0,64}").unwrap()
}

/// 16-byte vault salt
fn salt_strategy() -> impl Strategy<Value = [u8; 16]> {
    prop::array::uniform16(any::<u8>())
}

/// Hyphenated uuid
fn uuid_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}")
        .unwrap()
}

/// Item key blob (key || nonce)
fn key_blob_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 44)
}

// ============================================================================
// Key Derivation Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Property: derivation is a pure function of its inputs
    #[test]
    fn prop_deterministic_key_derivation(
        passphrase in passphrase_strategy(),
        salt in salt_strategy(),
        rounds in 1u32..8,
    ) {
        let a = derive_database_key(&MasterSecret::new(passphrase.as_bytes(), None), &salt, rounds).unwrap();
        let b = derive_database_key(&MasterSecret::new(passphrase.as_bytes(), None), &salt, rounds).unwrap();
        prop_assert_eq!(a.as_hex(), b.as_hex());
        prop_assert_eq!(a.as_hex().len(), 64);
        prop_assert!(a.as_hex().bytes().all(|c| matches!(c, b'0'..=b'9' | b'a'..=b'f')));
    }

    /// Property: a different salt gives a different key
    #[test]
    fn prop_salt_changes_key(
        passphrase in passphrase_strategy(),
        salt in salt_strategy(),
        flip in 0usize..16,
    ) {
        let mut other = salt;
        other[flip] ^= 0x01;
        let master = MasterSecret::new(passphrase.as_bytes(), None);
        let a = derive_database_key(&master, &salt, 2).unwrap();
        let b = derive_database_key(&master, &other, 2).unwrap();
        prop_assert_ne!(a.as_hex(), b.as_hex());
    }

    /// Property: key-file payload parsing inverts the `<key>HEX</key>` framing
    #[test]
    fn prop_key_file_payload(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let parsed = parse_key_file(&key_file_contents(&bytes)).unwrap();
        prop_assert_eq!(parsed.as_slice(), bytes.as_slice());
    }

    /// Property: short key files never panic and are key-file errors
    #[test]
    fn prop_short_key_file_rejected(contents in prop::collection::vec(any::<u8>(), 0..11)) {
        prop_assert!(matches!(parse_key_file(&contents), Err(Error::KeyFile(_))));
    }
}

// ============================================================================
// Field Decryption Properties
// ============================================================================

proptest! {
    /// Property: sealed values open to the original plaintext
    #[test]
    fn prop_seal_open(
        blob in key_blob_strategy(),
        uuid in uuid_strategy(),
        plaintext in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        let cipher = FieldCipher::from_key_blob(&blob).unwrap();
        let sealed = cipher.seal(&uuid, &plaintext).unwrap();
        prop_assert_eq!(sealed.len(), (plaintext.len() + 16) * 2);
        let opened = cipher.open(&uuid, &sealed).unwrap();
        prop_assert_eq!(opened.as_slice(), plaintext.as_slice());
    }

    /// Property: flipping any bit of ciphertext or tag fails authentication
    #[test]
    fn prop_tampered_value_rejected(
        blob in key_blob_strategy(),
        uuid in uuid_strategy(),
        plaintext in prop::collection::vec(any::<u8>(), 0..64),
        position in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let cipher = FieldCipher::from_key_blob(&blob).unwrap();
        let mut sealed = hex::decode(cipher.seal(&uuid, &plaintext).unwrap()).unwrap();
        let i = position.index(sealed.len());
        sealed[i] ^= 1 << bit;

        let result = cipher.open(&uuid, &hex::encode(&sealed));
        prop_assert!(
            matches!(result, Err(Error::FieldAuthentication { .. })),
            "tampered value was accepted"
        );
    }

    /// Property: a different header fails authentication
    #[test]
    fn prop_wrong_header_rejected(
        blob in key_blob_strategy(),
        uuid in uuid_strategy(),
        other in uuid_strategy(),
        plaintext in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        prop_assume!(uuid != other);
        let cipher = FieldCipher::from_key_blob(&blob).unwrap();
        let sealed = cipher.seal(&uuid, &plaintext).unwrap();
        prop_assert!(
            matches!(cipher.open(&other, &sealed), Err(Error::FieldAuthentication { .. })),
            "value opened under another item's header"
        );
    }
}
