//! Password-based key derivation using PBKDF2-HMAC-SHA256.
//!
//! Two independent derivations come out of the same passphrase:
//!
//! - the **encryption key**, stretched with a 16-byte salt that is kept
//!   in the config file under `auth.salt`;
//! - the **verification hash**, stretched with its own 32-byte salt and
//!   stored as `base64(salt || hash)` under `auth.password_hash`.
//!
//! Both use the same function and output length, so the salts must never
//! coincide: with equal salts the stored hash would *be* the key.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use super::keys::{DerivedKey, KEY_LEN};

/// Number of PBKDF2 rounds for both derivations.
pub const KDF_ROUNDS: u32 = 100_000;

/// Length of the encryption-key salt in bytes (128 bits).
pub const KEY_SALT_LEN: usize = 16;

/// Length of the verification-hash salt in bytes (256 bits).
pub const VERIFY_SALT_LEN: usize = 32;

/// Derive the 32-byte encryption key for `passphrase`.
///
/// With `salt = None` a fresh random salt is generated (enrollment and
/// passphrase change). The same passphrase + salt always produce the
/// same key, which is what lets `authenticate` rebuild it later.
pub fn derive(passphrase: &str, salt: Option<&[u8]>) -> (DerivedKey, Vec<u8>) {
    let salt = match salt {
        Some(s) => s.to_vec(),
        None => generate_salt(KEY_SALT_LEN),
    };

    let mut key_bytes = stretch(passphrase.as_bytes(), &salt);
    let key = DerivedKey::new(key_bytes);
    key_bytes.zeroize();

    (key, salt)
}

/// Hash `passphrase` for later verification.
///
/// Returns `base64(salt || hash)` with a salt generated here, never
/// shared with `derive`.
pub fn hash_for_verification(passphrase: &str) -> String {
    let salt = generate_salt(VERIFY_SALT_LEN);
    let mut hash = stretch(passphrase.as_bytes(), &salt);

    let mut blob = Vec::with_capacity(VERIFY_SALT_LEN + KEY_LEN);
    blob.extend_from_slice(&salt);
    blob.extend_from_slice(&hash);
    hash.zeroize();

    let encoded = BASE64.encode(&blob);
    blob.zeroize();
    encoded
}

/// Check `passphrase` against a blob produced by `hash_for_verification`.
///
/// Comparison is constant-time. Malformed blobs (bad base64, wrong
/// length) simply yield `false`.
pub fn verify(verification_blob: &str, passphrase: &str) -> bool {
    let Ok(mut decoded) = BASE64.decode(verification_blob.trim()) else {
        return false;
    };

    if decoded.len() != VERIFY_SALT_LEN + KEY_LEN {
        decoded.zeroize();
        return false;
    }

    let (salt, expected) = decoded.split_at(VERIFY_SALT_LEN);
    let mut actual = stretch(passphrase.as_bytes(), salt);
    let matches: bool = actual.as_slice().ct_eq(expected).into();

    actual.zeroize();
    decoded.zeroize();
    matches
}

/// Generate `len` cryptographically random bytes for use as a salt.
pub fn generate_salt(len: usize) -> Vec<u8> {
    let mut salt = vec![0u8; len];
    rand::rng().fill_bytes(&mut salt);
    salt
}

fn stretch(password: &[u8], salt: &[u8]) -> [u8; KEY_LEN] {
    let mut out = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password, salt, KDF_ROUNDS, &mut out);
    out
}
