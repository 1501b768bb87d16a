//! Hash utilities

use base64::{engine::general_purpose::STANDARD, Engine};
use digest::Digest;
use rand::RngCore;
use sha1::Sha1;

const SSHA_PREFIX: &str = "{SSHA}";
const SSHA_SALT_LEN: usize = 8;
const SHA1_LEN: usize = 20;

/// Salted SHA-1 in the `{SSHA}` form used for the `userPassword` attribute.
pub fn ssha_hash(password: &str) -> String {
    let mut salt = [0u8; SSHA_SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    ssha_hash_with_salt(password, &salt)
}

pub fn ssha_hash_with_salt(password: &str, salt: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(password.as_bytes());
    hasher.update(salt);

    let mut payload = hasher.finalize().to_vec();
    payload.extend_from_slice(salt);

    format!("{}{}", SSHA_PREFIX, STANDARD.encode(payload))
}

/// Check a plaintext password against an `{SSHA}` value.
pub fn verify_ssha(password: &str, hashed: &str) -> bool {
    let Some(encoded) = hashed.strip_prefix(SSHA_PREFIX) else {
        return false;
    };
    let Ok(payload) = STANDARD.decode(encoded) else {
        return false;
    };
    if payload.len() <= SHA1_LEN {
        return false;
    }

    let (_, salt) = payload.split_at(SHA1_LEN);
    ssha_hash_with_salt(password, salt) == hashed
}
