//! Password generation and Active Directory credential encoding.
//!
//! Active Directory only accepts passwords through the `unicodePwd`
//! attribute, written as the password wrapped in double quotes and encoded
//! as UTF-16LE.

use adbridge_core::config::PasswordPolicy;
use adbridge_core::{Error, Result};
use rand::Rng;

/// Attribute AD reads new passwords from
pub const UNICODE_PWD_ATTRIBUTE: &str = "unicodePwd";

/// Generated password length: 1 special, 3 digits, 2 upper, 3 lower
pub const GENERATED_PASSWORD_LEN: usize = 9;

/// Generate an initial password using the thread-local RNG.
pub fn create_password(policy: &PasswordPolicy) -> Result<String> {
    create_password_with(&mut rand::rng(), policy)
}

/// Generate an initial password from `rng`.
///
/// Layout is fixed: one special character, three digits, two uppercase
/// letters, three lowercase letters. Every pool must be non-empty.
pub fn create_password_with<R: Rng + ?Sized>(
    rng: &mut R,
    policy: &PasswordPolicy,
) -> Result<String> {
    let mut password = String::with_capacity(GENERATED_PASSWORD_LEN);

    for (name, pool, count) in [
        ("specials", &policy.specials, 1),
        ("digits", &policy.digits, 3),
        ("uppercase", &policy.uppercase, 2),
        ("lowercase", &policy.lowercase, 3),
    ] {
        let symbols: Vec<char> = pool.chars().collect();
        if symbols.is_empty() {
            return Err(Error::Config(format!("Password pool '{}' is empty", name)));
        }
        for _ in 0..count {
            password.push(symbols[rng.random_range(0..symbols.len())]);
        }
    }

    Ok(password)
}

/// Encode a plaintext password for the `unicodePwd` attribute.
pub fn encode_unicode_pwd(password: &str) -> Vec<u8> {
    format!("\"{password}\"")
        .encode_utf16()
        .flat_map(u16::to_le_bytes)
        .collect()
}
