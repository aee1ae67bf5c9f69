//! # Password Hashing
//!
//! Password hashing and verification using Argon2.

use argon2::{
    password_hash::{
        rand_core::{OsRng, RngCore},
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2,
};
use lib_utils::validate_min_length;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 8;

const TEMP_PASSWORD_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnpqrstuvwxyz23456789";

/// Hash a password using the Argon2 algorithm.
pub fn hash_password(password: &str) -> Result<String, String> {
    validate_min_length(password, MIN_PASSWORD_LEN, "Password")?;

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| format!("Failed to hash password: {}", e))?
        .to_string();

    Ok(password_hash)
}

/// Verify a plaintext password against an Argon2 hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, String> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| format!("Failed to parse hash: {}", e))?;

    let argon2 = Argon2::default();

    Ok(argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Generate a random temporary password for admin-driven resets.
///
/// Ambiguous glyphs (`0`, `O`, `1`, `l`, `I`) are left out of the alphabet.
pub fn generate_temporary_password(len: usize) -> String {
    let len = len.max(MIN_PASSWORD_LEN);
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);

    bytes
        .into_iter()
        .map(|b| TEMP_PASSWORD_ALPHABET[b as usize % TEMP_PASSWORD_ALPHABET.len()] as char)
        .collect()
}
