//! Password hashes and bearer tokens.
//!
//! Passwords are stored as Argon2id PHC strings, which carry their own salt
//! and cost parameters. Bearer tokens are random alphanumeric strings handed
//! to the client once; only their SHA-256 digest is persisted.

use std::sync::LazyLock;

use argon2::Argon2;
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use rand::distr::Alphanumeric;
use rand::{Rng, RngCore};
use sha2::{Digest, Sha256};

const SALT_BYTES: usize = 16;
const TOKEN_LEN: usize = 40;

/// Hash checked when a login names an unknown email, so that branch costs as
/// much as a wrong password.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("not-a-real-account-password").ok());

/// Argon2id PHC string for `password` under a fresh random salt.
///
/// # Errors
///
/// Returns `password_hash::Error` if the hasher rejects its input.
pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    let mut bytes = [0u8; SALT_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    let salt = SaltString::encode_b64(&bytes)?;
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Check `password` against a stored PHC string. Malformed hashes never
/// verify.
#[must_use]
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Spend one verification on a throwaway hash. Always false.
pub fn verify_unknown_account(password: &str) -> bool {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
    false
}

/// New plaintext bearer token.
#[must_use]
pub fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// Storage key for a plaintext bearer token.
#[must_use]
pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
