//! Argon2id password hashing.
//!
//! Every hash gets a fresh random salt; the PHC string stores the salt and
//! parameters next to the digest, so verification needs nothing else.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::SaltString, Algorithm, Argon2, Params, PasswordHash, PasswordHasher,
    PasswordVerifier, Version,
};
use rand::rngs::OsRng;

/// Build an Argon2id hasher with the given cost parameters.
#[must_use]
pub fn hasher(params: Params) -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
}

/// Hash a password, returning the PHC string as bytes.
///
/// # Errors
///
/// Returns an error if Argon2 rejects the input (e.g. exceeds length limits).
pub fn hash_password(argon2: &Argon2<'_>, password: &[u8]) -> Result<Vec<u8>> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(password, &salt)
        .map_err(|_| anyhow!("failed to hash password"))?
        .to_string();
    Ok(hash.into_bytes())
}

/// Check a password against a stored PHC hash.
///
/// A hash that cannot be parsed never matches.
#[must_use]
pub fn verify_password(argon2: &Argon2<'_>, password: &[u8], stored: &[u8]) -> bool {
    let Ok(stored) = std::str::from_utf8(stored) else {
        return false;
    };
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    argon2.verify_password(password, &parsed).is_ok()
}
