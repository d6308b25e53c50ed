//! Application-scoped access tokens.
//!
//! Tokens are compact JWTs signed with HS256 using the secret of the
//! application they were issued for:
//!
//! ```text
//! base64url({"alg":"HS256","typ":"JWT"}) . base64url(claims) . base64url(hmac)
//! ```
//!
//! The verifier is always handed the secret by the caller. Nothing inside
//! the token is trusted before the MAC checks out, so an `app_id` claim can
//! never be used to pick the key it is verified with.

use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const ALG_HS256: &str = "HS256";

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token")]
    Invalid,
    #[error("token expired")]
    Expired,
    #[error("invalid token ttl")]
    InvalidTtl,
    #[error("failed to encode token")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct TokenHeader {
    alg: String,
    typ: String,
}

impl TokenHeader {
    fn hs256() -> Self {
        Self {
            alg: ALG_HS256.to_string(),
            typ: "JWT".to_string(),
        }
    }
}

/// Payload carried by every token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub uid: i64,
    pub email: String,
    pub app_id: i32,
    /// Expiry as unix milliseconds; the token is valid while `now < exp`.
    pub exp: i64,
}

/// Issue and verify tokens. The engine only depends on this trait.
pub trait TokenCodec: Send + Sync {
    /// Build and sign a token that expires `ttl` from now.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidTtl`] for a TTL under one second.
    fn issue(
        &self,
        user_id: i64,
        email: &str,
        app_id: i32,
        secret: &[u8],
        ttl: Duration,
    ) -> Result<String, TokenError>;

    /// Check the signature against `secret`, then expiry, and return the claims.
    ///
    /// # Errors
    ///
    /// [`TokenError::Invalid`] for malformed or forged tokens,
    /// [`TokenError::Expired`] once `now >= exp`.
    fn verify(&self, token: &str, secret: &[u8]) -> Result<Claims, TokenError>;
}

/// HS256 codec reading the system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct Hs256Codec;

impl TokenCodec for Hs256Codec {
    fn issue(
        &self,
        user_id: i64,
        email: &str,
        app_id: i32,
        secret: &[u8],
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            uid: user_id,
            email: email.to_string(),
            app_id,
            exp: expiry_millis(since_epoch(), ttl)?,
        };

        sign_hs256(secret, &claims)
    }

    fn verify(&self, token: &str, secret: &[u8]) -> Result<Claims, TokenError> {
        verify_hs256(token, secret, floor_millis(since_epoch()))
    }
}

fn since_epoch() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

fn floor_millis(elapsed: Duration) -> i64 {
    i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
}

/// `exp` for a token issued at `issued` (time since the epoch).
///
/// The issue instant is rounded up to the next millisecond and the verifier
/// rounds the clock down, so a token never expires before `ttl` has elapsed.
fn expiry_millis(issued: Duration, ttl: Duration) -> Result<i64, TokenError> {
    if ttl < Duration::from_secs(1) {
        return Err(TokenError::InvalidTtl);
    }
    let ttl = i64::try_from(ttl.as_millis()).map_err(|_| TokenError::InvalidTtl)?;

    let mut issued_ms = floor_millis(issued);
    if issued.subsec_nanos() % 1_000_000 != 0 {
        issued_ms = issued_ms.saturating_add(1);
    }

    Ok(issued_ms.saturating_add(ttl))
}

fn b64e_json<T: Serialize>(value: &T) -> Result<String, TokenError> {
    let json = serde_json::to_vec(value)?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

fn b64d_json<T: for<'de> Deserialize<'de>>(s: &str) -> Result<T, TokenError> {
    let bytes = Base64UrlUnpadded::decode_vec(s).map_err(|_| TokenError::Invalid)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Invalid)
}

fn mac(secret: &[u8]) -> Result<HmacSha256, TokenError> {
    // HMAC accepts keys of any length; this only fails on a broken backend.
    HmacSha256::new_from_slice(secret).map_err(|_| TokenError::Invalid)
}

/// Sign `claims` with `secret`.
///
/// # Errors
///
/// Returns an error if the claims cannot be serialized.
pub fn sign_hs256(secret: &[u8], claims: &Claims) -> Result<String, TokenError> {
    let header_b64 = b64e_json(&TokenHeader::hs256())?;
    let claims_b64 = b64e_json(claims)?;
    let signing_input = format!("{header_b64}.{claims_b64}");

    let mut mac = mac(secret)?;
    mac.update(signing_input.as_bytes());
    let signature_b64 = Base64UrlUnpadded::encode_string(&mac.finalize().into_bytes());

    Ok(format!("{signing_input}.{signature_b64}"))
}

/// Verify a token at `now_unix_millis` and return its claims.
///
/// # Errors
///
/// [`TokenError::Invalid`] if the token is malformed, the MAC does not match
/// `secret`, or the header names another algorithm. [`TokenError::Expired`]
/// if `now_unix_millis >= exp`.
pub fn verify_hs256(token: &str, secret: &[u8], now_unix_millis: i64) -> Result<Claims, TokenError> {
    let mut parts = token.split('.');
    let header_b64 = parts.next().ok_or(TokenError::Invalid)?;
    let claims_b64 = parts.next().ok_or(TokenError::Invalid)?;
    let sig_b64 = parts.next().ok_or(TokenError::Invalid)?;
    if parts.next().is_some() {
        return Err(TokenError::Invalid);
    }

    let signature = Base64UrlUnpadded::decode_vec(sig_b64).map_err(|_| TokenError::Invalid)?;
    // only the canonical encoding of a signature is accepted
    if Base64UrlUnpadded::encode_string(&signature) != sig_b64 {
        return Err(TokenError::Invalid);
    }

    let mut mac = mac(secret)?;
    mac.update(header_b64.as_bytes());
    mac.update(b".");
    mac.update(claims_b64.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| TokenError::Invalid)?;

    let header: TokenHeader = b64d_json(header_b64)?;
    if header.alg != ALG_HS256 {
        return Err(TokenError::Invalid);
    }

    let claims: Claims = b64d_json(claims_b64)?;
    if now_unix_millis >= claims.exp {
        return Err(TokenError::Expired);
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;
    const SECRET_A: &[u8] = b"app-a-secret";
    const SECRET_B: &[u8] = b"app-b-secret";

    fn test_claims() -> Claims {
        Claims {
            uid: 1,
            email: "a@b.com".to_string(),
            app_id: 7,
            exp: NOW + 3_600_000,
        }
    }

    #[test]
    fn sign_and_verify() -> Result<(), TokenError> {
        let token = sign_hs256(SECRET_A, &test_claims())?;
        assert_eq!(token.split('.').count(), 3);

        let verified = verify_hs256(&token, SECRET_A, NOW)?;
        assert_eq!(verified, test_claims());
        Ok(())
    }

    #[test]
    fn signing_is_deterministic() -> Result<(), TokenError> {
        let first = sign_hs256(SECRET_A, &test_claims())?;
        let second = sign_hs256(SECRET_A, &test_claims())?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn header_is_hs256_jwt() -> Result<(), TokenError> {
        let token = sign_hs256(SECRET_A, &test_claims())?;
        let header_b64 = token.split('.').next().unwrap_or_default();
        let header: TokenHeader = b64d_json(header_b64)?;
        assert_eq!(header, TokenHeader::hs256());
        Ok(())
    }

    #[test]
    fn rejects_other_app_secret() -> Result<(), TokenError> {
        let token = sign_hs256(SECRET_A, &test_claims())?;
        assert!(matches!(
            verify_hs256(&token, SECRET_B, NOW),
            Err(TokenError::Invalid)
        ));
        Ok(())
    }

    #[test]
    fn expiry_boundary() -> Result<(), TokenError> {
        let mut claims = test_claims();
        claims.exp = NOW + 1_000;
        let token = sign_hs256(SECRET_A, &claims)?;

        assert!(verify_hs256(&token, SECRET_A, NOW).is_ok());
        assert!(verify_hs256(&token, SECRET_A, NOW + 999).is_ok());
        assert!(matches!(
            verify_hs256(&token, SECRET_A, NOW + 1_000),
            Err(TokenError::Expired)
        ));
        assert!(matches!(
            verify_hs256(&token, SECRET_A, NOW + 3_600_000),
            Err(TokenError::Expired)
        ));
        Ok(())
    }

    #[test]
    fn expired_token_with_bad_signature_is_invalid() -> Result<(), TokenError> {
        let token = sign_hs256(SECRET_A, &test_claims())?;
        assert!(matches!(
            verify_hs256(&token, SECRET_B, NOW + 9_999_000),
            Err(TokenError::Invalid)
        ));
        Ok(())
    }

    #[test]
    fn any_single_bit_flip_is_rejected() -> Result<(), TokenError> {
        let token = sign_hs256(SECRET_A, &test_claims())?;
        let bytes = token.as_bytes();

        for index in 0..bytes.len() {
            // flipping the low seven bits keeps the byte ASCII, so the
            // mutated token is still a valid &str
            for bit in 0..7 {
                let mut mutated = bytes.to_vec();
                mutated[index] ^= 1 << bit;
                let Ok(mutated) = String::from_utf8(mutated) else {
                    continue;
                };
                assert!(
                    matches!(verify_hs256(&mutated, SECRET_A, NOW), Err(TokenError::Invalid)),
                    "mutation at byte {index} bit {bit} was accepted"
                );
            }
        }
        Ok(())
    }

    #[test]
    fn rejects_forged_app_claim() -> Result<(), TokenError> {
        let token = sign_hs256(SECRET_A, &test_claims())?;
        let mut parts: Vec<&str> = token.split('.').collect();

        let mut forged = test_claims();
        forged.app_id = 8;
        let forged_b64 = b64e_json(&forged)?;
        parts[1] = &forged_b64;

        assert!(matches!(
            verify_hs256(&parts.join("."), SECRET_A, NOW),
            Err(TokenError::Invalid)
        ));
        Ok(())
    }

    #[test]
    fn rejects_malformed_tokens() {
        for token in ["", "a", "a.b", "a.b.c.d", "..", "!!.@@.##"] {
            assert!(
                matches!(verify_hs256(token, SECRET_A, NOW), Err(TokenError::Invalid)),
                "{token:?} was accepted"
            );
        }
    }

    #[test]
    fn rejects_alg_none_even_with_valid_mac() -> Result<(), TokenError> {
        let header_b64 = b64e_json(&TokenHeader {
            alg: "none".to_string(),
            typ: "JWT".to_string(),
        })?;
        let claims_b64 = b64e_json(&test_claims())?;
        let signing_input = format!("{header_b64}.{claims_b64}");
        let mut mac = mac(SECRET_A)?;
        mac.update(signing_input.as_bytes());
        let sig = Base64UrlUnpadded::encode_string(&mac.finalize().into_bytes());

        assert!(matches!(
            verify_hs256(&format!("{signing_input}.{sig}"), SECRET_A, NOW),
            Err(TokenError::Invalid)
        ));
        Ok(())
    }

    #[test]
    fn codec_issues_tokens_expiring_after_ttl() -> Result<(), TokenError> {
        let before = floor_millis(since_epoch());
        let token = Hs256Codec.issue(1, "a@b.com", 7, SECRET_A, Duration::from_secs(3600))?;
        let after = floor_millis(since_epoch());

        let claims = Hs256Codec.verify(&token, SECRET_A)?;
        assert_eq!(claims.uid, 1);
        assert_eq!(claims.app_id, 7);
        assert!(claims.exp >= before + 3_600_000 && claims.exp <= after + 3_601_000);
        Ok(())
    }

    #[test]
    fn expiry_keeps_sub_second_issue_time() -> Result<(), TokenError> {
        // issued 950ms into a second, one second before the next boundary
        let issued = Duration::from_millis(100_950);
        let exp = expiry_millis(issued, Duration::from_secs(1))?;
        assert_eq!(exp, 101_950);

        let mut claims = test_claims();
        claims.exp = exp;
        let token = sign_hs256(SECRET_A, &claims)?;

        // crossing the second boundary does not expire it
        assert!(verify_hs256(&token, SECRET_A, 101_000).is_ok());
        assert!(verify_hs256(&token, SECRET_A, 101_949).is_ok());
        assert!(matches!(
            verify_hs256(&token, SECRET_A, 101_950),
            Err(TokenError::Expired)
        ));
        Ok(())
    }

    #[test]
    fn expiry_rounds_partial_millisecond_up() -> Result<(), TokenError> {
        let issued = Duration::from_nanos(100_950_000_001);
        assert_eq!(expiry_millis(issued, Duration::from_secs(1))?, 101_951);
        Ok(())
    }

    #[test]
    fn codec_rejects_zero_ttl() {
        let result = Hs256Codec.issue(1, "a@b.com", 7, SECRET_A, Duration::from_millis(500));
        assert!(matches!(result, Err(TokenError::InvalidTtl)));
    }
}
