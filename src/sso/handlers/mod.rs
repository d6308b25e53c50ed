pub mod health;
pub use self::health::health;

pub mod user_register;
pub use self::user_register::register;

pub mod user_login;
pub use self::user_login::login;

pub mod is_admin;
pub use self::is_admin::is_admin;

pub mod token_validate;
pub use self::token_validate::validate;

// common functions for the handlers
use crate::{auth::AuthError, token::TokenError};
use axum::http::StatusCode;
use regex::Regex;
use std::sync::LazyLock;
use tracing::error;

pub const EMPTY_ID: i64 = 0;

static EMAIL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

pub fn valid_email(email: &str) -> bool {
    EMAIL_RE
        .as_ref()
        .is_some_and(|re| re.is_match(email.trim()))
}

/// Reject an empty email or password before the engine is involved.
pub fn validate_email_password(email: &str, password: &str) -> Result<(), (StatusCode, String)> {
    if email.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "email is required".to_string()));
    }
    if password.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "password is required".to_string()));
    }
    Ok(())
}

pub fn missing_payload() -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, "Missing payload".to_string())
}

/// Map an engine failure to a status and a message that is safe to return.
///
/// Infrastructure failures are logged here and answered with a generic 500.
pub fn error_response(err: &AuthError) -> (StatusCode, String) {
    match err {
        AuthError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            "invalid email or password".to_string(),
        ),
        AuthError::AppNotFound => (StatusCode::BAD_REQUEST, "invalid app_id".to_string()),
        AuthError::UserNotFound => (StatusCode::NOT_FOUND, "user not found".to_string()),
        AuthError::UserExists => (StatusCode::CONFLICT, "user already exists".to_string()),
        AuthError::Token(TokenError::Invalid | TokenError::Expired) => {
            (StatusCode::UNAUTHORIZED, "invalid token".to_string())
        }
        AuthError::Token(_) | AuthError::Storage(_) | AuthError::Internal(_) => {
            error!("request failed: {:?}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error".to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(valid_email("a@b.com"));
        assert!(valid_email("name.surname@example.co"));
    }

    #[test]
    fn email_pattern_compiles() {
        assert!(EMAIL_RE.is_some());
        assert!(valid_email(" padded@example.com "));
    }

    #[test]
    fn valid_email_rejects_missing_parts() {
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("missing-at.example.com"));
        assert!(!valid_email("missing-domain@"));
    }

    #[test]
    fn empty_fields_are_rejected() {
        assert_eq!(
            validate_email_password("", "pw"),
            Err((StatusCode::BAD_REQUEST, "email is required".to_string()))
        );
        assert_eq!(
            validate_email_password("   ", "pw"),
            Err((StatusCode::BAD_REQUEST, "email is required".to_string()))
        );
        assert_eq!(
            validate_email_password("a@b.com", ""),
            Err((StatusCode::BAD_REQUEST, "password is required".to_string()))
        );
        assert_eq!(validate_email_password("a@b.com", "pw"), Ok(()));
    }

    #[test]
    fn domain_errors_map_to_client_statuses() {
        assert_eq!(
            error_response(&AuthError::InvalidCredentials).0,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            error_response(&AuthError::AppNotFound).0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_response(&AuthError::UserNotFound).0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_response(&AuthError::UserExists).0,
            StatusCode::CONFLICT
        );
        assert_eq!(
            error_response(&AuthError::Token(TokenError::Expired)).0,
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn infrastructure_errors_do_not_leak_details() {
        let (status, message) = error_response(&AuthError::Storage(StorageError::Timeout));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "internal error");

        let (status, message) = error_response(&AuthError::Internal(anyhow::anyhow!("argon2 exploded")));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!message.contains("argon2"));
    }
}
