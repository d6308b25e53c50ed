//! Authentication engine.
//!
//! [`Auth`] verifies credentials, registers users, mints application-scoped
//! tokens and answers admin lookups. It holds no mutable state: storage and
//! token signing are injected through the traits in [`crate::storage`] and
//! [`crate::token`], which keeps it safe to share across any number of
//! concurrent requests.
//!
//! Emails are normalized (trimmed, lowercased) before they reach storage, at
//! registration and at login alike.

pub mod password;

use crate::{
    storage::{AppProvider, StorageError, UserProvider, UserSaver},
    token::{Claims, TokenCodec, TokenError},
};
use argon2::{Argon2, Params};
use secrecy::{ExposeSecret, SecretString};
use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};
use thiserror::Error;
use tracing::{debug, info, info_span, warn, Instrument, Span};

const DUMMY_PASSWORD: &[u8] = b"sso-dummy-password";

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password; callers cannot tell the two apart.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("user already exists")]
    UserExists,
    #[error("app not found")]
    AppNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error(transparent)]
    Token(TokenError),
    #[error("storage failure")]
    Storage(#[source] StorageError),
    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}

impl AuthError {
    /// Failures caused by infrastructure rather than by the caller's input.
    #[must_use]
    pub fn is_infrastructure(&self) -> bool {
        match self {
            Self::Storage(_) | Self::Internal(_) => true,
            Self::Token(err) => matches!(err, TokenError::Encode(_) | TokenError::InvalidTtl),
            _ => false,
        }
    }
}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UserExists => Self::UserExists,
            StorageError::UserNotFound => Self::UserNotFound,
            StorageError::AppNotFound => Self::AppNotFound,
            other => Self::Storage(other),
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        Self::Token(err)
    }
}

/// Normalize an email for lookup/uniqueness checks.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub struct Auth {
    span: Span,
    user_saver: Arc<dyn UserSaver>,
    user_provider: Arc<dyn UserProvider>,
    app_provider: Arc<dyn AppProvider>,
    codec: Arc<dyn TokenCodec>,
    token_ttl: Duration,
    argon2: Argon2<'static>,
    dummy_hash: OnceLock<Vec<u8>>,
}

impl Auth {
    /// Create the engine. Operations are traced as children of `span`.
    #[must_use]
    pub fn new(
        span: Span,
        user_saver: Arc<dyn UserSaver>,
        user_provider: Arc<dyn UserProvider>,
        app_provider: Arc<dyn AppProvider>,
        codec: Arc<dyn TokenCodec>,
        token_ttl: Duration,
    ) -> Self {
        Self {
            span,
            user_saver,
            user_provider,
            app_provider,
            codec,
            token_ttl,
            argon2: password::hasher(Params::default()),
            dummy_hash: OnceLock::new(),
        }
    }

    /// Replace the Argon2id cost parameters used for new hashes.
    #[must_use]
    pub fn with_hash_params(mut self, params: Params) -> Self {
        self.argon2 = password::hasher(params);
        self.dummy_hash = OnceLock::new();
        self
    }

    #[must_use]
    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Check the credentials and return a token for `app_id`.
    ///
    /// # Errors
    ///
    /// - [`AuthError::AppNotFound`] if the application is not provisioned
    /// - [`AuthError::InvalidCredentials`] for an unknown email or a wrong password
    /// - [`AuthError::Storage`] / [`AuthError::Internal`] for infrastructure failures
    pub async fn login(&self, email: &str, password: &str, app_id: i32) -> Result<String, AuthError> {
        let span = info_span!(parent: &self.span, "auth.login", app_id, user_id = tracing::field::Empty);
        let password = SecretString::from(password.to_string());

        async {
            let app = self.app_provider.app(app_id).await.map_err(|err| {
                if matches!(err, StorageError::AppNotFound) {
                    warn!("app not found");
                }
                AuthError::from(err)
            })?;

            let email = normalize_email(email);
            let user = match self.user_provider.user(&email).await {
                Ok(user) => Some(user),
                Err(StorageError::UserNotFound) => None,
                Err(err) => return Err(err.into()),
            };

            let Some(user) = user else {
                // burn the same hashing work as a real check
                let dummy = self.dummy_hash().await?;
                self.verify(password, dummy).await?;
                info!("login rejected");
                return Err(AuthError::InvalidCredentials);
            };

            Span::current().record("user_id", user.id);

            if !self.verify(password, user.pass_hash.clone()).await? {
                info!("login rejected");
                return Err(AuthError::InvalidCredentials);
            }

            let token = self
                .codec
                .issue(user.id, &user.email, app.id, app.secret(), self.token_ttl)?;

            info!("user logged in");

            Ok(token)
        }
        .instrument(span)
        .await
    }

    /// Hash the password and store a new user, returning its id.
    ///
    /// # Errors
    ///
    /// - [`AuthError::UserExists`] if the (normalized) email is taken
    /// - [`AuthError::Storage`] / [`AuthError::Internal`] for infrastructure failures
    pub async fn register_new_user(&self, email: &str, password: &str) -> Result<i64, AuthError> {
        let span = info_span!(parent: &self.span, "auth.register", user_id = tracing::field::Empty);
        let password = SecretString::from(password.to_string());

        async {
            let email = normalize_email(email);
            let pass_hash = self.hash(password).await?;

            let user_id = self
                .user_saver
                .save_user(&email, &pass_hash)
                .await
                .map_err(|err| {
                    if matches!(err, StorageError::UserExists) {
                        info!("user already exists");
                    }
                    AuthError::from(err)
                })?;

            Span::current().record("user_id", user_id);
            info!("user registered");

            Ok(user_id)
        }
        .instrument(span)
        .await
    }

    /// Look up the admin flag, always from storage.
    ///
    /// # Errors
    ///
    /// [`AuthError::UserNotFound`] if the user does not exist.
    pub async fn is_admin(&self, user_id: i64) -> Result<bool, AuthError> {
        let span = info_span!(parent: &self.span, "auth.is_admin", user_id);

        async {
            let is_admin = self.user_provider.is_admin(user_id).await?;
            debug!(is_admin, "checked admin flag");
            Ok(is_admin)
        }
        .instrument(span)
        .await
    }

    /// Verify a token presented to application `app_id`.
    ///
    /// The secret comes from the caller's `app_id`, never from the token, and
    /// the token's own `app_id` claim must agree with it.
    ///
    /// # Errors
    ///
    /// - [`AuthError::AppNotFound`] if the application is not provisioned
    /// - [`AuthError::Token`] with [`TokenError::Invalid`] or [`TokenError::Expired`]
    pub async fn validate_token(&self, token: &str, app_id: i32) -> Result<Claims, AuthError> {
        let span = info_span!(parent: &self.span, "auth.validate", app_id);

        async {
            let app = self.app_provider.app(app_id).await?;
            let claims = self.codec.verify(token, app.secret())?;
            if claims.app_id != app.id {
                return Err(TokenError::Invalid.into());
            }
            debug!(user_id = claims.uid, "token accepted");
            Ok(claims)
        }
        .instrument(span)
        .await
    }

    async fn dummy_hash(&self) -> Result<Vec<u8>, AuthError> {
        if let Some(hash) = self.dummy_hash.get() {
            return Ok(hash.clone());
        }
        let argon2 = self.argon2.clone();
        let hash = tokio::task::spawn_blocking(move || {
            password::hash_password(&argon2, DUMMY_PASSWORD)
        })
        .await
        .map_err(|err| AuthError::Internal(err.into()))?
        .map_err(AuthError::Internal)?;
        Ok(self.dummy_hash.get_or_init(|| hash).clone())
    }

    async fn hash(&self, password: SecretString) -> Result<Vec<u8>, AuthError> {
        let argon2 = self.argon2.clone();
        tokio::task::spawn_blocking(move || {
            password::hash_password(&argon2, password.expose_secret().as_bytes())
        })
        .await
        .map_err(|err| AuthError::Internal(err.into()))?
        .map_err(AuthError::Internal)
    }

    async fn verify(&self, password: SecretString, stored: Vec<u8>) -> Result<bool, AuthError> {
        let argon2 = self.argon2.clone();
        tokio::task::spawn_blocking(move || {
            password::verify_password(&argon2, password.expose_secret().as_bytes(), &stored)
        })
        .await
        .map_err(|err| AuthError::Internal(err.into()))
    }
}
