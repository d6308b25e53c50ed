//! Domain records shared by the storage layer and the auth engine.

use secrecy::{ExposeSecret, SecretSlice};
use std::fmt;

/// A registered user.
///
/// `pass_hash` holds the Argon2id PHC string as bytes. It never leaves the
/// engine and is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub pass_hash: Vec<u8>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("pass_hash", &"[REDACTED]")
            .finish()
    }
}

/// A tenant application with its own token signing secret.
pub struct App {
    pub id: i32,
    pub name: String,
    pub secret: SecretSlice<u8>,
}

impl App {
    #[must_use]
    pub fn new(id: i32, name: impl Into<String>, secret: Vec<u8>) -> Self {
        Self {
            id,
            name: name.into(),
            secret: SecretSlice::from(secret),
        }
    }

    #[must_use]
    pub fn secret(&self) -> &[u8] {
        self.secret.expose_secret()
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
