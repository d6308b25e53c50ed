//! Storage contracts consumed by the auth engine.
//!
//! The engine only sees these traits; `postgres` is the production adapter
//! and `memory` is an in-process fake with the same semantics.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStorage;
pub use postgres::PgStorage;

use crate::models::{App, User};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("user already exists")]
    UserExists,
    #[error("user not found")]
    UserNotFound,
    #[error("app not found")]
    AppNotFound,
    #[error("storage operation timed out")]
    Timeout,
    #[error("storage unavailable")]
    Unavailable(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => Self::Timeout,
            other => Self::Unavailable(other),
        }
    }
}

/// Persists new users.
#[async_trait]
pub trait UserSaver: Send + Sync {
    /// Insert a user if the email is free and return the assigned id.
    ///
    /// Must be atomic: of two concurrent saves for one email exactly one
    /// succeeds, the other gets [`StorageError::UserExists`].
    async fn save_user(&self, email: &str, pass_hash: &[u8]) -> Result<i64, StorageError>;
}

#[async_trait]
pub trait UserProvider: Send + Sync {
    async fn user(&self, email: &str) -> Result<User, StorageError>;
    async fn is_admin(&self, user_id: i64) -> Result<bool, StorageError>;
}

#[async_trait]
pub trait AppProvider: Send + Sync {
    async fn app(&self, app_id: i32) -> Result<App, StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_timeout_maps_to_timeout() {
        assert!(matches!(
            StorageError::from(sqlx::Error::PoolTimedOut),
            StorageError::Timeout
        ));
    }

    #[test]
    fn other_sqlx_errors_map_to_unavailable() {
        assert!(matches!(
            StorageError::from(sqlx::Error::PoolClosed),
            StorageError::Unavailable(_)
        ));
    }
}
