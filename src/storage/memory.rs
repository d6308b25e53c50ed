//! In-process storage used by tests and local experiments.

use super::{AppProvider, StorageError, UserProvider, UserSaver};
use crate::models::{App, User};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretSlice};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    users: HashMap<String, User>,
    admins: HashSet<i64>,
    apps: HashMap<i32, (String, SecretSlice<u8>)>,
    next_user_id: i64,
}

/// Storage backed by maps behind a single lock.
///
/// User ids start at 1 and increase by one per successful insert.
#[derive(Default)]
pub struct MemoryStorage {
    tables: RwLock<Tables>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Provision an application (replaces an existing one with the same id).
    pub async fn add_app(&self, id: i32, name: impl Into<String>, secret: Vec<u8>) {
        self.tables
            .write()
            .await
            .apps
            .insert(id, (name.into(), SecretSlice::from(secret)));
    }

    /// Set the admin flag for an existing user.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::UserNotFound`] if no user has this id.
    pub async fn set_admin(&self, user_id: i64, is_admin: bool) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;
        if !tables.users.values().any(|user| user.id == user_id) {
            return Err(StorageError::UserNotFound);
        }
        if is_admin {
            tables.admins.insert(user_id);
        } else {
            tables.admins.remove(&user_id);
        }
        Ok(())
    }
}

#[async_trait]
impl UserSaver for MemoryStorage {
    async fn save_user(&self, email: &str, pass_hash: &[u8]) -> Result<i64, StorageError> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(email) {
            return Err(StorageError::UserExists);
        }

        tables.next_user_id += 1;
        let id = tables.next_user_id;
        tables.users.insert(
            email.to_string(),
            User {
                id,
                email: email.to_string(),
                pass_hash: pass_hash.to_vec(),
            },
        );

        Ok(id)
    }
}

#[async_trait]
impl UserProvider for MemoryStorage {
    async fn user(&self, email: &str) -> Result<User, StorageError> {
        self.tables
            .read()
            .await
            .users
            .get(email)
            .cloned()
            .ok_or(StorageError::UserNotFound)
    }

    async fn is_admin(&self, user_id: i64) -> Result<bool, StorageError> {
        let tables = self.tables.read().await;
        if !tables.users.values().any(|user| user.id == user_id) {
            return Err(StorageError::UserNotFound);
        }
        Ok(tables.admins.contains(&user_id))
    }
}

#[async_trait]
impl AppProvider for MemoryStorage {
    async fn app(&self, app_id: i32) -> Result<App, StorageError> {
        let tables = self.tables.read().await;
        let (name, secret) = tables.apps.get(&app_id).ok_or(StorageError::AppNotFound)?;
        Ok(App::new(app_id, name.clone(), secret.expose_secret().to_vec()))
    }
}
