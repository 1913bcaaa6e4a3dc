// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User account table.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::ErrorCode;

/// A stored user account.
///
/// `password_updated_at` doubles as the credential freshness marker: tokens
/// embed it at mint time and become stale the moment it changes.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub salt: String,
    pub password_updated_at: DateTime<Utc>,
}

/// User table. Usernames are unique.
#[derive(Debug)]
pub struct UserStore {
    users: RwLock<HashMap<i64, UserRecord>>,
    next_id: AtomicI64,
}

impl Default for UserStore {
    fn default() -> Self {
        Self { users: RwLock::new(HashMap::new()), next_id: AtomicI64::new(1) }
    }
}

impl UserStore {
    /// Insert a new account. `Conflict` when the username is taken.
    pub async fn create(
        &self,
        username: &str,
        password_hash: &str,
        salt: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<UserRecord, ErrorCode> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.username == username) {
            return Err(ErrorCode::Conflict);
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let record = UserRecord {
            id,
            username: username.to_owned(),
            password_hash: password_hash.to_owned(),
            salt: salt.to_owned(),
            password_updated_at: updated_at,
        };
        users.insert(id, record.clone());
        Ok(record)
    }

    pub async fn find(&self, id: i64) -> Option<UserRecord> {
        self.users.read().await.get(&id).cloned()
    }

    pub async fn find_by_username(&self, username: &str) -> Option<UserRecord> {
        self.users.read().await.values().find(|u| u.username == username).cloned()
    }

    /// Rename an account. `Conflict` when another account holds the name.
    pub async fn update_username(&self, id: i64, username: &str) -> Result<UserRecord, ErrorCode> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.username == username && u.id != id) {
            return Err(ErrorCode::Conflict);
        }
        let user = users.get_mut(&id).ok_or(ErrorCode::NotFound)?;
        user.username = username.to_owned();
        Ok(user.clone())
    }

    /// Replace the password hash and salt, advancing the freshness marker.
    /// Every previously issued token for this account is stale afterwards.
    pub async fn update_password(
        &self,
        id: i64,
        password_hash: &str,
        salt: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<UserRecord, ErrorCode> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(ErrorCode::NotFound)?;
        user.password_hash = password_hash.to_owned();
        user.salt = salt.to_owned();
        user.password_updated_at = updated_at;
        Ok(user.clone())
    }

    pub async fn delete(&self, id: i64) -> Option<UserRecord> {
        self.users.write().await.remove(&id)
    }
}
