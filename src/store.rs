// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential store capability and its in-memory implementation.
//!
//! The authentication core never touches identity persistence directly. It
//! talks to a [`CredentialStore`], which owns password hashing, identity
//! records, and role membership.
//!
//! ## In-memory store
//!
//! [`InMemoryCredentialStore`] backs the server binary and the test suite:
//!
//! - usernames and emails are unique and compared case-insensitively
//! - passwords are hashed with Argon2id and a per-identity random salt
//! - new passwords must satisfy [`PasswordPolicy`]

use std::collections::{BTreeSet, HashMap};

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use tokio::{sync::RwLock, task::spawn_blocking};
use uuid::Uuid;

/// Error type for credential store operations.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    /// Backend could not be reached or failed mid-operation
    #[error("credential store unavailable: {0}")]
    Unavailable(String),
    /// The store refused the request; carries human-readable diagnostics
    #[error("rejected: {}", .0.join(" "))]
    Rejected(Vec<String>),
    /// Username or email is already held by another identity
    #[error("{0} is already taken")]
    Duplicate(DuplicateField),
    /// Referenced identity or role does not exist
    #[error("not found: {0}")]
    NotFound(String),
}

/// Unique identity attribute that collided on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateField {
    Username,
    Email,
}

impl std::fmt::Display for DuplicateField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DuplicateField::Username => f.write_str("username"),
            DuplicateField::Email => f.write_str("email"),
        }
    }
}

/// Result type for credential store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// An identity as held by the credential store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRecord {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub roles: BTreeSet<String>,
    /// Rotated on logout; changes invalidate per-user state other than bearer tokens
    pub security_stamp: Uuid,
}

/// Capabilities the authentication core needs from identity persistence.
///
/// Every method may suspend on I/O. Implementations report outages as
/// [`StoreError::Unavailable`] so callers never confuse them with a failed
/// credential check.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<IdentityRecord>>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<IdentityRecord>>;

    async fn check_password(&self, identity: &IdentityRecord, password: &str) -> StoreResult<bool>;

    /// Create an identity with a hashed password and no roles.
    ///
    /// Fails with [`StoreError::Rejected`] when the input violates the
    /// store's username, email, or password rules, and with
    /// [`StoreError::Duplicate`] when the username or email is taken.
    async fn create_identity(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> StoreResult<IdentityRecord>;

    async fn get_roles(&self, identity: &IdentityRecord) -> StoreResult<BTreeSet<String>>;

    /// Create the role if missing. Idempotent.
    async fn ensure_role_exists(&self, name: &str) -> StoreResult<()>;

    /// Add `name` to the identity's roles. Idempotent.
    async fn assign_role(&self, identity: &IdentityRecord, name: &str) -> StoreResult<()>;

    async fn rotate_security_stamp(&self, identity: &IdentityRecord) -> StoreResult<()>;

    /// Cheap connectivity check used by the readiness probe.
    async fn ping(&self) -> StoreResult<()>;
}

/// Password requirements applied when identities are created.
#[derive(Debug, Clone, Copy)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_digit: bool,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
    pub require_non_alphanumeric: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 6,
            require_digit: true,
            require_lowercase: true,
            require_uppercase: true,
            require_non_alphanumeric: true,
        }
    }
}

impl PasswordPolicy {
    /// Return every rule `password` violates.
    pub fn violations(&self, password: &str) -> Vec<String> {
        let mut problems = Vec::new();

        if password.chars().count() < self.min_length {
            problems.push(format!(
                "Passwords must be at least {} characters.",
                self.min_length
            ));
        }
        if self.require_non_alphanumeric && password.chars().all(char::is_alphanumeric) {
            problems.push("Passwords must have at least one non alphanumeric character.".into());
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            problems.push("Passwords must have at least one digit ('0'-'9').".into());
        }
        if self.require_lowercase && !password.chars().any(char::is_lowercase) {
            problems.push("Passwords must have at least one lowercase ('a'-'z').".into());
        }
        if self.require_uppercase && !password.chars().any(char::is_uppercase) {
            problems.push("Passwords must have at least one uppercase ('A'-'Z').".into());
        }

        problems
    }
}

#[derive(Default)]
struct Inner {
    /// Keyed by normalized username
    identities: HashMap<String, IdentityRecord>,
    /// Normalized role names
    roles: BTreeSet<String>,
}

/// Credential store kept entirely in process memory.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    inner: RwLock<Inner>,
    policy: PasswordPolicy,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store enforcing `policy` on new passwords.
    pub fn with_policy(policy: PasswordPolicy) -> Self {
        Self {
            inner: RwLock::default(),
            policy,
        }
    }

    /// Number of stored identities.
    pub async fn identity_count(&self) -> usize {
        self.inner.read().await.identities.len()
    }

    /// Argon2id hash on the blocking pool.
    async fn hash_password(password: &str) -> StoreResult<String> {
        let password = password.to_owned();
        spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| StoreError::Unavailable(format!("password hashing failed: {e}")))
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("password hashing task failed: {e}")))?
    }

    fn validate_new_identity(&self, username: &str, email: &str, password: &str) -> Vec<String> {
        let mut problems = Vec::new();

        if username.trim().is_empty() {
            problems.push("Username is required.".to_string());
        } else if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-._@+".contains(c))
        {
            problems.push(format!(
                "Username '{username}' is invalid, can only contain letters or digits."
            ));
        }

        let email_ok = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
        if !email_ok {
            problems.push(format!("Email '{email}' is invalid."));
        }

        problems.extend(self.policy.violations(password));
        problems
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_uppercase()
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<IdentityRecord>> {
        let inner = self.inner.read().await;
        Ok(inner.identities.get(&normalize(username)).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<IdentityRecord>> {
        let wanted = normalize(email);
        let inner = self.inner.read().await;
        Ok(inner
            .identities
            .values()
            .find(|identity| normalize(&identity.email) == wanted)
            .cloned())
    }

    async fn check_password(&self, identity: &IdentityRecord, password: &str) -> StoreResult<bool> {
        let username = identity.username.clone();
        let stored_hash = identity.password_hash.clone();
        let password = password.to_owned();

        spawn_blocking(move || {
            let parsed = match PasswordHash::new(&stored_hash) {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::warn!(username = %username, error = %e, "Stored password hash is unreadable");
                    return false;
                }
            };
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("password verification task failed: {e}")))
    }

    async fn create_identity(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> StoreResult<IdentityRecord> {
        let problems = self.validate_new_identity(username, email, password);
        if !problems.is_empty() {
            return Err(StoreError::Rejected(problems));
        }

        // Hash before taking the write lock.
        let password_hash = Self::hash_password(password).await?;

        let mut inner = self.inner.write().await;
        let key = normalize(username);
        if inner.identities.contains_key(&key) {
            return Err(StoreError::Duplicate(DuplicateField::Username));
        }
        let wanted_email = normalize(email);
        if inner
            .identities
            .values()
            .any(|identity| normalize(&identity.email) == wanted_email)
        {
            return Err(StoreError::Duplicate(DuplicateField::Email));
        }

        let identity = IdentityRecord {
            id: Uuid::new_v4(),
            username: username.trim().to_string(),
            email: email.trim().to_string(),
            password_hash,
            roles: BTreeSet::new(),
            security_stamp: Uuid::new_v4(),
        };
        inner.identities.insert(key, identity.clone());
        Ok(identity)
    }

    async fn get_roles(&self, identity: &IdentityRecord) -> StoreResult<BTreeSet<String>> {
        let inner = self.inner.read().await;
        inner
            .identities
            .get(&normalize(&identity.username))
            .map(|stored| stored.roles.clone())
            .ok_or_else(|| StoreError::NotFound(format!("Identity {}", identity.username)))
    }

    async fn ensure_role_exists(&self, name: &str) -> StoreResult<()> {
        self.inner.write().await.roles.insert(normalize(name));
        Ok(())
    }

    async fn assign_role(&self, identity: &IdentityRecord, name: &str) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        if !inner.roles.contains(&normalize(name)) {
            return Err(StoreError::NotFound(format!("Role {name}")));
        }
        let stored = inner
            .identities
            .get_mut(&normalize(&identity.username))
            .ok_or_else(|| StoreError::NotFound(format!("Identity {}", identity.username)))?;
        stored.roles.insert(name.to_string());
        Ok(())
    }

    async fn rotate_security_stamp(&self, identity: &IdentityRecord) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .identities
            .get_mut(&normalize(&identity.username))
            .ok_or_else(|| StoreError::NotFound(format!("Identity {}", identity.username)))?;
        stored.security_stamp = Uuid::new_v4();
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD_PASSWORD: &str = "Passw0rd!";

    #[tokio::test]
    async fn create_and_find_identity() {
        let store = InMemoryCredentialStore::new();
        let created = store
            .create_identity("bob", "bob@example.com", GOOD_PASSWORD)
            .await
            .unwrap();
        assert_eq!(created.username, "bob");
        assert!(created.roles.is_empty());
        assert_ne!(created.password_hash, GOOD_PASSWORD);

        let found = store.find_by_username("bob").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        let by_email = store.find_by_email("bob@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);
    }

    #[tokio::test]
    async fn lookups_are_case_insensitive() {
        let store = InMemoryCredentialStore::new();
        store
            .create_identity("Bob", "Bob@Example.com", GOOD_PASSWORD)
            .await
            .unwrap();
        assert!(store.find_by_username("BOB").await.unwrap().is_some());
        assert!(store.find_by_email("bob@example.COM").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn check_password_accepts_only_the_right_password() {
        let store = InMemoryCredentialStore::new();
        let identity = store
            .create_identity("bob", "bob@example.com", GOOD_PASSWORD)
            .await
            .unwrap();
        assert!(store.check_password(&identity, GOOD_PASSWORD).await.unwrap());
        assert!(!store.check_password(&identity, "Wr0ng!pass").await.unwrap());
    }

    #[tokio::test]
    async fn weak_password_reports_every_violation() {
        let store = InMemoryCredentialStore::new();
        let err = store
            .create_identity("bob", "bob@example.com", "abc")
            .await
            .unwrap_err();
        let StoreError::Rejected(problems) = err else {
            panic!("expected rejection");
        };
        assert_eq!(problems.len(), 4);
        assert!(problems.iter().any(|p| p.contains("at least 6 characters")));
        assert!(problems.iter().any(|p| p.contains("digit")));
        assert!(problems.iter().any(|p| p.contains("uppercase")));
        assert!(problems.iter().any(|p| p.contains("non alphanumeric")));
        assert_eq!(store.identity_count().await, 0);
    }

    #[tokio::test]
    async fn invalid_email_and_username_are_rejected() {
        let store = InMemoryCredentialStore::new();
        let err = store
            .create_identity("bad name", "not-an-email", GOOD_PASSWORD)
            .await
            .unwrap_err();
        let StoreError::Rejected(problems) = err else {
            panic!("expected rejection");
        };
        assert_eq!(problems.len(), 2);
    }

    #[tokio::test]
    async fn duplicate_identity_is_rejected_by_the_store() {
        let store = InMemoryCredentialStore::new();
        store
            .create_identity("bob", "bob@example.com", GOOD_PASSWORD)
            .await
            .unwrap();
        let err = store
            .create_identity("BOB", "other@example.com", GOOD_PASSWORD)
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::Duplicate(DuplicateField::Username));

        let err = store
            .create_identity("robert", "BOB@example.com", GOOD_PASSWORD)
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::Duplicate(DuplicateField::Email));
        assert_eq!(store.identity_count().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_of_one_username_yield_one_identity() {
        let store = std::sync::Arc::new(InMemoryCredentialStore::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .create_identity("bob", &format!("bob{i}@example.com"), GOOD_PASSWORD)
                        .await
                })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(err) => assert_eq!(err, StoreError::Duplicate(DuplicateField::Username)),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(store.identity_count().await, 1);
    }

    #[tokio::test]
    async fn roles_must_exist_before_assignment() {
        let store = InMemoryCredentialStore::new();
        let identity = store
            .create_identity("bob", "bob@example.com", GOOD_PASSWORD)
            .await
            .unwrap();

        let err = store.assign_role(&identity, "Manager").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        store.ensure_role_exists("Manager").await.unwrap();
        store.ensure_role_exists("manager").await.unwrap();

        store.assign_role(&identity, "Manager").await.unwrap();
        let roles = store.get_roles(&identity).await.unwrap();
        assert_eq!(roles, BTreeSet::from(["Manager".to_string()]));
    }

    #[tokio::test]
    async fn rotate_security_stamp_changes_stamp() {
        let store = InMemoryCredentialStore::new();
        let identity = store
            .create_identity("bob", "bob@example.com", GOOD_PASSWORD)
            .await
            .unwrap();
        store.rotate_security_stamp(&identity).await.unwrap();
        let reloaded = store.find_by_username("bob").await.unwrap().unwrap();
        assert_ne!(reloaded.security_stamp, identity.security_stamp);
    }

    #[tokio::test]
    async fn store_applies_custom_policy() {
        let store = InMemoryCredentialStore::with_policy(PasswordPolicy {
            min_length: 4,
            require_digit: false,
            require_lowercase: true,
            require_uppercase: false,
            require_non_alphanumeric: false,
        });

        let identity = store
            .create_identity("bob", "bob@example.com", "word")
            .await
            .unwrap();
        assert!(store.check_password(&identity, "word").await.unwrap());

        let err = store
            .create_identity("alice", "alice@example.com", "WORD")
            .await
            .unwrap_err();
        let StoreError::Rejected(problems) = err else {
            panic!("expected rejection");
        };
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("lowercase"));
    }
}
