// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for authentication tests.

use std::collections::BTreeSet;

use async_trait::async_trait;

use super::{Registrar, Role, TokenCodec};
use crate::config::JwtSettings;
use crate::store::{CredentialStore, IdentityRecord, InMemoryCredentialStore, StoreError, StoreResult};

/// Satisfies the default password policy.
pub const PASSWORD: &str = "Passw0rd!";

pub fn settings() -> JwtSettings {
    JwtSettings {
        secret: "test-secret-that-is-at-least-32-bytes-long".to_string(),
        issuer: "https://stock.example.com".to_string(),
        audience: "stock-clients".to_string(),
    }
}

pub fn codec() -> TokenCodec {
    TokenCodec::new(&settings())
}

/// In-memory store with one identity per `(username, role)`, all using
/// [`PASSWORD`] and `<username>@example.com`.
pub async fn seeded_store(users: &[(&str, Role)]) -> InMemoryCredentialStore {
    let store = InMemoryCredentialStore::new();
    let registrar = Registrar::new(&store);
    for (username, role) in users {
        registrar
            .register_with_role(username, &format!("{username}@example.com"), PASSWORD, *role)
            .await
            .expect("seed identity");
    }
    store
}

/// A credential store whose backend is unreachable.
pub struct DownStore;

fn down<T>() -> StoreResult<T> {
    Err(StoreError::Unavailable("connection refused".to_string()))
}

#[async_trait]
impl CredentialStore for DownStore {
    async fn find_by_username(&self, _username: &str) -> StoreResult<Option<IdentityRecord>> {
        down()
    }

    async fn find_by_email(&self, _email: &str) -> StoreResult<Option<IdentityRecord>> {
        down()
    }

    async fn check_password(&self, _identity: &IdentityRecord, _password: &str) -> StoreResult<bool> {
        down()
    }

    async fn create_identity(
        &self,
        _username: &str,
        _email: &str,
        _password: &str,
    ) -> StoreResult<IdentityRecord> {
        down()
    }

    async fn get_roles(&self, _identity: &IdentityRecord) -> StoreResult<BTreeSet<String>> {
        down()
    }

    async fn ensure_role_exists(&self, _name: &str) -> StoreResult<()> {
        down()
    }

    async fn assign_role(&self, _identity: &IdentityRecord, _name: &str) -> StoreResult<()> {
        down()
    }

    async fn rotate_security_stamp(&self, _identity: &IdentityRecord) -> StoreResult<()> {
        down()
    }

    async fn ping(&self) -> StoreResult<()> {
        down()
    }
}
