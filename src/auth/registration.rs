// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity registration and role assignment.
//!
//! Registration is three independent store calls (create identity, ensure
//! roles, assign role) with no transaction around them. A failure part-way
//! leaves an identity without its role; repeating the registration reports
//! a duplicate, and the role can be attached by an administrator.

use super::roles::Role;
use super::AuthError;
use crate::store::{CredentialStore, IdentityRecord};

/// Creates identities and attaches one of the fixed roles.
pub struct Registrar<'a> {
    store: &'a dyn CredentialStore,
}

impl<'a> Registrar<'a> {
    pub fn new(store: &'a dyn CredentialStore) -> Self {
        Self { store }
    }

    /// Make sure every role in [`Role::ALL`] exists in the store.
    pub async fn ensure_roles(&self) -> Result<(), AuthError> {
        for role in Role::ALL {
            self.store.ensure_role_exists(role.as_str()).await?;
        }
        Ok(())
    }

    /// Register a new identity holding `role`.
    pub async fn register_with_role(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<IdentityRecord, AuthError> {
        if self.store.find_by_username(username).await?.is_some() {
            tracing::info!(username = %username, "Registration rejected: username taken");
            return Err(AuthError::DuplicateUsername);
        }
        if self.store.find_by_email(email).await?.is_some() {
            tracing::info!(username = %username, "Registration rejected: email taken");
            return Err(AuthError::DuplicateEmail);
        }

        let identity = self
            .store
            .create_identity(username, email, password)
            .await
            .inspect_err(|e| tracing::info!(username = %username, error = %e, "Identity creation failed"))?;

        self.ensure_roles().await?;

        let current = self.store.get_roles(&identity).await?;
        if !current.contains(role.as_str()) {
            self.store.assign_role(&identity, role.as_str()).await?;
        }

        tracing::info!(username = %identity.username, role = %role, "Registered identity");
        Ok(identity)
    }
}
