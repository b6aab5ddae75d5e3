// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Username/password login.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::claims::ClaimSet;
use super::codec::{token_lifetime, IssuedToken, TokenCodec};
use super::AuthError;
use crate::store::CredentialStore;

/// Identity projection returned next to a token for client display.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub user_name: String,
    /// Absent on refresh, which never consults the credential store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub roles: Vec<String>,
}

/// Response body for login and token refresh.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    /// Absolute expiry, RFC 3339
    pub expiration: DateTime<Utc>,
    pub user_data: UserData,
}

impl TokenResponse {
    pub(crate) fn new(issued: IssuedToken, user_data: UserData) -> Self {
        Self {
            token: issued.token,
            expiration: issued.expires_at,
            user_data,
        }
    }
}

/// Verifies credentials against the store and mints access tokens.
pub struct TokenIssuer<'a> {
    store: &'a dyn CredentialStore,
    codec: &'a TokenCodec,
}

impl<'a> TokenIssuer<'a> {
    pub fn new(store: &'a dyn CredentialStore, codec: &'a TokenCodec) -> Self {
        Self { store, codec }
    }

    /// Authenticate `username`/`password` and issue a token.
    ///
    /// Unknown users and wrong passwords both yield
    /// [`AuthError::AuthenticationFailed`]. Store outages are reported as
    /// [`AuthError::StoreUnavailable`].
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<TokenResponse, AuthError> {
        let Some(identity) = self.store.find_by_username(username).await? else {
            tracing::warn!(username = %username, reason = "unknown_user", "Login rejected");
            return Err(AuthError::AuthenticationFailed);
        };

        if !self.store.check_password(&identity, password).await? {
            tracing::warn!(username = %username, reason = "bad_password", "Login rejected");
            return Err(AuthError::AuthenticationFailed);
        }

        let roles = self.store.get_roles(&identity).await?;
        let claims = ClaimSet::new(identity.username.clone(), roles);
        let issued = self.codec.encode(&claims, token_lifetime())?;

        tracing::info!(
            username = %identity.username,
            token_id = %claims.token_id,
            expires_at = %issued.expires_at,
            "Issued access token"
        );

        Ok(TokenResponse::new(
            issued,
            UserData {
                user_name: identity.username,
                email: Some(identity.email),
                roles: claims.roles.into_iter().collect(),
            },
        ))
    }
}
