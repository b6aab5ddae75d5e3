// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token refresh.
//!
//! A refresh trusts any token that carries a valid signature, issuer and
//! audience, even past its expiry. The credential store is not consulted:
//! the signature is the proof of the earlier login, so only holders of the
//! signing key can forge a refresh.

use super::codec::{token_lifetime, TokenCodec};
use super::issuer::{TokenResponse, UserData};
use super::AuthError;

pub struct TokenRefresher<'a> {
    codec: &'a TokenCodec,
}

impl<'a> TokenRefresher<'a> {
    pub fn new(codec: &'a TokenCodec) -> Self {
        Self { codec }
    }

    /// Exchange `old_token` for a new token with the same subject and roles.
    pub fn refresh(&self, old_token: &str) -> Result<TokenResponse, AuthError> {
        let claims = self.codec.decode(old_token, false)?;

        if claims.subject.trim().is_empty()
            || claims.roles.is_empty()
            || claims.roles.iter().any(|role| role.trim().is_empty())
        {
            return Err(AuthError::InvalidTokenPayload);
        }

        let renewed = claims.reissue();
        let issued = self.codec.encode(&renewed, token_lifetime())?;

        tracing::info!(
            username = %renewed.subject,
            previous_token_id = %claims.token_id,
            token_id = %renewed.token_id,
            "Refreshed access token"
        );

        Ok(TokenResponse::new(
            issued,
            UserData {
                user_name: renewed.subject,
                email: None,
                roles: renewed.roles.into_iter().collect(),
            },
        ))
    }
}
