// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Claim sets and the authenticated user representation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity facts embedded in an access token.
///
/// A claim set is immutable once built. Every call to [`ClaimSet::new`]
/// draws a fresh `token_id`, so two tokens minted for the same user never
/// share one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimSet {
    /// Username of the token holder
    pub subject: String,
    /// Role names, treated as opaque strings
    pub roles: BTreeSet<String>,
    /// Unique token identifier (`jti`)
    pub token_id: Uuid,
}

impl ClaimSet {
    pub fn new<I, S>(subject: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            subject: subject.into(),
            roles: roles.into_iter().map(Into::into).collect(),
            token_id: Uuid::new_v4(),
        }
    }

    /// Same subject and roles under a new token id.
    pub fn reissue(&self) -> Self {
        Self {
            subject: self.subject.clone(),
            roles: self.roles.clone(),
            token_id: Uuid::new_v4(),
        }
    }
}

/// JWT payload as it appears on the wire.
///
/// `name` and `role` default to empty so that a correctly signed token with
/// a missing subject still decodes; the refresher rejects it afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct JwtClaims {
    /// Subject (username)
    #[serde(default)]
    pub name: String,
    /// Token ID
    pub jti: Uuid,
    /// Role names
    #[serde(default, rename = "role")]
    pub roles: Vec<String>,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

impl JwtClaims {
    pub(crate) fn into_claim_set(self) -> ClaimSet {
        ClaimSet {
            subject: self.name,
            roles: self.roles.into_iter().collect(),
            token_id: self.jti,
        }
    }
}

/// Authenticated user extracted from a verified bearer token.
///
/// This is the type handlers receive from the [`super::Auth`] extractor.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Username (`name` claim)
    pub username: String,
    /// Role names from the token
    pub roles: BTreeSet<String>,
    /// ID of the token that authenticated this request
    pub token_id: Uuid,
}

impl From<ClaimSet> for AuthenticatedUser {
    fn from(claims: ClaimSet) -> Self {
        Self {
            username: claims.subject,
            roles: claims.roles,
            token_id: claims.token_id,
        }
    }
}
