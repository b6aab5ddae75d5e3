// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! This module issues and verifies the bearer tokens of the Stock API.
//!
//! ## Auth Flow
//!
//! 1. Client registers through one of the `register-*` endpoints, which
//!    creates the identity and attaches the matching role
//! 2. Client logs in with username and password and receives an HS256 JWT
//!    valid for three hours
//! 3. Client sends `Authorization: Bearer <token>` to protected endpoints
//! 4. Before or after expiry, client exchanges the token for a new one at
//!    `refresh-token` without sending credentials again
//!
//! ## Security
//!
//! - One symmetric key, loaded at startup, signs and verifies every token
//! - Signature, issuer, and audience are always verified
//! - Only the refresh flow tolerates expired tokens
//! - Login failures never reveal whether the username exists

pub mod claims;
pub mod codec;
pub mod error;
pub mod extractor;
pub mod issuer;
pub mod refresh;
pub mod registration;
pub mod roles;

#[cfg(test)]
pub(crate) mod test_support;

pub use claims::{AuthenticatedUser, ClaimSet};
pub use codec::{token_lifetime, IssuedToken, TokenCodec, TOKEN_LIFETIME_HOURS};
pub use error::AuthError;
pub use extractor::Auth;
pub use issuer::{TokenIssuer, TokenResponse, UserData};
pub use refresh::TokenRefresher;
pub use registration::Registrar;
pub use roles::Role;
