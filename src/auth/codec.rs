// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HS256 token encoding and verification.
//!
//! ## Token Layout
//!
//! Tokens are compact JWTs (`header.payload.signature`, base64url without
//! padding) signed with HMAC-SHA256 over `header.payload`. The payload
//! carries `name`, `jti`, `role`, `iss`, `aud`, `iat` and `exp`.
//!
//! ## Verification Order
//!
//! 1. Structure: three segments, header and payload are JSON objects
//! 2. Algorithm: the header must declare `HS256`
//! 3. Signature, issuer and audience (always)
//! 4. Expiry (only when the caller requires an unexpired token)

use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde_json::{Map, Value};

use super::claims::{ClaimSet, JwtClaims};
use super::AuthError;
use crate::config::JwtSettings;

/// Lifetime of every issued token, in hours.
pub const TOKEN_LIFETIME_HOURS: i64 = 3;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Lifetime applied by the issuer and the refresher.
pub fn token_lifetime() -> Duration {
    Duration::hours(TOKEN_LIFETIME_HOURS)
}

/// A freshly signed token and the instant it stops being valid.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies access tokens with a single symmetric key.
///
/// Built once at startup from [`JwtSettings`] and shared read-only between
/// all requests.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
}

impl TokenCodec {
    pub fn new(settings: &JwtSettings) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.secret.as_bytes()),
            issuer: settings.issuer.clone(),
            audience: settings.audience.clone(),
        }
    }

    /// Sign `claims` into a token valid for `lifetime` from now.
    pub fn encode(&self, claims: &ClaimSet, lifetime: Duration) -> Result<IssuedToken, AuthError> {
        self.encode_at(claims, Utc::now(), lifetime)
    }

    /// Sign `claims` as if issued at `issued_at`.
    pub(crate) fn encode_at(
        &self,
        claims: &ClaimSet,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Result<IssuedToken, AuthError> {
        let iat = issued_at.timestamp();
        let exp = iat + lifetime.num_seconds();
        let expires_at = DateTime::<Utc>::from_timestamp(exp, 0)
            .ok_or_else(|| AuthError::Internal(format!("expiry out of range: {exp}")))?;

        let payload = JwtClaims {
            name: claims.subject.clone(),
            jti: claims.token_id,
            roles: claims.roles.iter().cloned().collect(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat,
            exp,
        };

        let token = encode(&Header::new(ALGORITHM), &payload, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("failed to sign token: {e}")))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify `token` and return its claims.
    ///
    /// Signature, issuer and audience are always checked. Expiry is checked
    /// only when `require_unexpired` is set, which lets the refresh flow
    /// accept tokens past their lifetime through the same verification path.
    pub fn decode(&self, token: &str, require_unexpired: bool) -> Result<ClaimSet, AuthError> {
        check_structure(token)?;

        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.validate_exp = require_unexpired;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        let token_data = decode::<JwtClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            let err = match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => AuthError::InvalidSignature,
                // Header and payload already decoded, so only the signature
                // segment can fail base64 here.
                ErrorKind::Base64(_) => AuthError::InvalidSignature,
                ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
                ErrorKind::InvalidAudience => AuthError::InvalidAudience,
                _ => AuthError::MalformedToken,
            };
            tracing::debug!(error = %e, code = err.error_code(), "Token verification failed");
            err
        })?;

        Ok(token_data.claims.into_claim_set())
    }
}

/// Reject anything that is not a three-segment token with JSON object
/// header and payload, and any header not declaring HS256.
fn check_structure(token: &str) -> Result<(), AuthError> {
    let mut segments = token.split('.');
    let (Some(header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(AuthError::MalformedToken);
    };

    let header = decode_segment(header)?;
    decode_segment(payload)?;

    match header.get("alg").and_then(Value::as_str) {
        Some("HS256") => Ok(()),
        Some(_) => Err(AuthError::InvalidSignature),
        None => Err(AuthError::MalformedToken),
    }
}

fn decode_segment(segment: &str) -> Result<Map<String, Value>, AuthError> {
    let bytes = Base64UrlUnpadded::decode_vec(segment).map_err(|_| AuthError::MalformedToken)?;
    serde_json::from_slice(&bytes).map_err(|_| AuthError::MalformedToken)
}
