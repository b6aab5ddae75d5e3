// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::store::{DuplicateField, StoreError};

/// Authentication error type.
///
/// Covers credential checks, registration, and token verification. Every
/// variant maps to a machine-readable code and an HTTP status; none of them
/// is retried by the service.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Unknown user or wrong password. The two cases are never distinguished.
    #[error("Invalid username or password")]
    AuthenticationFailed,
    #[error("User already exists!")]
    DuplicateUsername,
    #[error("Email already exists!")]
    DuplicateEmail,
    /// The credential store refused to create the identity
    #[error("User creation failed! {}", .0.join(" "))]
    IdentityCreationFailed(Vec<String>),
    #[error("Token signature is invalid")]
    InvalidSignature,
    #[error("Token is malformed")]
    MalformedToken,
    #[error("Token has expired")]
    Expired,
    #[error("Token issuer is invalid")]
    InvalidIssuer,
    #[error("Token audience is invalid")]
    InvalidAudience,
    /// Signed correctly but carries no subject or no roles
    #[error("Token payload is invalid")]
    InvalidTokenPayload,
    #[error("Authorization header is required")]
    MissingAuthHeader,
    #[error("Invalid authorization header format (expected 'Bearer <token>')")]
    InvalidAuthHeader,
    #[error("Credential store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Internal authentication error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    status: String,
    message: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::AuthenticationFailed => "authentication_failed",
            AuthError::DuplicateUsername => "duplicate_username",
            AuthError::DuplicateEmail => "duplicate_email",
            AuthError::IdentityCreationFailed(_) => "identity_creation_failed",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::MalformedToken => "malformed_token",
            AuthError::Expired => "token_expired",
            AuthError::InvalidIssuer => "invalid_issuer",
            AuthError::InvalidAudience => "invalid_audience",
            AuthError::InvalidTokenPayload => "invalid_token_payload",
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::StoreUnavailable(_) => "store_unavailable",
            AuthError::Internal(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::AuthenticationFailed
            | AuthError::InvalidSignature
            | AuthError::MalformedToken
            | AuthError::Expired
            | AuthError::InvalidIssuer
            | AuthError::InvalidAudience
            | AuthError::InvalidTokenPayload
            | AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader => StatusCode::UNAUTHORIZED,
            AuthError::DuplicateUsername | AuthError::DuplicateEmail => StatusCode::CONFLICT,
            AuthError::IdentityCreationFailed(_) => StatusCode::BAD_REQUEST,
            AuthError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Rejected(diagnostics) => AuthError::IdentityCreationFailed(diagnostics),
            StoreError::Duplicate(DuplicateField::Username) => AuthError::DuplicateUsername,
            StoreError::Duplicate(DuplicateField::Email) => AuthError::DuplicateEmail,
            StoreError::Unavailable(msg) => AuthError::StoreUnavailable(msg),
            StoreError::NotFound(what) => AuthError::Internal(format!("{what} not found")),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Login failures carry no body.
        if matches!(self, AuthError::AuthenticationFailed) {
            return status.into_response();
        }

        let body = Json(AuthErrorBody {
            status: self.error_code().to_string(),
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn authentication_failed_returns_401_without_body() {
        let response = AuthError::AuthenticationFailed.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body_bytes.is_empty());
    }

    #[tokio::test]
    async fn expired_token_returns_401_with_status_and_message() {
        let response = AuthError::Expired.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["status"], "token_expired");
        assert_eq!(body["message"], "Token has expired");
    }

    #[test]
    fn duplicates_map_to_conflict() {
        assert_eq!(AuthError::DuplicateUsername.status_code(), StatusCode::CONFLICT);
        assert_eq!(AuthError::DuplicateEmail.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn store_errors_convert() {
        let err: AuthError = StoreError::Unavailable("connection refused".into()).into();
        assert!(matches!(err, AuthError::StoreUnavailable(_)));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let err: AuthError = StoreError::Rejected(vec!["Passwords must have at least one digit ('0'-'9').".into()]).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("at least one digit"));
    }

    #[test]
    fn store_duplicates_convert_to_conflicts() {
        let err: AuthError = StoreError::Duplicate(DuplicateField::Username).into();
        assert!(matches!(err, AuthError::DuplicateUsername));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let err: AuthError = StoreError::Duplicate(DuplicateField::Email).into();
        assert!(matches!(err, AuthError::DuplicateEmail));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }
}
