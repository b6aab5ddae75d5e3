// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication endpoints: registration, login, logout, token refresh.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    auth::{Auth, AuthError, Registrar, Role, TokenIssuer, TokenRefresher, TokenResponse},
    error::ApiJson,
    state::AppState,
};

/// Body for the `register-*` endpoints.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub token: String,
}

/// `{status, message}` body for operations without a payload.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

impl StatusResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            status: "Success".to_string(),
            message: message.into(),
        }
    }
}

async fn register(state: &AppState, request: RegisterRequest, role: Role) -> Result<Json<StatusResponse>, AuthError> {
    Registrar::new(state.store.as_ref())
        .register_with_role(&request.username, &request.email, &request.password, role)
        .await?;
    Ok(Json(StatusResponse::success("User created successfully!")))
}

/// POST /authenticate/register-user
pub async fn register_user(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<Json<StatusResponse>, AuthError> {
    register(&state, request, Role::User).await
}

/// POST /authenticate/register-manager
pub async fn register_manager(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<Json<StatusResponse>, AuthError> {
    register(&state, request, Role::Manager).await
}

/// POST /authenticate/register-admin
pub async fn register_admin(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<Json<StatusResponse>, AuthError> {
    register(&state, request, Role::Admin).await
}

/// POST /authenticate/login
///
/// Any credential failure is a bare 401.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    let response = TokenIssuer::new(state.store.as_ref(), &state.codec)
        .authenticate(&request.username, &request.password)
        .await?;
    Ok(Json(response))
}

/// POST /authenticate/logout
///
/// Rotates the caller's security stamp. Bearer tokens already issued stay
/// valid until they expire.
pub async fn logout(Auth(user): Auth, State(state): State<AppState>) -> Result<Response, AuthError> {
    let Some(identity) = state.store.find_by_username(&user.username).await? else {
        return Ok(StatusCode::OK.into_response());
    };

    state.store.rotate_security_stamp(&identity).await?;
    tracing::info!(username = %identity.username, token_id = %user.token_id, "User logged out");

    Ok(Json(StatusResponse::success("User logged out!")).into_response())
}

/// POST /authenticate/refresh-token
pub async fn refresh_token(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RefreshTokenRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    let response = TokenRefresher::new(&state.codec)
        .refresh(&request.token)
        .inspect_err(|e| tracing::warn!(code = e.error_code(), "Token refresh rejected"))?;
    Ok(Json(response))
}
