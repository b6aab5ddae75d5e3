// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values, and the
//! token-signing settings loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWT_SECRET` | HMAC-SHA256 signing secret (at least 32 bytes) | Required |
//! | `JWT_VALID_ISSUER` | Issuer claim written to and expected in tokens | Required |
//! | `JWT_VALID_AUDIENCE` | Audience claim written to and expected in tokens | Required |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::fmt;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Environment variable holding the symmetric signing secret.
///
/// Corresponds to the `JWT:Secret` key of the hierarchical configuration.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const JWT_ISSUER_ENV: &str = "JWT_VALID_ISSUER";
pub const JWT_AUDIENCE_ENV: &str = "JWT_VALID_AUDIENCE";

pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// HS256 keys shorter than the digest size are rejected.
pub const MIN_SECRET_BYTES: usize = 32;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("JWT_SECRET must be at least 32 bytes (got {0})")]
    SecretTooShort(usize),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Token signing settings.
///
/// Loaded once at startup and handed to [`crate::auth::TokenCodec::new`];
/// never mutated afterwards.
#[derive(Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

impl fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

impl JwtSettings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let secret = required(JWT_SECRET_ENV)?;
        if secret.len() < MIN_SECRET_BYTES {
            return Err(ConfigError::SecretTooShort(secret.len()));
        }

        Ok(Self {
            secret,
            issuer: required(JWT_ISSUER_ENV)?,
            audience: required(JWT_AUDIENCE_ENV)?,
        })
    }
}

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    pub fn from_env() -> Self {
        std::env::var(LOG_FORMAT_ENV)
            .map(|value| Self::parse(&value))
            .unwrap_or_default()
    }

    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Resolve the bind address from `HOST`/`PORT`.
pub fn bind_address() -> Result<String, ConfigError> {
    let host = std::env::var(HOST_ENV).unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = match std::env::var(PORT_ENV) {
        Ok(raw) => raw.parse::<u16>().map_err(|_| ConfigError::Invalid {
            name: PORT_ENV,
            value: raw,
        })?,
        Err(_) => DEFAULT_PORT,
    };
    Ok(format!("{host}:{port}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn loads_complete_settings() {
        let settings = JwtSettings::from_lookup(lookup_from(&[
            (JWT_SECRET_ENV, "0123456789abcdef0123456789abcdef"),
            (JWT_ISSUER_ENV, "https://stock.example.com"),
            (JWT_AUDIENCE_ENV, "stock-clients"),
        ]))
        .unwrap();
        assert_eq!(settings.issuer, "https://stock.example.com");
        assert_eq!(settings.audience, "stock-clients");
    }

    #[test]
    fn missing_issuer_is_reported() {
        let err = JwtSettings::from_lookup(lookup_from(&[
            (JWT_SECRET_ENV, "0123456789abcdef0123456789abcdef"),
            (JWT_AUDIENCE_ENV, "stock-clients"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing(JWT_ISSUER_ENV));
    }

    #[test]
    fn short_secret_is_rejected() {
        let err = JwtSettings::from_lookup(lookup_from(&[
            (JWT_SECRET_ENV, "too-short"),
            (JWT_ISSUER_ENV, "iss"),
            (JWT_AUDIENCE_ENV, "aud"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::SecretTooShort(9));
    }

    #[test]
    fn debug_output_redacts_secret() {
        let settings = JwtSettings {
            secret: "super-secret-value-that-is-long-enough".into(),
            issuer: "iss".into(),
            audience: "aud".into(),
        };
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn log_format_parsing() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("anything"), LogFormat::Pretty);
    }
}
