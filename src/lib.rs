// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Stock Auth Server - credential issuance and verification
//!
//! Registers identities with one of three roles, authenticates them with
//! username and password, and issues HMAC-SHA256 signed bearer tokens that
//! can later be renewed.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token codec, issuer, refresher and role registration
//! - `config` - Environment configuration
//! - `store` - Credential store interface and in-memory backend

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod state;
pub mod store;
