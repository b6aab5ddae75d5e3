// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::TokenCodec;
use crate::config::JwtSettings;
use crate::store::CredentialStore;

/// Shared, read-only application state.
///
/// The codec holds the signing key for the lifetime of the process; the
/// store is whatever identity backend the binary was started with.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CredentialStore>,
    pub codec: Arc<TokenCodec>,
}

impl AppState {
    pub fn new(store: Arc<dyn CredentialStore>, settings: &JwtSettings) -> Self {
        Self {
            store,
            codec: Arc::new(TokenCodec::new(settings)),
        }
    }

    /// Empty in-memory store with the shared test signing settings.
    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Self::new(
            Arc::new(crate::store::InMemoryCredentialStore::new()),
            &crate::auth::test_support::settings(),
        )
    }
}
