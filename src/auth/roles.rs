// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles for authorization.

/// The fixed set of roles known to the Stock API.
///
/// ## Roles
///
/// - `Admin` - Full access, including user administration
/// - `Manager` - Manages products and categories
/// - `User` - Regular authenticated user
///
/// Tokens carry roles as plain strings; this enum is only used where the
/// service itself decides which role to attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Full administrative access
    Admin,
    /// Product and category management
    Manager,
    /// Regular user
    User,
}

impl Role {
    /// Every role that must exist in the credential store.
    pub const ALL: [Role; 3] = [Role::Admin, Role::Manager, Role::User];

    /// Role name as stored in the credential store and in token claims.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Manager => "Manager",
            Role::User => "User",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_stored_name() {
        for role in Role::ALL {
            assert_eq!(role.to_string(), role.as_str());
        }
    }

    #[test]
    fn all_roles_have_distinct_names() {
        let names: std::collections::BTreeSet<_> = Role::ALL.iter().map(Role::as_str).collect();
        assert_eq!(names.len(), 3);
    }
}
