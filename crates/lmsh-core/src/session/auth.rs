//! Fixed credential table for the simulated session.
//!
//! Illustrative policy only. This is a toy lookup, not a security boundary;
//! the table mirrors what the session program ships with.

use std::fmt;

/// Role granted by a successful credential check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Student,
    Faculty,
    Librarian,
}

impl Role {
    /// Lowercase name as it appears in user-facing text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Faculty => "faculty",
            Role::Librarian => "librarian",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in the credential table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credential {
    pub email: &'static str,
    pub password: &'static str,
    pub role: Role,
}

/// The accounts the simulated session accepts.
pub const CREDENTIALS: &[Credential] = &[
    Credential {
        email: "john@example.com",
        password: "pass123",
        role: Role::Student,
    },
    Credential {
        email: "wilson@example.com",
        password: "pass987",
        role: Role::Faculty,
    },
    Credential {
        email: "admin@library.com",
        password: "admin123",
        role: Role::Librarian,
    },
];

/// Look up a credential pair, returning the granted role on a match.
pub fn authenticate(email: &str, password: &str) -> Option<Role> {
    CREDENTIALS
        .iter()
        .find(|c| c.email == email && c.password == password)
        .map(|c| c.role)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn every_table_entry_authenticates_to_its_role() {
        for entry in CREDENTIALS {
            assert_eq!(authenticate(entry.email, entry.password), Some(entry.role));
        }
    }

    #[test]
    fn wrong_password_is_rejected() {
        assert_eq!(authenticate("john@example.com", "pass124"), None);
    }

    #[test]
    fn crossed_pair_is_rejected() {
        // Valid email, valid password, but from different entries.
        assert_eq!(authenticate("john@example.com", "admin123"), None);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert_eq!(authenticate("John@example.com", "pass123"), None);
        assert_eq!(authenticate("john@example.com", "PASS123"), None);
    }

    #[test]
    fn empty_pair_is_rejected() {
        assert_eq!(authenticate("", ""), None);
    }

    #[test]
    fn role_names() {
        assert_eq!(Role::Student.to_string(), "student");
        assert_eq!(Role::Faculty.to_string(), "faculty");
        assert_eq!(Role::Librarian.to_string(), "librarian");
    }

    proptest! {
        #[test]
        fn unknown_pairs_are_always_rejected(
            email in "[a-z]{1,12}@[a-z]{1,8}\\.com",
            password in "[a-zA-Z0-9]{0,16}",
        ) {
            prop_assume!(
                !CREDENTIALS
                    .iter()
                    .any(|c| c.email == email && c.password == password)
            );
            prop_assert_eq!(authenticate(&email, &password), None);
        }
    }
}
