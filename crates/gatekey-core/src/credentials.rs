//! Read-only credential store backed by PHC password-hash strings.

use std::collections::HashMap;

use argon2::Argon2;
use argon2::password_hash::{Error as PasswordHashError, PasswordHash, PasswordVerifier};
use tracing::{debug, warn};

/// In-memory mapping from username to a self-describing password hash.
///
/// Populated once at startup by an external loader and read-only afterwards;
/// concurrent readers need no synchronization. Stored hashes use the PHC
/// string format, which names its algorithm and parameters, so entries can
/// migrate to stronger algorithms without a format change.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    entries: HashMap<String, String>,
}

impl CredentialStore {
    /// Build a store from already-parsed `username -> hash` entries.
    #[must_use]
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    /// Check `plaintext` against the stored hash for `username`.
    ///
    /// Returns `false` for an unknown username (without computing any hash),
    /// a wrong password, or a stored hash that fails to parse or verify.
    /// The three cases are deliberately indistinguishable to the caller;
    /// malformed entries were already warned about by the loader.
    #[must_use]
    pub fn verify_password(&self, username: &str, plaintext: &str) -> bool {
        let Some(stored) = self.entries.get(username) else {
            debug!(username, "no credential entry for username");
            return false;
        };
        let parsed = match PasswordHash::new(stored) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(username, error = %err, "stored hash failed to parse");
                return false;
            }
        };
        match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => true,
            Err(PasswordHashError::Password) => {
                debug!(username, "password verification failed");
                false
            }
            Err(err) => {
                warn!(username, error = %err, "password verification errored");
                false
            }
        }
    }

    /// Number of provisioned identities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether any identities are provisioned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for CredentialStore {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::password_hash::{PasswordHasher, SaltString, rand_core::OsRng};

    fn store_with(username: &str, password: &str) -> CredentialStore {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .expect("hashing test password must succeed")
            .to_string();
        CredentialStore::from_iter([(username.to_string(), hash)])
    }

    #[test]
    fn correct_password_verifies() {
        let store = store_with("alice", "wonderland");
        assert!(store.verify_password("alice", "wonderland"));
    }

    #[test]
    fn wrong_password_is_rejected() {
        let store = store_with("alice", "wonderland");
        assert!(!store.verify_password("alice", "looking-glass"));
    }

    #[test]
    fn unknown_username_is_rejected() {
        let store = store_with("alice", "wonderland");
        assert!(!store.verify_password("bob", "wonderland"));
    }

    #[test]
    fn malformed_stored_hash_is_rejected_quietly() {
        let store =
            CredentialStore::from_iter([("carol".to_string(), "not-a-phc-string".to_string())]);
        assert!(!store.verify_password("carol", "anything"));
    }

    #[test]
    fn empty_store_reports_empty() {
        let store = CredentialStore::default();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert!(!store.verify_password("anyone", "anything"));
    }
}
