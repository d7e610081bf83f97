//! Credential lookups for the external sign-in flow.
//!
//! Only pre-hashed secrets are accepted; hashing and verification belong to
//! the caller.

use std::fmt;

use schema_store::{Credential, NewCredential, SchemaStore, SchemaStoreExt};

use crate::error::Result;
use crate::room::ValidationError;

/// An opaque password hash. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wraps an already-computed hash, rejecting empty input.
    pub fn new(hash: impl Into<String>) -> std::result::Result<Self, ValidationError> {
        let hash = hash.into();
        if hash.is_empty() {
            return Err(ValidationError::BlankPasswordHash);
        }
        Ok(Self(hash))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

fn normalize_email(email: &str) -> std::result::Result<&str, ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::BlankEmail);
    }
    Ok(email)
}

/// Directory of login credentials keyed by email.
#[derive(Debug, Clone)]
pub struct CredentialDirectory<S: SchemaStore> {
    store: S,
}

impl<S: SchemaStore> CredentialDirectory<S> {
    /// Creates a new directory over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Looks up the credential registered for an email.
    #[tracing::instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Credential>> {
        let email = normalize_email(email)?;
        Ok(self.store.find_credential(email).await?)
    }

    /// Registers a credential. Fails with `Duplicate` if the email is taken.
    #[tracing::instrument(skip(self))]
    pub async fn insert(&self, email: &str, password_hash: PasswordHash) -> Result<Credential> {
        let email = normalize_email(email)?;
        let credential = self
            .store
            .insert_credential(NewCredential {
                email: email.to_string(),
                password_hash: password_hash.0,
            })
            .await?;

        tracing::info!(credential_id = %credential.id, "credential registered");
        Ok(credential)
    }

    /// Checks whether an email has a credential.
    pub async fn exists(&self, email: &str) -> Result<bool> {
        let email = normalize_email(email)?;
        Ok(self.store.credential_exists(email).await?)
    }
}

#[cfg(test)]
mod tests {
    use schema_store::InMemorySchemaStore;

    use super::*;
    use crate::error::ErrorKind;

    fn directory() -> CredentialDirectory<InMemorySchemaStore> {
        CredentialDirectory::new(InMemorySchemaStore::new())
    }

    #[test]
    fn password_hash_is_redacted() {
        let hash = PasswordHash::new("$argon2id$v=19$secret").unwrap();
        assert_eq!(format!("{hash:?}"), "PasswordHash(<redacted>)");
        assert_eq!(PasswordHash::new(""), Err(ValidationError::BlankPasswordHash));
    }

    #[tokio::test]
    async fn insert_then_find() {
        let directory = directory();
        let hash = PasswordHash::new("hash-1").unwrap();
        let credential = directory
            .insert(" warden@example.com ", hash)
            .await
            .unwrap();

        assert_eq!(credential.email, "warden@example.com");
        let found = directory
            .find_by_email("warden@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, credential.id);
        assert!(directory.exists("warden@example.com").await.unwrap());
        assert!(!directory.exists("guest@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let directory = directory();
        directory
            .insert("warden@example.com", PasswordHash::new("a").unwrap())
            .await
            .unwrap();

        let err = directory
            .insert("warden@example.com", PasswordHash::new("b").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Duplicate);
    }

    #[tokio::test]
    async fn blank_email_is_validation_error() {
        let err = directory().exists("   ").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
