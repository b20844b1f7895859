use async_trait::async_trait;

use super::domain::Credentials;
use super::errors::AuthError;

/// Repository abstraction for credential records, keyed by username.
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<Credentials>, AuthError>;

    /// Add a new record; fails with `Conflict` when the username is taken.
    async fn insert(&self, credentials: Credentials) -> Result<(), AuthError>;

    /// Add or replace a record.
    async fn upsert(&self, credentials: Credentials) -> Result<(), AuthError>;
}

/// Process-local credential store used by the deployed services and tests.
pub mod memory {
    use super::*;
    use dashmap::mapref::entry::Entry;
    use dashmap::DashMap;

    #[derive(Default)]
    pub struct InMemoryCredentialRepository {
        users: DashMap<String, Credentials>,
    }

    impl InMemoryCredentialRepository {
        pub fn len(&self) -> usize {
            self.users.len()
        }

        pub fn is_empty(&self) -> bool {
            self.users.is_empty()
        }
    }

    #[async_trait]
    impl CredentialRepository for InMemoryCredentialRepository {
        async fn find_by_username(&self, username: &str) -> Result<Option<Credentials>, AuthError> {
            Ok(self.users.get(username).map(|r| r.value().clone()))
        }

        async fn insert(&self, credentials: Credentials) -> Result<(), AuthError> {
            match self.users.entry(credentials.username.clone()) {
                Entry::Occupied(_) => Err(AuthError::Conflict),
                Entry::Vacant(slot) => {
                    slot.insert(credentials);
                    Ok(())
                }
            }
        }

        async fn upsert(&self, credentials: Credentials) -> Result<(), AuthError> {
            self.users.insert(credentials.username.clone(), credentials);
            Ok(())
        }
    }
}
