#![cfg(test)]
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use argon2::Params;
use async_trait::async_trait;

use crate::auth::domain::{Principal, Role, SeedAccount, SeedSecret};
use crate::auth::repository::memory::InMemoryCredentialRepository;
use crate::auth::service::{AuthConfig, AuthService};
use crate::lookup::{EntityKind, EntityLookup, LookupError, LookupOutcome};

/// Cheap argon2 cost so hashing in tests stays fast.
pub fn fast_params() -> Params {
    Params::new(1024, 1, 1, None).expect("valid argon2 params")
}

pub fn admin() -> Principal {
    Principal::new("admin", Role::Admin)
}

pub fn customer() -> Principal {
    Principal::new("customer", Role::Customer)
}

/// Auth service seeded with `admin/puffdaddy` and `customer/Lakers`.
pub async fn auth_service() -> AuthService<InMemoryCredentialRepository> {
    let repo = Arc::new(InMemoryCredentialRepository::default());
    let svc = AuthService::new(repo, AuthConfig::new("test-secret").with_argon2_params(fast_params()));
    let accounts = vec![
        SeedAccount { username: "admin".into(), role: Role::Admin, secret: SeedSecret::Plain("puffdaddy".into()) },
        SeedAccount { username: "customer".into(), role: Role::Customer, secret: SeedSecret::Plain("Lakers".into()) },
    ];
    svc.seed(accounts).await.expect("seed accounts");
    svc
}

/// Lookup answering from a table; unknown ids are `NotFound`. Records forwarded bearers.
#[derive(Default)]
pub struct StubLookup {
    answers: HashMap<(EntityKind, u64), Result<LookupOutcome, LookupError>>,
    seen: Mutex<Vec<Option<String>>>,
}

impl StubLookup {
    pub fn found(mut self, kind: EntityKind, id: u64) -> Self {
        self.answers.insert((kind, id), Ok(LookupOutcome::Found));
        self
    }

    pub fn failing(mut self, kind: EntityKind, id: u64, error: LookupError) -> Self {
        self.answers.insert((kind, id), Err(error));
        self
    }

    pub fn bearers(&self) -> Vec<Option<String>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl EntityLookup for StubLookup {
    async fn exists(&self, kind: EntityKind, id: u64, bearer: Option<&str>) -> Result<LookupOutcome, LookupError> {
        self.seen.lock().unwrap().push(bearer.map(str::to_string));
        self.answers.get(&(kind, id)).cloned().unwrap_or(Ok(LookupOutcome::NotFound))
    }
}
