use std::fmt;
use std::sync::Arc;

use argon2::password_hash::{PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm as HashAlgorithm, Argon2, Params, PasswordHash, Version};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::OnceCell;
use rand::rngs::OsRng;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use super::domain::{
    AccessToken, Claims, Credentials, Principal, RegisterInput, Role, SeedAccount, SeedSecret,
};
use super::errors::AuthError;
use super::gate;
use super::repository::CredentialRepository;

pub const TOKEN_TYPE: &str = "bearer";

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: Duration,
    /// Cost parameters for newly hashed passwords. Verification reads them from the stored hash.
    pub argon2_params: Params,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self { jwt_secret: jwt_secret.into(), token_ttl: Duration::minutes(30), argon2_params: Params::default() }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn with_argon2_params(mut self, params: Params) -> Self {
        self.argon2_params = params;
        self
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .finish_non_exhaustive()
    }
}

/// Claims as they arrive; every field is optional so absence maps to `InvalidToken`.
#[derive(Debug, Deserialize)]
struct IncomingClaims {
    sub: Option<String>,
    role: Option<String>,
}

/// Auth business service independent of web framework
pub struct AuthService<R: CredentialRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    dummy_hash: OnceCell<String>,
}

impl<R: CredentialRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(cfg.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(cfg.jwt_secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        Self { repo, cfg, encoding_key, decoding_key, validation, dummy_hash: OnceCell::new() }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repo
    }

    fn hasher(&self) -> Argon2<'static> {
        Argon2::new(HashAlgorithm::Argon2id, Version::V0x13, self.cfg.argon2_params.clone())
    }

    /// Hash a password into a PHC string using the configured argon2 cost.
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        self.hasher()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AuthError::HashError(e.to_string()))
    }

    fn verify_password(password: &str, phc: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(phc).map_err(|e| AuthError::HashError(e.to_string()))?;
        Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
    }

    /// Burn one verification against a throwaway hash so unknown usernames cost the same.
    fn verify_against_dummy(&self, password: &str) {
        let dummy = self.dummy_hash.get_or_try_init(|| self.hash_password("not-a-real-password"));
        if let Ok(phc) = dummy {
            let _ = Self::verify_password(password, phc);
        }
    }

    /// Load the startup accounts, replacing any record with the same username.
    #[instrument(skip(self, accounts), fields(count = accounts.len()))]
    pub async fn seed(&self, accounts: Vec<SeedAccount>) -> Result<usize, AuthError> {
        let mut seeded = 0;
        for account in accounts {
            let password_hash = match account.secret {
                SeedSecret::Plain(password) => self.hash_password(&password)?,
                SeedSecret::Hash(phc) => {
                    PasswordHash::new(&phc).map_err(|e| AuthError::HashError(e.to_string()))?;
                    phc
                }
            };
            self.repo
                .upsert(Credentials { username: account.username, password_hash, role: account.role })
                .await?;
            seeded += 1;
        }
        info!(seeded, "credential store seeded");
        Ok(seeded)
    }

    /// Register a new account. Only admins may do this.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::memory::InMemoryCredentialRepository};
    /// use service::auth::domain::{Principal, RegisterInput, Role};
    /// use std::sync::Arc;
    /// let repo = Arc::new(InMemoryCredentialRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig::new("secret"));
    /// let admin = Principal::new("root", Role::Admin);
    /// let input = RegisterInput { username: "lamar".into(), password: "Lakers123".into(), role: Role::Customer };
    /// let created = tokio_test::block_on(svc.register(&admin, input)).unwrap();
    /// assert_eq!(created.role, Role::Customer);
    /// ```
    #[instrument(skip(self, input), fields(actor = %actor.username, username = %input.username))]
    pub async fn register(&self, actor: &Principal, input: RegisterInput) -> Result<Principal, AuthError> {
        gate::require_role(actor, Role::Admin)?;
        if input.username.trim().is_empty() || input.username.chars().any(char::is_whitespace) {
            return Err(AuthError::Validation("username must be non-empty without whitespace".into()));
        }
        if input.password.len() < 8 {
            return Err(AuthError::Validation("password too short (>=8)".into()));
        }
        let password_hash = self.hash_password(&input.password)?;
        self.repo
            .insert(Credentials { username: input.username.clone(), password_hash, role: input.role })
            .await?;
        info!(role = %input.role, "user_registered");
        Ok(Principal::new(input.username, input.role))
    }

    /// Verify a username/password pair and issue a signed access token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::memory::InMemoryCredentialRepository};
    /// use service::auth::domain::{Role, SeedAccount, SeedSecret};
    /// use std::sync::Arc;
    /// let repo = Arc::new(InMemoryCredentialRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig::new("secret"));
    /// let seed = SeedAccount { username: "admin".into(), role: Role::Admin, secret: SeedSecret::Plain("puffdaddy".into()) };
    /// tokio_test::block_on(svc.seed(vec![seed])).unwrap();
    /// let token = tokio_test::block_on(svc.issue_token("admin", "puffdaddy")).unwrap();
    /// assert_eq!(token.token_type, "bearer");
    /// ```
    #[instrument(skip(self, password))]
    pub async fn issue_token(&self, username: &str, password: &str) -> Result<AccessToken, AuthError> {
        let Some(record) = self.repo.find_by_username(username).await? else {
            self.verify_against_dummy(password);
            warn!("login rejected: unknown user");
            return Err(AuthError::InvalidCredentials);
        };
        if !Self::verify_password(password, &record.password_hash)? {
            warn!("login rejected: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now();
        let claims = Claims {
            sub: record.username,
            role: record.role,
            iat: now.timestamp(),
            exp: (now + self.cfg.token_ttl).timestamp(),
        };
        let access_token = self.sign(&claims)?;
        info!(role = %claims.role, "token issued");
        Ok(AccessToken {
            access_token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: self.cfg.token_ttl.num_seconds(),
        })
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// Check signature and expiry, then resolve the subject against the credential store.
    ///
    /// A token whose role no longer matches the stored role is rejected, so role
    /// changes take effect immediately instead of at token expiry.
    #[instrument(skip_all)]
    pub async fn validate(&self, token: &str) -> Result<Principal, AuthError> {
        let data = decode::<IncomingClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!(error = %e, "token rejected");
            AuthError::InvalidToken(e.to_string())
        })?;
        let (Some(username), Some(role)) = (data.claims.sub, data.claims.role) else {
            warn!("token rejected: subject or role missing");
            return Err(AuthError::InvalidToken("subject or role missing".into()));
        };
        let role: Role = role.parse().map_err(|e: super::domain::UnknownRole| AuthError::InvalidToken(e.to_string()))?;

        let record = self.repo.find_by_username(&username).await?.ok_or_else(|| {
            warn!(%username, "token rejected: unknown subject");
            AuthError::InvalidToken("unknown subject".into())
        })?;
        if record.role != role {
            warn!(%username, token_role = %role, stored_role = %record.role, "token rejected: role changed");
            return Err(AuthError::InvalidToken("role changed since the token was issued".into()));
        }
        debug!(%username, %role, "token accepted");
        Ok(Principal { username, role })
    }
}
