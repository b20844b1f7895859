use std::collections::HashSet;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub lookup: LookupConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

/// Signing secret, token lifetime and the accounts seeded into the credential store.
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_minutes: i64,
    #[serde(default)]
    pub users: Vec<SeedUser>,
    /// argon2 memory cost in KiB for passwords hashed by this process.
    #[serde(default = "default_hash_memory")]
    pub hash_memory_kib: u32,
    #[serde(default = "default_hash_iterations")]
    pub hash_iterations: u32,
    #[serde(default = "default_hash_parallelism")]
    pub hash_parallelism: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_minutes: default_token_ttl(),
            users: Vec::new(),
            hash_memory_kib: default_hash_memory(),
            hash_iterations: default_hash_iterations(),
            hash_parallelism: default_hash_parallelism(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .field("users", &self.users)
            .field("hash_memory_kib", &self.hash_memory_kib)
            .field("hash_iterations", &self.hash_iterations)
            .field("hash_parallelism", &self.hash_parallelism)
            .finish()
    }
}

/// One seeded account. Either `password` (hashed at startup) or a PHC `password_hash`.
#[derive(Clone, Deserialize)]
pub struct SeedUser {
    pub username: String,
    pub role: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub password_hash: Option<String>,
}

impl std::fmt::Debug for SeedUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedUser")
            .field("username", &self.username)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Where the order workflow finds the customer and product services.
#[derive(Debug, Clone, Deserialize)]
pub struct LookupConfig {
    #[serde(default)]
    pub customer_base_url: String,
    #[serde(default)]
    pub product_base_url: String,
    #[serde(default = "default_lookup_timeout")]
    pub timeout_ms: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_base")]
    pub backoff_base_ms: u64,
    #[serde(default = "default_backoff_max")]
    pub backoff_max_ms: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            customer_base_url: String::new(),
            product_base_url: String::new(),
            timeout_ms: default_lookup_timeout(),
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base(),
            backoff_max_ms: default_backoff_max(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_rps")]
    pub requests_per_second: u64,
    #[serde(default = "default_burst")]
    pub burst_size: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { enabled: true, requests_per_second: default_rps(), burst_size: default_burst() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { format: default_log_format() }
    }
}

fn default_token_ttl() -> i64 { 30 }
fn default_hash_memory() -> u32 { 19 * 1024 }
fn default_hash_iterations() -> u32 { 2 }
fn default_hash_parallelism() -> u32 { 1 }
fn default_lookup_timeout() -> u64 { 2000 }
fn default_max_attempts() -> u32 { 2 }
fn default_backoff_base() -> u64 { 50 }
fn default_backoff_max() -> u64 { 500 }
fn default_true() -> bool { true }
fn default_rps() -> u64 { 10 }
fn default_burst() -> u64 { 20 }
fn default_log_format() -> String { "compact".into() }

pub const ROLES: [&str; 2] = ["admin", "customer"];

/// `CONFIG_PATH`, or `config.toml` in the working directory.
pub fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Read the config file (defaults when it does not exist), apply env overrides, validate.
    pub fn load_and_validate() -> Result<Self> {
        let path = config_path();
        let mut cfg = if Path::new(&path).exists() { load_from_file(&path)? } else { AppConfig::default() };
        cfg.apply_env(|key| std::env::var(key).ok())?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Overlay values from the environment. `lookup` is injected so callers can test it.
    /// A `SERVER_PORT` that is not a valid port number is an error.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT") {
            self.server.port = port
                .trim()
                .parse::<u16>()
                .map_err(|e| anyhow!("SERVER_PORT={port:?} is not a valid port: {e}"))?;
        }
        if let Some(url) = lookup("CUSTOMER_SERVICE_URL") {
            self.lookup.customer_base_url = url;
        }
        if let Some(url) = lookup("PRODUCT_SERVICE_URL") {
            self.lookup.product_base_url = url;
        }
        Ok(())
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        let self_url = format!("http://{}:{}", self.server.host, self.server.port);
        self.lookup.normalize(&self_url);
        self.lookup.validate()?;
        self.auth.validate()?;
        self.rate_limit.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl AuthConfig {
    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.trim().is_empty() {
            return Err(anyhow!("auth.jwt_secret is empty; set it in config.toml or JWT_SECRET"));
        }
        if self.token_ttl_minutes <= 0 {
            return Err(anyhow!("auth.token_ttl_minutes must be positive"));
        }
        if self.hash_iterations == 0 || self.hash_parallelism == 0 {
            return Err(anyhow!("auth.hash_iterations and auth.hash_parallelism must be >= 1"));
        }
        if self.hash_memory_kib < 8 * self.hash_parallelism {
            return Err(anyhow!("auth.hash_memory_kib must be at least 8 * hash_parallelism"));
        }
        let mut seen = HashSet::new();
        for user in &self.users {
            if user.username.trim().is_empty() {
                return Err(anyhow!("auth.users: username must not be empty"));
            }
            if !seen.insert(user.username.as_str()) {
                return Err(anyhow!("auth.users: duplicate username {}", user.username));
            }
            if !ROLES.contains(&user.role.as_str()) {
                return Err(anyhow!("auth.users: {} has unknown role {}", user.username, user.role));
            }
            if user.password.is_none() && user.password_hash.is_none() {
                return Err(anyhow!("auth.users: {} needs password or password_hash", user.username));
            }
        }
        Ok(())
    }
}

impl LookupConfig {
    fn normalize(&mut self, self_url: &str) {
        if self.customer_base_url.trim().is_empty() {
            self.customer_base_url = self_url.to_string();
        }
        if self.product_base_url.trim().is_empty() {
            self.product_base_url = self_url.to_string();
        }
        self.customer_base_url = self.customer_base_url.trim_end_matches('/').to_string();
        self.product_base_url = self.product_base_url.trim_end_matches('/').to_string();
    }

    pub fn validate(&self) -> Result<()> {
        for url in [&self.customer_base_url, &self.product_base_url] {
            let lower = url.to_lowercase();
            if !(lower.starts_with("http://") || lower.starts_with("https://")) {
                return Err(anyhow!("lookup base url must start with http:// or https://: {url}"));
            }
        }
        if self.timeout_ms == 0 {
            return Err(anyhow!("lookup.timeout_ms must be positive"));
        }
        if self.max_attempts == 0 {
            return Err(anyhow!("lookup.max_attempts must be >= 1"));
        }
        if self.backoff_max_ms < self.backoff_base_ms {
            return Err(anyhow!("lookup.backoff_max_ms must be >= backoff_base_ms"));
        }
        Ok(())
    }
}

impl RateLimitConfig {
    fn validate(&self) -> Result<()> {
        if self.enabled && (self.requests_per_second == 0 || self.burst_size == 0) {
            return Err(anyhow!("rate_limit requires requests_per_second and burst_size > 0 when enabled"));
        }
        Ok(())
    }
}
