use thiserror::Error;

/// Business errors for auth workflows
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("incorrect username or password")]
    InvalidCredentials,
    #[error("could not validate credentials: {0}")]
    InvalidToken(String),
    #[error("not enough privileges: {0}")]
    Forbidden(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("user already exists")]
    Conflict,
    #[error("hashing error: {0}")]
    HashError(String),
    #[error("token error: {0}")]
    TokenError(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Validation(_) => 1001,
            AuthError::Conflict => 1002,
            AuthError::InvalidCredentials => 1004,
            AuthError::InvalidToken(_) => 1005,
            AuthError::Forbidden(_) => 1006,
            AuthError::HashError(_) => 1101,
            AuthError::TokenError(_) => 1102,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn codes_are_distinct() {
        let all = [
            AuthError::InvalidCredentials,
            AuthError::InvalidToken(String::new()),
            AuthError::Forbidden(String::new()),
            AuthError::Validation(String::new()),
            AuthError::Conflict,
            AuthError::HashError(String::new()),
            AuthError::TokenError(String::new()),
        ];
        let codes: HashSet<u16> = all.iter().map(AuthError::code).collect();
        assert_eq!(codes.len(), all.len());
    }
}
