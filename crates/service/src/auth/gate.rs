//! Role gate: checks applied to an authenticated [`Principal`] before a protected
//! operation runs. Every failure is `AuthError::Forbidden`.

use super::domain::{Principal, Role};
use super::errors::AuthError;

/// Pass only when the principal holds exactly `required`.
pub fn require_role(principal: &Principal, required: Role) -> Result<(), AuthError> {
    require_any_role(principal, &[required])
}

/// Pass when the principal holds any of `allowed`.
pub fn require_any_role(principal: &Principal, allowed: &[Role]) -> Result<(), AuthError> {
    if allowed.contains(&principal.role) {
        return Ok(());
    }
    let wanted: Vec<&str> = allowed.iter().map(Role::as_str).collect();
    Err(AuthError::Forbidden(format!(
        "role '{}' required, caller has '{}'",
        wanted.join("|"),
        principal.role
    )))
}

/// Pass for admins, or when the principal owns the resource.
pub fn require_self_or_admin(principal: &Principal, owner: Option<&str>) -> Result<(), AuthError> {
    if principal.is_admin() || owner == Some(principal.username.as_str()) {
        return Ok(());
    }
    Err(AuthError::Forbidden(format!("'{}' may only modify their own record", principal.username)))
}
