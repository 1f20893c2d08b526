use thiserror::Error;

use crate::{Principal, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing role '{0}'")]
    Forbidden(String),
}

/// Check that a principal holds the required role.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(principal: &Principal, required: &Role) -> Result<(), AuthzError> {
    if principal.has_role(required) {
        Ok(())
    } else {
        tracing::debug!(login = %principal.login, role = %required, "authorization denied");
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use rockparade_core::Login;

    use super::*;

    #[test]
    fn admin_passes_admin_check() {
        let principal = Principal::new(Login::new("boss").unwrap(), [Role::ADMIN]);
        assert_eq!(authorize(&principal, &Role::ADMIN), Ok(()));
        assert_eq!(authorize(&principal, &Role::USER), Ok(()));
    }

    #[test]
    fn plain_user_is_denied_admin() {
        let principal = Principal::new(Login::new("first").unwrap(), [Role::new("musician")]);
        assert_eq!(
            authorize(&principal, &Role::ADMIN),
            Err(AuthzError::Forbidden("admin".to_string()))
        );
    }
}
