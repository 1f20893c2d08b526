//! API-side role guard, run in handlers before any repository access.

use rockparade_auth::{authorize, AuthzError, Role};

use crate::context::PrincipalContext;

pub fn require_role(principal: &PrincipalContext, role: &Role) -> Result<(), AuthzError> {
    authorize(principal.principal(), role)
}
