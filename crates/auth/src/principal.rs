use serde::Serialize;

use rockparade_core::Login;

use crate::Role;

/// An authenticated caller and the roles it acts with.
///
/// Every principal implicitly holds [`Role::USER`]; other roles come from
/// the stored assignments of its login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub login: Login,
    pub roles: Vec<Role>,
}

impl Principal {
    pub fn new(login: Login, roles: impl IntoIterator<Item = Role>) -> Self {
        let mut all: Vec<Role> = vec![Role::USER];
        for role in roles {
            if !all.contains(&role) {
                all.push(role);
            }
        }
        Self { login, roles: all }
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }
}
