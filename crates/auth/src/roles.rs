use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Role identifier used for RBAC.
///
/// Roles are opaque strings at this layer. The set of roles that may be
/// *assigned* to users is fixed by [`RoleCatalog`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    /// Implicitly held by every authenticated principal.
    pub const USER: Role = Role(Cow::Borrowed("user"));

    /// Grants role management.
    pub const ADMIN: Role = Role(Cow::Borrowed("admin"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A role together with its human-readable description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub name: Role,
    pub description: String,
}

impl RoleDefinition {
    pub fn new(name: &'static str, description: impl Into<String>) -> Self {
        Self {
            name: Role::new(name),
            description: description.into(),
        }
    }
}

/// The fixed set of assignable roles, keyed by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleCatalog {
    roles: BTreeMap<String, RoleDefinition>,
}

impl RoleCatalog {
    pub fn new(definitions: impl IntoIterator<Item = RoleDefinition>) -> Self {
        let roles = definitions
            .into_iter()
            .map(|d| (d.name.as_str().to_string(), d))
            .collect();
        Self { roles }
    }

    pub fn get(&self, name: &str) -> Option<&RoleDefinition> {
        self.roles.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.roles.contains_key(name)
    }

    /// Definitions ordered by role name.
    pub fn definitions(&self) -> impl Iterator<Item = &RoleDefinition> {
        self.roles.values()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl Default for RoleCatalog {
    fn default() -> Self {
        Self::new([
            RoleDefinition::new("admin", "Администратор"),
            RoleDefinition::new("moderator", "Модератор"),
            RoleDefinition::new("musician", "Музыкант"),
            RoleDefinition::new("organizer", "Организатор"),
            RoleDefinition::new("critic", "Критик"),
        ])
    }
}
