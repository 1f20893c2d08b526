//! Validation of role assignment requests.
//!
//! The whole request is checked against the catalog before anything is
//! returned, so callers either get every role or none of them.

use thiserror::Error;

use rockparade_core::Login;

use crate::{Role, RoleCatalog};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssignmentError {
    #[error("Properties \"login\" and \"roles\" are mandatory.")]
    MissingProperties,

    #[error("Not all provided roles are valid.")]
    UnknownRoles(Vec<String>),
}

/// A validated request to grant `roles` to `login`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignment {
    pub login: Login,
    /// Deduplicated, in request order.
    pub roles: Vec<Role>,
}

pub fn validate_assignment(
    login: Option<&str>,
    roles: Option<&[String]>,
    catalog: &RoleCatalog,
) -> Result<RoleAssignment, AssignmentError> {
    let login = login
        .and_then(|l| Login::new(l).ok())
        .ok_or(AssignmentError::MissingProperties)?;
    let requested = match roles {
        Some(r) if !r.is_empty() => r,
        _ => return Err(AssignmentError::MissingProperties),
    };

    let unknown: Vec<String> = requested
        .iter()
        .filter(|name| !catalog.contains(name))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return Err(AssignmentError::UnknownRoles(unknown));
    }

    let mut roles: Vec<Role> = Vec::with_capacity(requested.len());
    for name in requested {
        if let Some(definition) = catalog.get(name) {
            if !roles.contains(&definition.name) {
                roles.push(definition.name.clone());
            }
        }
    }

    Ok(RoleAssignment { login, roles })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn missing_login_or_roles_is_rejected() {
        let catalog = RoleCatalog::default();
        let roles = names(&["admin"]);

        assert_eq!(
            validate_assignment(None, Some(roles.as_slice()), &catalog),
            Err(AssignmentError::MissingProperties)
        );
        assert_eq!(
            validate_assignment(Some("first"), None, &catalog),
            Err(AssignmentError::MissingProperties)
        );
        assert_eq!(
            validate_assignment(Some("first"), Some(&[][..]), &catalog),
            Err(AssignmentError::MissingProperties)
        );
        assert_eq!(
            validate_assignment(Some("  "), Some(roles.as_slice()), &catalog),
            Err(AssignmentError::MissingProperties)
        );
    }

    #[test]
    fn one_unknown_role_rejects_the_whole_request() {
        let catalog = RoleCatalog::default();
        let roles = names(&["admin", "musician", "nonexistent"]);

        let err = validate_assignment(Some("first"), Some(roles.as_slice()), &catalog).unwrap_err();
        assert_eq!(err, AssignmentError::UnknownRoles(names(&["nonexistent"])));
        assert_eq!(err.to_string(), "Not all provided roles are valid.");
    }

    #[test]
    fn duplicate_role_names_collapse() {
        let catalog = RoleCatalog::default();
        let roles = names(&["musician", "admin", "musician"]);

        let assignment = validate_assignment(Some("first"), Some(roles.as_slice()), &catalog).unwrap();
        assert_eq!(assignment.login.as_str(), "first");
        assert_eq!(assignment.roles, vec![Role::new("musician"), Role::ADMIN]);
    }

    mod prop {
        use proptest::prelude::*;

        use super::*;

        const KNOWN: [&str; 5] = ["admin", "moderator", "musician", "organizer", "critic"];

        proptest! {
            #[test]
            fn known_roles_are_accepted_once_each(picks in proptest::collection::vec(0usize..KNOWN.len(), 1..12)) {
                let catalog = RoleCatalog::default();
                let requested: Vec<String> = picks.iter().map(|&i| KNOWN[i].to_string()).collect();

                let assignment = validate_assignment(Some("first"), Some(requested.as_slice()), &catalog).unwrap();

                let mut distinct = assignment.roles.clone();
                distinct.sort();
                distinct.dedup();
                prop_assert_eq!(distinct.len(), assignment.roles.len());
                for name in &requested {
                    prop_assert!(assignment.roles.iter().any(|r| r.as_str() == name));
                }
            }

            #[test]
            fn any_unknown_name_rejects_everything(
                picks in proptest::collection::vec(0usize..KNOWN.len(), 0..6),
                unknown in "[a-z]{1,12}",
            ) {
                prop_assume!(!KNOWN.contains(&unknown.as_str()));
                let catalog = RoleCatalog::default();
                let mut requested: Vec<String> = picks.iter().map(|&i| KNOWN[i].to_string()).collect();
                requested.push(unknown.clone());

                let err = validate_assignment(Some("first"), Some(requested.as_slice()), &catalog).unwrap_err();
                prop_assert_eq!(err, AssignmentError::UnknownRoles(vec![unknown]));
            }
        }
    }
}
