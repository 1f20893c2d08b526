use serde::Deserialize;
use serde_json::{json, Map, Value};

use rockparade_auth::Role;
use rockparade_bands::{Band, BandMember, User};
use rockparade_core::format_registration_date;
use rockparade_infra::RoleMembership;

// -------------------------
// Request DTOs
// -------------------------

/// `POST /roles/assign` body. Both fields are checked by `validate_assignment`.
#[derive(Debug, Default, Deserialize)]
pub struct AssignRolesRequest {
    pub login: Option<String>,
    pub roles: Option<Vec<String>>,
}

// -------------------------
// Response mapping helpers
// -------------------------

pub fn member_to_json(member: &BandMember) -> Value {
    json!({
        "login": member.login.as_str(),
        "short_description": member.short_description,
        "description": member.description,
    })
}

pub fn band_to_json(band: &Band) -> Value {
    json!({
        "name": band.name().as_str(),
        "description": band.description(),
        "creator": band.creator().as_str(),
        "registration_date": format_registration_date(band.registered_at()),
        "members": band.members().iter().map(member_to_json).collect::<Vec<_>>(),
    })
}

pub fn user_to_json(user: &User) -> Value {
    json!({
        "login": user.login.as_str(),
        "name": user.name,
        "registration_date": format_registration_date(user.registered_at),
    })
}

pub fn user_with_roles_to_json(user: &User, roles: &[Role]) -> Value {
    let mut value = user_to_json(user);
    if let Value::Object(map) = &mut value {
        map.insert(
            "roles".to_string(),
            roles.iter().map(|r| Value::from(r.as_str())).collect(),
        );
    }
    value
}

/// `{"<role>": {"description": ..., "users": [...]}, ...}`
pub fn roles_to_json(memberships: &[RoleMembership]) -> Value {
    let mut map = Map::new();
    for membership in memberships {
        map.insert(
            membership.role.name.as_str().to_string(),
            json!({
                "description": membership.role.description,
                "users": membership.users.iter().map(|l| l.as_str()).collect::<Vec<_>>(),
            }),
        );
    }
    Value::Object(map)
}
