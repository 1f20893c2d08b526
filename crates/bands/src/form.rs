//! Request forms and their field rules.
//!
//! Forms deserialize leniently (every field optional) and report every
//! problem at once through [`FormErrors`].

use serde::Deserialize;

use rockparade_core::{BandId, DomainError, FormErrors, Login};

use crate::band::{BandEdit, NewBand};
use crate::member::MemberDetails;

fn required(field: &str) -> String {
    format!("Field \"{field}\" is required.")
}

fn invalid(field: &str, reason: impl core::fmt::Display) -> String {
    format!("Field \"{field}\" is invalid: {reason}.")
}

/// Trimmed, non-blank text or a "required" message.
fn required_text(value: Option<&str>, field: &str, errors: &mut FormErrors) -> Option<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => {
            errors.push(required(field));
            None
        }
    }
}

fn id_reason(e: DomainError) -> String {
    match e {
        DomainError::InvalidId(reason) => reason,
        other => other.to_string(),
    }
}

fn optional_text(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

fn band_name(value: Option<&str>, errors: &mut FormErrors) -> Option<BandId> {
    let name = required_text(value, "name", errors)?;
    match BandId::new(name) {
        Ok(id) => Some(id),
        Err(e) => {
            errors.push(invalid("name", id_reason(e)));
            None
        }
    }
}

fn login(value: Option<&str>, field: &str, errors: &mut FormErrors) -> Option<Login> {
    let raw = required_text(value, field, errors)?;
    match Login::new(raw) {
        Ok(login) => Some(login),
        Err(e) => {
            errors.push(invalid(field, id_reason(e)));
            None
        }
    }
}

/// One entry of the optional `members` list of [`BandForm`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberEntryForm {
    pub login: Option<String>,
    pub short_description: Option<String>,
    pub description: Option<String>,
}

/// `POST /band` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BandForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub members: Option<Vec<MemberEntryForm>>,
}

impl BandForm {
    pub fn validate(&self) -> Result<NewBand, FormErrors> {
        let mut errors = FormErrors::new();
        let name = band_name(self.name.as_deref(), &mut errors);
        let description = required_text(self.description.as_deref(), "description", &mut errors);

        let mut members = Vec::new();
        for (idx, entry) in self.members.iter().flatten().enumerate() {
            let login = login(entry.login.as_deref(), &format!("members[{idx}].login"), &mut errors);
            let short = required_text(
                entry.short_description.as_deref(),
                &format!("members[{idx}].short_description"),
                &mut errors,
            );
            if let (Some(login), Some(short)) = (login, short) {
                members.push((login, MemberDetails::new(short, optional_text(entry.description.as_deref()))));
            }
        }

        match (name, description) {
            (Some(name), Some(description)) => errors.into_result(NewBand {
                name,
                description,
                members,
            }),
            _ => Err(errors),
        }
    }
}

/// `PUT /band/{id}` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BandEditForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub users: Option<Vec<String>>,
}

impl BandEditForm {
    pub fn validate(&self) -> Result<BandEdit, FormErrors> {
        let mut errors = FormErrors::new();
        let name = band_name(self.name.as_deref(), &mut errors);
        let description = required_text(self.description.as_deref(), "description", &mut errors);

        let users = match &self.users {
            None => {
                errors.push(required("users"));
                None
            }
            Some(raw) => {
                let mut users = Vec::with_capacity(raw.len());
                for (idx, value) in raw.iter().enumerate() {
                    if let Some(login) = login(Some(value.as_str()), &format!("users[{idx}]"), &mut errors) {
                        users.push(login);
                    }
                }
                Some(users)
            }
        };

        match (name, description, users) {
            (Some(name), Some(description), Some(users)) => errors.into_result(BandEdit {
                name,
                description,
                users,
            }),
            _ => Err(errors),
        }
    }
}

/// `POST /band/{id}/members` and `PUT /band/{id}/member` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BandMemberForm {
    pub login: Option<String>,
    pub short_description: Option<String>,
    pub description: Option<String>,
}

impl BandMemberForm {
    pub fn validate(&self) -> Result<(Login, MemberDetails), FormErrors> {
        let mut errors = FormErrors::new();
        let login = login(self.login.as_deref(), "login", &mut errors);
        let short = required_text(self.short_description.as_deref(), "short_description", &mut errors);

        match (login, short) {
            (Some(login), Some(short)) => errors.into_result((
                login,
                MemberDetails::new(short, optional_text(self.description.as_deref())),
            )),
            _ => Err(errors),
        }
    }
}
