use chrono::{DateTime, Utc};

use rockparade_core::{BandId, DomainError, DomainResult, Login};

use crate::member::{BandMember, MemberDetails};

/// Validated input for registering a band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBand {
    pub name: BandId,
    pub description: String,
    pub members: Vec<(Login, MemberDetails)>,
}

/// Validated replacement of a band's editable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandEdit {
    pub name: BandId,
    pub description: String,
    /// Complete list of member logins after the edit.
    pub users: Vec<Login>,
}

/// Aggregate root: a band together with its memberships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Band {
    id: BandId,
    description: String,
    creator: Login,
    registered_at: DateTime<Utc>,
    members: Vec<BandMember>,
}

impl Band {
    /// Register a new band. Duplicate member logins keep the first entry.
    pub fn create(new: NewBand, creator: Login, registered_at: DateTime<Utc>) -> Self {
        let mut band = Self {
            id: new.name,
            description: new.description,
            creator,
            registered_at,
            members: Vec::new(),
        };
        for (login, details) in new.members {
            band.get_or_create_member(login, details);
        }
        band
    }

    /// Rehydrate a band from storage.
    pub fn restore(
        id: BandId,
        description: String,
        creator: Login,
        registered_at: DateTime<Utc>,
        members: Vec<BandMember>,
    ) -> Self {
        Self {
            id,
            description,
            creator,
            registered_at,
            members,
        }
    }

    pub fn name(&self) -> &BandId {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn creator(&self) -> &Login {
        &self.creator
    }

    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    /// Members in the order they joined.
    pub fn members(&self) -> &[BandMember] {
        &self.members
    }

    pub fn member(&self, login: &Login) -> Option<&BandMember> {
        self.members.iter().find(|m| &m.login == login)
    }

    pub fn has_member(&self, login: &Login) -> bool {
        self.member(login).is_some()
    }

    /// Return the membership for `login`, creating it with `details` if absent.
    ///
    /// An existing membership is returned unchanged. The flag is `true` when a
    /// new membership was created.
    pub fn get_or_create_member(&mut self, login: Login, details: MemberDetails) -> (&BandMember, bool) {
        match self.members.iter().position(|m| m.login == login) {
            Some(idx) => (&self.members[idx], false),
            None => {
                self.members.push(BandMember::new(self.id.clone(), login, details));
                let idx = self.members.len() - 1;
                (&self.members[idx], true)
            }
        }
    }

    pub fn remove_member(&mut self, login: &Login) -> DomainResult<BandMember> {
        let idx = self
            .members
            .iter()
            .position(|m| &m.login == login)
            .ok_or_else(|| DomainError::not_found("Band member", login.as_str()))?;
        Ok(self.members.remove(idx))
    }

    pub fn update_member(&mut self, login: &Login, details: MemberDetails) -> DomainResult<()> {
        let member = self
            .members
            .iter_mut()
            .find(|m| &m.login == login)
            .ok_or_else(|| DomainError::not_found("Band member", login.as_str()))?;
        member.apply(details);
        Ok(())
    }

    /// Replace name, description and member set.
    ///
    /// Listed logins that already play in the band keep their descriptions;
    /// new logins join with empty descriptions; everyone else is removed.
    pub fn apply_edit(&mut self, edit: BandEdit) {
        self.id = edit.name;
        self.description = edit.description;

        let mut members = Vec::with_capacity(edit.users.len());
        for login in edit.users {
            if members.iter().any(|m: &BandMember| m.login == login) {
                continue;
            }
            let member = match self.members.iter().position(|m| m.login == login) {
                Some(idx) => self.members.swap_remove(idx),
                None => BandMember::new(self.id.clone(), login, MemberDetails::default()),
            };
            members.push(member);
        }
        for member in &mut members {
            member.band = self.id.clone();
        }
        self.members = members;
    }
}
