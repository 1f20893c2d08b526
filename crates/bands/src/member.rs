use serde::{Deserialize, Serialize};

use rockparade_core::{BandId, Login};

/// Descriptions of a musician's part in a band.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDetails {
    pub short_description: String,
    /// Empty when not provided.
    pub description: String,
}

impl MemberDetails {
    pub fn new(short_description: impl Into<String>, description: Option<String>) -> Self {
        Self {
            short_description: short_description.into(),
            description: description.unwrap_or_default(),
        }
    }
}

/// Join entity: one user playing in one band.
///
/// Identity is the (band, login) pair; a band holds at most one member per login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandMember {
    pub band: BandId,
    pub login: Login,
    pub short_description: String,
    pub description: String,
}

impl BandMember {
    pub fn new(band: BandId, login: Login, details: MemberDetails) -> Self {
        Self {
            band,
            login,
            short_description: details.short_description,
            description: details.description,
        }
    }

    pub fn details(&self) -> MemberDetails {
        MemberDetails {
            short_description: self.short_description.clone(),
            description: self.description.clone(),
        }
    }

    pub fn apply(&mut self, details: MemberDetails) {
        self.short_description = details.short_description;
        self.description = details.description;
    }
}
