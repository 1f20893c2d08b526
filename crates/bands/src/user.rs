use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rockparade_core::Login;

/// A registered user of the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub login: Login,
    pub name: String,
    pub registered_at: DateTime<Utc>,
}

impl User {
    pub fn new(login: Login, name: impl Into<String>, registered_at: DateTime<Utc>) -> Self {
        Self {
            login,
            name: name.into(),
            registered_at,
        }
    }
}
