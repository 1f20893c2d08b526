//! Strongly-typed natural identifiers used across the domain.
//!
//! Bands are identified by their name and users by their login, so both
//! identifiers are validated strings rather than generated ids.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a band (its unique name).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BandId(String);

/// Identifier of a user (its unique login).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Login(String);

macro_rules! impl_name_newtype {
    ($t:ty, $name:literal, $max_len:expr) => {
        impl $t {
            /// Maximum accepted length, in characters.
            pub const MAX_LEN: usize = $max_len;

            /// Validate and wrap an identifier. Surrounding whitespace is trimmed.
            pub fn new(value: impl AsRef<str>) -> Result<Self, DomainError> {
                let value = value.as_ref().trim();
                if value.is_empty() {
                    return Err(DomainError::invalid_id(format!("{} must not be blank", $name)));
                }
                if value.chars().count() > Self::MAX_LEN {
                    return Err(DomainError::invalid_id(format!(
                        "{} must be at most {} characters",
                        $name,
                        Self::MAX_LEN
                    )));
                }
                Ok(Self(value.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $t {
            type Error = DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

impl_name_newtype!(BandId, "band name", 255);
impl_name_newtype!(Login, "login", 64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_trimmed() {
        let id = BandId::new("  Rammstein ").unwrap();
        assert_eq!(id.as_str(), "Rammstein");
    }

    #[test]
    fn blank_identifiers_are_rejected() {
        assert!(matches!(Login::new("   "), Err(DomainError::InvalidId(_))));
        assert!(matches!(BandId::new(""), Err(DomainError::InvalidId(_))));
    }

    #[test]
    fn overlong_login_is_rejected() {
        let long = "a".repeat(Login::MAX_LEN + 1);
        assert!(Login::new(long).is_err());
        assert!(Login::new("a".repeat(Login::MAX_LEN)).is_ok());
    }

    #[test]
    fn punctuation_is_part_of_the_name() {
        let id = BandId::new("AC/DC").unwrap();
        assert_eq!(id.as_str(), "AC/DC");
        assert_eq!("Guns N' Roses".parse::<BandId>().unwrap().to_string(), "Guns N' Roses");
    }

    #[test]
    fn serde_validates_on_the_way_in() {
        let ok: Login = serde_json::from_str("\"first\"").unwrap();
        assert_eq!(ok.as_str(), "first");
        assert!(serde_json::from_str::<Login>("\"  \"").is_err());
    }

    mod prop {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn accepted_logins_are_stable(raw in " {0,3}[a-z0-9_.-]{1,40} {0,3}") {
                let login = Login::new(raw.as_str()).unwrap();
                prop_assert_eq!(login.as_str(), raw.trim());
                prop_assert_eq!(Login::new(login.as_str()).unwrap(), login);
            }
        }
    }
}
