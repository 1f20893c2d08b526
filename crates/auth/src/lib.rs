//! `rockparade-auth`: authentication/authorization boundary and the role catalog.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod assignment;
pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod principal;
pub mod roles;

pub use assignment::{validate_assignment, AssignmentError, RoleAssignment};
pub use authorize::{authorize, AuthzError};
pub use claims::{validate_claims, JwtClaims, TokenValidationError};
pub use jwt::{Hs256JwtValidator, JwtValidator, TokenError};
pub use principal::Principal;
pub use roles::{Role, RoleCatalog, RoleDefinition};
