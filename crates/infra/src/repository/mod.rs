//! Repository contracts for bands, users and roles.
//!
//! Each mutating call is one unit of work: the caller mutates the loaded
//! aggregate in memory and hands it back to be persisted in a single step.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rockparade_auth::{Role, RoleAssignment, RoleCatalog, RoleDefinition};
use rockparade_bands::{Band, User};
use rockparade_core::{BandId, Login};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryRepository;
pub use postgres::PostgresRepository;

/// Pagination parameters for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Maximum number of records to return.
    pub limit: u32,
    /// Offset for pagination (0-based).
    pub offset: u32,
}

impl Pagination {
    pub const DEFAULT_LIMIT: u32 = 50;
    pub const MAX_LIMIT: u32 = 1000;

    /// A missing or zero limit falls back to the default.
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        let limit = match limit {
            None | Some(0) => Self::DEFAULT_LIMIT,
            Some(l) => l.min(Self::MAX_LIMIT),
        };
        Self {
            limit,
            offset: offset.unwrap_or(0),
        }
    }

    /// Apply to an already ordered iterator.
    pub fn slice<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .collect()
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// A role with the logins currently holding it (sorted).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleMembership {
    pub role: RoleDefinition,
    pub users: Vec<Login>,
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{entity} \"{id}\" already exists.")]
    Duplicate { entity: &'static str, id: String },

    #[error("{entity} \"{id}\" was not found.")]
    NotFound { entity: &'static str, id: String },

    /// A write referenced a row that does not exist (e.g. an unknown member login).
    #[error("missing reference: {0}")]
    MissingReference(String),

    #[error("database error in {operation}: {source}")]
    Database {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("stored data is inconsistent: {0}")]
    Corrupt(String),

    #[error("repository lock poisoned")]
    Poisoned,
}

#[async_trait]
pub trait BandRepository: Send + Sync {
    /// Bands ordered by name.
    async fn list(&self, page: Pagination) -> Result<Vec<Band>, RepositoryError>;

    async fn find_one_by_id(&self, id: &BandId) -> Result<Option<Band>, RepositoryError>;

    /// Insert a new band with its members. Fails with `Duplicate` when the name is taken.
    async fn create(&self, band: &Band) -> Result<(), RepositoryError>;

    /// Persist a band previously loaded under `previous_id`, members included.
    ///
    /// `band.name()` may differ from `previous_id` (rename); the new name must be free.
    async fn update(&self, previous_id: &BandId, band: &Band) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Users ordered by login.
    async fn list(&self, page: Pagination) -> Result<Vec<User>, RepositoryError>;

    async fn find_one_by_login(&self, login: &Login) -> Result<Option<User>, RepositoryError>;

    /// Insert a user. Fails with `Duplicate` when the login is taken.
    async fn create(&self, user: &User) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// The set of assignable roles.
    async fn catalog(&self) -> Result<RoleCatalog, RepositoryError>;

    /// Register role definitions, updating descriptions of existing ones.
    async fn seed(&self, catalog: &RoleCatalog) -> Result<(), RepositoryError>;

    /// Every role ordered by name, with its holders.
    async fn list_with_users(&self) -> Result<Vec<RoleMembership>, RepositoryError>;

    /// Roles held by one user, ordered by name.
    async fn roles_of(&self, login: &Login) -> Result<Vec<Role>, RepositoryError>;

    /// Grant every role of the assignment at once (set union, idempotent).
    async fn assign(&self, assignment: &RoleAssignment) -> Result<(), RepositoryError>;
}
