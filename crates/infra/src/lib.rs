//! Infrastructure layer: repositories, fixtures, and configuration.

pub mod config;
pub mod fixtures;
pub mod repository;

pub use config::{AppConfig, ConfigError, StorageBackend};
pub use repository::{
    BandRepository, InMemoryRepository, Pagination, PostgresRepository, RepositoryError,
    RoleMembership, RoleRepository, UserRepository,
};
