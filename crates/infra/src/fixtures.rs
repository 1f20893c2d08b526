//! Startup data: the role catalog and a handful of users for dev/test.

use chrono::Utc;

use rockparade_auth::{Role, RoleAssignment, RoleCatalog};
use rockparade_bands::User;
use rockparade_core::Login;

use crate::repository::{RepositoryError, RoleRepository, UserRepository};

/// Logins created by [`load`].
pub const USER_LOGINS: [&str; 3] = ["first", "second", "third"];

/// Fixture user holding `admin`, so that roles can be handed out at all.
pub const ADMIN_LOGIN: &str = "first";

/// Seed `catalog`, the fixture users and the initial admin. Running it twice is harmless.
pub async fn load(
    users: &dyn UserRepository,
    roles: &dyn RoleRepository,
    catalog: &RoleCatalog,
) -> Result<(), RepositoryError> {
    roles.seed(catalog).await?;

    for raw in USER_LOGINS {
        let login = Login::new(raw).map_err(|e| RepositoryError::Corrupt(e.to_string()))?;
        let user = User::new(login, format!("{raw} user"), Utc::now());
        match users.create(&user).await {
            Ok(()) => tracing::info!(login = raw, "fixture user created"),
            Err(RepositoryError::Duplicate { .. }) => {}
            Err(e) => return Err(e),
        }
    }

    if catalog.contains(Role::ADMIN.as_str()) {
        let login = Login::new(ADMIN_LOGIN).map_err(|e| RepositoryError::Corrupt(e.to_string()))?;
        roles
            .assign(&RoleAssignment {
                login,
                roles: vec![Role::ADMIN],
            })
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryRepository, Pagination};

    #[tokio::test]
    async fn loading_twice_keeps_one_copy_of_everything() {
        let repo = InMemoryRepository::new();
        let catalog = RoleCatalog::default();

        load(&repo, &repo, &catalog).await.unwrap();
        load(&repo, &repo, &catalog).await.unwrap();

        let users = UserRepository::list(&repo, Pagination::default()).await.unwrap();
        assert_eq!(users.len(), USER_LOGINS.len());
        assert_eq!(repo.catalog().await.unwrap(), catalog);
        assert_eq!(
            repo.roles_of(&Login::new(ADMIN_LOGIN).unwrap()).await.unwrap(),
            vec![Role::ADMIN]
        );
        assert!(repo.roles_of(&Login::new("second").unwrap()).await.unwrap().is_empty());
    }
}
