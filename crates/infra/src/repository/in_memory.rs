use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use rockparade_auth::{Role, RoleAssignment, RoleCatalog, RoleDefinition};
use rockparade_bands::{Band, User};
use rockparade_core::{BandId, Login};

use super::{BandRepository, Pagination, RepositoryError, RoleMembership, RoleRepository, UserRepository};

#[derive(Debug, Default)]
struct State {
    bands: BTreeMap<BandId, Band>,
    users: BTreeMap<Login, User>,
    roles: BTreeMap<String, RoleDefinition>,
    holders: BTreeMap<String, BTreeSet<Login>>,
}

impl State {
    /// Members must reference known users, like the foreign keys of the SQL schema.
    fn check_members(&self, band: &Band) -> Result<(), RepositoryError> {
        if !self.users.contains_key(band.creator()) {
            return Err(RepositoryError::MissingReference(format!(
                "creator \"{}\" is not a known user",
                band.creator()
            )));
        }
        match band.members().iter().find(|m| !self.users.contains_key(&m.login)) {
            Some(m) => Err(RepositoryError::MissingReference(format!(
                "member \"{}\" is not a known user",
                m.login
            ))),
            None => Ok(()),
        }
    }
}

/// In-memory repository for tests/dev.
///
/// Implements every repository trait over one lock, so each write is atomic.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: RwLock<State>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, RepositoryError> {
        self.state.read().map_err(|_| RepositoryError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, RepositoryError> {
        self.state.write().map_err(|_| RepositoryError::Poisoned)
    }
}

#[async_trait]
impl BandRepository for InMemoryRepository {
    async fn list(&self, page: Pagination) -> Result<Vec<Band>, RepositoryError> {
        let state = self.read()?;
        Ok(page.slice(state.bands.values().cloned()))
    }

    async fn find_one_by_id(&self, id: &BandId) -> Result<Option<Band>, RepositoryError> {
        Ok(self.read()?.bands.get(id).cloned())
    }

    async fn create(&self, band: &Band) -> Result<(), RepositoryError> {
        let mut state = self.write()?;
        if state.bands.contains_key(band.name()) {
            return Err(RepositoryError::Duplicate {
                entity: "Band",
                id: band.name().to_string(),
            });
        }
        state.check_members(band)?;
        state.bands.insert(band.name().clone(), band.clone());
        tracing::debug!(band = %band.name(), "band stored");
        Ok(())
    }

    async fn update(&self, previous_id: &BandId, band: &Band) -> Result<(), RepositoryError> {
        let mut state = self.write()?;
        if !state.bands.contains_key(previous_id) {
            return Err(RepositoryError::NotFound {
                entity: "Band",
                id: previous_id.to_string(),
            });
        }
        if band.name() != previous_id && state.bands.contains_key(band.name()) {
            return Err(RepositoryError::Duplicate {
                entity: "Band",
                id: band.name().to_string(),
            });
        }
        state.check_members(band)?;
        state.bands.remove(previous_id);
        state.bands.insert(band.name().clone(), band.clone());
        tracing::debug!(band = %band.name(), previous = %previous_id, "band updated");
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn list(&self, page: Pagination) -> Result<Vec<User>, RepositoryError> {
        let state = self.read()?;
        Ok(page.slice(state.users.values().cloned()))
    }

    async fn find_one_by_login(&self, login: &Login) -> Result<Option<User>, RepositoryError> {
        Ok(self.read()?.users.get(login).cloned())
    }

    async fn create(&self, user: &User) -> Result<(), RepositoryError> {
        let mut state = self.write()?;
        if state.users.contains_key(&user.login) {
            return Err(RepositoryError::Duplicate {
                entity: "User",
                id: user.login.to_string(),
            });
        }
        state.users.insert(user.login.clone(), user.clone());
        Ok(())
    }
}

#[async_trait]
impl RoleRepository for InMemoryRepository {
    async fn catalog(&self) -> Result<RoleCatalog, RepositoryError> {
        Ok(RoleCatalog::new(self.read()?.roles.values().cloned()))
    }

    async fn seed(&self, catalog: &RoleCatalog) -> Result<(), RepositoryError> {
        let mut state = self.write()?;
        for definition in catalog.definitions() {
            state
                .roles
                .insert(definition.name.as_str().to_string(), definition.clone());
        }
        Ok(())
    }

    async fn list_with_users(&self) -> Result<Vec<RoleMembership>, RepositoryError> {
        let state = self.read()?;
        Ok(state
            .roles
            .iter()
            .map(|(name, role)| RoleMembership {
                role: role.clone(),
                users: state
                    .holders
                    .get(name)
                    .map(|set| set.iter().cloned().collect())
                    .unwrap_or_default(),
            })
            .collect())
    }

    async fn roles_of(&self, login: &Login) -> Result<Vec<Role>, RepositoryError> {
        let state = self.read()?;
        Ok(state
            .holders
            .iter()
            .filter(|(_, users)| users.contains(login))
            .filter_map(|(name, _)| state.roles.get(name).map(|d| d.name.clone()))
            .collect())
    }

    async fn assign(&self, assignment: &RoleAssignment) -> Result<(), RepositoryError> {
        let mut state = self.write()?;
        if !state.users.contains_key(&assignment.login) {
            return Err(RepositoryError::NotFound {
                entity: "User",
                id: assignment.login.to_string(),
            });
        }
        // Check everything before touching anything.
        if let Some(role) = assignment
            .roles
            .iter()
            .find(|r| !state.roles.contains_key(r.as_str()))
        {
            return Err(RepositoryError::MissingReference(format!("role \"{role}\" is not registered")));
        }
        for role in &assignment.roles {
            state
                .holders
                .entry(role.as_str().to_string())
                .or_default()
                .insert(assignment.login.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rockparade_bands::{MemberDetails, NewBand};

    use super::*;

    fn login(s: &str) -> Login {
        Login::new(s).unwrap()
    }

    async fn repo_with_users(logins: &[&str]) -> InMemoryRepository {
        let repo = InMemoryRepository::new();
        for l in logins {
            UserRepository::create(&repo, &User::new(login(l), *l, Utc::now()))
                .await
                .unwrap();
        }
        repo.seed(&RoleCatalog::default()).await.unwrap();
        repo
    }

    fn band(name: &str, members: &[&str]) -> Band {
        Band::create(
            NewBand {
                name: BandId::new(name).unwrap(),
                description: "desc".to_string(),
                members: members
                    .iter()
                    .map(|l| (login(l), MemberDetails::new("guitar", None)))
                    .collect(),
            },
            login("first"),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn create_rejects_duplicate_band_names() {
        let repo = repo_with_users(&["first"]).await;
        BandRepository::create(&repo, &band("Ария", &[])).await.unwrap();

        let err = BandRepository::create(&repo, &band("Ария", &[])).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Duplicate { entity: "Band", .. }));
    }

    #[tokio::test]
    async fn members_must_reference_known_users() {
        let repo = repo_with_users(&["first"]).await;

        let err = BandRepository::create(&repo, &band("Ария", &["ghost"])).await.unwrap_err();
        assert!(matches!(err, RepositoryError::MissingReference(_)));
        assert!(repo.find_one_by_id(&BandId::new("Ария").unwrap()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_can_rename_but_not_onto_another_band() {
        let repo = repo_with_users(&["first"]).await;
        BandRepository::create(&repo, &band("Ария", &[])).await.unwrap();
        BandRepository::create(&repo, &band("Кипелов", &[])).await.unwrap();

        let old = BandId::new("Ария").unwrap();
        let clash = band("Кипелов", &[]);
        let err = repo.update(&old, &clash).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Duplicate { .. }));

        let renamed = band("Мастер", &["first"]);
        repo.update(&old, &renamed).await.unwrap();
        assert!(repo.find_one_by_id(&old).await.unwrap().is_none());
        let stored = repo
            .find_one_by_id(&BandId::new("Мастер").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.members().len(), 1);
    }

    #[tokio::test]
    async fn list_is_ordered_and_paged() {
        let repo = repo_with_users(&["first"]).await;
        for name in ["c", "a", "b"] {
            BandRepository::create(&repo, &band(name, &[])).await.unwrap();
        }

        let names: Vec<String> = BandRepository::list(&repo, Pagination::new(Some(2), Some(1)))
            .await
            .unwrap()
            .iter()
            .map(|b| b.name().to_string())
            .collect();
        assert_eq!(names, ["b", "c"]);
    }

    #[tokio::test]
    async fn list_uses_byte_order() {
        let repo = repo_with_users(&["first"]).await;
        for name in ["alpha", "Zebra", "Ария"] {
            BandRepository::create(&repo, &band(name, &[])).await.unwrap();
        }

        let names: Vec<String> = BandRepository::list(&repo, Pagination::default())
            .await
            .unwrap()
            .iter()
            .map(|b| b.name().to_string())
            .collect();
        assert_eq!(names, ["Zebra", "alpha", "Ария"]);
    }

    #[tokio::test]
    async fn assigning_twice_is_idempotent() {
        let repo = repo_with_users(&["first"]).await;
        let assignment = RoleAssignment {
            login: login("first"),
            roles: vec![Role::ADMIN, Role::new("musician")],
        };

        repo.assign(&assignment).await.unwrap();
        let once = repo.list_with_users().await.unwrap();
        repo.assign(&assignment).await.unwrap();
        let twice = repo.list_with_users().await.unwrap();

        assert_eq!(once, twice);
        assert_eq!(
            repo.roles_of(&login("first")).await.unwrap(),
            vec![Role::ADMIN, Role::new("musician")]
        );
    }

    #[tokio::test]
    async fn assignment_with_unregistered_role_changes_nothing() {
        let repo = repo_with_users(&["first"]).await;
        let assignment = RoleAssignment {
            login: login("first"),
            roles: vec![Role::ADMIN, Role::new("nonexistent")],
        };

        assert!(repo.assign(&assignment).await.is_err());
        assert!(repo.roles_of(&login("first")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn assigning_to_unknown_user_is_not_found() {
        let repo = repo_with_users(&[]).await;
        let assignment = RoleAssignment {
            login: login("ghost"),
            roles: vec![Role::ADMIN],
        };

        let err = repo.assign(&assignment).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { entity: "User", .. }));
    }
}
