//! Storage wiring and the operations behind each route.
//!
//! Every mutating operation validates, mutates the loaded aggregate, and
//! persists it once.

use std::sync::Arc;

use chrono::Utc;

use rockparade_auth::{validate_assignment, Role, RoleCatalog};
use rockparade_bands::{Band, BandEditForm, BandForm, BandMember, BandMemberForm, User};
use rockparade_core::{BandId, Login};
use rockparade_infra::{
    fixtures, AppConfig, BandRepository, InMemoryRepository, Pagination, PostgresRepository,
    RepositoryError, RoleMembership, RoleRepository, StorageBackend, UserRepository,
};

use crate::app::dto::AssignRolesRequest;
use crate::app::errors::ApiError;

pub struct AppServices {
    pub bands: Arc<dyn BandRepository>,
    pub users: Arc<dyn UserRepository>,
    pub roles: Arc<dyn RoleRepository>,
}

/// Pick the storage backend from config and seed fixtures when asked to.
pub async fn build_services(config: &AppConfig) -> Result<Arc<AppServices>, RepositoryError> {
    let services = match &config.storage {
        StorageBackend::InMemory => AppServices::from_repository(Arc::new(InMemoryRepository::new())),
        StorageBackend::Postgres { database_url } => {
            let repo = PostgresRepository::connect(database_url).await?;
            AppServices::from_repository(Arc::new(repo))
        }
    };

    if config.load_fixtures {
        fixtures::load(services.users.as_ref(), services.roles.as_ref(), &RoleCatalog::default()).await?;
    }
    Ok(Arc::new(services))
}

impl AppServices {
    pub fn from_repository<R>(repo: Arc<R>) -> Self
    where
        R: BandRepository + UserRepository + RoleRepository + 'static,
    {
        Self {
            bands: repo.clone(),
            users: repo.clone(),
            roles: repo,
        }
    }

    /// In-memory storage with the role catalog and fixture users loaded.
    pub async fn in_memory_with_fixtures() -> Result<Arc<Self>, RepositoryError> {
        let services = Self::from_repository(Arc::new(InMemoryRepository::new()));
        fixtures::load(services.users.as_ref(), services.roles.as_ref(), &RoleCatalog::default()).await?;
        Ok(Arc::new(services))
    }

    // -------------------------
    // Bands
    // -------------------------

    pub async fn list_bands(&self, page: Pagination) -> Result<Vec<Band>, ApiError> {
        Ok(self.bands.list(page).await?)
    }

    pub async fn band(&self, raw_id: &str) -> Result<Band, ApiError> {
        let not_found = || ApiError::not_found("Band", raw_id);
        let id = BandId::new(raw_id).map_err(|_| not_found())?;
        self.bands.find_one_by_id(&id).await?.ok_or_else(not_found)
    }

    pub async fn create_band(&self, creator: &Login, form: BandForm) -> Result<Band, ApiError> {
        let new = form.validate()?;

        let mut errors = Vec::new();
        if self.bands.find_one_by_id(&new.name).await?.is_some() {
            errors.push(format!("Band \"{}\" already exists.", new.name));
        }
        for (login, _) in &new.members {
            if self.users.find_one_by_login(login).await?.is_none() {
                errors.push(format!("User \"{login}\" was not found."));
            }
        }
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        let band = Band::create(new, creator.clone(), Utc::now());
        self.bands.create(&band).await?;
        tracing::info!(band = %band.name(), creator = %creator, "band created");
        Ok(band)
    }

    pub async fn edit_band(&self, raw_id: &str, form: BandEditForm) -> Result<(), ApiError> {
        let mut band = self.band(raw_id).await?;
        let edit = form.validate()?;

        let mut errors = Vec::new();
        if &edit.name != band.name() && self.bands.find_one_by_id(&edit.name).await?.is_some() {
            errors.push(format!("Band \"{}\" already exists.", edit.name));
        }
        for login in &edit.users {
            if self.users.find_one_by_login(login).await?.is_none() {
                errors.push(format!("User \"{login}\" was not found."));
            }
        }
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        let previous = band.name().clone();
        band.apply_edit(edit);
        self.bands.update(&previous, &band).await?;
        tracing::info!(band = %band.name(), previous = %previous, "band edited");
        Ok(())
    }

    // -------------------------
    // Band members
    // -------------------------

    pub async fn list_members(&self, raw_band: &str) -> Result<Vec<BandMember>, ApiError> {
        Ok(self.band(raw_band).await?.members().to_vec())
    }

    /// Get-or-create: an existing membership is left untouched.
    pub async fn add_member(&self, raw_band: &str, form: BandMemberForm) -> Result<BandMember, ApiError> {
        let (login, details) = form.validate()?;
        let mut band = self.band(raw_band).await?;
        self.user(login.as_str()).await?;

        let (member, created) = band.get_or_create_member(login, details);
        let member = member.clone();
        if created {
            self.bands.update(&band.name().clone(), &band).await?;
            tracing::info!(band = %band.name(), login = %member.login, "member added");
        }
        Ok(member)
    }

    pub async fn remove_member(&self, raw_band: &str, raw_login: &str) -> Result<(), ApiError> {
        let mut band = self.band(raw_band).await?;
        let user = self.user(raw_login).await?;

        band.remove_member(&user.login)?;
        self.bands.update(&band.name().clone(), &band).await?;
        tracing::info!(band = %band.name(), login = %user.login, "member removed");
        Ok(())
    }

    pub async fn update_member(&self, raw_band: &str, form: BandMemberForm) -> Result<(), ApiError> {
        let mut band = self.band(raw_band).await?;

        // Lookups come before field validation so that 404s win over 400s;
        // a missing login is a user that cannot be found.
        let raw_login = form.login.as_deref().map(str::trim).unwrap_or_default();
        let user = self.user(raw_login).await?;
        if !band.has_member(&user.login) {
            return Err(ApiError::not_found("Band member", user.login.as_str()));
        }

        let (login, details) = form.validate()?;
        band.update_member(&login, details)?;
        self.bands.update(&band.name().clone(), &band).await?;
        tracing::info!(band = %band.name(), login = %login, "member updated");
        Ok(())
    }

    // -------------------------
    // Users
    // -------------------------

    pub async fn list_users(&self, page: Pagination) -> Result<Vec<User>, ApiError> {
        Ok(self.users.list(page).await?)
    }

    pub async fn user(&self, raw_login: &str) -> Result<User, ApiError> {
        let not_found = || ApiError::not_found("User", raw_login);
        let login = Login::new(raw_login).map_err(|_| not_found())?;
        self.users.find_one_by_login(&login).await?.ok_or_else(not_found)
    }

    pub async fn user_with_roles(&self, raw_login: &str) -> Result<(User, Vec<Role>), ApiError> {
        let user = self.user(raw_login).await?;
        let roles = self.roles.roles_of(&user.login).await?;
        Ok((user, roles))
    }

    // -------------------------
    // Roles
    // -------------------------

    pub async fn list_roles(&self) -> Result<Vec<RoleMembership>, ApiError> {
        Ok(self.roles.list_with_users().await?)
    }

    /// All-or-nothing: every role is checked against the catalog before anything is stored.
    pub async fn assign_roles(&self, request: AssignRolesRequest) -> Result<(), ApiError> {
        let catalog = self.roles.catalog().await?;
        let assignment = validate_assignment(request.login.as_deref(), request.roles.as_deref(), &catalog)?;
        self.user(assignment.login.as_str()).await?;

        self.roles.assign(&assignment).await?;
        tracing::info!(
            login = %assignment.login,
            roles = ?assignment.roles.iter().map(Role::as_str).collect::<Vec<_>>(),
            "roles assigned"
        );
        Ok(())
    }
}
