//! Postgres-backed repository implementation.
//!
//! Every write runs inside one transaction; uniqueness and references are
//! enforced by the schema and mapped back to `RepositoryError`. Listings sort
//! with `COLLATE "C"` (byte order) so pages match the in-memory repository.
//!
//! ## Error Mapping
//!
//! | PostgreSQL Error Code | RepositoryError | Scenario |
//! |-----------------------|-----------------|----------|
//! | `23505` (unique violation) | `Duplicate` | band name or login already taken |
//! | `23503` (foreign key violation) | `MissingReference` | member/creator/role holder is not a known user |
//! | anything else | `Database` | connectivity, syntax, pool closed, ... |

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::instrument;

use rockparade_auth::{Role, RoleAssignment, RoleCatalog, RoleDefinition};
use rockparade_bands::{Band, BandMember, User};
use rockparade_core::{BandId, Login};

use super::{BandRepository, Pagination, RepositoryError, RoleMembership, RoleRepository, UserRepository};

/// Schema bootstrap, one statement per entry.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        login TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        registered_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS bands (
        name TEXT PRIMARY KEY,
        description TEXT NOT NULL,
        creator TEXT NOT NULL REFERENCES users (login),
        registered_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS band_members (
        band_name TEXT NOT NULL REFERENCES bands (name) ON UPDATE CASCADE ON DELETE CASCADE,
        user_login TEXT NOT NULL REFERENCES users (login),
        position INTEGER NOT NULL,
        short_description TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        PRIMARY KEY (band_name, user_login)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS roles (
        name TEXT PRIMARY KEY,
        description TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_roles (
        role_name TEXT NOT NULL REFERENCES roles (name),
        user_login TEXT NOT NULL REFERENCES users (login),
        PRIMARY KEY (role_name, user_login)
    )
    "#,
];

const LIST_BANDS: &str = r#"
    SELECT name, description, creator, registered_at
    FROM bands
    ORDER BY name COLLATE "C"
    LIMIT $1 OFFSET $2
"#;

const LIST_USERS: &str = r#"
    SELECT login, name, registered_at
    FROM users
    ORDER BY login COLLATE "C"
    LIMIT $1 OFFSET $2
"#;

/// Postgres repository for bands, users and roles.
///
/// Uses an SQLx connection pool, so it is `Send + Sync` and cheap to clone.
#[derive(Debug, Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `database_url` and make sure the schema exists.
    pub async fn connect(database_url: &str) -> Result<Self, RepositoryError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let repo = Self::new(pool);
        repo.migrate().await?;
        Ok(repo)
    }

    /// Create missing tables. Safe to run on every start.
    pub async fn migrate(&self) -> Result<(), RepositoryError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("migrate", e))?;
        }
        Ok(())
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>, RepositoryError> {
        self.pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))
    }

    async fn load_members(&self, names: &[String]) -> Result<HashMap<String, Vec<BandMember>>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT band_name, user_login, short_description, description
            FROM band_members
            WHERE band_name = ANY($1)
            ORDER BY band_name, position
            "#,
        )
        .bind(names)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_members", e))?;

        let mut members: HashMap<String, Vec<BandMember>> = HashMap::new();
        for row in rows {
            let band_name: String = row.try_get("band_name").map_err(corrupt)?;
            let member = BandMember {
                band: parse_band_id(&band_name)?,
                login: parse_login(&row.try_get::<String, _>("user_login").map_err(corrupt)?)?,
                short_description: row.try_get("short_description").map_err(corrupt)?,
                description: row.try_get("description").map_err(corrupt)?,
            };
            members.entry(band_name).or_default().push(member);
        }
        Ok(members)
    }

    async fn hydrate(&self, rows: Vec<BandRow>) -> Result<Vec<Band>, RepositoryError> {
        let names: Vec<String> = rows.iter().map(|r| r.name.clone()).collect();
        let mut members = self.load_members(&names).await?;

        rows.into_iter()
            .map(|row| {
                let band_members = members.remove(&row.name).unwrap_or_default();
                Ok(Band::restore(
                    parse_band_id(&row.name)?,
                    row.description,
                    parse_login(&row.creator)?,
                    row.registered_at,
                    band_members,
                ))
            })
            .collect()
    }
}

async fn insert_members(tx: &mut Transaction<'static, Postgres>, band: &Band) -> Result<(), RepositoryError> {
    for (position, member) in band.members().iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO band_members (band_name, user_login, position, short_description, description)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(band.name().as_str())
        .bind(member.login.as_str())
        .bind(position as i32)
        .bind(&member.short_description)
        .bind(&member.description)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("insert_member", e))?;
    }
    Ok(())
}

async fn commit(tx: Transaction<'static, Postgres>) -> Result<(), RepositoryError> {
    tx.commit()
        .await
        .map_err(|e| map_sqlx_error("commit_transaction", e))
}

#[async_trait]
impl BandRepository for PostgresRepository {
    #[instrument(skip(self), err)]
    async fn list(&self, page: Pagination) -> Result<Vec<Band>, RepositoryError> {
        let rows = sqlx::query(LIST_BANDS)
        .bind(i64::from(page.limit))
        .bind(i64::from(page.offset))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_bands", e))?;

        let rows = rows.iter().map(BandRow::from_pg).collect::<Result<Vec<_>, _>>()?;
        self.hydrate(rows).await
    }

    #[instrument(skip(self), fields(band = %id), err)]
    async fn find_one_by_id(&self, id: &BandId) -> Result<Option<Band>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT name, description, creator, registered_at
            FROM bands
            WHERE name = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_band", e))?;

        match row {
            Some(row) => Ok(self.hydrate(vec![BandRow::from_pg(&row)?]).await?.pop()),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, band), fields(band = %band.name()), err)]
    async fn create(&self, band: &Band) -> Result<(), RepositoryError> {
        let mut tx = self.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO bands (name, description, creator, registered_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(band.name().as_str())
        .bind(band.description())
        .bind(band.creator().as_str())
        .bind(band.registered_at())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error("insert_band", "Band", band.name().as_str(), e))?;

        insert_members(&mut tx, band).await?;
        commit(tx).await
    }

    #[instrument(skip(self, band), fields(band = %band.name(), previous = %previous_id), err)]
    async fn update(&self, previous_id: &BandId, band: &Band) -> Result<(), RepositoryError> {
        let mut tx = self.begin().await?;

        // Renames cascade to band_members through the foreign key.
        let updated = sqlx::query(
            r#"
            UPDATE bands
            SET name = $1, description = $2
            WHERE name = $3
            "#,
        )
        .bind(band.name().as_str())
        .bind(band.description())
        .bind(previous_id.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error("update_band", "Band", band.name().as_str(), e))?;

        if updated.rows_affected() == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Band",
                id: previous_id.to_string(),
            });
        }

        sqlx::query("DELETE FROM band_members WHERE band_name = $1")
            .bind(band.name().as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("clear_members", e))?;

        insert_members(&mut tx, band).await?;
        commit(tx).await
    }
}

#[async_trait]
impl UserRepository for PostgresRepository {
    #[instrument(skip(self), err)]
    async fn list(&self, page: Pagination) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query(LIST_USERS)
        .bind(i64::from(page.limit))
        .bind(i64::from(page.offset))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_users", e))?;

        rows.iter().map(user_from_row).collect()
    }

    #[instrument(skip(self), fields(login = %login), err)]
    async fn find_one_by_login(&self, login: &Login) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT login, name, registered_at FROM users WHERE login = $1")
            .bind(login.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user", e))?;

        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self, user), fields(login = %user.login), err)]
    async fn create(&self, user: &User) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO users (login, name, registered_at) VALUES ($1, $2, $3)")
            .bind(user.login.as_str())
            .bind(&user.name)
            .bind(user.registered_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error("insert_user", "User", user.login.as_str(), e))?;
        Ok(())
    }
}

#[async_trait]
impl RoleRepository for PostgresRepository {
    async fn catalog(&self) -> Result<RoleCatalog, RepositoryError> {
        let rows = sqlx::query("SELECT name, description FROM roles ORDER BY name COLLATE \"C\"")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("load_roles", e))?;

        let definitions = rows
            .iter()
            .map(|row| {
                Ok(RoleDefinition {
                    name: Role::new(row.try_get::<String, _>("name").map_err(corrupt)?),
                    description: row.try_get("description").map_err(corrupt)?,
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;
        Ok(RoleCatalog::new(definitions))
    }

    #[instrument(skip(self, catalog), fields(roles = catalog.len()), err)]
    async fn seed(&self, catalog: &RoleCatalog) -> Result<(), RepositoryError> {
        let mut tx = self.begin().await?;
        for definition in catalog.definitions() {
            sqlx::query(
                r#"
                INSERT INTO roles (name, description)
                VALUES ($1, $2)
                ON CONFLICT (name) DO UPDATE SET description = EXCLUDED.description
                "#,
            )
            .bind(definition.name.as_str())
            .bind(&definition.description)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("seed_role", e))?;
        }
        commit(tx).await
    }

    async fn list_with_users(&self) -> Result<Vec<RoleMembership>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT r.name, r.description, ur.user_login
            FROM roles r
            LEFT JOIN user_roles ur ON ur.role_name = r.name
            ORDER BY r.name COLLATE "C", ur.user_login COLLATE "C"
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_role_holders", e))?;

        let mut memberships: Vec<RoleMembership> = Vec::new();
        for row in rows {
            let name: String = row.try_get("name").map_err(corrupt)?;
            let holder: Option<String> = row.try_get("user_login").map_err(corrupt)?;

            let start_new = memberships
                .last()
                .map_or(true, |m| m.role.name.as_str() != name);
            if start_new {
                memberships.push(RoleMembership {
                    role: RoleDefinition {
                        name: Role::new(name),
                        description: row.try_get("description").map_err(corrupt)?,
                    },
                    users: Vec::new(),
                });
            }
            if let (Some(holder), Some(current)) = (holder, memberships.last_mut()) {
                current.users.push(parse_login(&holder)?);
            }
        }
        Ok(memberships)
    }

    #[instrument(skip(self), fields(login = %login), err)]
    async fn roles_of(&self, login: &Login) -> Result<Vec<Role>, RepositoryError> {
        let rows = sqlx::query("SELECT role_name FROM user_roles WHERE user_login = $1 ORDER BY role_name COLLATE \"C\"")
            .bind(login.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("roles_of", e))?;

        rows.iter()
            .map(|row| Ok(Role::new(row.try_get::<String, _>("role_name").map_err(corrupt)?)))
            .collect()
    }

    #[instrument(skip(self, assignment), fields(login = %assignment.login), err)]
    async fn assign(&self, assignment: &RoleAssignment) -> Result<(), RepositoryError> {
        let mut tx = self.begin().await?;

        let user_exists = sqlx::query("SELECT 1 FROM users WHERE login = $1 FOR SHARE")
            .bind(assignment.login.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("lock_user", e))?
            .is_some();
        if !user_exists {
            return Err(RepositoryError::NotFound {
                entity: "User",
                id: assignment.login.to_string(),
            });
        }

        for role in &assignment.roles {
            sqlx::query(
                r#"
                INSERT INTO user_roles (role_name, user_login)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(role.as_str())
            .bind(assignment.login.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_write_error("assign_role", "Role", role.as_str(), e))?;
        }
        commit(tx).await
    }
}

// SQLx row types

#[derive(Debug)]
struct BandRow {
    name: String,
    description: String,
    creator: String,
    registered_at: DateTime<Utc>,
}

impl BandRow {
    fn from_pg(row: &sqlx::postgres::PgRow) -> Result<Self, RepositoryError> {
        Ok(Self {
            name: row.try_get("name").map_err(corrupt)?,
            description: row.try_get("description").map_err(corrupt)?,
            creator: row.try_get("creator").map_err(corrupt)?,
            registered_at: row.try_get("registered_at").map_err(corrupt)?,
        })
    }
}

fn user_from_row(row: &sqlx::postgres::PgRow) -> Result<User, RepositoryError> {
    Ok(User {
        login: parse_login(&row.try_get::<String, _>("login").map_err(corrupt)?)?,
        name: row.try_get("name").map_err(corrupt)?,
        registered_at: row.try_get("registered_at").map_err(corrupt)?,
    })
}

fn parse_band_id(raw: &str) -> Result<BandId, RepositoryError> {
    BandId::new(raw).map_err(|e| RepositoryError::Corrupt(e.to_string()))
}

fn parse_login(raw: &str) -> Result<Login, RepositoryError> {
    Login::new(raw).map_err(|e| RepositoryError::Corrupt(e.to_string()))
}

fn corrupt(err: sqlx::Error) -> RepositoryError {
    RepositoryError::Corrupt(err.to_string())
}

/// Map SQLx errors raised by an insert/update of `entity` identified by `id`.
fn map_write_error(operation: &'static str, entity: &'static str, id: &str, err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23505") => {
                return RepositoryError::Duplicate {
                    entity,
                    id: id.to_string(),
                };
            }
            Some("23503") => return RepositoryError::MissingReference(db_err.message().to_string()),
            _ => {}
        }
    }
    map_sqlx_error(operation, err)
}

/// Map SQLx errors to RepositoryError.
fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23503") {
            return RepositoryError::MissingReference(db_err.message().to_string());
        }
    }
    RepositoryError::Database { operation, source: err }
}
