use axum::{
    routing::{delete, get, post, put},
    Router,
};

pub mod bands;
pub mod members;
pub mod roles;
pub mod system;
pub mod users;

/// Read-only endpoints open to anonymous callers.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/bands", get(bands::list_bands))
        .route("/bands/:limit", get(bands::list_bands))
        .route("/bands/:limit/:offset", get(bands::list_bands))
        .route("/band/:id", get(bands::view_band))
        .route("/band/:id/members", get(members::list_members))
        .route("/roles", get(roles::list_roles))
        .route("/users", get(users::list_users))
        .route("/users/:limit", get(users::list_users))
        .route("/users/:limit/:offset", get(users::list_users))
        .route("/user/:login", get(users::view_user))
}

/// Endpoints that need an authenticated principal.
pub fn protected_router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/band", post(bands::create_band))
        .route("/band/:id", put(bands::edit_band))
        .route("/band/:id/members", post(members::add_member))
        .route("/band/:id/member", put(members::update_member))
        .route("/band/:id/member/:login", delete(members::remove_member))
        .route("/roles/assign", post(roles::assign_roles))
}
