//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: storage wiring and the operations behind each route
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`, `response.rs`: the `{errors}` / `{data}` envelope
//! - `extract.rs`: body and path extraction with envelope errors

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod extract;
pub mod response;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(jwt_secret: impl AsRef<[u8]>, services: Arc<AppServices>) -> Router {
    let jwt = Arc::new(rockparade_auth::Hs256JwtValidator::new(jwt_secret));
    let auth_state = middleware::AuthState {
        jwt,
        services: services.clone(),
    };

    // Protected routes: require a valid bearer token.
    let protected = routes::protected_router().route_layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    routes::public_router()
        .merge(protected)
        .method_not_allowed_fallback(routes::system::method_not_allowed)
        .fallback(routes::system::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::request_id_middleware))
                .layer(Extension(services)),
        )
}
