//! VidaPlus Server - hospital management HTTP API
//!
//! Patients, professionals, facilities, appointments, prescriptions and
//! notifications over a Postgres store, with every mutation recorded in the
//! audit trail after it commits.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod services;
pub mod types;
pub mod validation;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use server::VidaPlusServer;

use axum::{middleware::from_fn, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Create the main application router with all routes and middleware
pub fn create_app(server: VidaPlusServer) -> Router {
    routes::create_routes(server.config.enable_dev_endpoints)
        .layer(
            ServiceBuilder::new()
                .layer(from_fn(middleware::request_id_middleware))
                .layer(TraceLayer::new_for_http())
                .layer(middleware::create_cors_layer())
                .layer(from_fn(middleware::request_timing_middleware)),
        )
        .with_state(server)
}
