use std::collections::BTreeMap;

use axum::{
    extract::State,
    http::{header, HeaderMap, Method, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::error::{api_success, ApiError, ApiResponse, ApiResult};
use crate::server::VidaPlusServer;

/// Service information returned by `GET /`
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceInfo {
    #[schema(example = "VidaPlus Health Services API")]
    pub name: String,
    pub version: String,
    #[schema(example = "development")]
    pub environment: String,
    /// Route prefixes by area
    pub endpoints: BTreeMap<String, String>,
}

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Overall system health status
    #[schema(example = "healthy")]
    pub status: String,
    /// Current timestamp in RFC3339 format
    pub timestamp: String,
    pub version: String,
    /// System uptime in seconds
    pub uptime: u64,
    /// Individual service health checks
    pub checks: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CorsTestResponse {
    pub message: String,
    pub method: String,
    pub origin: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecreateResponse {
    pub message: String,
}

const ENDPOINTS: [(&str, &str); 9] = [
    ("health", "/api/v1/health"),
    ("auth", "/api/v1/auth"),
    ("patients", "/api/v1/patients"),
    ("professionals", "/api/v1/professionals"),
    ("facilities", "/api/v1/facilities"),
    ("appointments", "/api/v1/appointments"),
    ("prescriptions", "/api/v1/prescriptions"),
    ("notifications", "/api/v1/notifications"),
    ("openapi", "/api/v1/openapi.json"),
];

/// Service information
#[utoipa::path(
    get,
    path = "/",
    tag = "system",
    responses((status = 200, description = "Service information", body = ServiceInfo))
)]
pub async fn home(State(server): State<VidaPlusServer>) -> ApiResponse<ServiceInfo> {
    api_success(ServiceInfo {
        name: "VidaPlus Health Services API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: server.config.environment.as_str().to_string(),
        endpoints: ENDPOINTS
            .iter()
            .map(|(name, path)| ((*name).to_string(), (*path).to_string()))
            .collect(),
    })
}

/// Health check handler
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "system",
    responses(
        (status = 200, description = "System is healthy", body = HealthResponse),
        (status = 503, description = "System is unhealthy", body = HealthResponse)
    )
)]
pub async fn health_check(State(server): State<VidaPlusServer>) -> impl IntoResponse {
    let database_ok = server.database.is_healthy().await;

    let mut checks = BTreeMap::new();
    checks.insert(
        "database".to_string(),
        if database_ok { "healthy" } else { "unhealthy" }.to_string(),
    );

    let (status, label) = if database_ok {
        (StatusCode::OK, "healthy")
    } else {
        warn!("Health check failed: database unreachable");
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    let body = HealthResponse {
        status: label.to_string(),
        timestamp: Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: server.uptime_seconds(),
        checks,
    };
    (status, Json(body))
}

/// Echoes request details so browser clients can confirm CORS works
#[utoipa::path(
    get,
    path = "/api/v1/cors-test",
    tag = "system",
    responses((status = 200, description = "CORS is working", body = CorsTestResponse))
)]
pub async fn cors_test(method: Method, headers: HeaderMap) -> Json<CorsTestResponse> {
    Json(CorsTestResponse {
        message: "CORS is working".to_string(),
        method: method.to_string(),
        origin: headers
            .get(header::ORIGIN)
            .and_then(|h| h.to_str().ok())
            .map(ToString::to_string),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Drop every table, rerun migrations and reseed. Development only.
#[utoipa::path(
    post,
    path = "/api/v1/dev/recreate-db",
    tag = "system",
    responses(
        (status = 200, description = "Database recreated", body = RecreateResponse),
        (status = 500, description = "Recreation failed")
    )
)]
pub async fn recreate_database(
    State(server): State<VidaPlusServer>,
) -> ApiResult<ApiResponse<RecreateResponse>> {
    warn!("Recreating database schema");
    server.database.recreate_schema().await?;
    server
        .seed()
        .await
        .map_err(|e| ApiError::internal(format!("Reseeding failed: {e:#}")))?;
    info!("Database recreated and reseeded");

    Ok(api_success(RecreateResponse {
        message: "Database recreated successfully".to_string(),
    }))
}
