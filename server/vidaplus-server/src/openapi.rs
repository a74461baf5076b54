use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::server::VidaPlusServer;

pub const OPENAPI_JSON: &str = "/api/v1/openapi.json";
pub const DOCS_UI: &str = "/docs";

/// Main OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::home,
        crate::handlers::health::health_check,
        crate::handlers::health::cors_test,
        crate::handlers::health::recreate_database,

        crate::handlers::auth::login,
        crate::handlers::auth::register,
        crate::handlers::auth::profile,
        crate::handlers::auth::change_password,
        crate::handlers::auth::logout,

        crate::handlers::patients::create_patient,
        crate::handlers::patients::list_patients,
        crate::handlers::patients::get_patient,
        crate::handlers::patients::update_patient,
        crate::handlers::patients::delete_patient,

        crate::handlers::professionals::create_professional,
        crate::handlers::professionals::list_professionals,
        crate::handlers::professionals::get_professional,
        crate::handlers::professionals::update_professional,
        crate::handlers::professionals::delete_professional,

        crate::handlers::facilities::create_facility,
        crate::handlers::facilities::list_facilities,
        crate::handlers::facilities::get_facility,
        crate::handlers::facilities::update_facility,

        crate::handlers::appointments::create_appointment,
        crate::handlers::appointments::list_appointments,
        crate::handlers::appointments::get_appointment,
        crate::handlers::appointments::update_appointment,
        crate::handlers::appointments::delete_appointment,

        crate::handlers::prescriptions::create_prescription,
        crate::handlers::prescriptions::list_prescriptions,
        crate::handlers::prescriptions::get_prescription,
        crate::handlers::prescriptions::update_prescription,
        crate::handlers::prescriptions::delete_prescription,

        crate::handlers::notifications::list_notifications,
        crate::handlers::notifications::mark_notification_read,
    ),
    components(
        schemas(
            crate::error::ApiErrorResponse,
            crate::error::ResponseMetadata,
            crate::error::PaginationInfo,

            crate::handlers::health::ServiceInfo,
            crate::handlers::health::HealthResponse,
            crate::handlers::health::CorsTestResponse,
            crate::handlers::health::RecreateResponse,

            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::LoginResponse,
            crate::handlers::auth::RegisterRequest,
            crate::handlers::auth::ProfileResponse,
            crate::handlers::auth::ChangePasswordRequest,
            crate::handlers::auth::MessageResponse,

            crate::handlers::patients::CreatePatientRequest,
            crate::handlers::professionals::CreateProfessionalRequest,
            crate::handlers::facilities::CreateFacilityRequest,
            crate::handlers::appointments::CreateAppointmentRequest,
            crate::handlers::appointments::UpdateAppointmentRequest,
            crate::handlers::prescriptions::CreatePrescriptionRequest,
            crate::handlers::prescriptions::UpdatePrescriptionRequest,

            database_layer::models::User,
            database_layer::models::Patient,
            database_layer::models::PatientChanges,
            database_layer::models::Professional,
            database_layer::models::ProfessionalChanges,
            database_layer::models::Facility,
            database_layer::models::FacilityChanges,
            database_layer::models::Appointment,
            database_layer::models::Prescription,
            database_layer::models::Notification,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "system", description = "Service information, health and CORS probe"),
        (name = "auth", description = "Login, registration and the caller's account"),
        (name = "patients", description = "Patient registry"),
        (name = "professionals", description = "Doctors and nurses"),
        (name = "facilities", description = "Hospitals, clinics and labs"),
        (name = "appointments", description = "In-person and telemedicine scheduling"),
        (name = "prescriptions", description = "Digital prescriptions"),
        (name = "notifications", description = "Per-user notifications"),
    ),
    info(
        title = "VidaPlus Health Services API",
        version = "1.0.0",
        description = "Hospital management backend: patients, professionals, facilities, appointments and prescriptions, with an audit trail of every change.",
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server"),
    ),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Swagger UI at `/docs`, backed by the generated document
pub fn create_docs_routes() -> Router<VidaPlusServer> {
    Router::new().merge(SwaggerUi::new(DOCS_UI).url(OPENAPI_JSON, ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_area() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/health",
            "/api/v1/auth/login",
            "/api/v1/patients/{id}",
            "/api/v1/appointments",
            "/api/v1/prescriptions/{id}",
            "/api/v1/notifications/{id}/read",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
