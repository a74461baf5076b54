use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{
    handlers::{
        appointments, auth, facilities, health, notifications, patients, prescriptions,
        professionals,
    },
    openapi,
    server::VidaPlusServer,
};

/// Route paths relative to their mount point
pub mod paths {
    pub const API_V1: &str = "/api/v1";
    pub const ROOT: &str = "/";
    pub const BY_ID: &str = "/:id";

    pub mod system {
        pub const HEALTH: &str = "/health";
        pub const CORS_TEST: &str = "/cors-test";
        pub const RECREATE_DB: &str = "/dev/recreate-db";
    }

    pub mod auth {
        pub const PREFIX: &str = "/auth";
        pub const LOGIN: &str = "/login";
        pub const REGISTER: &str = "/register";
        pub const PROFILE: &str = "/profile";
        pub const PASSWORD: &str = "/password";
        pub const LOGOUT: &str = "/logout";
    }

    pub const PATIENTS: &str = "/patients";
    pub const PROFESSIONALS: &str = "/professionals";
    pub const FACILITIES: &str = "/facilities";
    pub const APPOINTMENTS: &str = "/appointments";
    pub const PRESCRIPTIONS: &str = "/prescriptions";
    pub const NOTIFICATIONS: &str = "/notifications";
    pub const MARK_READ: &str = "/:id/read";
}

/// Health, CORS probe and, when enabled, the schema reset
pub fn system_routes(enable_dev_endpoints: bool) -> Router<VidaPlusServer> {
    let router = Router::new()
        .route(paths::system::HEALTH, get(health::health_check))
        .route(paths::system::CORS_TEST, get(health::cors_test).post(health::cors_test));

    if enable_dev_endpoints {
        router.route(paths::system::RECREATE_DB, post(health::recreate_database))
    } else {
        router
    }
}

pub fn auth_routes() -> Router<VidaPlusServer> {
    Router::new()
        .route(paths::auth::LOGIN, post(auth::login))
        .route(paths::auth::REGISTER, post(auth::register))
        .route(paths::auth::PROFILE, get(auth::profile))
        .route(paths::auth::PASSWORD, put(auth::change_password))
        .route(paths::auth::LOGOUT, post(auth::logout))
}

pub fn patient_routes() -> Router<VidaPlusServer> {
    Router::new()
        .route(paths::ROOT, get(patients::list_patients).post(patients::create_patient))
        .route(
            paths::BY_ID,
            get(patients::get_patient)
                .put(patients::update_patient)
                .delete(patients::delete_patient),
        )
}

pub fn professional_routes() -> Router<VidaPlusServer> {
    Router::new()
        .route(
            paths::ROOT,
            get(professionals::list_professionals).post(professionals::create_professional),
        )
        .route(
            paths::BY_ID,
            get(professionals::get_professional)
                .put(professionals::update_professional)
                .delete(professionals::delete_professional),
        )
}

pub fn facility_routes() -> Router<VidaPlusServer> {
    Router::new()
        .route(paths::ROOT, get(facilities::list_facilities).post(facilities::create_facility))
        .route(paths::BY_ID, get(facilities::get_facility).put(facilities::update_facility))
}

pub fn appointment_routes() -> Router<VidaPlusServer> {
    Router::new()
        .route(
            paths::ROOT,
            get(appointments::list_appointments).post(appointments::create_appointment),
        )
        .route(
            paths::BY_ID,
            get(appointments::get_appointment)
                .put(appointments::update_appointment)
                .delete(appointments::delete_appointment),
        )
}

pub fn prescription_routes() -> Router<VidaPlusServer> {
    Router::new()
        .route(
            paths::ROOT,
            get(prescriptions::list_prescriptions).post(prescriptions::create_prescription),
        )
        .route(
            paths::BY_ID,
            get(prescriptions::get_prescription)
                .put(prescriptions::update_prescription)
                .delete(prescriptions::delete_prescription),
        )
}

pub fn notification_routes() -> Router<VidaPlusServer> {
    Router::new()
        .route(paths::ROOT, get(notifications::list_notifications))
        .route(paths::MARK_READ, put(notifications::mark_notification_read))
}

/// Everything under `/api/v1`
pub fn api_v1_routes(enable_dev_endpoints: bool) -> Router<VidaPlusServer> {
    Router::new()
        .merge(system_routes(enable_dev_endpoints))
        .nest(paths::auth::PREFIX, auth_routes())
        .nest(paths::PATIENTS, patient_routes())
        .nest(paths::PROFESSIONALS, professional_routes())
        .nest(paths::FACILITIES, facility_routes())
        .nest(paths::APPOINTMENTS, appointment_routes())
        .nest(paths::PRESCRIPTIONS, prescription_routes())
        .nest(paths::NOTIFICATIONS, notification_routes())
}

/// The full route table
pub fn create_routes(enable_dev_endpoints: bool) -> Router<VidaPlusServer> {
    Router::new()
        .route(paths::ROOT, get(health::home))
        .nest(paths::API_V1, api_v1_routes(enable_dev_endpoints))
        .merge(openapi::create_docs_routes())
}
