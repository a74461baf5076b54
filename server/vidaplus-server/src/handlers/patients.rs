//! Patient endpoints
//!
//! Creating a patient also creates its login account; deleting one removes
//! the account and its notifications.

use audit_engine::AuditAction;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use database_layer::models::{NewPatient, NewUser, NotificationKind, Patient, PatientChanges, Sex, UserType};
use database_layer::repositories::{NotificationRepository, PatientFilter, PatientRepository, UserRepository};
use database_layer::UnitOfWork;
use serde::Deserialize;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::error::{api_success, ApiError, ApiResponse, ApiResult};
use crate::handlers::auth::MessageResponse;
use crate::handlers::read_connection;
use crate::middleware::AuthContext;
use crate::server::VidaPlusServer;
use crate::services::{audit_entry, notify, snapshot};
use crate::types::PaginationParams;
use crate::validate_field;
use crate::validation::{
    format_cpf, optional, parse_calendar_date, required, validate_cpf, validate_email,
    require_changes, validate_not_future, validate_password_strength, RequestValidation,
};

const PATIENTS: &str = "patients";

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreatePatientRequest {
    #[schema(example = "maria.silva@email.com")]
    pub email: Option<String>,
    pub password: Option<String>,
    #[schema(example = "123.456.789-09")]
    pub cpf: Option<String>,
    pub name: Option<String>,
    /// YYYY-MM-DD
    #[schema(example = "1990-05-17")]
    pub birth_date: Option<String>,
    /// M, F or O
    pub sex: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub health_plan: Option<String>,
    pub allergies: Option<String>,
    pub current_medications: Option<String>,
    pub family_history: Option<String>,
}

/// A create request that passed every check that needs no database
#[derive(Debug)]
pub struct ValidPatient {
    pub email: String,
    pub password: String,
    pub patient: NewPatient,
}

impl CreatePatientRequest {
    /// Runs the field checks in order and returns the normalized record.
    /// `user_id` is filled in once the account exists.
    ///
    /// # Errors
    ///
    /// Returns the first failed check as a validation error.
    pub fn validate(self, today: NaiveDate) -> ApiResult<ValidPatient> {
        let email = required(&self.email, "email")?;
        let password = required(&self.password, "password")?;
        let cpf = required(&self.cpf, "cpf")?;
        let name = required(&self.name, "name")?;
        let birth_date = required(&self.birth_date, "birth_date")?;
        let sex = required(&self.sex, "sex")?;

        validate_cpf(cpf).into_result()?;
        let cpf = format_cpf(cpf).ok_or_else(|| ApiError::validation("CPF is invalid"))?;
        validate_email(email).into_result()?;
        validate_password_strength(password).into_result()?;

        let sex = sex
            .parse::<Sex>()
            .map_err(|()| ApiError::validation("Sex must be M, F or O"))?;
        let birth_date = parse_calendar_date(birth_date, "birth_date")?;
        validate_not_future(birth_date, today, "Birth date")?;

        Ok(ValidPatient {
            email: email.to_string(),
            password: password.to_string(),
            patient: NewPatient {
                user_id: 0,
                cpf,
                name: name.to_string(),
                birth_date,
                sex,
                phone: optional(self.phone),
                address: optional(self.address),
                health_plan: optional(self.health_plan),
                allergies: optional(self.allergies),
                current_medications: optional(self.current_medications),
                family_history: optional(self.family_history),
            },
        })
    }
}

impl RequestValidation for PatientChanges {
    fn validate(&self) -> ApiResult<()> {
        require_changes(self.is_empty())?;
        if let Some(name) = &self.name {
            validate_field!(!name.trim().is_empty(), "Name cannot be empty");
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PatientQuery {
    /// Case-insensitive partial match
    pub name: Option<String>,
    /// Exact match, with or without punctuation
    pub cpf: Option<String>,
    /// Case-insensitive partial match
    pub health_plan: Option<String>,
}

/// Register a patient and its login account
#[utoipa::path(
    post,
    path = "/api/v1/patients",
    tag = "patients",
    request_body = CreatePatientRequest,
    responses(
        (status = 201, description = "Patient created", body = Patient),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "CPF or email already registered")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_patient(
    State(server): State<VidaPlusServer>,
    auth: AuthContext,
    Json(payload): Json<CreatePatientRequest>,
) -> ApiResult<(StatusCode, ApiResponse<Patient>)> {
    let ValidPatient {
        email,
        password,
        patient: mut new_patient,
    } = payload.validate(Utc::now().date_naive())?;

    let mut uow = UnitOfWork::begin(&server.database).await?;

    if PatientRepository::new(uow.conn()).cpf_exists(&new_patient.cpf).await? {
        return Err(ApiError::conflict("CPF is already registered"));
    }
    if UserRepository::new(uow.conn()).email_exists(&email).await? {
        return Err(ApiError::conflict("Email is already in use"));
    }

    let password_hash = server.passwords.hash(&password).await?;
    let user = UserRepository::new(uow.conn())
        .create(&NewUser {
            email,
            password_hash,
            user_type: UserType::Patient,
        })
        .await?;
    new_patient.user_id = user.id;

    let mut patients = PatientRepository::new(uow.conn());
    let id = patients.create(&new_patient).await?;
    let patient = patients
        .find(id)
        .await?
        .ok_or_else(|| ApiError::internal("Created patient could not be read back"))?;

    let mut entry = audit_entry(&auth, AuditAction::Create, PATIENTS).record_id(id);
    if let Some(after) = snapshot(&patient) {
        entry = entry.after(after);
    }
    uow.commit_audited(&server.audit, entry).await?;
    info!(patient_id = id, "Patient created");

    notify(
        &server.database,
        user.id,
        "Welcome to VidaPlus",
        &format!("Hello {}, your registration was completed successfully!", patient.name),
        NotificationKind::System,
    )
    .await;

    Ok((StatusCode::CREATED, api_success(patient)))
}

/// List patients
#[utoipa::path(
    get,
    path = "/api/v1/patients",
    tag = "patients",
    params(PatientQuery, PaginationParams),
    responses((status = 200, description = "Page of patients ordered by name", body = [Patient])),
    security(("bearer_auth" = []))
)]
pub async fn list_patients(
    State(server): State<VidaPlusServer>,
    _auth: AuthContext,
    Query(query): Query<PatientQuery>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<ApiResponse<Vec<Patient>>> {
    let filter = PatientFilter {
        name: optional(query.name),
        cpf: optional(query.cpf).map(|cpf| format_cpf(&cpf).unwrap_or(cpf)),
        health_plan: optional(query.health_plan),
    };

    let mut conn = read_connection(&server.database).await?;
    let (patients, total) = PatientRepository::new(&mut conn)
        .list(&filter, pagination.page())
        .await?;

    Ok(pagination.wrap_response(patients, total))
}

/// Get a patient by id
#[utoipa::path(
    get,
    path = "/api/v1/patients/{id}",
    tag = "patients",
    params(("id" = i64, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Patient", body = Patient),
        (status = 404, description = "Patient not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_patient(
    State(server): State<VidaPlusServer>,
    _auth: AuthContext,
    Path(id): Path<i64>,
) -> ApiResult<ApiResponse<Patient>> {
    let mut conn = read_connection(&server.database).await?;
    PatientRepository::new(&mut conn)
        .find(id)
        .await?
        .map(api_success)
        .ok_or_else(|| ApiError::not_found("Patient"))
}

/// Update a patient's editable fields
#[utoipa::path(
    put,
    path = "/api/v1/patients/{id}",
    tag = "patients",
    params(("id" = i64, Path, description = "Patient id")),
    request_body = PatientChanges,
    responses(
        (status = 200, description = "Updated patient", body = Patient),
        (status = 404, description = "Patient not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_patient(
    State(server): State<VidaPlusServer>,
    auth: AuthContext,
    Path(id): Path<i64>,
    Json(changes): Json<PatientChanges>,
) -> ApiResult<ApiResponse<Patient>> {
    changes.validate()?;

    let mut uow = UnitOfWork::begin(&server.database).await?;
    let mut patients = PatientRepository::new(uow.conn());

    let before = patients.find(id).await?.ok_or_else(|| ApiError::not_found("Patient"))?;
    patients.update(id, &changes).await?;
    let after = patients.find(id).await?.ok_or_else(|| ApiError::not_found("Patient"))?;

    let mut entry = audit_entry(&auth, AuditAction::Update, PATIENTS).record_id(id);
    if let Some(state) = snapshot(&before) {
        entry = entry.before(state);
    }
    if let Some(state) = snapshot(&after) {
        entry = entry.after(state);
    }
    uow.commit_audited(&server.audit, entry).await?;

    Ok(api_success(after))
}

/// Delete a patient with no appointments or prescriptions
#[utoipa::path(
    delete,
    path = "/api/v1/patients/{id}",
    tag = "patients",
    params(("id" = i64, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Patient deleted", body = MessageResponse),
        (status = 404, description = "Patient not found"),
        (status = 409, description = "Patient still has appointments or prescriptions")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_patient(
    State(server): State<VidaPlusServer>,
    auth: AuthContext,
    Path(id): Path<i64>,
) -> ApiResult<ApiResponse<MessageResponse>> {
    let mut uow = UnitOfWork::begin(&server.database).await?;
    let mut patients = PatientRepository::new(uow.conn());

    let patient = patients.find(id).await?.ok_or_else(|| ApiError::not_found("Patient"))?;
    if patients.dependent_records(id).await? > 0 {
        return Err(ApiError::conflict(
            "Patient has appointments or prescriptions and cannot be deleted",
        ));
    }
    patients.delete(id).await?;
    NotificationRepository::new(uow.conn())
        .delete_for_user(patient.user_id)
        .await?;
    UserRepository::new(uow.conn()).delete(patient.user_id).await?;

    let mut entry = audit_entry(&auth, AuditAction::Delete, PATIENTS).record_id(id);
    if let Some(state) = snapshot(&patient) {
        entry = entry.before(state);
    }
    uow.commit_audited(&server.audit, entry).await?;
    info!(patient_id = id, "Patient deleted");

    Ok(api_success(MessageResponse::new("Patient deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()
    }

    fn request() -> CreatePatientRequest {
        CreatePatientRequest {
            email: Some("maria.silva@email.com".to_string()),
            password: Some("Paciente123!".to_string()),
            cpf: Some("12345678909".to_string()),
            name: Some("Maria Silva".to_string()),
            birth_date: Some("1990-05-17".to_string()),
            sex: Some("F".to_string()),
            health_plan: Some("  ".to_string()),
            ..CreatePatientRequest::default()
        }
    }

    #[test]
    fn valid_request_is_normalized() {
        let valid = request().validate(today()).unwrap();
        assert_eq!(valid.patient.cpf, "123.456.789-09");
        assert_eq!(valid.patient.sex, Sex::Female);
        assert_eq!(valid.patient.health_plan, None);
    }

    #[test]
    fn missing_field_is_named() {
        let err = CreatePatientRequest { sex: None, ..request() }
            .validate(today())
            .unwrap_err();
        assert_eq!(err.to_string(), "Field sex is required");
    }

    #[test]
    fn invalid_cpf_uses_validator_message() {
        let err = CreatePatientRequest {
            cpf: Some("111.111.111-11".to_string()),
            ..request()
        }
        .validate(today())
        .unwrap_err();
        assert_eq!(err.to_string(), "CPF is invalid");
    }

    #[test]
    fn future_birth_date_is_rejected() {
        let err = CreatePatientRequest {
            birth_date: Some("2025-01-11".to_string()),
            ..request()
        }
        .validate(today())
        .unwrap_err();
        assert_eq!(err.to_string(), "Birth date cannot be in the future");
    }

    #[test]
    fn unknown_sex_is_rejected() {
        let err = CreatePatientRequest {
            sex: Some("X".to_string()),
            ..request()
        }
        .validate(today())
        .unwrap_err();
        assert_eq!(err.to_string(), "Sex must be M, F or O");
    }

    #[test]
    fn blank_name_change_is_rejected() {
        let changes = PatientChanges {
            name: Some(" ".to_string()),
            ..PatientChanges::default()
        };
        assert!(changes.validate().is_err());
        let changes = PatientChanges {
            allergies: Some("Penicillin".to_string()),
            ..PatientChanges::default()
        };
        assert!(changes.validate().is_ok());
    }

    #[test]
    fn empty_change_set_is_rejected() {
        assert_eq!(
            PatientChanges::default().validate().unwrap_err().to_string(),
            "No data provided"
        );
    }
}
