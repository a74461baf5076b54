//! Professional endpoints

use audit_engine::AuditAction;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use database_layer::models::{
    accepted, NewProfessional, NewUser, NotificationKind, Professional, ProfessionalChanges,
    Specialty, UserType,
};
use database_layer::repositories::{
    NotificationRepository, ProfessionalFilter, ProfessionalRepository, UserRepository,
};
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
    only_digits, optional, parse_calendar_date, require_changes, required, validate_email,
    validate_license_number, validate_not_future, validate_password_strength, RequestValidation,
};

const PROFESSIONALS: &str = "professionals";

fn parse_specialty(value: &str) -> ApiResult<Specialty> {
    value.parse::<Specialty>().map_err(|()| {
        ApiError::validation(format!(
            "Invalid specialty. Accepted values: {}",
            accepted(Specialty::ALL)
        ))
    })
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateProfessionalRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    /// CRM/COREN; punctuation is stripped before storage
    #[schema(example = "CRM/SP 123456")]
    pub license_number: Option<String>,
    pub name: Option<String>,
    #[schema(example = "Cardiology")]
    pub specialty: Option<String>,
    pub phone: Option<String>,
    pub professional_email: Option<String>,
    /// YYYY-MM-DD, defaults to today
    pub admission_date: Option<String>,
}

#[derive(Debug)]
pub struct ValidProfessional {
    pub email: String,
    pub password: String,
    pub professional: NewProfessional,
}

impl CreateProfessionalRequest {
    /// # Errors
    ///
    /// Returns the first failed check as a validation error.
    pub fn validate(self, today: NaiveDate) -> ApiResult<ValidProfessional> {
        let email = required(&self.email, "email")?;
        let password = required(&self.password, "password")?;
        let license_number = required(&self.license_number, "license_number")?;
        let name = required(&self.name, "name")?;
        let specialty = required(&self.specialty, "specialty")?;

        validate_license_number(license_number).into_result()?;
        validate_email(email).into_result()?;
        validate_password_strength(password).into_result()?;
        let specialty = parse_specialty(specialty)?;

        let admission_date = match optional(self.admission_date) {
            Some(text) => {
                let date = parse_calendar_date(&text, "admission_date")?;
                validate_not_future(date, today, "Admission date")?;
                date
            }
            None => today,
        };

        let professional_email = optional(self.professional_email);
        if let Some(address) = &professional_email {
            validate_email(address).into_result()?;
        }

        Ok(ValidProfessional {
            email: email.to_string(),
            password: password.to_string(),
            professional: NewProfessional {
                user_id: 0,
                license_number: only_digits(license_number),
                name: name.to_string(),
                specialty,
                phone: optional(self.phone),
                professional_email,
                admission_date,
            },
        })
    }
}

impl RequestValidation for ProfessionalChanges {
    fn validate(&self) -> ApiResult<()> {
        require_changes(self.is_empty())?;
        if let Some(name) = &self.name {
            validate_field!(!name.trim().is_empty(), "Name cannot be empty");
        }
        if let Some(specialty) = &self.specialty {
            parse_specialty(specialty)?;
        }
        if let Some(address) = &self.professional_email {
            validate_email(address).into_result()?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProfessionalQuery {
    /// Case-insensitive partial match
    pub name: Option<String>,
    /// Exact specialty
    pub specialty: Option<String>,
}

/// Register a professional and its login account
#[utoipa::path(
    post,
    path = "/api/v1/professionals",
    tag = "professionals",
    request_body = CreateProfessionalRequest,
    responses(
        (status = 201, description = "Professional created", body = Professional),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "License number or email already registered")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_professional(
    State(server): State<VidaPlusServer>,
    auth: AuthContext,
    Json(payload): Json<CreateProfessionalRequest>,
) -> ApiResult<(StatusCode, ApiResponse<Professional>)> {
    let ValidProfessional {
        email,
        password,
        professional: mut new_professional,
    } = payload.validate(Utc::now().date_naive())?;

    let mut uow = UnitOfWork::begin(&server.database).await?;

    if ProfessionalRepository::new(uow.conn())
        .license_exists(&new_professional.license_number)
        .await?
    {
        return Err(ApiError::conflict("CRM/COREN is already registered"));
    }
    if UserRepository::new(uow.conn()).email_exists(&email).await? {
        return Err(ApiError::conflict("Email is already in use"));
    }

    let password_hash = server.passwords.hash(&password).await?;
    let user = UserRepository::new(uow.conn())
        .create(&NewUser {
            email,
            password_hash,
            user_type: UserType::Professional,
        })
        .await?;
    new_professional.user_id = user.id;

    let mut professionals = ProfessionalRepository::new(uow.conn());
    let id = professionals.create(&new_professional).await?;
    let professional = professionals
        .find(id)
        .await?
        .ok_or_else(|| ApiError::internal("Created professional could not be read back"))?;

    let mut entry = audit_entry(&auth, AuditAction::Create, PROFESSIONALS).record_id(id);
    if let Some(after) = snapshot(&professional) {
        entry = entry.after(after);
    }
    uow.commit_audited(&server.audit, entry).await?;
    info!(professional_id = id, "Professional created");

    notify(
        &server.database,
        user.id,
        "Welcome to VidaPlus",
        &format!(
            "Hello {}, your registration as a professional was completed successfully!",
            professional.name
        ),
        NotificationKind::System,
    )
    .await;

    Ok((StatusCode::CREATED, api_success(professional)))
}

/// List professionals
#[utoipa::path(
    get,
    path = "/api/v1/professionals",
    tag = "professionals",
    params(ProfessionalQuery, PaginationParams),
    responses((status = 200, description = "Page of professionals ordered by name", body = [Professional])),
    security(("bearer_auth" = []))
)]
pub async fn list_professionals(
    State(server): State<VidaPlusServer>,
    _auth: AuthContext,
    Query(query): Query<ProfessionalQuery>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<ApiResponse<Vec<Professional>>> {
    let filter = ProfessionalFilter {
        name: optional(query.name),
        specialty: optional(query.specialty),
    };

    let mut conn = read_connection(&server.database).await?;
    let (professionals, total) = ProfessionalRepository::new(&mut conn)
        .list(&filter, pagination.page())
        .await?;

    Ok(pagination.wrap_response(professionals, total))
}

/// Get a professional by id
#[utoipa::path(
    get,
    path = "/api/v1/professionals/{id}",
    tag = "professionals",
    params(("id" = i64, Path, description = "Professional id")),
    responses(
        (status = 200, description = "Professional", body = Professional),
        (status = 404, description = "Professional not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_professional(
    State(server): State<VidaPlusServer>,
    _auth: AuthContext,
    Path(id): Path<i64>,
) -> ApiResult<ApiResponse<Professional>> {
    let mut conn = read_connection(&server.database).await?;
    ProfessionalRepository::new(&mut conn)
        .find(id)
        .await?
        .map(api_success)
        .ok_or_else(|| ApiError::not_found("Professional"))
}

/// Update a professional's editable fields
#[utoipa::path(
    put,
    path = "/api/v1/professionals/{id}",
    tag = "professionals",
    params(("id" = i64, Path, description = "Professional id")),
    request_body = ProfessionalChanges,
    responses(
        (status = 200, description = "Updated professional", body = Professional),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Professional not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_professional(
    State(server): State<VidaPlusServer>,
    auth: AuthContext,
    Path(id): Path<i64>,
    Json(changes): Json<ProfessionalChanges>,
) -> ApiResult<ApiResponse<Professional>> {
    changes.validate()?;

    let mut uow = UnitOfWork::begin(&server.database).await?;
    let mut professionals = ProfessionalRepository::new(uow.conn());

    let before = professionals
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Professional"))?;
    professionals.update(id, &changes).await?;
    let after = professionals
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Professional"))?;

    let mut entry = audit_entry(&auth, AuditAction::Update, PROFESSIONALS).record_id(id);
    if let Some(state) = snapshot(&before) {
        entry = entry.before(state);
    }
    if let Some(state) = snapshot(&after) {
        entry = entry.after(state);
    }
    uow.commit_audited(&server.audit, entry).await?;

    Ok(api_success(after))
}

/// Delete a professional with no appointments or prescriptions
#[utoipa::path(
    delete,
    path = "/api/v1/professionals/{id}",
    tag = "professionals",
    params(("id" = i64, Path, description = "Professional id")),
    responses(
        (status = 200, description = "Professional deleted", body = MessageResponse),
        (status = 404, description = "Professional not found"),
        (status = 409, description = "Professional still has appointments or prescriptions")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_professional(
    State(server): State<VidaPlusServer>,
    auth: AuthContext,
    Path(id): Path<i64>,
) -> ApiResult<ApiResponse<MessageResponse>> {
    let mut uow = UnitOfWork::begin(&server.database).await?;
    let mut professionals = ProfessionalRepository::new(uow.conn());

    let professional = professionals
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Professional"))?;
    if professionals.dependent_records(id).await? > 0 {
        return Err(ApiError::conflict(
            "Professional has appointments or prescriptions and cannot be deleted",
        ));
    }
    professionals.delete(id).await?;
    NotificationRepository::new(uow.conn())
        .delete_for_user(professional.user_id)
        .await?;
    UserRepository::new(uow.conn()).delete(professional.user_id).await?;

    let mut entry = audit_entry(&auth, AuditAction::Delete, PROFESSIONALS).record_id(id);
    if let Some(state) = snapshot(&professional) {
        entry = entry.before(state);
    }
    uow.commit_audited(&server.audit, entry).await?;
    info!(professional_id = id, "Professional deleted");

    Ok(api_success(MessageResponse::new("Professional deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()
    }

    fn request() -> CreateProfessionalRequest {
        CreateProfessionalRequest {
            email: Some("dr.joao@vidaplus.com".to_string()),
            password: Some("Medico123!".to_string()),
            license_number: Some("CRM/SP 123.456".to_string()),
            name: Some("Dr. João Santos".to_string()),
            specialty: Some("Cardiology".to_string()),
            ..CreateProfessionalRequest::default()
        }
    }

    #[test]
    fn license_is_stored_as_digits_and_admission_defaults_to_today() {
        let valid = request().validate(today()).unwrap();
        assert_eq!(valid.professional.license_number, "123456");
        assert_eq!(valid.professional.admission_date, today());
        assert_eq!(valid.professional.specialty, Specialty::Cardiology);
    }

    #[test]
    fn short_license_is_rejected() {
        let err = CreateProfessionalRequest {
            license_number: Some("123".to_string()),
            ..request()
        }
        .validate(today())
        .unwrap_err();
        assert_eq!(err.to_string(), "CRM/COREN must have between 5 and 10 digits");
    }

    #[test]
    fn specialty_outside_whitelist_is_rejected() {
        let err = CreateProfessionalRequest {
            specialty: Some("Astrology".to_string()),
            ..request()
        }
        .validate(today())
        .unwrap_err();
        assert!(err.to_string().starts_with("Invalid specialty"));
    }

    #[test]
    fn future_admission_is_rejected() {
        let err = CreateProfessionalRequest {
            admission_date: Some("2025-02-01".to_string()),
            ..request()
        }
        .validate(today())
        .unwrap_err();
        assert_eq!(err.to_string(), "Admission date cannot be in the future");
    }

    #[test]
    fn professional_email_is_checked() {
        let err = CreateProfessionalRequest {
            professional_email: Some("not-an-email".to_string()),
            ..request()
        }
        .validate(today())
        .unwrap_err();
        assert_eq!(err.to_string(), "Email format is invalid");
    }

    #[test]
    fn changes_validate_specialty() {
        let changes = ProfessionalChanges {
            specialty: Some("Neurology".to_string()),
            ..ProfessionalChanges::default()
        };
        assert!(changes.validate().is_ok());

        let changes = ProfessionalChanges {
            specialty: Some("neurology".to_string()),
            ..ProfessionalChanges::default()
        };
        assert!(changes.validate().is_err());
        assert!(ProfessionalChanges::default().validate().is_err());
    }
}
