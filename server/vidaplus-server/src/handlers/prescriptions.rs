//! Prescription endpoints

use audit_engine::AuditAction;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use database_layer::models::{
    accepted, NewPrescription, NotificationKind, Prescription, PrescriptionChanges,
    PrescriptionStatus,
};
use database_layer::repositories::{
    PatientRepository, PrescriptionFilter, PrescriptionRepository, ProfessionalRepository,
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
use crate::validation::{optional, require_changes, required, required_id};

const PRESCRIPTIONS: &str = "prescriptions";

fn parse_status(value: &str) -> ApiResult<PrescriptionStatus> {
    value.parse().map_err(|()| {
        ApiError::validation(format!(
            "Invalid prescription status. Accepted values: {}",
            accepted(PrescriptionStatus::ALL)
        ))
    })
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreatePrescriptionRequest {
    pub patient_id: Option<i64>,
    pub professional_id: Option<i64>,
    #[schema(example = "Losartan 50mg")]
    pub medications: Option<String>,
    #[schema(example = "1 tablet every 12 hours")]
    pub dosage: Option<String>,
    pub duration: Option<String>,
    pub notes: Option<String>,
}

impl CreatePrescriptionRequest {
    /// # Errors
    ///
    /// Returns the first failed check as a validation error.
    pub fn validate(self) -> ApiResult<NewPrescription> {
        let patient_id = required_id(self.patient_id, "patient_id")?;
        let professional_id = required_id(self.professional_id, "professional_id")?;
        let medications = required(&self.medications, "medications")?.to_string();
        let dosage = required(&self.dosage, "dosage")?.to_string();

        Ok(NewPrescription {
            patient_id,
            professional_id,
            medications,
            dosage,
            duration: optional(self.duration),
            notes: optional(self.notes),
        })
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdatePrescriptionRequest {
    pub medications: Option<String>,
    pub dosage: Option<String>,
    pub duration: Option<String>,
    pub notes: Option<String>,
    /// active or closed
    pub status: Option<String>,
}

impl UpdatePrescriptionRequest {
    /// # Errors
    ///
    /// Fails on an unknown status or blank medications or dosage.
    pub fn validate(self) -> ApiResult<PrescriptionChanges> {
        for (field, value) in [("Medications", &self.medications), ("Dosage", &self.dosage)] {
            if value.as_deref().is_some_and(|text| text.trim().is_empty()) {
                return Err(ApiError::validation(format!("{field} cannot be empty")));
            }
        }
        let changes = PrescriptionChanges {
            status: self.status.as_deref().map(parse_status).transpose()?,
            medications: self.medications,
            dosage: self.dosage,
            duration: self.duration,
            notes: self.notes,
        };
        require_changes(changes.is_empty())?;
        Ok(changes)
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PrescriptionQuery {
    pub patient_id: Option<i64>,
    pub professional_id: Option<i64>,
    pub status: Option<String>,
}

/// Issue a prescription
#[utoipa::path(
    post,
    path = "/api/v1/prescriptions",
    tag = "prescriptions",
    request_body = CreatePrescriptionRequest,
    responses(
        (status = 201, description = "Prescription created", body = Prescription),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Patient or professional not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_prescription(
    State(server): State<VidaPlusServer>,
    auth: AuthContext,
    Json(payload): Json<CreatePrescriptionRequest>,
) -> ApiResult<(StatusCode, ApiResponse<Prescription>)> {
    let new_prescription = payload.validate()?;

    let mut uow = UnitOfWork::begin(&server.database).await?;

    let patient = PatientRepository::new(uow.conn())
        .find(new_prescription.patient_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Patient"))?;
    ProfessionalRepository::new(uow.conn())
        .find(new_prescription.professional_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Professional"))?;

    let mut prescriptions = PrescriptionRepository::new(uow.conn());
    let id = prescriptions.create(&new_prescription).await?;
    let prescription = prescriptions
        .find(id)
        .await?
        .ok_or_else(|| ApiError::internal("Created prescription could not be read back"))?;

    let mut entry = audit_entry(&auth, AuditAction::Create, PRESCRIPTIONS).record_id(id);
    if let Some(after) = snapshot(&prescription) {
        entry = entry.after(after);
    }
    uow.commit_audited(&server.audit, entry).await?;
    info!(prescription_id = id, "Prescription created");

    notify(
        &server.database,
        patient.user_id,
        "New prescription",
        &format!(
            "{} issued a new prescription for you: {}.",
            prescription.professional_name, prescription.medications
        ),
        NotificationKind::Result,
    )
    .await;

    Ok((StatusCode::CREATED, api_success(prescription)))
}

/// List prescriptions, newest first
#[utoipa::path(
    get,
    path = "/api/v1/prescriptions",
    tag = "prescriptions",
    params(PrescriptionQuery, PaginationParams),
    responses(
        (status = 200, description = "Page of prescriptions", body = [Prescription]),
        (status = 400, description = "Invalid filter")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_prescriptions(
    State(server): State<VidaPlusServer>,
    _auth: AuthContext,
    Query(query): Query<PrescriptionQuery>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<ApiResponse<Vec<Prescription>>> {
    let status = optional(query.status);
    if let Some(status) = &status {
        parse_status(status)?;
    }
    let filter = PrescriptionFilter {
        patient_id: query.patient_id,
        professional_id: query.professional_id,
        status,
    };

    let mut conn = read_connection(&server.database).await?;
    let (prescriptions, total) = PrescriptionRepository::new(&mut conn)
        .list(&filter, pagination.page())
        .await?;

    Ok(pagination.wrap_response(prescriptions, total))
}

/// Get a prescription by id
#[utoipa::path(
    get,
    path = "/api/v1/prescriptions/{id}",
    tag = "prescriptions",
    params(("id" = i64, Path, description = "Prescription id")),
    responses(
        (status = 200, description = "Prescription", body = Prescription),
        (status = 404, description = "Prescription not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_prescription(
    State(server): State<VidaPlusServer>,
    _auth: AuthContext,
    Path(id): Path<i64>,
) -> ApiResult<ApiResponse<Prescription>> {
    let mut conn = read_connection(&server.database).await?;
    PrescriptionRepository::new(&mut conn)
        .find(id)
        .await?
        .map(api_success)
        .ok_or_else(|| ApiError::not_found("Prescription"))
}

/// Update a prescription
#[utoipa::path(
    put,
    path = "/api/v1/prescriptions/{id}",
    tag = "prescriptions",
    params(("id" = i64, Path, description = "Prescription id")),
    request_body = UpdatePrescriptionRequest,
    responses(
        (status = 200, description = "Updated prescription", body = Prescription),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Prescription not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_prescription(
    State(server): State<VidaPlusServer>,
    auth: AuthContext,
    Path(id): Path<i64>,
    Json(payload): Json<UpdatePrescriptionRequest>,
) -> ApiResult<ApiResponse<Prescription>> {
    let changes = payload.validate()?;

    let mut uow = UnitOfWork::begin(&server.database).await?;
    let mut prescriptions = PrescriptionRepository::new(uow.conn());

    let before = prescriptions
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Prescription"))?;
    prescriptions.update(id, &changes).await?;
    let after = prescriptions
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Prescription"))?;

    let mut entry = audit_entry(&auth, AuditAction::Update, PRESCRIPTIONS).record_id(id);
    if let Some(state) = snapshot(&before) {
        entry = entry.before(state);
    }
    if let Some(state) = snapshot(&after) {
        entry = entry.after(state);
    }
    uow.commit_audited(&server.audit, entry).await?;

    Ok(api_success(after))
}

/// Delete a prescription
#[utoipa::path(
    delete,
    path = "/api/v1/prescriptions/{id}",
    tag = "prescriptions",
    params(("id" = i64, Path, description = "Prescription id")),
    responses(
        (status = 200, description = "Prescription deleted", body = MessageResponse),
        (status = 404, description = "Prescription not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_prescription(
    State(server): State<VidaPlusServer>,
    auth: AuthContext,
    Path(id): Path<i64>,
) -> ApiResult<ApiResponse<MessageResponse>> {
    let mut uow = UnitOfWork::begin(&server.database).await?;
    let mut prescriptions = PrescriptionRepository::new(uow.conn());

    let prescription = prescriptions
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Prescription"))?;
    prescriptions.delete(id).await?;

    let mut entry = audit_entry(&auth, AuditAction::Delete, PRESCRIPTIONS).record_id(id);
    if let Some(state) = snapshot(&prescription) {
        entry = entry.before(state);
    }
    uow.commit_audited(&server.audit, entry).await?;
    info!(prescription_id = id, "Prescription deleted");

    Ok(api_success(MessageResponse::new("Prescription deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_medications_and_dosage() {
        let request = CreatePrescriptionRequest {
            patient_id: Some(1),
            professional_id: Some(2),
            medications: Some("Losartan 50mg".to_string()),
            ..CreatePrescriptionRequest::default()
        };
        assert_eq!(request.validate().unwrap_err().to_string(), "Field dosage is required");
    }

    #[test]
    fn update_parses_status() {
        let changes = UpdatePrescriptionRequest {
            status: Some("closed".to_string()),
            ..UpdatePrescriptionRequest::default()
        }
        .validate()
        .unwrap();
        assert_eq!(changes.status, Some(PrescriptionStatus::Closed));

        assert!(UpdatePrescriptionRequest {
            status: Some("open".to_string()),
            ..UpdatePrescriptionRequest::default()
        }
        .validate()
        .is_err());
    }

    #[test]
    fn update_rejects_blank_dosage() {
        let err = UpdatePrescriptionRequest {
            dosage: Some(" ".to_string()),
            ..UpdatePrescriptionRequest::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.to_string(), "Dosage cannot be empty");
    }

    #[test]
    fn update_without_fields_is_rejected() {
        let err = UpdatePrescriptionRequest::default().validate().unwrap_err();
        assert_eq!(err.to_string(), "No data provided");
    }
}
