//! Appointment endpoints

use audit_engine::AuditAction;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, NaiveTime, Utc};
use database_layer::models::{
    accepted, Appointment, AppointmentChanges, AppointmentStatus, AppointmentType,
    NewAppointment, NotificationKind,
};
use database_layer::repositories::{
    AppointmentFilter, AppointmentRepository, FacilityRepository, PatientRepository,
    ProfessionalRepository,
};
use database_layer::UnitOfWork;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::error::{api_success, ApiError, ApiResponse, ApiResult};
use crate::handlers::auth::MessageResponse;
use crate::handlers::read_connection;
use crate::middleware::AuthContext;
use crate::server::VidaPlusServer;
use crate::services::{audit_entry, notify, snapshot, telemedicine_link};
use crate::types::PaginationParams;
use crate::validation::{
    optional, parse_appointment_time, parse_calendar_date, require_changes, required, required_id,
};

const APPOINTMENTS: &str = "appointments";

fn parse_type(value: &str) -> ApiResult<AppointmentType> {
    value.parse().map_err(|()| {
        ApiError::validation(format!(
            "Invalid appointment type. Accepted values: {}",
            accepted(AppointmentType::ALL)
        ))
    })
}

fn parse_status(value: &str) -> ApiResult<AppointmentStatus> {
    value.parse().map_err(|()| {
        ApiError::validation(format!(
            "Invalid appointment status. Accepted values: {}",
            accepted(AppointmentStatus::ALL)
        ))
    })
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateAppointmentRequest {
    pub patient_id: Option<i64>,
    pub professional_id: Option<i64>,
    pub facility_id: Option<i64>,
    /// UTC, YYYY-MM-DDTHH:MM:SS
    #[schema(example = "2030-03-15T14:30:00")]
    pub scheduled_at: Option<String>,
    /// in_person or telemedicine
    pub appointment_type: Option<String>,
    pub notes: Option<String>,
}

impl CreateAppointmentRequest {
    /// # Errors
    ///
    /// Returns the first failed check as a validation error.
    pub fn validate(self, now: DateTime<Utc>) -> ApiResult<NewAppointment> {
        let patient_id = required_id(self.patient_id, "patient_id")?;
        let professional_id = required_id(self.professional_id, "professional_id")?;
        let facility_id = required_id(self.facility_id, "facility_id")?;
        let scheduled_at = required(&self.scheduled_at, "scheduled_at")?;
        let appointment_type = parse_type(required(&self.appointment_type, "appointment_type")?)?;
        let scheduled_at = parse_appointment_time(scheduled_at, now)?;

        Ok(NewAppointment {
            patient_id,
            professional_id,
            facility_id,
            scheduled_at,
            appointment_type,
            notes: optional(self.notes),
            telemedicine_link: (appointment_type == AppointmentType::Telemedicine)
                .then(telemedicine_link),
        })
    }
}

/// Keeps an explicit `null` apart from an absent field.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateAppointmentRequest {
    /// UTC, YYYY-MM-DDTHH:MM:SS
    pub scheduled_at: Option<String>,
    pub appointment_type: Option<String>,
    /// scheduled, completed or cancelled
    pub status: Option<String>,
    /// null or blank clears the notes
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
}

impl UpdateAppointmentRequest {
    /// # Errors
    ///
    /// Returns the first failed check as a validation error.
    pub fn validate(&self, now: DateTime<Utc>) -> ApiResult<AppointmentChanges> {
        let appointment_type = self.appointment_type.as_deref().map(parse_type).transpose()?;
        let changes = AppointmentChanges {
            scheduled_at: self
                .scheduled_at
                .as_deref()
                .map(|value| parse_appointment_time(value, now))
                .transpose()?,
            appointment_type,
            status: self.status.as_deref().map(parse_status).transpose()?,
            notes: self.notes.clone().map(optional),
            telemedicine_link: None,
        };
        require_changes(changes.is_empty())?;
        Ok(changes)
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AppointmentQuery {
    pub patient_id: Option<i64>,
    pub professional_id: Option<i64>,
    pub facility_id: Option<i64>,
    pub status: Option<String>,
    /// First day included, YYYY-MM-DD
    pub date_from: Option<String>,
    /// Last day included, YYYY-MM-DD
    pub date_to: Option<String>,
}

impl AppointmentQuery {
    /// # Errors
    ///
    /// Fails on an unknown status or a malformed date.
    pub fn into_filter(self) -> ApiResult<AppointmentFilter> {
        let status = optional(self.status);
        if let Some(status) = &status {
            parse_status(status)?;
        }
        let from = optional(self.date_from)
            .map(|text| parse_calendar_date(&text, "date_from"))
            .transpose()?
            .map(|date| date.and_time(NaiveTime::MIN).and_utc());
        let until = optional(self.date_to)
            .map(|text| parse_calendar_date(&text, "date_to"))
            .transpose()?
            .and_then(|date| date.and_hms_opt(23, 59, 59))
            .map(|end| end.and_utc());

        Ok(AppointmentFilter {
            patient_id: self.patient_id,
            professional_id: self.professional_id,
            facility_id: self.facility_id,
            status,
            from,
            until,
        })
    }
}

/// Schedule an appointment
#[utoipa::path(
    post,
    path = "/api/v1/appointments",
    tag = "appointments",
    request_body = CreateAppointmentRequest,
    responses(
        (status = 201, description = "Appointment scheduled", body = Appointment),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Patient, professional or facility not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_appointment(
    State(server): State<VidaPlusServer>,
    auth: AuthContext,
    Json(payload): Json<CreateAppointmentRequest>,
) -> ApiResult<(StatusCode, ApiResponse<Appointment>)> {
    let new_appointment = payload.validate(Utc::now())?;

    let mut uow = UnitOfWork::begin(&server.database).await?;

    let patient = PatientRepository::new(uow.conn())
        .find(new_appointment.patient_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Patient"))?;
    ProfessionalRepository::new(uow.conn())
        .find(new_appointment.professional_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Professional"))?;
    FacilityRepository::new(uow.conn())
        .find(new_appointment.facility_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Facility"))?;

    let mut appointments = AppointmentRepository::new(uow.conn());
    let id = appointments.create(&new_appointment).await?;
    let appointment = appointments
        .find(id)
        .await?
        .ok_or_else(|| ApiError::internal("Created appointment could not be read back"))?;

    let mut entry = audit_entry(&auth, AuditAction::Create, APPOINTMENTS).record_id(id);
    if let Some(after) = snapshot(&appointment) {
        entry = entry.after(after);
    }
    uow.commit_audited(&server.audit, entry).await?;
    info!(appointment_id = id, "Appointment scheduled");

    notify(
        &server.database,
        patient.user_id,
        "Appointment scheduled",
        &format!(
            "Your appointment with {} at {} is scheduled for {} UTC.",
            appointment.professional_name,
            appointment.facility_name,
            appointment.scheduled_at.format("%Y-%m-%d %H:%M")
        ),
        NotificationKind::Scheduling,
    )
    .await;

    Ok((StatusCode::CREATED, api_success(appointment)))
}

/// List appointments ordered by time
#[utoipa::path(
    get,
    path = "/api/v1/appointments",
    tag = "appointments",
    params(AppointmentQuery, PaginationParams),
    responses(
        (status = 200, description = "Page of appointments", body = [Appointment]),
        (status = 400, description = "Invalid filter")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_appointments(
    State(server): State<VidaPlusServer>,
    _auth: AuthContext,
    Query(query): Query<AppointmentQuery>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<ApiResponse<Vec<Appointment>>> {
    let filter = query.into_filter()?;

    let mut conn = read_connection(&server.database).await?;
    let (appointments, total) = AppointmentRepository::new(&mut conn)
        .list(&filter, pagination.page())
        .await?;

    Ok(pagination.wrap_response(appointments, total))
}

/// Get an appointment by id
#[utoipa::path(
    get,
    path = "/api/v1/appointments/{id}",
    tag = "appointments",
    params(("id" = i64, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Appointment", body = Appointment),
        (status = 404, description = "Appointment not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_appointment(
    State(server): State<VidaPlusServer>,
    _auth: AuthContext,
    Path(id): Path<i64>,
) -> ApiResult<ApiResponse<Appointment>> {
    let mut conn = read_connection(&server.database).await?;
    AppointmentRepository::new(&mut conn)
        .find(id)
        .await?
        .map(api_success)
        .ok_or_else(|| ApiError::not_found("Appointment"))
}

/// Reschedule, change type or status, or annotate an appointment
#[utoipa::path(
    put,
    path = "/api/v1/appointments/{id}",
    tag = "appointments",
    params(("id" = i64, Path, description = "Appointment id")),
    request_body = UpdateAppointmentRequest,
    responses(
        (status = 200, description = "Updated appointment", body = Appointment),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Appointment not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_appointment(
    State(server): State<VidaPlusServer>,
    auth: AuthContext,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateAppointmentRequest>,
) -> ApiResult<ApiResponse<Appointment>> {
    let mut changes = payload.validate(Utc::now())?;

    let mut uow = UnitOfWork::begin(&server.database).await?;
    let mut appointments = AppointmentRepository::new(uow.conn());

    let before = appointments
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Appointment"))?;

    // switching to telemedicine opens a room if there is none yet
    if changes.appointment_type == Some(AppointmentType::Telemedicine)
        && before.telemedicine_link.is_none()
    {
        changes.telemedicine_link = Some(telemedicine_link());
    }

    appointments.update(id, &changes).await?;
    let after = appointments
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Appointment"))?;

    let mut entry = audit_entry(&auth, AuditAction::Update, APPOINTMENTS).record_id(id);
    if let Some(state) = snapshot(&before) {
        entry = entry.before(state);
    }
    if let Some(state) = snapshot(&after) {
        entry = entry.after(state);
    }
    uow.commit_audited(&server.audit, entry).await?;

    Ok(api_success(after))
}

/// Delete an appointment
#[utoipa::path(
    delete,
    path = "/api/v1/appointments/{id}",
    tag = "appointments",
    params(("id" = i64, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Appointment deleted", body = MessageResponse),
        (status = 404, description = "Appointment not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_appointment(
    State(server): State<VidaPlusServer>,
    auth: AuthContext,
    Path(id): Path<i64>,
) -> ApiResult<ApiResponse<MessageResponse>> {
    let mut uow = UnitOfWork::begin(&server.database).await?;
    let mut appointments = AppointmentRepository::new(uow.conn());

    let appointment = appointments
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Appointment"))?;
    appointments.delete(id).await?;

    let mut entry = audit_entry(&auth, AuditAction::Delete, APPOINTMENTS).record_id(id);
    if let Some(state) = snapshot(&appointment) {
        entry = entry.before(state);
    }
    uow.commit_audited(&server.audit, entry).await?;
    info!(appointment_id = id, "Appointment deleted");

    Ok(api_success(MessageResponse::new("Appointment deleted successfully")))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap()
    }

    fn request() -> CreateAppointmentRequest {
        CreateAppointmentRequest {
            patient_id: Some(1),
            professional_id: Some(2),
            facility_id: Some(3),
            scheduled_at: Some("2025-01-15T09:00:00".to_string()),
            appointment_type: Some("in_person".to_string()),
            notes: None,
        }
    }

    #[test]
    fn in_person_appointment_has_no_link() {
        let appointment = request().validate(now()).unwrap();
        assert_eq!(appointment.appointment_type, AppointmentType::InPerson);
        assert_eq!(appointment.telemedicine_link, None);
        assert_eq!(
            appointment.scheduled_at,
            Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap()
        );
    }

    #[test]
    fn telemedicine_appointment_gets_a_room() {
        let appointment = CreateAppointmentRequest {
            appointment_type: Some("telemedicine".to_string()),
            ..request()
        }
        .validate(now())
        .unwrap();
        assert!(appointment.telemedicine_link.is_some());
    }

    #[test]
    fn past_time_is_rejected() {
        let err = CreateAppointmentRequest {
            scheduled_at: Some("2025-01-09T09:00:00".to_string()),
            ..request()
        }
        .validate(now())
        .unwrap_err();
        assert_eq!(err.to_string(), "Appointment cannot be scheduled in the past");
    }

    #[test]
    fn missing_facility_is_named() {
        let err = CreateAppointmentRequest {
            facility_id: None,
            ..request()
        }
        .validate(now())
        .unwrap_err();
        assert_eq!(err.to_string(), "Field facility_id is required");
    }

    #[test]
    fn update_rejects_unknown_status() {
        let payload = UpdateAppointmentRequest {
            status: Some("done".to_string()),
            ..UpdateAppointmentRequest::default()
        };
        assert!(payload.validate(now()).is_err());

        let payload = UpdateAppointmentRequest {
            status: Some("completed".to_string()),
            ..UpdateAppointmentRequest::default()
        };
        assert_eq!(
            payload.validate(now()).unwrap().status,
            Some(AppointmentStatus::Completed)
        );
    }

    #[test]
    fn update_needs_at_least_one_field() {
        let payload: UpdateAppointmentRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(
            payload.validate(now()).unwrap_err().to_string(),
            "No data provided"
        );
    }

    #[test]
    fn null_notes_clear_the_field() {
        let payload: UpdateAppointmentRequest =
            serde_json::from_str(r#"{"notes": null}"#).unwrap();
        assert_eq!(payload.validate(now()).unwrap().notes, Some(None));

        let payload: UpdateAppointmentRequest =
            serde_json::from_str(r#"{"notes": " Bring exams "}"#).unwrap();
        assert_eq!(
            payload.validate(now()).unwrap().notes,
            Some(Some("Bring exams".to_string()))
        );
    }

    #[test]
    fn date_range_covers_whole_days() {
        let filter = AppointmentQuery {
            date_from: Some("2025-01-01".to_string()),
            date_to: Some("2025-01-31".to_string()),
            ..AppointmentQuery::default()
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.from, Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()));
        assert_eq!(filter.until, Some(Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 59).unwrap()));
    }
}
