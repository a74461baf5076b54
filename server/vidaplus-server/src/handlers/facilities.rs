//! Facility endpoints

use audit_engine::AuditAction;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use database_layer::models::{Facility, FacilityChanges, NewFacility};
use database_layer::repositories::{FacilityFilter, FacilityRepository};
use database_layer::UnitOfWork;
use serde::Deserialize;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::error::{api_success, ApiError, ApiResponse, ApiResult};
use crate::handlers::read_connection;
use crate::middleware::AuthContext;
use crate::server::VidaPlusServer;
use crate::services::{audit_entry, snapshot};
use crate::types::PaginationParams;
use crate::validate_field;
use crate::validation::{
    format_cnpj, optional, require_changes, required, validate_cnpj, RequestValidation,
};

const FACILITIES: &str = "facilities";

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateFacilityRequest {
    #[schema(example = "VidaPlus Central Hospital")]
    pub name: Option<String>,
    #[schema(example = "hospital")]
    pub facility_type: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[schema(example = "12.345.678/0001-95")]
    pub cnpj: Option<String>,
}

impl CreateFacilityRequest {
    /// # Errors
    ///
    /// Returns the first failed check as a validation error.
    pub fn validate(self) -> ApiResult<NewFacility> {
        let name = required(&self.name, "name")?;
        let facility_type = required(&self.facility_type, "facility_type")?;
        let address = required(&self.address, "address")?;

        let cnpj = match optional(self.cnpj) {
            Some(cnpj) => {
                validate_cnpj(&cnpj).into_result()?;
                Some(format_cnpj(&cnpj).ok_or_else(|| ApiError::validation("CNPJ is invalid"))?)
            }
            None => None,
        };

        Ok(NewFacility {
            name: name.to_string(),
            facility_type: facility_type.to_string(),
            address: address.to_string(),
            phone: optional(self.phone),
            cnpj,
        })
    }
}

impl RequestValidation for FacilityChanges {
    fn validate(&self) -> ApiResult<()> {
        require_changes(self.is_empty())?;
        for (field, value) in [
            ("Name", &self.name),
            ("Facility type", &self.facility_type),
            ("Address", &self.address),
        ] {
            if let Some(text) = value {
                validate_field!(!text.trim().is_empty(), format!("{field} cannot be empty"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FacilityQuery {
    /// Case-insensitive partial match
    pub name: Option<String>,
    pub active: Option<bool>,
}

/// Register a facility
#[utoipa::path(
    post,
    path = "/api/v1/facilities",
    tag = "facilities",
    request_body = CreateFacilityRequest,
    responses(
        (status = 201, description = "Facility created", body = Facility),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "CNPJ already registered")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_facility(
    State(server): State<VidaPlusServer>,
    auth: AuthContext,
    Json(payload): Json<CreateFacilityRequest>,
) -> ApiResult<(StatusCode, ApiResponse<Facility>)> {
    let new_facility = payload.validate()?;

    let mut uow = UnitOfWork::begin(&server.database).await?;
    let mut facilities = FacilityRepository::new(uow.conn());

    if let Some(cnpj) = &new_facility.cnpj {
        if facilities.cnpj_exists(cnpj).await? {
            return Err(ApiError::conflict("CNPJ is already registered"));
        }
    }

    let id = facilities.create(&new_facility).await?;
    let facility = facilities
        .find(id)
        .await?
        .ok_or_else(|| ApiError::internal("Created facility could not be read back"))?;

    let mut entry = audit_entry(&auth, AuditAction::Create, FACILITIES).record_id(id);
    if let Some(after) = snapshot(&facility) {
        entry = entry.after(after);
    }
    uow.commit_audited(&server.audit, entry).await?;
    info!(facility_id = id, "Facility created");

    Ok((StatusCode::CREATED, api_success(facility)))
}

/// List facilities
#[utoipa::path(
    get,
    path = "/api/v1/facilities",
    tag = "facilities",
    params(FacilityQuery, PaginationParams),
    responses((status = 200, description = "Page of facilities ordered by name", body = [Facility])),
    security(("bearer_auth" = []))
)]
pub async fn list_facilities(
    State(server): State<VidaPlusServer>,
    _auth: AuthContext,
    Query(query): Query<FacilityQuery>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<ApiResponse<Vec<Facility>>> {
    let filter = FacilityFilter {
        name: optional(query.name),
        active: query.active,
    };

    let mut conn = read_connection(&server.database).await?;
    let (facilities, total) = FacilityRepository::new(&mut conn)
        .list(&filter, pagination.page())
        .await?;

    Ok(pagination.wrap_response(facilities, total))
}

/// Get a facility by id
#[utoipa::path(
    get,
    path = "/api/v1/facilities/{id}",
    tag = "facilities",
    params(("id" = i64, Path, description = "Facility id")),
    responses(
        (status = 200, description = "Facility", body = Facility),
        (status = 404, description = "Facility not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_facility(
    State(server): State<VidaPlusServer>,
    _auth: AuthContext,
    Path(id): Path<i64>,
) -> ApiResult<ApiResponse<Facility>> {
    let mut conn = read_connection(&server.database).await?;
    FacilityRepository::new(&mut conn)
        .find(id)
        .await?
        .map(api_success)
        .ok_or_else(|| ApiError::not_found("Facility"))
}

/// Update a facility
#[utoipa::path(
    put,
    path = "/api/v1/facilities/{id}",
    tag = "facilities",
    params(("id" = i64, Path, description = "Facility id")),
    request_body = FacilityChanges,
    responses(
        (status = 200, description = "Updated facility", body = Facility),
        (status = 404, description = "Facility not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_facility(
    State(server): State<VidaPlusServer>,
    auth: AuthContext,
    Path(id): Path<i64>,
    Json(changes): Json<FacilityChanges>,
) -> ApiResult<ApiResponse<Facility>> {
    changes.validate()?;

    let mut uow = UnitOfWork::begin(&server.database).await?;
    let mut facilities = FacilityRepository::new(uow.conn());

    let before = facilities
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Facility"))?;
    facilities.update(id, &changes).await?;
    let after = facilities
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Facility"))?;

    let mut entry = audit_entry(&auth, AuditAction::Update, FACILITIES).record_id(id);
    if let Some(state) = snapshot(&before) {
        entry = entry.before(state);
    }
    if let Some(state) = snapshot(&after) {
        entry = entry.after(state);
    }
    uow.commit_audited(&server.audit, entry).await?;

    Ok(api_success(after))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateFacilityRequest {
        CreateFacilityRequest {
            name: Some("Clínica Norte".to_string()),
            facility_type: Some("clinic".to_string()),
            address: Some("Rua A, 10".to_string()),
            phone: None,
            cnpj: Some("11222333000181".to_string()),
        }
    }

    #[test]
    fn cnpj_is_stored_formatted() {
        let facility = request().validate().unwrap();
        assert_eq!(facility.cnpj.as_deref(), Some("11.222.333/0001-81"));
    }

    #[test]
    fn cnpj_is_optional() {
        let facility = CreateFacilityRequest { cnpj: None, ..request() }.validate().unwrap();
        assert_eq!(facility.cnpj, None);
    }

    #[test]
    fn bad_cnpj_check_digit_is_rejected() {
        let err = CreateFacilityRequest {
            cnpj: Some("12.345.678/0001-90".to_string()),
            ..request()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.to_string(), "CNPJ is invalid");
    }

    #[test]
    fn blank_name_change_is_rejected() {
        let changes = FacilityChanges {
            name: Some(String::new()),
            ..FacilityChanges::default()
        };
        assert_eq!(changes.validate().unwrap_err().to_string(), "Name cannot be empty");
    }

    #[test]
    fn deactivation_alone_is_a_change() {
        let changes = FacilityChanges {
            active: Some(false),
            ..FacilityChanges::default()
        };
        assert!(changes.validate().is_ok());
        assert!(FacilityChanges::default().validate().is_err());
    }
}
