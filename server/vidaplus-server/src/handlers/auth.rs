//! Login, registration and account endpoints

use audit_engine::{AuditAction, AuditEntry};
use axum::{extract::State, http::StatusCode, Json};
use database_layer::models::{NewUser, Patient, Professional, User, UserType};
use database_layer::repositories::{PatientRepository, ProfessionalRepository, UserRepository};
use database_layer::UnitOfWork;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

use crate::error::{api_success, ApiError, ApiResponse, ApiResult};
use crate::handlers::read_connection;
use crate::middleware::{AuthContext, RequestContext};
use crate::server::VidaPlusServer;
use crate::services::audit_entry;
use crate::validation::{required, validate_email, validate_password_strength};

const USERS: &str = "users";

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "admin@vidaplus.com")]
    pub email: Option<String>,
    #[schema(example = "Admin@123")]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: i64,
    pub user: User,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    /// admin, patient or professional; defaults to patient
    pub user_type: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient: Option<Patient>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub professional: Option<Professional>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Exchange credentials for an access token
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 400, description = "Missing credentials"),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account disabled")
    )
)]
pub async fn login(
    State(server): State<VidaPlusServer>,
    request: RequestContext,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<ApiResponse<LoginResponse>> {
    let (Ok(email), Ok(password)) = (
        required(&payload.email, "email"),
        required(&payload.password, "password"),
    ) else {
        return Err(ApiError::validation("Email and password are required"));
    };

    let mut uow = UnitOfWork::begin(&server.database).await?;
    let mut users = UserRepository::new(uow.conn());

    let Some(user) = users.find_by_email(email).await? else {
        return Err(ApiError::authentication("Invalid email or password"));
    };
    if !server.passwords.verify(password, &user.password_hash).await? {
        return Err(ApiError::authentication("Invalid email or password"));
    }
    if !user.active {
        return Err(ApiError::authorization(
            "Account is disabled. Contact the administrator.",
        ));
    }

    users.touch_last_access(user.id).await?;
    let user = users
        .find(user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    let entry = AuditEntry::new(user.id, AuditAction::Login, USERS)
        .record_id(user.id)
        .after(json!({ "last_access": user.last_access }))
        .origin(request.remote_addr.clone());
    uow.commit_audited(&server.audit, entry).await?;

    let access_token = server.tokens.issue(&user)?;
    info!(user_id = user.id, "User logged in");

    Ok(api_success(LoginResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: server.tokens.ttl_seconds(),
        user,
    }))
}

/// Create a login account
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn register(
    State(server): State<VidaPlusServer>,
    request: RequestContext,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, ApiResponse<User>)> {
    let (Ok(email), Ok(password)) = (
        required(&payload.email, "email"),
        required(&payload.password, "password"),
    ) else {
        return Err(ApiError::validation("Email and password are required"));
    };

    validate_email(email).into_result()?;
    validate_password_strength(password).into_result()?;

    let user_type = match payload.user_type.as_deref() {
        None => UserType::Patient,
        Some(tag) => tag
            .parse::<UserType>()
            .map_err(|()| ApiError::validation("Invalid user type"))?,
    };

    let mut uow = UnitOfWork::begin(&server.database).await?;
    let mut users = UserRepository::new(uow.conn());
    if users.email_exists(email).await? {
        return Err(ApiError::conflict("Email is already in use"));
    }

    let password_hash = server.passwords.hash(password).await?;
    let user = users
        .create(&NewUser {
            email: email.to_string(),
            password_hash,
            user_type,
        })
        .await?;

    let entry = AuditEntry::new(user.id, AuditAction::Register, USERS)
        .record_id(user.id)
        .after(json!({ "email": user.email, "user_type": user.user_type, "active": user.active }))
        .origin(request.remote_addr.clone());
    uow.commit_audited(&server.audit, entry).await?;

    info!(user_id = user.id, user_type = %user_type, "User registered");
    Ok((StatusCode::CREATED, api_success(user)))
}

/// Current user with its patient or professional profile
#[utoipa::path(
    get,
    path = "/api/v1/auth/profile",
    tag = "auth",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn profile(
    State(server): State<VidaPlusServer>,
    auth: AuthContext,
) -> ApiResult<ApiResponse<ProfileResponse>> {
    let mut conn = read_connection(&server.database).await?;

    let user = UserRepository::new(&mut conn)
        .find(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    let (patient, professional) = match auth.user_type {
        UserType::Patient => (PatientRepository::new(&mut conn).find_by_user(user.id).await?, None),
        UserType::Professional => (
            None,
            ProfessionalRepository::new(&mut conn).find_by_user(user.id).await?,
        ),
        UserType::Admin => (None, None),
    };

    Ok(api_success(ProfileResponse {
        user,
        patient,
        professional,
    }))
}

/// Change the caller's password
#[utoipa::path(
    put,
    path = "/api/v1/auth/password",
    tag = "auth",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Wrong current password")
    ),
    security(("bearer_auth" = []))
)]
pub async fn change_password(
    State(server): State<VidaPlusServer>,
    auth: AuthContext,
    Json(payload): Json<ChangePasswordRequest>,
) -> ApiResult<ApiResponse<MessageResponse>> {
    let (Ok(current), Ok(new_password)) = (
        required(&payload.current_password, "current_password"),
        required(&payload.new_password, "new_password"),
    ) else {
        return Err(ApiError::validation(
            "Current password and new password are required",
        ));
    };

    let mut uow = UnitOfWork::begin(&server.database).await?;
    let mut users = UserRepository::new(uow.conn());
    let user = users
        .find(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    if !server.passwords.verify(current, &user.password_hash).await? {
        return Err(ApiError::authentication("Current password is incorrect"));
    }
    validate_password_strength(new_password).into_result()?;

    let password_hash = server.passwords.hash(new_password).await?;
    users.update_password(user.id, &password_hash).await?;

    let masked = json!({ "password_hash": "***" });
    let entry = audit_entry(&auth, AuditAction::PasswordChange, USERS)
        .record_id(user.id)
        .before(masked.clone())
        .after(masked);
    uow.commit_audited(&server.audit, entry).await?;

    Ok(api_success(MessageResponse::new("Password changed successfully")))
}

/// Record the logout. Tokens are stateless; the client discards its own.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "auth",
    responses((status = 200, description = "Logged out", body = MessageResponse)),
    security(("bearer_auth" = []))
)]
pub async fn logout(
    State(server): State<VidaPlusServer>,
    auth: AuthContext,
) -> ApiResponse<MessageResponse> {
    server
        .audit
        .record(audit_entry(&auth, AuditAction::Logout, USERS).record_id(auth.user_id))
        .await;
    info!(user_id = auth.user_id, "User logged out");
    api_success(MessageResponse::new("Logged out successfully"))
}
