//! The caller's own notifications

use axum::extract::{Path, Query, State};
use database_layer::models::Notification;
use database_layer::repositories::NotificationRepository;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::{api_success, ApiError, ApiResponse, ApiResult};
use crate::handlers::read_connection;
use crate::middleware::AuthContext;
use crate::server::VidaPlusServer;
use crate::types::PaginationParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NotificationQuery {
    /// Only notifications not yet read
    #[serde(default)]
    pub unread_only: bool,
}

/// List the caller's notifications, newest first
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    tag = "notifications",
    params(NotificationQuery, PaginationParams),
    responses((status = 200, description = "Page of notifications", body = [Notification])),
    security(("bearer_auth" = []))
)]
pub async fn list_notifications(
    State(server): State<VidaPlusServer>,
    auth: AuthContext,
    Query(query): Query<NotificationQuery>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<ApiResponse<Vec<Notification>>> {
    let mut conn = read_connection(&server.database).await?;
    let (notifications, total) = NotificationRepository::new(&mut conn)
        .list_for_user(auth.user_id, query.unread_only, pagination.page())
        .await?;

    Ok(pagination.wrap_response(notifications, total))
}

/// Mark one of the caller's notifications as read
#[utoipa::path(
    put,
    path = "/api/v1/notifications/{id}/read",
    tag = "notifications",
    params(("id" = i64, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification marked read", body = Notification),
        (status = 404, description = "No such notification for this user")
    ),
    security(("bearer_auth" = []))
)]
pub async fn mark_notification_read(
    State(server): State<VidaPlusServer>,
    auth: AuthContext,
    Path(id): Path<i64>,
) -> ApiResult<ApiResponse<Notification>> {
    let mut conn = read_connection(&server.database).await?;
    NotificationRepository::new(&mut conn)
        .mark_read(id, auth.user_id)
        .await?
        .map(api_success)
        .ok_or_else(|| ApiError::not_found("Notification"))
}
