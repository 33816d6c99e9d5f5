//! Notification handlers.

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::Notification;
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Listing of the caller's notifications with the unread total.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsResponse {
    /// Notifications, newest first.
    pub notifications: Vec<Notification>,
    /// Unread rows across the whole inbox, not just this page.
    pub unread_count: i64,
}

/// Mark-read request body.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadPayload {
    /// Notification ids to mark read; omit to mark everything.
    pub ids: Option<Vec<uuid::Uuid>>,
}

/// How many rows a mark-read call changed.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadResponse {
    /// Rows updated.
    pub updated: u64,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct NotificationsQuery {
    /// Maximum entries to return; clamped server-side.
    pub limit: Option<i64>,
}

/// The caller's notifications, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    params(NotificationsQuery),
    responses(
        (status = 200, description = "Notification inbox", body = NotificationsResponse),
        (status = 401, description = "Not logged in", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["notifications"],
    operation_id = "list_notifications"
)]
#[get("/notifications")]
pub async fn list(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<NotificationsQuery>,
) -> ApiResult<web::Json<NotificationsResponse>> {
    let user_id = session.require_user_id()?;
    let notifications = state
        .notifications
        .list(user_id, query.limit.unwrap_or(50))
        .await?;
    let unread_count = state.notifications.unread_count(user_id).await?;
    Ok(web::Json(NotificationsResponse {
        notifications,
        unread_count,
    }))
}

/// Mark notifications read; rows belonging to other users are untouched.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/mark-read",
    request_body = MarkReadPayload,
    responses(
        (status = 200, description = "Rows updated", body = MarkReadResponse),
        (status = 401, description = "Not logged in", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["notifications"],
    operation_id = "mark_notifications_read"
)]
#[post("/notifications/mark-read")]
pub async fn mark_read(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<MarkReadPayload>,
) -> ApiResult<web::Json<MarkReadResponse>> {
    let user_id = session.require_user_id()?;
    let updated = state
        .notifications
        .mark_read(user_id, payload.into_inner().ids)
        .await?;
    Ok(web::Json(MarkReadResponse { updated }))
}

#[cfg(test)]
#[path = "notifications_tests.rs"]
mod tests;
