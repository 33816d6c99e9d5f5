//! Check-in handlers: check in, check out, and the public activity feed.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{ActivityFeedItem, CheckIn, CheckInNote, CheckInRequest, Coordinates};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_value_error, out_of_range_error};

/// Check-in request body.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckInPayload {
    /// The venue to check into.
    pub hotspot_id: uuid::Uuid,
    /// Reported device latitude.
    pub latitude: f64,
    /// Reported device longitude.
    pub longitude: f64,
    /// Reported device accuracy in metres.
    pub accuracy_m: Option<f64>,
    /// Optional note, at most 150 characters after sanitisation.
    pub note: Option<String>,
    /// Feed visibility; defaults to public.
    pub is_public: Option<bool>,
}

/// Response for a successful check-in.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckInResponse {
    /// The recorded check-in.
    pub check_in: CheckIn,
    /// Measured distance to the venue in metres.
    pub distance_m: f64,
    /// Set when device accuracy was poor; the check-in still succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy_warning: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct FeedQuery {
    /// Maximum entries to return; clamped server-side.
    pub limit: Option<i64>,
}

/// Check into a hotspot.
///
/// Rejected when the reported position lies more than 100 m from the
/// venue or when the caller exceeds the check-in rate limit.
#[utoipa::path(
    post,
    path = "/api/v1/check-ins",
    request_body = CheckInPayload,
    responses(
        (status = 201, description = "Checked in", body = CheckInResponse),
        (status = 400, description = "Outside the geofence or invalid input", body = crate::inbound::http::error::ApiError),
        (status = 404, description = "Unknown hotspot", body = crate::inbound::http::error::ApiError),
        (status = 429, description = "Rate limited", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["check-ins"],
    operation_id = "check_in"
)]
#[post("/check-ins")]
pub async fn check_in(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CheckInPayload>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let payload = payload.into_inner();
    let position = Coordinates::new(payload.latitude, payload.longitude)
        .map_err(|error| out_of_range_error(FieldName::new("latitude"), error))?;
    let note = match payload.note.as_deref() {
        Some(raw) => CheckInNote::new(raw)
            .map_err(|error| invalid_value_error(FieldName::new("note"), error))?,
        None => None,
    };
    let outcome = state
        .check_ins
        .check_in(
            user_id,
            CheckInRequest {
                hotspot_id: payload.hotspot_id,
                position,
                accuracy_m: payload.accuracy_m,
                note,
                is_public: payload.is_public.unwrap_or(true),
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(CheckInResponse {
        check_in: outcome.check_in,
        distance_m: outcome.distance_m,
        accuracy_warning: outcome.accuracy_warning,
    }))
}

/// Check out of the current hotspot. A no-op when not checked in.
#[utoipa::path(
    post,
    path = "/api/v1/check-out",
    responses(
        (status = 204, description = "Checked out"),
        (status = 401, description = "Not logged in", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["check-ins"],
    operation_id = "check_out"
)]
#[post("/check-out")]
pub async fn check_out(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    state.check_ins.check_out(user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Recent public check-ins, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/activity-feed",
    params(FeedQuery),
    responses(
        (status = 200, description = "Activity feed", body = [ActivityFeedItem]),
        (status = 401, description = "Not logged in", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["check-ins"],
    operation_id = "activity_feed"
)]
#[get("/activity-feed")]
pub async fn activity_feed(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<FeedQuery>,
) -> ApiResult<web::Json<Vec<ActivityFeedItem>>> {
    session.require_user_id()?;
    let feed = state.check_ins.activity_feed(query.limit.unwrap_or(20)).await?;
    Ok(web::Json(feed))
}

#[cfg(test)]
#[path = "check_ins_tests.rs"]
mod tests;
