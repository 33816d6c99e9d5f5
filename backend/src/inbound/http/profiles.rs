//! Profile handlers: read and update the caller's own profile.

use actix_web::{get, put, web};
use serde::Deserialize;

use crate::domain::{Profile, ProfileUpdate};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_value_error};

/// Profile update body. Omitted fields are left untouched.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePayload {
    /// New username, sanitised to `[A-Za-z0-9_-]`.
    pub username: Option<String>,
    /// New avatar URL; must be https.
    pub avatar_url: Option<String>,
    /// New bio.
    pub bio: Option<String>,
    /// New home city.
    pub city: Option<String>,
    /// New Instagram handle.
    pub instagram_username: Option<String>,
    /// New Twitter handle.
    pub twitter_username: Option<String>,
}

/// The caller's profile.
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Own profile", body = Profile),
        (status = 401, description = "Not logged in", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["profiles"],
    operation_id = "get_profile"
)]
#[get("/profile")]
pub async fn get(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Profile>> {
    let user_id = session.require_user_id()?;
    Ok(web::Json(state.profiles.get(user_id).await?))
}

/// Another user's public profile.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/profile",
    params(("id" = uuid::Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "Public profile", body = Profile),
        (status = 404, description = "Unknown user", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["profiles"],
    operation_id = "get_user_profile"
)]
#[get("/users/{id}/profile")]
pub async fn get_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<uuid::Uuid>,
) -> ApiResult<web::Json<Profile>> {
    session.require_user_id()?;
    Ok(web::Json(state.profiles.get(path.into_inner()).await?))
}

/// Update the caller's profile.
#[utoipa::path(
    put,
    path = "/api/v1/profile",
    request_body = ProfilePayload,
    responses(
        (status = 200, description = "Profile updated", body = Profile),
        (status = 400, description = "Invalid or taken username", body = crate::inbound::http::error::ApiError),
        (status = 429, description = "Rate limited", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["profiles"],
    operation_id = "update_profile"
)]
#[put("/profile")]
pub async fn update(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ProfilePayload>,
) -> ApiResult<web::Json<Profile>> {
    let user_id = session.require_user_id()?;
    let payload = payload.into_inner();
    let update = ProfileUpdate::from_raw(
        payload.username.as_deref(),
        payload.avatar_url.as_deref(),
        payload.bio.as_deref(),
        payload.city.as_deref(),
        payload.instagram_username.as_deref(),
        payload.twitter_username.as_deref(),
    )
    .map_err(|error| invalid_value_error(FieldName::new("username"), error))?;
    Ok(web::Json(state.profiles.update(user_id, update).await?))
}

#[cfg(test)]
#[path = "profiles_tests.rs"]
mod tests;
