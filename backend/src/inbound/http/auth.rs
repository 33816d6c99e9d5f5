//! Authentication handlers.
//!
//! ```text
//! POST /api/v1/login {"username":"ada"}
//! POST /api/v1/logout
//! GET  /api/v1/me
//! ```
//!
//! Login is by username alone: first sight of a username creates its
//! profile. The configured admin username receives the admin session
//! flag, which gates the hotspot catalogue mutations.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{CheckIn, Profile};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /api/v1/login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Username to log in as; created on first sight.
    pub username: String,
}

/// Session description returned by login and `GET /me`.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// The authenticated user's profile.
    pub profile: Profile,
    /// Whether the session carries the admin flag.
    pub is_admin: bool,
    /// The user's active check-in, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_check_in: Option<CheckIn>,
    /// Check-ins the user has recorded since UTC midnight.
    pub today_check_ins: u64,
}

/// Log in by username and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = SessionResponse),
        (status = 400, description = "Invalid request", body = crate::inbound::http::error::ApiError),
        (status = 503, description = "Service unavailable", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<SessionResponse>> {
    let profile = state.profiles.login(&payload.username).await?;
    let is_admin = profile
        .username
        .as_deref()
        .is_some_and(|name| name == state.admin_username);
    session.persist_user(profile.id, is_admin)?;
    let today_check_ins = state.check_ins.today_count(profile.id).await?;
    Ok(web::Json(SessionResponse {
        profile,
        is_admin,
        current_check_in: None,
        today_check_ins,
    }))
}

/// Drop the session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Logged out")),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// Describe the current session.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Session description", body = SessionResponse),
        (status = 401, description = "Not logged in", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["auth"],
    operation_id = "me"
)]
#[get("/me")]
pub async fn me(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<SessionResponse>> {
    let user_id = session.require_user_id()?;
    let profile = state.profiles.get(user_id).await?;
    let current_check_in = state.check_ins.current(user_id).await?;
    let today_check_ins = state.check_ins.today_count(user_id).await?;
    Ok(web::Json(SessionResponse {
        profile,
        is_admin: session.is_admin()?,
        current_check_in,
        today_check_ins,
    }))
}
