//! Friend request and friendship handlers.

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{FriendEntry, FriendRequest, FriendStatus};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Friend request body: who to befriend.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestPayload {
    /// The user to send the request to.
    pub user_id: uuid::Uuid,
}

/// Relationship between the caller and another user.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FriendStatusResponse {
    /// One of `none`, `sent`, `received`, or `friends`.
    pub status: FriendStatus,
}

/// Send a friend request.
#[utoipa::path(
    post,
    path = "/api/v1/friend-requests",
    request_body = FriendRequestPayload,
    responses(
        (status = 201, description = "Request sent", body = FriendRequest),
        (status = 400, description = "Already friends or already pending", body = crate::inbound::http::error::ApiError),
        (status = 404, description = "Unknown user", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["friends"],
    operation_id = "send_friend_request"
)]
#[post("/friend-requests")]
pub async fn send(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<FriendRequestPayload>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let request = state.friends.send_request(user_id, payload.user_id).await?;
    Ok(HttpResponse::Created().json(request))
}

/// Accept a pending request addressed to the caller.
#[utoipa::path(
    post,
    path = "/api/v1/friend-requests/{id}/accept",
    params(("id" = uuid::Uuid, Path, description = "Friend request id")),
    responses(
        (status = 204, description = "Request accepted"),
        (status = 403, description = "Not the receiver", body = crate::inbound::http::error::ApiError),
        (status = 404, description = "Unknown request", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["friends"],
    operation_id = "accept_friend_request"
)]
#[post("/friend-requests/{id}/accept")]
pub async fn accept(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<uuid::Uuid>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    state.friends.accept_request(path.into_inner(), user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Reject a pending request addressed to the caller.
#[utoipa::path(
    post,
    path = "/api/v1/friend-requests/{id}/reject",
    params(("id" = uuid::Uuid, Path, description = "Friend request id")),
    responses(
        (status = 204, description = "Request rejected"),
        (status = 403, description = "Not the receiver", body = crate::inbound::http::error::ApiError),
        (status = 404, description = "Unknown request", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["friends"],
    operation_id = "reject_friend_request"
)]
#[post("/friend-requests/{id}/reject")]
pub async fn reject(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<uuid::Uuid>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    state.friends.reject_request(path.into_inner(), user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Cancel a pending request the caller sent.
#[utoipa::path(
    delete,
    path = "/api/v1/friend-requests/{id}",
    params(("id" = uuid::Uuid, Path, description = "Friend request id")),
    responses(
        (status = 204, description = "Request cancelled"),
        (status = 403, description = "Not the sender", body = crate::inbound::http::error::ApiError),
        (status = 404, description = "Unknown request", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["friends"],
    operation_id = "cancel_friend_request"
)]
#[delete("/friend-requests/{id}")]
pub async fn cancel(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<uuid::Uuid>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    state.friends.cancel_request(path.into_inner(), user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// The caller's friends.
#[utoipa::path(
    get,
    path = "/api/v1/friends",
    responses(
        (status = 200, description = "Friend list", body = [FriendEntry]),
        (status = 401, description = "Not logged in", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["friends"],
    operation_id = "list_friends"
)]
#[get("/friends")]
pub async fn list(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<FriendEntry>>> {
    let user_id = session.require_user_id()?;
    Ok(web::Json(state.friends.list_friends(user_id).await?))
}

/// Dissolve a friendship the caller belongs to.
#[utoipa::path(
    delete,
    path = "/api/v1/friendships/{id}",
    params(("id" = uuid::Uuid, Path, description = "Friendship id")),
    responses(
        (status = 204, description = "Friendship removed"),
        (status = 403, description = "Not a member", body = crate::inbound::http::error::ApiError),
        (status = 404, description = "Unknown friendship", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["friends"],
    operation_id = "remove_friend"
)]
#[delete("/friendships/{id}")]
pub async fn remove(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<uuid::Uuid>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    state.friends.remove_friend(path.into_inner(), user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Relationship between the caller and another user.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/friend-status",
    params(("id" = uuid::Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "Relationship", body = FriendStatusResponse),
        (status = 401, description = "Not logged in", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["friends"],
    operation_id = "friend_status"
)]
#[get("/users/{id}/friend-status")]
pub async fn status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<uuid::Uuid>,
) -> ApiResult<web::Json<FriendStatusResponse>> {
    let user_id = session.require_user_id()?;
    let status = state.friends.friend_status(user_id, path.into_inner()).await?;
    Ok(web::Json(FriendStatusResponse { status }))
}

#[cfg(test)]
#[path = "friends_tests.rs"]
mod tests;
