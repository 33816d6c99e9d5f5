//! Rating and review handlers.

use actix_web::{get, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Rating, RatingSummary, ReviewEntry, Score};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, out_of_range_error};

/// Rating upsert body.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingPayload {
    /// Star score between 1 and 5.
    pub score: i16,
    /// Optional review text.
    pub review: Option<String>,
}

/// Reviews for a hotspot together with the aggregate figures.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewsResponse {
    /// Individual reviews, newest first.
    pub reviews: Vec<ReviewEntry>,
    /// Count and display average.
    pub summary: RatingSummary,
}

/// Create or replace the caller's rating for a hotspot.
#[utoipa::path(
    put,
    path = "/api/v1/hotspots/{id}/rating",
    params(("id" = uuid::Uuid, Path, description = "Hotspot id")),
    request_body = RatingPayload,
    responses(
        (status = 200, description = "Rating recorded", body = Rating),
        (status = 400, description = "Score out of range", body = crate::inbound::http::error::ApiError),
        (status = 404, description = "Unknown hotspot", body = crate::inbound::http::error::ApiError),
        (status = 429, description = "Rate limited", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["ratings"],
    operation_id = "rate_hotspot"
)]
#[put("/hotspots/{id}/rating")]
pub async fn rate(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<uuid::Uuid>,
    payload: web::Json<RatingPayload>,
) -> ApiResult<web::Json<Rating>> {
    let user_id = session.require_user_id()?;
    let score = Score::new(payload.score)
        .map_err(|error| out_of_range_error(FieldName::new("score"), error))?;
    let rating = state
        .ratings
        .rate(user_id, path.into_inner(), score, payload.review.as_deref())
        .await?;
    Ok(web::Json(rating))
}

/// Reviews for a hotspot, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/hotspots/{id}/reviews",
    params(("id" = uuid::Uuid, Path, description = "Hotspot id")),
    responses(
        (status = 200, description = "Reviews and summary", body = ReviewsResponse),
        (status = 401, description = "Not logged in", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["ratings"],
    operation_id = "hotspot_reviews"
)]
#[get("/hotspots/{id}/reviews")]
pub async fn reviews(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<uuid::Uuid>,
) -> ApiResult<web::Json<ReviewsResponse>> {
    session.require_user_id()?;
    let hotspot_id = path.into_inner();
    let reviews = state.ratings.reviews(hotspot_id).await?;
    let summary = state.ratings.summary(hotspot_id).await?;
    Ok(web::Json(ReviewsResponse { reviews, summary }))
}

#[cfg(test)]
#[path = "ratings_tests.rs"]
mod tests;
