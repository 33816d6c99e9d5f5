//! Hotspot catalogue handlers, including the admin mutations and the
//! per-user saved list.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::{
    ActiveVisitor, Category, Coordinates, Hotspot, HotspotDraft, Rating, RatingSummary,
    TrendingHotspot,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_value_error, out_of_range_error};

/// A catalogue entry together with its live visitor count.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HotspotListItem {
    /// The venue.
    pub hotspot: Hotspot,
    /// Users checked in right now, from the live projection.
    pub active_visitors: u32,
}

/// Everything the hotspot detail page needs in one response.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HotspotDetail {
    /// The venue.
    pub hotspot: Hotspot,
    /// Users checked in right now.
    pub visitors: Vec<ActiveVisitor>,
    /// Aggregate rating figures.
    pub rating: RatingSummary,
    /// The caller's own rating, if they have one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub own_rating: Option<Rating>,
    /// Whether the caller has saved this hotspot.
    pub is_saved: bool,
}

/// Create or replace payload for a hotspot.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HotspotPayload {
    /// Display name.
    pub name: String,
    /// Venue category.
    pub category: Category,
    /// Street address.
    pub address: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Optional description.
    pub description: Option<String>,
    /// Optional image URL.
    pub image_url: Option<String>,
}

impl HotspotPayload {
    fn into_draft(self) -> Result<HotspotDraft, crate::domain::Error> {
        let position = Coordinates::new(self.latitude, self.longitude)
            .map_err(|error| out_of_range_error(FieldName::new("latitude"), error))?;
        HotspotDraft::new(
            self.name,
            self.category,
            self.address,
            position,
            self.description,
            self.image_url,
        )
        .map_err(|error| invalid_value_error(FieldName::new("name"), error))
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct TrendingQuery {
    /// Maximum entries to return; clamped server-side.
    pub limit: Option<i64>,
}

/// List the catalogue with live visitor counts.
#[utoipa::path(
    get,
    path = "/api/v1/hotspots",
    responses(
        (status = 200, description = "Catalogue listing", body = [HotspotListItem]),
        (status = 401, description = "Not logged in", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["hotspots"],
    operation_id = "list_hotspots"
)]
#[get("/hotspots")]
pub async fn list(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<HotspotListItem>>> {
    session.require_user_id()?;
    let hotspots = state.hotspots.list().await?;
    let counts = state.check_ins.visitor_counts();
    let items = hotspots
        .into_iter()
        .map(|hotspot| {
            let active_visitors = counts.get(&hotspot.id).copied().unwrap_or(0);
            HotspotListItem {
                hotspot,
                active_visitors,
            }
        })
        .collect();
    Ok(web::Json(items))
}

/// Hotspots ranked by check-ins over the last day.
#[utoipa::path(
    get,
    path = "/api/v1/hotspots/trending",
    params(TrendingQuery),
    responses(
        (status = 200, description = "Trending venues", body = [TrendingHotspot]),
        (status = 401, description = "Not logged in", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["hotspots"],
    operation_id = "trending_hotspots"
)]
#[get("/hotspots/trending")]
pub async fn trending(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<TrendingQuery>,
) -> ApiResult<web::Json<Vec<TrendingHotspot>>> {
    session.require_user_id()?;
    let ranked = state.hotspots.trending(query.limit.unwrap_or(10)).await?;
    Ok(web::Json(ranked))
}

/// Fetch one hotspot with visitors, ratings, and the caller's state.
#[utoipa::path(
    get,
    path = "/api/v1/hotspots/{id}",
    params(("id" = uuid::Uuid, Path, description = "Hotspot id")),
    responses(
        (status = 200, description = "Hotspot detail", body = HotspotDetail),
        (status = 404, description = "Unknown hotspot", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["hotspots"],
    operation_id = "get_hotspot"
)]
#[get("/hotspots/{id}")]
pub async fn get(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<uuid::Uuid>,
) -> ApiResult<web::Json<HotspotDetail>> {
    let user_id = session.require_user_id()?;
    let hotspot_id = path.into_inner();
    let hotspot = state.hotspots.get(hotspot_id).await?;
    let visitors = state.check_ins.active_visitors(hotspot_id).await?;
    let rating = state.ratings.summary(hotspot_id).await?;
    let own_rating = state.ratings.own_rating(user_id, hotspot_id).await?;
    let is_saved = state.hotspots.is_saved(user_id, hotspot_id).await?;
    Ok(web::Json(HotspotDetail {
        hotspot,
        visitors,
        rating,
        own_rating,
        is_saved,
    }))
}

/// Add a hotspot to the catalogue. Admin only.
#[utoipa::path(
    post,
    path = "/api/v1/hotspots",
    request_body = HotspotPayload,
    responses(
        (status = 201, description = "Hotspot created", body = Hotspot),
        (status = 403, description = "Admin access required", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["hotspots"],
    operation_id = "create_hotspot"
)]
#[post("/hotspots")]
pub async fn create(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<HotspotPayload>,
) -> ApiResult<HttpResponse> {
    session.require_admin()?;
    let draft = payload.into_inner().into_draft()?;
    let hotspot = state.hotspots.create(draft).await?;
    Ok(HttpResponse::Created().json(hotspot))
}

/// Replace a hotspot's editable fields. Admin only.
#[utoipa::path(
    put,
    path = "/api/v1/hotspots/{id}",
    params(("id" = uuid::Uuid, Path, description = "Hotspot id")),
    request_body = HotspotPayload,
    responses(
        (status = 200, description = "Hotspot updated", body = Hotspot),
        (status = 403, description = "Admin access required", body = crate::inbound::http::error::ApiError),
        (status = 404, description = "Unknown hotspot", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["hotspots"],
    operation_id = "update_hotspot"
)]
#[put("/hotspots/{id}")]
pub async fn update(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<uuid::Uuid>,
    payload: web::Json<HotspotPayload>,
) -> ApiResult<web::Json<Hotspot>> {
    session.require_admin()?;
    let draft = payload.into_inner().into_draft()?;
    let hotspot = state.hotspots.update(path.into_inner(), draft).await?;
    Ok(web::Json(hotspot))
}

/// Remove a hotspot from the catalogue. Admin only.
#[utoipa::path(
    delete,
    path = "/api/v1/hotspots/{id}",
    params(("id" = uuid::Uuid, Path, description = "Hotspot id")),
    responses(
        (status = 204, description = "Hotspot deleted"),
        (status = 403, description = "Admin access required", body = crate::inbound::http::error::ApiError),
        (status = 404, description = "Unknown hotspot", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["hotspots"],
    operation_id = "delete_hotspot"
)]
#[delete("/hotspots/{id}")]
pub async fn delete(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<uuid::Uuid>,
) -> ApiResult<HttpResponse> {
    session.require_admin()?;
    state.hotspots.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Save a hotspot to the caller's list. Idempotent.
#[utoipa::path(
    put,
    path = "/api/v1/hotspots/{id}/saved",
    params(("id" = uuid::Uuid, Path, description = "Hotspot id")),
    responses(
        (status = 204, description = "Hotspot saved"),
        (status = 404, description = "Unknown hotspot", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["hotspots"],
    operation_id = "save_hotspot"
)]
#[put("/hotspots/{id}/saved")]
pub async fn save(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<uuid::Uuid>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    state.hotspots.save(user_id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Drop a hotspot from the caller's list. Idempotent.
#[utoipa::path(
    delete,
    path = "/api/v1/hotspots/{id}/saved",
    params(("id" = uuid::Uuid, Path, description = "Hotspot id")),
    responses((status = 204, description = "Hotspot unsaved")),
    tags = ["hotspots"],
    operation_id = "unsave_hotspot"
)]
#[delete("/hotspots/{id}/saved")]
pub async fn unsave(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<uuid::Uuid>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    state.hotspots.unsave(user_id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// The caller's saved hotspots.
#[utoipa::path(
    get,
    path = "/api/v1/saved-hotspots",
    responses(
        (status = 200, description = "Saved hotspots", body = [Hotspot]),
        (status = 401, description = "Not logged in", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["hotspots"],
    operation_id = "list_saved_hotspots"
)]
#[get("/saved-hotspots")]
pub async fn list_saved(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Hotspot>>> {
    let user_id = session.require_user_id()?;
    Ok(web::Json(state.hotspots.list_saved(user_id).await?))
}

#[cfg(test)]
#[path = "hotspots_tests.rs"]
mod tests;
