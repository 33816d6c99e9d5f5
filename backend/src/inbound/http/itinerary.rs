//! AI day-planner handler.

use actix_web::{post, web};
use serde::Deserialize;

use crate::domain::itinerary::ItineraryValidationError;
use crate::domain::{CompanionType, GeneratedItinerary, ItineraryRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_value_error, out_of_range_error};

/// Itinerary generation request body.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryPayload {
    /// Trip length in hours, between 1 and 12.
    pub time_available: u8,
    /// Who the caller is travelling with.
    pub companion_type: CompanionType,
    /// Where the trip starts, at most 100 characters.
    pub start_location: String,
}

/// Generate a day plan. Limited to three generations per UTC day.
#[utoipa::path(
    post,
    path = "/api/v1/itinerary",
    request_body = ItineraryPayload,
    responses(
        (status = 200, description = "Generated plan", body = GeneratedItinerary),
        (status = 400, description = "Invalid request", body = crate::inbound::http::error::ApiError),
        (status = 429, description = "Daily limit reached", body = crate::inbound::http::error::ApiError),
        (status = 503, description = "Planner unavailable or busy", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["itinerary"],
    operation_id = "generate_itinerary"
)]
#[post("/itinerary")]
pub async fn generate(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ItineraryPayload>,
) -> ApiResult<web::Json<GeneratedItinerary>> {
    let user_id = session.require_user_id()?;
    let payload = payload.into_inner();
    let request = ItineraryRequest::new(
        payload.time_available,
        payload.companion_type,
        &payload.start_location,
    )
    .map_err(|error| match error {
        ItineraryValidationError::HoursOutOfRange => {
            out_of_range_error(FieldName::new("timeAvailable"), error)
        }
        ItineraryValidationError::EmptyStartLocation
        | ItineraryValidationError::StartLocationTooLong => {
            invalid_value_error(FieldName::new("startLocation"), error)
        }
    })?;
    let generated = state.itineraries.generate(user_id, &request).await?;
    Ok(web::Json(generated))
}

#[cfg(test)]
#[path = "itinerary_tests.rs"]
mod tests;
