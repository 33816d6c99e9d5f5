//! OpenAPI documentation configuration.
//!
//! Defines [`ApiDoc`], the generated specification for the REST API:
//! every inbound HTTP path, the request and response schemas they use,
//! and the session cookie security scheme. Swagger UI serves the
//! document in debug builds at `/docs`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    ActiveVisitor, ActivityFeedItem, Category, CheckIn, CompanionType, Coordinates, ErrorCode,
    FriendEntry, FriendRequest, FriendRequestStatus, FriendStatus, GeneratedItinerary, Hotspot,
    Notification, NotificationKind, Profile, Rating, RatingSummary, ReviewEntry, Score,
    TrendingHotspot,
};
use crate::inbound::http::auth::{LoginRequest, SessionResponse};
use crate::inbound::http::check_ins::{CheckInPayload, CheckInResponse};
use crate::inbound::http::error::ApiError;
use crate::inbound::http::friends::{FriendRequestPayload, FriendStatusResponse};
use crate::inbound::http::hotspots::{HotspotDetail, HotspotListItem, HotspotPayload};
use crate::inbound::http::itinerary::ItineraryPayload;
use crate::inbound::http::notifications::{
    MarkReadPayload, MarkReadResponse, NotificationsResponse,
};
use crate::inbound::http::profiles::ProfilePayload;
use crate::inbound::http::ratings::{RatingPayload, ReviewsResponse};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "VV Hotspots backend API",
        description = "Geofenced check-ins, hotspot ratings, friends, and AI day itineraries for Vasai-Virar."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::me,
        crate::inbound::http::hotspots::list,
        crate::inbound::http::hotspots::trending,
        crate::inbound::http::hotspots::get,
        crate::inbound::http::hotspots::create,
        crate::inbound::http::hotspots::update,
        crate::inbound::http::hotspots::delete,
        crate::inbound::http::hotspots::save,
        crate::inbound::http::hotspots::unsave,
        crate::inbound::http::hotspots::list_saved,
        crate::inbound::http::check_ins::check_in,
        crate::inbound::http::check_ins::check_out,
        crate::inbound::http::check_ins::activity_feed,
        crate::inbound::http::ratings::rate,
        crate::inbound::http::ratings::reviews,
        crate::inbound::http::friends::send,
        crate::inbound::http::friends::accept,
        crate::inbound::http::friends::reject,
        crate::inbound::http::friends::cancel,
        crate::inbound::http::friends::list,
        crate::inbound::http::friends::remove,
        crate::inbound::http::friends::status,
        crate::inbound::http::profiles::get,
        crate::inbound::http::profiles::get_user,
        crate::inbound::http::profiles::update,
        crate::inbound::http::notifications::list,
        crate::inbound::http::notifications::mark_read,
        crate::inbound::http::itinerary::generate,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ApiError,
        ErrorCode,
        Coordinates,
        Category,
        Hotspot,
        TrendingHotspot,
        ActiveVisitor,
        ActivityFeedItem,
        CheckIn,
        Score,
        Rating,
        RatingSummary,
        ReviewEntry,
        FriendRequest,
        FriendRequestStatus,
        FriendStatus,
        FriendEntry,
        Notification,
        NotificationKind,
        Profile,
        CompanionType,
        GeneratedItinerary,
        LoginRequest,
        SessionResponse,
        HotspotListItem,
        HotspotDetail,
        HotspotPayload,
        CheckInPayload,
        CheckInResponse,
        RatingPayload,
        ReviewsResponse,
        FriendRequestPayload,
        FriendStatusResponse,
        ProfilePayload,
        NotificationsResponse,
        MarkReadPayload,
        MarkReadResponse,
        ItineraryPayload,
    )),
    tags(
        (name = "auth", description = "Login, logout, and session inspection"),
        (name = "hotspots", description = "Hotspot catalogue and saved lists"),
        (name = "check-ins", description = "Check-in lifecycle and the activity feed"),
        (name = "ratings", description = "Ratings and reviews"),
        (name = "friends", description = "Friend requests and friendships"),
        (name = "profiles", description = "User profiles"),
        (name = "notifications", description = "Notification inbox"),
        (name = "itinerary", description = "AI day planner"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
