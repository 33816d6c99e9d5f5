//! Domain types, invariants, and services.
//!
//! Purpose: Define strongly typed entities for hotspots, check-ins,
//! ratings, friendships, profiles, notifications, and itineraries, plus
//! the services that drive them. Types stay immutable where practical and
//! document their invariants and serde contracts in each type's Rustdoc.
//! Adapters interact with the domain only through the traits in
//! [`ports`].

pub mod check_in;
pub mod check_in_service;
pub mod error;
pub mod friend_service;
pub mod friends;
pub mod geo;
pub mod hotspot;
pub mod hotspot_service;
pub mod itinerary;
pub mod itinerary_service;
pub mod live_state;
pub mod notification;
pub mod notification_service;
pub mod ports;
pub mod profile;
pub mod profile_service;
pub mod rate_limit;
pub mod rating;
pub mod rating_service;
pub mod sanitize;

pub use self::check_in::{ActiveVisitor, ActivityFeedItem, CheckIn, CheckInNote, NewCheckIn};
pub use self::check_in_service::{CheckInOutcome, CheckInRequest, CheckInService};
pub use self::error::{Error, ErrorCode};
pub use self::friend_service::FriendService;
pub use self::friends::{FriendEntry, FriendRequest, FriendRequestStatus, FriendStatus, Friendship};
pub use self::geo::{Coordinates, GEOFENCE_RADIUS_M};
pub use self::hotspot::{Category, Hotspot, HotspotDraft, TrendingHotspot};
pub use self::hotspot_service::HotspotService;
pub use self::itinerary::{
    CompanionType, GeneratedItinerary, ItineraryRequest, MAX_DAILY_ITINERARIES,
};
pub use self::itinerary_service::ItineraryService;
pub use self::notification::{NewNotification, Notification, NotificationKind};
pub use self::notification_service::NotificationService;
pub use self::profile::{Profile, ProfileUpdate};
pub use self::profile_service::ProfileService;
pub use self::rate_limit::{RateLimitAction, RateLimitDecision, RateLimiter};
pub use self::rating::{NewRating, Rating, RatingSummary, ReviewEntry, Score};
pub use self::rating_service::RatingService;

/// Convenient API result alias.
pub type ApiResult<T> = Result<T, Error>;
