//! Shared HTTP adapter state.
//!
//! Handlers accept this bundle via `actix_web::web::Data`, so they depend
//! only on domain services and stay testable without a database.

use std::sync::Arc;

use crate::domain::{
    CheckInService, FriendService, HotspotService, ItineraryService, NotificationService,
    ProfileService, RatingService,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Check-in lifecycle and feeds.
    pub check_ins: Arc<CheckInService>,
    /// Hotspot catalogue and saved lists.
    pub hotspots: Arc<HotspotService>,
    /// Ratings and reviews.
    pub ratings: Arc<RatingService>,
    /// Friend requests and friendships.
    pub friends: Arc<FriendService>,
    /// Profiles and login.
    pub profiles: Arc<ProfileService>,
    /// Notification listings.
    pub notifications: Arc<NotificationService>,
    /// AI day planner.
    pub itineraries: Arc<ItineraryService>,
    /// Username granted the admin flag at login.
    pub admin_username: String,
}
