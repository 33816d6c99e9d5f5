//! Test helpers for inbound HTTP components.
//!
//! Handler tests run the full service stack over the in-memory adapters,
//! so requests exercise validation, sessions, and domain rules without a
//! database.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::{test as actix_test, web};
use async_trait::async_trait;
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{ItineraryGenerationError, ItineraryGenerator};
use crate::domain::{
    CheckInService, FriendService, HotspotService, ItineraryService, NotificationService,
    ProfileService, RateLimiter, RatingService,
};
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::{
    MemoryCheckInRepository, MemoryFriendRepository, MemoryHotspotRepository,
    MemoryNotificationRepository, MemoryProfileRepository, MemoryRatingRepository,
    MemorySavedHotspotRepository, MemoryStore,
};

/// Username that receives the admin flag in handler tests.
pub const TEST_ADMIN: &str = "admin";

/// Build a session middleware configured for tests.
///
/// Generates a fresh signing key per invocation, names the cookie
/// `session`, and disables the `Secure` flag for plain-HTTP test calls.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Itinerary generator returning a canned plan.
pub struct FixedItineraryGenerator(pub String);

#[async_trait]
impl ItineraryGenerator for FixedItineraryGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, ItineraryGenerationError> {
        Ok(self.0.clone())
    }
}

/// Build handler state over a fresh in-memory store.
pub fn test_state() -> web::Data<HttpState> {
    test_state_with_generator(Arc::new(FixedItineraryGenerator(
        "10:00 chai at the bandstand".to_owned(),
    )))
}

/// Build handler state with an explicit itinerary generator.
pub fn test_state_with_generator(generator: Arc<dyn ItineraryGenerator>) -> web::Data<HttpState> {
    let store = MemoryStore::new();
    let check_in_repo = Arc::new(MemoryCheckInRepository(store.clone()));
    let hotspot_repo = Arc::new(MemoryHotspotRepository(store.clone()));
    let rating_repo = Arc::new(MemoryRatingRepository(store.clone()));
    let friend_repo = Arc::new(MemoryFriendRepository(store.clone()));
    let profile_repo = Arc::new(MemoryProfileRepository(store.clone()));
    let saved_repo = Arc::new(MemorySavedHotspotRepository(store.clone()));
    let notification_repo = Arc::new(MemoryNotificationRepository(store));

    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let rate_limiter = Arc::new(RateLimiter::new(clock.clone()));

    web::Data::new(HttpState {
        check_ins: Arc::new(CheckInService::new(
            check_in_repo,
            hotspot_repo.clone(),
            friend_repo.clone(),
            notification_repo.clone(),
            profile_repo.clone(),
            rate_limiter.clone(),
            clock.clone(),
        )),
        hotspots: Arc::new(HotspotService::new(
            hotspot_repo.clone(),
            saved_repo,
            clock.clone(),
        )),
        ratings: Arc::new(RatingService::new(
            rating_repo,
            hotspot_repo,
            rate_limiter.clone(),
        )),
        friends: Arc::new(FriendService::new(
            friend_repo,
            profile_repo.clone(),
            notification_repo.clone(),
            clock.clone(),
        )),
        profiles: Arc::new(ProfileService::new(profile_repo, rate_limiter, clock.clone())),
        notifications: Arc::new(NotificationService::new(notification_repo)),
        itineraries: Arc::new(ItineraryService::new(generator, clock)),
        admin_username: TEST_ADMIN.to_owned(),
    })
}

/// Log in as `username` and return the profile id with the session cookie.
pub async fn log_in(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    username: &str,
) -> (uuid::Uuid, actix_web::cookie::Cookie<'static>) {
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(serde_json::json!({ "username": username }))
        .to_request();
    let response = actix_test::call_service(app, request).await;
    assert!(response.status().is_success(), "login as {username}");
    let cookie = response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned();
    let body: serde_json::Value = actix_test::read_body_json(response).await;
    let id = body["profile"]["id"]
        .as_str()
        .expect("profile id")
        .parse()
        .expect("uuid");
    (id, cookie)
}
