//! Builders for the HTTP state and its repository-backed services.
//!
//! Selects PostgreSQL adapters when a pool is configured and falls back
//! to the in-memory adapters otherwise, so the binary runs without a
//! database for local development.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::info;

use crate::domain::ports::{
    CheckInRepository, FriendRepository, HotspotRepository, ItineraryGenerator,
    NotificationRepository, ProfileRepository, RatingRepository, SavedHotspotRepository,
};
use crate::domain::{
    CheckInService, FriendService, HotspotService, ItineraryService, NotificationService,
    ProfileService, RateLimiter, RatingService,
};
use crate::inbound::http::state::HttpState;
use crate::outbound::gemini::GeminiGenerator;
use crate::outbound::memory::{
    MemoryCheckInRepository, MemoryFriendRepository, MemoryHotspotRepository,
    MemoryNotificationRepository, MemoryProfileRepository, MemoryRatingRepository,
    MemorySavedHotspotRepository, MemoryStore,
};
use crate::outbound::persistence::{
    DbPool, DieselCheckInRepository, DieselFriendRepository, DieselHotspotRepository,
    DieselNotificationRepository, DieselProfileRepository, DieselRatingRepository,
    DieselSavedHotspotRepository,
};

use super::ServerConfig;

/// Repository ports bundled so both backends wire up identically.
struct Repositories {
    check_ins: Arc<dyn CheckInRepository>,
    hotspots: Arc<dyn HotspotRepository>,
    ratings: Arc<dyn RatingRepository>,
    friends: Arc<dyn FriendRepository>,
    profiles: Arc<dyn ProfileRepository>,
    saved: Arc<dyn SavedHotspotRepository>,
    notifications: Arc<dyn NotificationRepository>,
}

impl Repositories {
    fn diesel(pool: &DbPool) -> Self {
        Self {
            check_ins: Arc::new(DieselCheckInRepository::new(pool.clone())),
            hotspots: Arc::new(DieselHotspotRepository::new(pool.clone())),
            ratings: Arc::new(DieselRatingRepository::new(pool.clone())),
            friends: Arc::new(DieselFriendRepository::new(pool.clone())),
            profiles: Arc::new(DieselProfileRepository::new(pool.clone())),
            saved: Arc::new(DieselSavedHotspotRepository::new(pool.clone())),
            notifications: Arc::new(DieselNotificationRepository::new(pool.clone())),
        }
    }

    fn memory() -> Self {
        let store = MemoryStore::new();
        Self {
            check_ins: Arc::new(MemoryCheckInRepository(store.clone())),
            hotspots: Arc::new(MemoryHotspotRepository(store.clone())),
            ratings: Arc::new(MemoryRatingRepository(store.clone())),
            friends: Arc::new(MemoryFriendRepository(store.clone())),
            profiles: Arc::new(MemoryProfileRepository(store.clone())),
            saved: Arc::new(MemorySavedHotspotRepository(store.clone())),
            notifications: Arc::new(MemoryNotificationRepository(store)),
        }
    }
}

fn build_repositories(config: &ServerConfig) -> Repositories {
    match &config.db_pool {
        Some(pool) => Repositories::diesel(pool),
        None => {
            info!("no database pool configured; using in-memory storage");
            Repositories::memory()
        }
    }
}

fn build_generator(config: &ServerConfig) -> std::io::Result<Arc<dyn ItineraryGenerator>> {
    let generator = GeminiGenerator::new(config.gemini_keys.clone())
        .map_err(|error| std::io::Error::other(format!("gemini client build failed: {error}")))?;
    info!(keys = generator.key_count(), "itinerary generator configured");
    Ok(Arc::new(generator))
}

/// Build the shared HTTP state from configured ports.
///
/// # Errors
/// Returns [`std::io::Error`] when the outbound HTTP client cannot be
/// constructed.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let repos = build_repositories(config);
    let generator = build_generator(config)?;

    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let rate_limiter = Arc::new(RateLimiter::new(clock.clone()));

    let check_ins = Arc::new(CheckInService::new(
        repos.check_ins,
        repos.hotspots.clone(),
        repos.friends.clone(),
        repos.notifications.clone(),
        repos.profiles.clone(),
        rate_limiter.clone(),
        clock.clone(),
    ));
    let hotspots = Arc::new(HotspotService::new(
        repos.hotspots.clone(),
        repos.saved,
        clock.clone(),
    ));
    let ratings = Arc::new(RatingService::new(
        repos.ratings,
        repos.hotspots,
        rate_limiter.clone(),
    ));
    let friends = Arc::new(FriendService::new(
        repos.friends,
        repos.profiles.clone(),
        repos.notifications.clone(),
        clock.clone(),
    ));
    let profiles = Arc::new(ProfileService::new(
        repos.profiles,
        rate_limiter,
        clock.clone(),
    ));
    let notifications = Arc::new(NotificationService::new(repos.notifications));
    let itineraries = Arc::new(ItineraryService::new(generator, clock));

    Ok(web::Data::new(HttpState {
        check_ins,
        hotspots,
        ratings,
        friends,
        profiles,
        notifications,
        itineraries,
        admin_username: config.admin_username.clone(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::{Key, SameSite};
    use rstest::rstest;

    fn config() -> ServerConfig {
        ServerConfig::new(
            Key::generate(),
            false,
            SameSite::Lax,
            "127.0.0.1:0".parse().expect("socket addr"),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn memory_fallback_serves_logins_without_a_pool() {
        let state = build_http_state(&config().with_admin_username("boss"))
            .expect("state builds without a pool");
        assert_eq!(state.admin_username, "boss");

        let profile = state.profiles.login("ada").await.expect("login creates");
        assert_eq!(profile.username.as_deref(), Some("ada"));
    }

    #[rstest]
    fn generator_reports_configured_key_count() {
        let generator = GeminiGenerator::new(vec!["k1".to_owned(), "k2".to_owned()])
            .expect("client builds");
        assert_eq!(generator.key_count(), 2);
    }
}
