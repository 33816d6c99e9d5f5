//! Profile domain service: login-by-username, lookup, and updates.

use std::sync::Arc;

use mockable::Clock;
use serde_json::json;
use uuid::Uuid;

use super::Error;
use super::ports::ProfileRepository;
use super::profile::{Profile, ProfileUpdate};
use super::rate_limit::{RateLimitAction, RateLimitDecision, RateLimiter};
use super::sanitize::sanitize_username;

/// Service driving profile reads and writes.
pub struct ProfileService {
    profiles: Arc<dyn ProfileRepository>,
    rate_limiter: Arc<RateLimiter>,
    clock: Arc<dyn Clock>,
}

impl ProfileService {
    /// Wire the service to its repository, limiter, and clock.
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        rate_limiter: Arc<RateLimiter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            profiles,
            rate_limiter,
            clock,
        }
    }

    /// Log a user in by username, creating their profile on first sight.
    pub async fn login(&self, username: &str) -> Result<Profile, Error> {
        let username = sanitize_username(username);
        if username.is_empty() {
            return Err(Error::invalid_request(
                "username must contain at least one letter, digit, underscore, or hyphen",
            ));
        }
        if let Some(profile) = self.profiles.find_by_username(&username).await? {
            return Ok(profile);
        }
        let profile = Profile {
            id: Uuid::new_v4(),
            username: Some(username),
            avatar_url: None,
            bio: None,
            city: None,
            instagram_username: None,
            twitter_username: None,
            created_at: self.clock.utc(),
        };
        self.profiles.insert(&profile).await?;
        Ok(profile)
    }

    /// Fetch a profile by user id.
    pub async fn get(&self, user_id: Uuid) -> Result<Profile, Error> {
        self.profiles
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| Error::not_found("profile not found"))
    }

    /// Apply an update to the user's own profile.
    pub async fn update(&self, user_id: Uuid, update: ProfileUpdate) -> Result<Profile, Error> {
        if let RateLimitDecision::Denied { wait } =
            self.rate_limiter.check(RateLimitAction::Profile, user_id)
        {
            let seconds = wait.as_secs();
            return Err(Error::too_many_requests(format!(
                "Updating your profile too often; try again in {seconds}s"
            ))
            .with_details(json!({ "waitSeconds": seconds })));
        }
        if let Some(username) = update.username.as_deref() {
            if let Some(existing) = self.profiles.find_by_username(username).await? {
                if existing.id != user_id {
                    return Err(Error::invalid_request("username is already taken"));
                }
            }
        }
        self.profiles
            .update(user_id, &update)
            .await?
            .ok_or_else(|| Error::not_found("profile not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockProfileRepository;
    use chrono::Utc;
    use mockable::DefaultClock;

    fn sample(id: Uuid, username: &str) -> Profile {
        Profile {
            id,
            username: Some(username.to_owned()),
            avatar_url: None,
            bio: None,
            city: None,
            instagram_username: None,
            twitter_username: None,
            created_at: Utc::now(),
        }
    }

    fn service(profiles: MockProfileRepository) -> ProfileService {
        ProfileService::new(
            Arc::new(profiles),
            Arc::new(RateLimiter::new(Arc::new(DefaultClock))),
            Arc::new(DefaultClock),
        )
    }

    #[tokio::test]
    async fn login_returns_the_existing_profile() {
        let id = Uuid::new_v4();
        let mut profiles = MockProfileRepository::new();
        profiles
            .expect_find_by_username()
            .return_once(move |_| Ok(Some(sample(id, "ada"))));
        profiles.expect_insert().times(0);

        let profile = service(profiles).login("ada").await.expect("logged in");
        assert_eq!(profile.id, id);
    }

    #[tokio::test]
    async fn login_creates_a_profile_on_first_sight() {
        let mut profiles = MockProfileRepository::new();
        profiles
            .expect_find_by_username()
            .return_once(|_| Ok(None));
        profiles
            .expect_insert()
            .times(1)
            .withf(|profile| profile.username.as_deref() == Some("adalovelace"))
            .return_once(|_| Ok(()));

        let profile = service(profiles)
            .login("ada lovelace!")
            .await
            .expect("profile created");
        assert_eq!(profile.username.as_deref(), Some("adalovelace"));
    }

    #[tokio::test]
    async fn login_rejects_usernames_that_sanitise_away() {
        let error = service(MockProfileRepository::new())
            .login("!!!")
            .await
            .expect_err("empty username");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn update_refuses_a_taken_username() {
        let user = Uuid::new_v4();
        let mut profiles = MockProfileRepository::new();
        profiles
            .expect_find_by_username()
            .return_once(move |_| Ok(Some(sample(Uuid::new_v4(), "bea"))));

        let update = ProfileUpdate::from_raw(Some("bea"), None, None, None, None, None)
            .expect("valid update");
        let error = service(profiles)
            .update(user, update)
            .await
            .expect_err("taken username");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn update_is_rate_limited_after_the_window_fills() {
        let user = Uuid::new_v4();
        let limiter = Arc::new(RateLimiter::new(Arc::new(DefaultClock)));
        for _ in 0..RateLimitAction::Profile.policy().max {
            assert!(limiter.check(RateLimitAction::Profile, user).is_allowed());
        }

        let service = ProfileService::new(
            Arc::new(MockProfileRepository::new()),
            limiter,
            Arc::new(DefaultClock),
        );
        let error = service
            .update(user, ProfileUpdate::default())
            .await
            .expect_err("rate limited");
        assert_eq!(error.code(), ErrorCode::TooManyRequests);
    }
}
