//! User profile entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use super::sanitize::{sanitize_avatar_url, sanitize_text, sanitize_username};

/// Validation errors for profile updates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileValidationError {
    /// Username is empty after sanitisation.
    #[error("username must contain at least one letter, digit, underscore, or hyphen")]
    EmptyUsername,
}

/// A user's public profile. The id equals the auth user id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// User identifier.
    pub id: Uuid,
    /// Unique handle, sanitised to `[A-Za-z0-9_-]`.
    pub username: Option<String>,
    /// Avatar URL (https only).
    pub avatar_url: Option<String>,
    /// Short bio.
    pub bio: Option<String>,
    /// Home city.
    pub city: Option<String>,
    /// Instagram handle.
    pub instagram_username: Option<String>,
    /// Twitter handle.
    pub twitter_username: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Sanitised input for a profile update.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfileUpdate {
    /// New username.
    pub username: Option<String>,
    /// New avatar URL.
    pub avatar_url: Option<String>,
    /// New bio.
    pub bio: Option<String>,
    /// New city.
    pub city: Option<String>,
    /// New Instagram handle.
    pub instagram_username: Option<String>,
    /// New Twitter handle.
    pub twitter_username: Option<String>,
}

impl ProfileUpdate {
    /// Sanitise raw field values into an update payload.
    ///
    /// Fields left as `None` are not touched by the update. A supplied
    /// username that sanitises to the empty string is rejected; other
    /// fields collapse to `None` (cleared) when blank.
    pub fn from_raw(
        username: Option<&str>,
        avatar_url: Option<&str>,
        bio: Option<&str>,
        city: Option<&str>,
        instagram_username: Option<&str>,
        twitter_username: Option<&str>,
    ) -> Result<Self, ProfileValidationError> {
        let username = match username {
            Some(raw) => {
                let cleaned = sanitize_username(raw);
                if cleaned.is_empty() {
                    return Err(ProfileValidationError::EmptyUsername);
                }
                Some(cleaned)
            }
            None => None,
        };
        let clean_opt = |raw: Option<&str>| {
            raw.map(sanitize_text).filter(|text| !text.is_empty())
        };
        Ok(Self {
            username,
            avatar_url: avatar_url
                .map(sanitize_avatar_url)
                .filter(|url| !url.is_empty()),
            bio: clean_opt(bio),
            city: clean_opt(city),
            instagram_username: instagram_username
                .map(sanitize_username)
                .filter(|handle| !handle.is_empty()),
            twitter_username: twitter_username
                .map(sanitize_username)
                .filter(|handle| !handle.is_empty()),
        })
    }
}
