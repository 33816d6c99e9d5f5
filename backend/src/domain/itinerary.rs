//! AI day-planner request types and prompt construction.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use super::sanitize::sanitize_text;

/// Itineraries a user may generate per calendar day.
pub const MAX_DAILY_ITINERARIES: u32 = 3;

/// Maximum length of the starting-location field, in characters.
pub const START_LOCATION_MAX: usize = 100;

/// Who the user is travelling with. Shapes the tone of the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CompanionType {
    /// A romantic date. Accepts the legacy `girlfriend` wire name.
    #[serde(alias = "girlfriend")]
    Partner,
    /// A group hangout.
    Friends,
    /// An all-ages outing.
    Family,
    /// Travelling alone.
    Solo,
}

impl CompanionType {
    /// Phrase substituted into the generation prompt.
    pub fn prompt_text(self) -> &'static str {
        match self {
            Self::Partner => "your romantic partner",
            Self::Friends => "a group of friends",
            Self::Family => "family members",
            Self::Solo => "solo (by yourself)",
        }
    }
}

impl fmt::Display for CompanionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Partner => "partner",
            Self::Friends => "friends",
            Self::Family => "family",
            Self::Solo => "solo",
        };
        f.write_str(name)
    }
}

/// Validation errors for itinerary requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItineraryValidationError {
    /// Hours fall outside 1..=12.
    #[error("time must be between 1 and 12 hours")]
    HoursOutOfRange,
    /// Starting location is empty after sanitisation.
    #[error("starting location must not be empty")]
    EmptyStartLocation,
    /// Starting location exceeds [`START_LOCATION_MAX`] characters.
    #[error("location name too long")]
    StartLocationTooLong,
}

/// A validated itinerary request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItineraryRequest {
    hours: u8,
    companion: CompanionType,
    start_location: String,
}

impl ItineraryRequest {
    /// Validate and construct a request, sanitising the location.
    pub fn new(
        hours: u8,
        companion: CompanionType,
        start_location: &str,
    ) -> Result<Self, ItineraryValidationError> {
        if !(1..=12).contains(&hours) {
            return Err(ItineraryValidationError::HoursOutOfRange);
        }
        let start_location = sanitize_text(start_location);
        if start_location.is_empty() {
            return Err(ItineraryValidationError::EmptyStartLocation);
        }
        if start_location.chars().count() > START_LOCATION_MAX {
            return Err(ItineraryValidationError::StartLocationTooLong);
        }
        Ok(Self {
            hours,
            companion,
            start_location,
        })
    }

    /// Trip length in hours.
    pub fn hours(&self) -> u8 {
        self.hours
    }

    /// Companion selection.
    pub fn companion(&self) -> CompanionType {
        self.companion
    }

    /// Sanitised starting location.
    pub fn start_location(&self) -> &str {
        &self.start_location
    }

    /// Render the generation prompt for this request.
    pub fn prompt(&self) -> String {
        format!(
            "You are an expert local travel guide for Vasai-Virar, Maharashtra, India. \
             Create a detailed {hours}-hour itinerary for someone traveling with {companion}.\n\n\
             Starting Location: {location}\n\n\
             REQUIREMENTS:\n\
             1. Include 2-3 REAL places from Vasai-Virar:\n\
             \x20  - Vasai Fort (Portuguese ruins, ocean views)\n\
             \x20  - Arnala Beach (peaceful beach, seafood)\n\
             \x20  - Tungareshwar Temple (forest trek, hilltop temple)\n\
             \x20  - Global Vipassana Pagoda (meditation center)\n\
             \x20  - Local markets (Virar Market, Vasai Market)\n\
             \x20  - Popular cafes and restaurants\n\n\
             2. For EACH place provide:\n\
             \x20  - Place name\n\
             \x20  - Specific timing (e.g., 9:00 AM - 10:30 AM)\n\
             \x20  - Activities (be specific and exciting)\n\
             \x20  - Cost in INR (realistic prices)\n\
             \x20  - Travel time and transport method\n\n\
             3. Match companion type:\n\
             \x20  - Romantic partner: romantic spots, cafes, sunset views\n\
             \x20  - Friends: fun activities, street food\n\
             \x20  - Family: safe, all-ages friendly\n\
             \x20  - Solo: peaceful spots, photography\n\n\
             4. Format clearly with sections\n\n\
             5. End with 3-4 practical tips for Vasai-Virar\n\n\
             6. Keep total cost in the INR 500-2000 range\n\n\
             Make it exciting and authentic! Use conversational tone.",
            hours = self.hours,
            companion = self.companion.prompt_text(),
            location = self.start_location,
        )
    }
}

/// A generated plan together with its timestamp and quota usage.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedItinerary {
    /// The plan text.
    pub itinerary: String,
    /// When generation completed.
    pub generated_at: DateTime<Utc>,
    /// Generations used today, including this one.
    pub usage_count: u32,
}
