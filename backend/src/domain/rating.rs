//! Ratings and reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use super::sanitize::sanitize_text;

/// Validation errors for ratings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RatingValidationError {
    /// Score falls outside 1..=5.
    #[error("rating must be between 1 and 5")]
    ScoreOutOfRange,
}

/// A star score between 1 and 5 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "i16", into = "i16")]
pub struct Score(i16);

impl Score {
    /// Validate and construct a score.
    pub fn new(value: i16) -> Result<Self, RatingValidationError> {
        if (1..=5).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RatingValidationError::ScoreOutOfRange)
        }
    }

    /// The numeric value.
    pub fn value(&self) -> i16 {
        self.0
    }
}

impl From<Score> for i16 {
    fn from(value: Score) -> Self {
        value.0
    }
}

impl TryFrom<i16> for Score {
    type Error = RatingValidationError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A persisted rating row, unique per `(user, hotspot)`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    /// Row identifier.
    pub id: Uuid,
    /// The rating user.
    pub user_id: Uuid,
    /// The rated hotspot.
    pub hotspot_id: Uuid,
    /// Star score.
    pub score: Score,
    /// Optional review text.
    pub review: Option<String>,
    /// When the rating was first created.
    pub created_at: DateTime<Utc>,
}

/// Upsert input for a rating.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRating {
    /// The rating user.
    pub user_id: Uuid,
    /// The rated hotspot.
    pub hotspot_id: Uuid,
    /// Star score.
    pub score: Score,
    /// Optional review text (sanitised on construction).
    pub review: Option<String>,
}

impl NewRating {
    /// Build an upsert payload, sanitising the review and dropping it when
    /// it collapses to the empty string.
    pub fn new(
        user_id: Uuid,
        hotspot_id: Uuid,
        score: Score,
        review: Option<&str>,
    ) -> Self {
        let review = review
            .map(sanitize_text)
            .filter(|text| !text.is_empty());
        Self {
            user_id,
            hotspot_id,
            score,
            review,
        }
    }
}

/// A review as listed on a hotspot page.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEntry {
    /// The reviewing user.
    pub user_id: Uuid,
    /// Their username, if the profile has one.
    pub username: Option<String>,
    /// Their avatar URL, if any.
    pub avatar_url: Option<String>,
    /// Star score.
    pub score: Score,
    /// Review text.
    pub review: Option<String>,
    /// When the rating was first created.
    pub created_at: DateTime<Utc>,
}

/// Aggregate rating figures for a hotspot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    /// Raw mean score, absent when the hotspot has no ratings.
    pub average: Option<f64>,
    /// Number of ratings.
    pub count: i64,
}

impl RatingSummary {
    /// A summary for a hotspot with no ratings.
    pub const fn empty() -> Self {
        Self {
            average: None,
            count: 0,
        }
    }
}

/// Round an average rating to one decimal place for display.
pub fn round_average(average: f64) -> f64 {
    (average * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[case(5)]
    fn accepts_scores_in_range(#[case] value: i16) {
        assert_eq!(Score::new(value).expect("valid").value(), value);
    }

    #[rstest]
    #[case(0)]
    #[case(6)]
    #[case(-1)]
    fn rejects_scores_out_of_range(#[case] value: i16) {
        assert_eq!(
            Score::new(value).expect_err("invalid"),
            RatingValidationError::ScoreOutOfRange
        );
    }

    #[rstest]
    fn review_is_sanitised_and_blank_reviews_dropped() {
        let with_markup = NewRating::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Score::new(4).expect("valid"),
            Some("<i>great</i>"),
        );
        assert_eq!(with_markup.review.as_deref(), Some("igreat/i"));

        let blank = NewRating::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Score::new(4).expect("valid"),
            Some("   "),
        );
        assert!(blank.review.is_none());
    }

    #[rstest]
    #[case(4.26, 4.3)]
    #[case(4.24, 4.2)]
    #[case(5.0, 5.0)]
    fn averages_round_to_one_decimal(#[case] raw: f64, #[case] expected: f64) {
        assert!((round_average(raw) - expected).abs() < 1e-9);
    }
}
