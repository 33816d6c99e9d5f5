//! Hotspot entity: a point-of-interest venue users can check into.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use super::geo::Coordinates;
use super::sanitize::sanitize_text;

/// Venue categories shown as map filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Coffee shops and cafes.
    Cafe,
    /// Parks and open spaces.
    Park,
    /// Arcades and gaming lounges.
    Gaming,
    /// Restaurants and street food.
    Food,
    /// General hangout spots.
    Hangout,
    /// Anything else.
    Other,
}

/// Error returned when parsing an unknown category name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown hotspot category: {0}")]
pub struct CategoryParseError(pub String);

impl FromStr for Category {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cafe" => Ok(Self::Cafe),
            "park" => Ok(Self::Park),
            "gaming" => Ok(Self::Gaming),
            "food" => Ok(Self::Food),
            "hangout" => Ok(Self::Hangout),
            "other" => Ok(Self::Other),
            other => Err(CategoryParseError(other.to_owned())),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cafe => "cafe",
            Self::Park => "park",
            Self::Gaming => "gaming",
            Self::Food => "food",
            Self::Hangout => "hangout",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// Validation errors for hotspot drafts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HotspotValidationError {
    /// Name is empty after trimming.
    #[error("hotspot name must not be empty")]
    EmptyName,
    /// Address is empty after trimming.
    #[error("hotspot address must not be empty")]
    EmptyAddress,
}

/// A venue as stored and served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    /// Stable venue identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Venue category.
    pub category: Category,
    /// Street address.
    pub address: String,
    /// Geographic position.
    pub position: Coordinates,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Optional hosted image URL.
    pub image_url: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Validated input for creating or replacing a hotspot.
#[derive(Debug, Clone, PartialEq)]
pub struct HotspotDraft {
    /// Display name, non-empty.
    pub name: String,
    /// Venue category.
    pub category: Category,
    /// Street address, non-empty.
    pub address: String,
    /// Geographic position.
    pub position: Coordinates,
    /// Optional sanitised description.
    pub description: Option<String>,
    /// Optional image URL.
    pub image_url: Option<String>,
}

impl HotspotDraft {
    /// Validate and construct a draft, sanitising free-text fields.
    pub fn new(
        name: impl Into<String>,
        category: Category,
        address: impl Into<String>,
        position: Coordinates,
        description: Option<String>,
        image_url: Option<String>,
    ) -> Result<Self, HotspotValidationError> {
        let name = sanitize_text(&name.into());
        if name.is_empty() {
            return Err(HotspotValidationError::EmptyName);
        }
        let address = sanitize_text(&address.into());
        if address.is_empty() {
            return Err(HotspotValidationError::EmptyAddress);
        }
        let description = description
            .map(|text| sanitize_text(&text))
            .filter(|text| !text.is_empty());
        Ok(Self {
            name,
            category,
            address,
            position,
            description,
            image_url,
        })
    }
}

/// A hotspot ranked by recent check-in volume.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrendingHotspot {
    /// The ranked venue.
    pub hotspot: Hotspot,
    /// Check-ins recorded within the trending window.
    pub recent_check_ins: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn position() -> Coordinates {
        Coordinates::new(19.3919, 72.8397).expect("valid coordinates")
    }

    #[rstest]
    #[case("cafe", Category::Cafe)]
    #[case("park", Category::Park)]
    #[case("gaming", Category::Gaming)]
    #[case("food", Category::Food)]
    #[case("hangout", Category::Hangout)]
    #[case("other", Category::Other)]
    fn category_parses_and_displays(#[case] raw: &str, #[case] expected: Category) {
        assert_eq!(raw.parse::<Category>().expect("known category"), expected);
        assert_eq!(expected.to_string(), raw);
    }

    #[rstest]
    fn category_rejects_unknown_names() {
        assert!("bar".parse::<Category>().is_err());
    }

    #[rstest]
    fn draft_rejects_blank_name() {
        let err = HotspotDraft::new("  ", Category::Cafe, "Main St", position(), None, None)
            .expect_err("blank name");
        assert_eq!(err, HotspotValidationError::EmptyName);
    }

    #[rstest]
    fn draft_sanitises_description() {
        let draft = HotspotDraft::new(
            "Neon Cafe",
            Category::Cafe,
            "Main St",
            position(),
            Some("<b>cosy</b>".to_owned()),
            None,
        )
        .expect("valid draft");
        assert_eq!(draft.description.as_deref(), Some("bcosy/b"));
    }

    #[rstest]
    fn draft_drops_empty_description() {
        let draft = HotspotDraft::new(
            "Neon Cafe",
            Category::Cafe,
            "Main St",
            position(),
            Some("   ".to_owned()),
            None,
        )
        .expect("valid draft");
        assert!(draft.description.is_none());
    }
}
