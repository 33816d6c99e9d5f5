//! Hotspot catalogue and saved-list domain service.

use std::sync::Arc;

use chrono::TimeDelta;
use mockable::Clock;
use uuid::Uuid;

use super::Error;
use super::hotspot::{Hotspot, HotspotDraft, TrendingHotspot};
use super::ports::{HotspotRepository, SavedHotspotRepository};

/// Window over which trending check-ins are counted.
const TRENDING_WINDOW_HOURS: i64 = 24;

/// Maximum venues a trending query may return.
const TRENDING_LIMIT_MAX: i64 = 20;

/// Service driving the hotspot catalogue and per-user saved lists.
pub struct HotspotService {
    hotspots: Arc<dyn HotspotRepository>,
    saved: Arc<dyn SavedHotspotRepository>,
    clock: Arc<dyn Clock>,
}

impl HotspotService {
    /// Wire the service to its repositories and clock.
    pub fn new(
        hotspots: Arc<dyn HotspotRepository>,
        saved: Arc<dyn SavedHotspotRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            hotspots,
            saved,
            clock,
        }
    }

    /// Every hotspot in the catalogue.
    pub async fn list(&self) -> Result<Vec<Hotspot>, Error> {
        Ok(self.hotspots.list().await?)
    }

    /// Fetch one hotspot.
    pub async fn get(&self, id: Uuid) -> Result<Hotspot, Error> {
        self.hotspots
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("hotspot not found"))
    }

    /// Hotspots ranked by check-ins over the last 24 hours.
    pub async fn trending(&self, limit: i64) -> Result<Vec<TrendingHotspot>, Error> {
        let since = self.clock.utc() - TimeDelta::hours(TRENDING_WINDOW_HOURS);
        let limit = limit.clamp(1, TRENDING_LIMIT_MAX);
        Ok(self.hotspots.trending(since, limit).await?)
    }

    /// Add a hotspot to the catalogue.
    pub async fn create(&self, draft: HotspotDraft) -> Result<Hotspot, Error> {
        let hotspot = Hotspot {
            id: Uuid::new_v4(),
            name: draft.name.clone(),
            category: draft.category,
            address: draft.address.clone(),
            position: draft.position,
            description: draft.description.clone(),
            image_url: draft.image_url.clone(),
            created_at: self.clock.utc(),
        };
        self.hotspots.insert(&hotspot).await?;
        Ok(hotspot)
    }

    /// Replace a hotspot's editable fields.
    pub async fn update(&self, id: Uuid, draft: HotspotDraft) -> Result<Hotspot, Error> {
        self.hotspots
            .update(id, &draft)
            .await?
            .ok_or_else(|| Error::not_found("hotspot not found"))
    }

    /// Remove a hotspot from the catalogue.
    pub async fn delete(&self, id: Uuid) -> Result<(), Error> {
        if self.hotspots.delete(id).await? {
            Ok(())
        } else {
            Err(Error::not_found("hotspot not found"))
        }
    }

    /// Save a hotspot to the user's list. Saving twice is a no-op.
    pub async fn save(&self, user_id: Uuid, hotspot_id: Uuid) -> Result<(), Error> {
        // Verify the target exists so a stale id surfaces as 404, not a
        // dangling join row.
        self.get(hotspot_id).await?;
        self.saved.save(user_id, hotspot_id).await?;
        Ok(())
    }

    /// Remove a hotspot from the user's list.
    pub async fn unsave(&self, user_id: Uuid, hotspot_id: Uuid) -> Result<(), Error> {
        self.saved.unsave(user_id, hotspot_id).await?;
        Ok(())
    }

    /// The user's saved hotspots.
    pub async fn list_saved(&self, user_id: Uuid) -> Result<Vec<Hotspot>, Error> {
        Ok(self.saved.list(user_id).await?)
    }

    /// Whether the user has saved the hotspot.
    pub async fn is_saved(&self, user_id: Uuid, hotspot_id: Uuid) -> Result<bool, Error> {
        Ok(self.saved.is_saved(user_id, hotspot_id).await?)
    }
}
