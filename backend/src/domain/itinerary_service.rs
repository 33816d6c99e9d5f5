//! AI day-planner service with a per-user daily quota.
//!
//! The quota is enforced here, server-side, in a date-keyed in-process
//! store: three generations per user per UTC calendar day. Entries from
//! earlier days are pruned as they are touched, so the store stays
//! bounded by the active user count.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;
use mockable::Clock;
use serde_json::json;
use uuid::Uuid;

use super::Error;
use super::itinerary::{GeneratedItinerary, ItineraryRequest, MAX_DAILY_ITINERARIES};
use super::ports::ItineraryGenerator;

/// Service driving itinerary generation and quota accounting.
pub struct ItineraryService {
    generator: Arc<dyn ItineraryGenerator>,
    clock: Arc<dyn Clock>,
    usage: Mutex<HashMap<(Uuid, NaiveDate), u32>>,
}

impl ItineraryService {
    /// Wire the service to its generator and clock.
    pub fn new(generator: Arc<dyn ItineraryGenerator>, clock: Arc<dyn Clock>) -> Self {
        Self {
            generator,
            clock,
            usage: Mutex::new(HashMap::new()),
        }
    }

    /// Generations the user has used today.
    pub fn usage_today(&self, user_id: Uuid) -> u32 {
        let today = self.clock.utc().date_naive();
        self.lock_usage()
            .get(&(user_id, today))
            .copied()
            .unwrap_or(0)
    }

    /// Generate an itinerary for the user, consuming one quota unit.
    ///
    /// The unit is reserved under the lock before the upstream call, so
    /// concurrent requests cannot overrun the cap, and refunded when the
    /// call fails so a failed generation can be retried without penalty.
    pub async fn generate(
        &self,
        user_id: Uuid,
        request: &ItineraryRequest,
    ) -> Result<GeneratedItinerary, Error> {
        let today = self.clock.utc().date_naive();
        let usage_count = {
            let mut usage = self.lock_usage();
            usage.retain(|(_, date), _| *date == today);
            let entry = usage.entry((user_id, today)).or_insert(0);
            if *entry >= MAX_DAILY_ITINERARIES {
                let used = *entry;
                return Err(Error::too_many_requests(format!(
                    "Daily limit reached! You can generate {MAX_DAILY_ITINERARIES} itineraries per day."
                ))
                .with_details(json!({
                    "usageCount": used,
                    "maxDaily": MAX_DAILY_ITINERARIES,
                })));
            }
            *entry += 1;
            *entry
        };

        match self.generator.generate(&request.prompt()).await {
            Ok(itinerary) => Ok(GeneratedItinerary {
                itinerary,
                generated_at: self.clock.utc(),
                usage_count,
            }),
            Err(error) => {
                let mut usage = self.lock_usage();
                if let Some(entry) = usage.get_mut(&(user_id, today)) {
                    *entry = entry.saturating_sub(1);
                }
                Err(error.into())
            }
        }
    }

    fn lock_usage(&self) -> MutexGuard<'_, HashMap<(Uuid, NaiveDate), u32>> {
        match self.usage.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
