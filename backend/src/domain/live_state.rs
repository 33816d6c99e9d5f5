//! Live visitor-count projection with optimistic updates.
//!
//! The check-in flow applies count changes before the storage write
//! completes so the map reflects the action immediately. Each change is
//! reverted individually if its write fails. Because a check-in is a
//! deactivate-then-insert pair rather than a transaction, an insert
//! failure after a successful deactivation leaves the prior venue's
//! decrement in place and clears the user's current check-in; only the
//! target venue's increment is rolled back. The projection is a cache
//! subordinate to the database and can be re-primed from it at any time.

use std::collections::HashMap;

use uuid::Uuid;

/// A user's current active check-in, as the projection sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentCheckIn {
    /// Check-in row identifier.
    pub check_in_id: Uuid,
    /// The venue checked into.
    pub hotspot_id: Uuid,
}

/// Per-venue active visitor counts plus each user's current check-in.
#[derive(Debug, Clone, Default)]
pub struct LiveState {
    counts: HashMap<Uuid, u32>,
    current: HashMap<Uuid, CurrentCheckIn>,
}

impl LiveState {
    /// Build a projection from confirmed storage state.
    pub fn new(counts: HashMap<Uuid, u32>, current: HashMap<Uuid, CurrentCheckIn>) -> Self {
        Self { counts, current }
    }

    /// Replace the projection wholesale with confirmed storage state.
    pub fn prime(&mut self, counts: HashMap<Uuid, u32>, current: HashMap<Uuid, CurrentCheckIn>) {
        self.counts = counts;
        self.current = current;
    }

    /// Active visitors at a venue. Venues never seen count as zero.
    pub fn visitor_count(&self, hotspot_id: Uuid) -> u32 {
        self.counts.get(&hotspot_id).copied().unwrap_or(0)
    }

    /// A snapshot of every venue's active visitor count.
    pub fn visitor_counts(&self) -> HashMap<Uuid, u32> {
        self.counts.clone()
    }

    /// The user's current check-in, if any.
    pub fn current_for(&self, user_id: Uuid) -> Option<CurrentCheckIn> {
        self.current.get(&user_id).copied()
    }

    /// Record a user's confirmed current check-in without touching counts.
    ///
    /// Used to reconcile the projection with storage when the current map
    /// is cold (after a restart) and the primed counts already include the
    /// active row.
    pub fn note_current(&mut self, user_id: Uuid, current: CurrentCheckIn) {
        self.current.insert(user_id, current);
    }

    /// Optimistically apply a check-in by `user_id` at `hotspot_id`.
    ///
    /// Decrements the user's prior venue (if any), increments the target,
    /// and records the new current check-in.
    pub fn apply_check_in(&mut self, user_id: Uuid, check_in_id: Uuid, hotspot_id: Uuid) {
        if let Some(prior) = self.current.remove(&user_id) {
            self.decrement(prior.hotspot_id);
        }
        self.increment(hotspot_id);
        self.current.insert(
            user_id,
            CurrentCheckIn {
                check_in_id,
                hotspot_id,
            },
        );
    }

    /// Roll back a check-in whose insert failed after the prior row was
    /// already deactivated.
    ///
    /// The target venue's increment is reverted. The prior venue's
    /// decrement stands, and the user is left with no current check-in,
    /// matching what storage now holds.
    pub fn revert_failed_check_in(&mut self, user_id: Uuid, hotspot_id: Uuid) {
        self.decrement(hotspot_id);
        self.current.remove(&user_id);
    }

    /// Optimistically apply a check-out of the user's current check-in.
    ///
    /// Returns the check-in that was cleared, for use in a revert.
    pub fn apply_check_out(&mut self, user_id: Uuid) -> Option<CurrentCheckIn> {
        let cleared = self.current.remove(&user_id)?;
        self.decrement(cleared.hotspot_id);
        Some(cleared)
    }

    /// Roll back a failed check-out, restoring the cleared check-in.
    pub fn revert_check_out(&mut self, user_id: Uuid, cleared: CurrentCheckIn) {
        self.increment(cleared.hotspot_id);
        self.current.insert(user_id, cleared);
    }

    fn increment(&mut self, hotspot_id: Uuid) {
        *self.counts.entry(hotspot_id).or_insert(0) += 1;
    }

    fn decrement(&mut self, hotspot_id: Uuid) {
        if let Some(count) = self.counts.get_mut(&hotspot_id) {
            *count = count.saturating_sub(1);
        }
    }
}
