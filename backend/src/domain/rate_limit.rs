//! Fixed-window rate limiting for mutating user actions.
//!
//! The limiter tracks `(action, user)` pairs in process memory. It is an
//! abuse brake, not an access control: state is lost on restart and the
//! thresholds are deliberately generous. The clock is injected so tests can
//! drive the window boundary deterministically.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use uuid::Uuid;

/// Actions subject to rate limiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateLimitAction {
    /// Checking into a hotspot.
    CheckIn,
    /// Submitting or updating a rating.
    Rating,
    /// Updating the user's own profile.
    Profile,
}

impl RateLimitAction {
    /// Window policy for this action.
    pub const fn policy(self) -> RateLimitPolicy {
        match self {
            // 10 check-ins per minute.
            Self::CheckIn => RateLimitPolicy::new(10, Duration::from_secs(60)),
            // 20 ratings per minute.
            Self::Rating => RateLimitPolicy::new(20, Duration::from_secs(60)),
            // 5 profile updates per minute.
            Self::Profile => RateLimitPolicy::new(5, Duration::from_secs(60)),
        }
    }
}

impl fmt::Display for RateLimitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CheckIn => "check_in",
            Self::Rating => "rating",
            Self::Profile => "profile",
        };
        f.write_str(name)
    }
}

/// Maximum attempts permitted within a rolling window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Attempts allowed per window.
    pub max: u32,
    /// Window length.
    pub window: Duration,
}

impl RateLimitPolicy {
    /// Build a policy from its parts.
    pub const fn new(max: u32, window: Duration) -> Self {
        Self { max, window }
    }
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// The action may proceed.
    Allowed,
    /// The action is throttled; retry after `wait`.
    Denied {
        /// Time remaining until the window resets, rounded up to whole seconds.
        wait: Duration,
    },
}

impl RateLimitDecision {
    /// Whether the action may proceed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    count: u32,
    reset_at: DateTime<Utc>,
}

/// In-memory fixed-window limiter keyed by `(action, user)`.
pub struct RateLimiter {
    clock: Arc<dyn Clock>,
    store: Mutex<HashMap<(RateLimitAction, Uuid), WindowEntry>>,
}

impl RateLimiter {
    /// Create a limiter backed by the supplied clock.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use mockable::DefaultClock;
    /// use hotspots_backend::domain::rate_limit::RateLimiter;
    ///
    /// let limiter = RateLimiter::new(Arc::new(DefaultClock));
    /// ```
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            store: Mutex::new(HashMap::new()),
        }
    }

    /// Record an attempt and decide whether it may proceed.
    ///
    /// Counts attempts inside a fixed window; the first attempt after the
    /// window lapses starts a fresh one. A denied attempt does not extend
    /// the window.
    pub fn check(&self, action: RateLimitAction, user_id: Uuid) -> RateLimitDecision {
        let policy = action.policy();
        let now = self.clock.utc();
        let mut store = self.lock_store();

        let key = (action, user_id);
        match store.get_mut(&key) {
            Some(entry) if now <= entry.reset_at => {
                if entry.count >= policy.max {
                    let remaining = entry.reset_at - now;
                    return RateLimitDecision::Denied {
                        wait: ceil_seconds(remaining),
                    };
                }
                entry.count += 1;
                RateLimitDecision::Allowed
            }
            _ => {
                let reset_at = now
                    + TimeDelta::from_std(policy.window)
                        .unwrap_or_else(|_| TimeDelta::seconds(60));
                store.insert(
                    key,
                    WindowEntry {
                        count: 1,
                        reset_at,
                    },
                );
                RateLimitDecision::Allowed
            }
        }
    }

    fn lock_store(&self) -> MutexGuard<'_, HashMap<(RateLimitAction, Uuid), WindowEntry>> {
        // A poisoned lock only means another thread panicked mid-insert; the
        // map itself stays structurally valid.
        match self.store.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn ceil_seconds(delta: TimeDelta) -> Duration {
    let millis = delta.num_milliseconds().max(0);
    let seconds = millis / 1000 + i64::from(millis % 1000 != 0);
    Duration::from_secs(seconds.max(1).unsigned_abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Local, TimeZone, Utc};
    use rstest::{fixture, rstest};
    use std::sync::Mutex as StdMutex;

    struct MutableClock(StdMutex<DateTime<Utc>>);

    impl MutableClock {
        fn new(now: DateTime<Utc>) -> Self {
            Self(StdMutex::new(now))
        }

        fn advance_seconds(&self, seconds: i64) {
            let mut guard = self.0.lock().expect("clock mutex");
            *guard += TimeDelta::seconds(seconds);
        }
    }

    impl Clock for MutableClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            *self.0.lock().expect("clock mutex")
        }
    }

    #[fixture]
    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().expect("valid timestamp")
    }

    #[rstest]
    fn allows_up_to_the_policy_maximum(start: DateTime<Utc>) {
        let limiter = RateLimiter::new(Arc::new(MutableClock::new(start)));
        let user = Uuid::new_v4();

        for _ in 0..RateLimitAction::CheckIn.policy().max {
            assert!(limiter.check(RateLimitAction::CheckIn, user).is_allowed());
        }
        let denied = limiter.check(RateLimitAction::CheckIn, user);
        assert!(matches!(denied, RateLimitDecision::Denied { wait } if wait.as_secs() > 0));
    }

    #[rstest]
    fn window_resets_after_it_elapses(start: DateTime<Utc>) {
        let clock = Arc::new(MutableClock::new(start));
        let limiter = RateLimiter::new(clock.clone());
        let user = Uuid::new_v4();

        for _ in 0..RateLimitAction::Profile.policy().max {
            assert!(limiter.check(RateLimitAction::Profile, user).is_allowed());
        }
        assert!(!limiter.check(RateLimitAction::Profile, user).is_allowed());

        clock.advance_seconds(61);
        assert!(limiter.check(RateLimitAction::Profile, user).is_allowed());
    }

    #[rstest]
    fn wait_time_reflects_remaining_window(start: DateTime<Utc>) {
        let clock = Arc::new(MutableClock::new(start));
        let limiter = RateLimiter::new(clock.clone());
        let user = Uuid::new_v4();

        for _ in 0..RateLimitAction::Rating.policy().max {
            limiter.check(RateLimitAction::Rating, user);
        }
        clock.advance_seconds(40);
        let decision = limiter.check(RateLimitAction::Rating, user);
        match decision {
            RateLimitDecision::Denied { wait } => assert_eq!(wait.as_secs(), 20),
            RateLimitDecision::Allowed => panic!("expected denial"),
        }
    }

    #[rstest]
    fn users_and_actions_are_tracked_independently(start: DateTime<Utc>) {
        let limiter = RateLimiter::new(Arc::new(MutableClock::new(start)));
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        for _ in 0..RateLimitAction::Profile.policy().max {
            assert!(limiter.check(RateLimitAction::Profile, alice).is_allowed());
        }
        assert!(!limiter.check(RateLimitAction::Profile, alice).is_allowed());
        // Other users and other actions for the same user are unaffected.
        assert!(limiter.check(RateLimitAction::Profile, bob).is_allowed());
        assert!(limiter.check(RateLimitAction::Rating, alice).is_allowed());
    }
}
