//! Clock Module
//!
//! The storage engine never reads the system time directly. It asks an injected
//! [`Clock`] for the current instant and works in whole seconds since the Unix
//! epoch.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

// == Clock Trait ==
/// Source of the current instant.
pub trait Clock {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current instant as whole seconds since the Unix epoch.
    ///
    /// Sub-second precision is truncated. Instants before the epoch clamp to 0.
    fn now_secs(&self) -> u64 {
        u64::try_from(self.now().timestamp()).unwrap_or(0)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

// == System Clock ==
/// Wall clock backed by [`Utc::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// == Manual Clock ==
/// Deterministic clock that only moves when told to.
///
/// Clones share the same instant: hand one clone to the store and keep another
/// to drive time forward.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Arc<RwLock<DateTime<Utc>>>,
}

impl ManualClock {
    /// Creates a clock frozen at `instant`.
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            current: Arc::new(RwLock::new(instant)),
        }
    }

    /// Creates a clock frozen at `secs` seconds after the Unix epoch.
    pub fn from_secs(secs: i64) -> Self {
        let instant = Utc.timestamp_opt(secs, 0).single().unwrap_or_default();
        Self::new(instant)
    }

    /// Moves the clock to `instant`.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.write() = instant;
    }

    /// Moves the clock forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        let step = chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::MAX);
        let mut current = self.write();
        *current = current
            .checked_add_signed(step)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
    }

    /// Moves the clock forward by whole seconds.
    pub fn advance_secs(&self, secs: u64) {
        self.advance(Duration::from_secs(secs));
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, DateTime<Utc>> {
        // The guarded value is plain data, so a poisoned lock is still usable.
        self.current.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.read().unwrap_or_else(|e| e.into_inner())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_from_secs() {
        let clock = ManualClock::from_secs(1_000);
        assert_eq!(clock.now_secs(), 1_000);
    }

    #[test]
    fn test_manual_clock_advance_is_shared_between_clones() {
        let clock = ManualClock::from_secs(100);
        let handle = clock.clone();

        handle.advance_secs(6);

        assert_eq!(clock.now_secs(), 106);
        assert_eq!(handle.now_secs(), 106);
    }

    #[test]
    fn test_now_secs_truncates_sub_second_part() {
        let clock = ManualClock::from_secs(10);
        clock.advance(Duration::from_millis(1_999));

        assert_eq!(clock.now_secs(), 11);
    }

    #[test]
    fn test_now_secs_clamps_before_epoch() {
        let clock = ManualClock::from_secs(-50);
        assert_eq!(clock.now_secs(), 0);
    }

    #[test]
    fn test_manual_clock_set() {
        let clock = ManualClock::from_secs(0);
        let instant = Utc.timestamp_opt(42, 0).single().unwrap();

        clock.set(instant);

        assert_eq!(clock.now(), instant);
    }

    #[test]
    fn test_clock_through_reference_and_arc() {
        let clock = ManualClock::from_secs(7);
        assert_eq!((&clock).now_secs(), 7);
        assert_eq!(Arc::new(clock).now_secs(), 7);
    }

    #[test]
    fn test_system_clock_is_after_epoch() {
        assert!(SystemClock.now_secs() > 0);
    }
}
