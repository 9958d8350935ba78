//! Millisecond readings of a [`tick::Clock`]
//!
//! Every expiry decision in haul-cache reads "now" through a `tick::Clock`.
//! Production code uses [`system_clock`]; tests build a clock from a
//! `tick::ClockControl` and move time forward by hand.

use std::time::{Duration, SystemTime};

use tick::Clock;
use tick::runtime::InactiveClock;

/// Convert a duration to whole milliseconds, saturating at `u64::MAX`
pub fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Clock backed by the system time
///
/// Works outside an async runtime. Only the clock's time readings are used,
/// so its timer driver is not kept.
pub fn system_clock() -> Clock {
    let (clock, _driver) = InactiveClock::default().activate();
    clock
}

/// Current time of `clock` in milliseconds since the Unix epoch
///
/// Times before the epoch read as zero.
///
/// ```
/// use std::time::Duration;
/// use haul_cache_core::now_millis;
/// use tick::ClockControl;
///
/// let control = ClockControl::new_at(std::time::SystemTime::UNIX_EPOCH + Duration::from_millis(1_000));
/// let clock = control.to_clock();
///
/// control.advance(Duration::from_secs(2));
/// assert_eq!(now_millis(&clock), 3_000);
/// ```
pub fn now_millis(clock: &Clock) -> u64 {
    clock
        .system_time()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(duration_millis)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tick::ClockControl;

    #[test]
    fn test_system_clock_reads_wall_time() {
        let clock = system_clock();
        let first = now_millis(&clock);
        let second = now_millis(&clock);
        assert!(first > 0);
        assert!(second + 1_000 >= first);
    }

    #[test]
    fn test_controlled_clock_advances() {
        let control = ClockControl::new_at(std::time::SystemTime::UNIX_EPOCH + Duration::from_millis(1_000));
        let clock = control.to_clock();
        assert_eq!(now_millis(&clock), 1_000);

        control.advance(Duration::from_millis(250));
        assert_eq!(now_millis(&clock), 1_250);

        control.advance_millis(750);
        assert_eq!(now_millis(&clock), 2_000);
    }

    #[test]
    fn test_clones_share_time() {
        let control = ClockControl::new();
        let a = control.to_clock();
        let b = a.clone();

        control.advance(Duration::from_secs(5));
        assert_eq!(now_millis(&a), 5_000);
        assert_eq!(now_millis(&b), 5_000);
    }

    #[test]
    fn test_duration_millis_saturates() {
        assert_eq!(duration_millis(Duration::from_millis(42)), 42);
        assert_eq!(duration_millis(Duration::MAX), u64::MAX);
    }
}
