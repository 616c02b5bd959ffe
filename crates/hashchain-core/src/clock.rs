use std::time::{SystemTime, UNIX_EPOCH};

/// Timestamp source for block construction.
///
/// Injectable so tests can pin timestamps and assert exact digests; the
/// wall clock is only reached through this seam.
pub trait Clock {
    /// Seconds since the Unix epoch.
    fn now(&self) -> u64;
}

/// Wall clock, second resolution.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_secs()
    }
}

/// Always reports the same instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_monotonic_enough() {
        let a = SystemClock.now();
        let b = SystemClock.now();
        assert!(b >= a);
        assert!(a > 1_600_000_000);
    }

    #[test]
    fn fixed_clock_is_fixed() {
        let clock = FixedClock(1_600_000_000);
        assert_eq!(clock.now(), 1_600_000_000);
        assert_eq!(clock.now(), clock.now());
    }
}
