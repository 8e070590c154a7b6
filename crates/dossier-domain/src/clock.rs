//! Wall-clock source, injectable so timestamps are reproducible in tests

use chrono::{Duration, Local, NaiveDateTime};
use std::sync::atomic::{AtomicU32, Ordering};

/// Format of every timestamp in the output document
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Source of local wall-clock time
pub trait Clock: Send + Sync {
    /// Current local time
    fn now(&self) -> NaiveDateTime;
}

/// Format a timestamp for the output document
pub fn format_timestamp(at: &NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Seconds between two instants, rounded to 3 decimals
pub fn elapsed_seconds(from: &NaiveDateTime, to: &NaiveDateTime) -> f64 {
    let elapsed = *to - *from;
    let micros = elapsed
        .num_microseconds()
        .unwrap_or_else(|| elapsed.num_milliseconds().saturating_mul(1000))
        .max(0);
    (micros as f64 / 1000.0).round() / 1000.0
}

/// The machine's local clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Deterministic clock advancing by a fixed step on every read
///
/// # Examples
///
/// ```
/// use chrono::{Duration, NaiveDate};
/// use dossier_domain::clock::{Clock, FixedClock, format_timestamp};
///
/// let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();
/// let clock = FixedClock::new(start, Duration::seconds(2));
///
/// assert_eq!(format_timestamp(&clock.now()), "2024-05-01 09:00:00");
/// assert_eq!(format_timestamp(&clock.now()), "2024-05-01 09:00:02");
/// ```
#[derive(Debug)]
pub struct FixedClock {
    start: NaiveDateTime,
    step: Duration,
    reads: AtomicU32,
}

impl FixedClock {
    /// Clock starting at `start`, moving `step` forward per read
    pub fn new(start: NaiveDateTime, step: Duration) -> Self {
        Self {
            start,
            step,
            reads: AtomicU32::new(0),
        }
    }

    /// Clock that always reports `at`
    pub fn frozen(at: NaiveDateTime) -> Self {
        Self::new(at, Duration::zero())
    }

    /// Rewind to the start time
    pub fn reset(&self) {
        self.reads.store(0, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        let n = self.reads.fetch_add(1, Ordering::SeqCst);
        self.start + self.step * n as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap()
    }

    #[test]
    fn test_fixed_clock_steps_and_resets() {
        let clock = FixedClock::new(start(), Duration::milliseconds(1500));
        let a = clock.now();
        let b = clock.now();
        assert_eq!(elapsed_seconds(&a, &b), 1.5);

        clock.reset();
        assert_eq!(clock.now(), start());
    }

    #[test]
    fn test_frozen_clock() {
        let clock = FixedClock::frozen(start());
        assert_eq!(clock.now(), clock.now());
        assert_eq!(format_timestamp(&clock.now()), "2024-01-02 03:04:05");
    }

    #[test]
    fn test_elapsed_never_negative() {
        let later = start() + Duration::seconds(5);
        assert_eq!(elapsed_seconds(&later, &start()), 0.0);
    }

    #[test]
    fn test_elapsed_rounds_to_millis() {
        let to = start() + Duration::microseconds(1_234_567);
        assert_eq!(elapsed_seconds(&start(), &to), 1.235);

        let to = start() + Duration::microseconds(1_234_499);
        assert_eq!(elapsed_seconds(&start(), &to), 1.234);

        let to = start() + Duration::microseconds(999_600);
        assert_eq!(elapsed_seconds(&start(), &to), 1.0);
    }
}
