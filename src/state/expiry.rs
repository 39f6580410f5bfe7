// Countdown display refresh for records carrying an expiry time.
// A single chained one-second tick, re-armed only while a live countdown is
// visible.

#![allow(dead_code)]

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use super::cache::Record;

const TICK_INTERVAL: Duration = Duration::from_millis(1000);

// Unit thresholds in milliseconds, largest first.
const UNITS: [(&str, i64); 5] = [
    ("year", 31_536_000_000),
    ("month", 2_592_000_000),
    ("day", 86_400_000),
    ("hour", 3_600_000),
    ("minute", 60_000),
];

/// Coarse human rendering of the distance from `now` to `target`.
///
/// Anything at or before `now` is `"expired"`. Otherwise the first unit
/// whose threshold the delta clears wins, rounded to the nearest whole
/// count, falling back to seconds. Counts are carried signed so past
/// instants phrase as "N units ago" and future ones as "in N units".
pub fn format_relative_time(target: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = (target - now).num_milliseconds();
    if delta <= 0 {
        return "expired".to_string();
    }
    for (unit, threshold) in UNITS {
        if delta.abs() > threshold {
            return phrase(rounded(delta, threshold), unit);
        }
    }
    phrase(rounded(delta, 1_000), "second")
}

fn rounded(delta: i64, unit: i64) -> i64 {
    (delta as f64 / unit as f64).round() as i64
}

fn phrase(count: i64, unit: &str) -> String {
    let n = count.abs();
    let plural = if n == 1 { "" } else { "s" };
    if count < 0 {
        format!("{n} {unit}{plural} ago")
    } else {
        format!("in {n} {unit}{plural}")
    }
}

/// Per-record countdown display state, keyed off the record in its tab.
#[derive(Debug, Clone, Default)]
pub struct Countdown {
    pub label: String,
    pub expired: bool,
    pub controls_locked: bool,
}

/// Recompute countdown state for every timed record in the visible window.
///
/// Expired records are flagged and, where the collection's policy says so,
/// their action controls are locked; locking again on later ticks is
/// harmless. Returns whether any live countdown remains, which decides
/// whether the scheduler re-arms.
pub fn refresh_countdowns<T: Record>(
    visible: &[T],
    rows: &mut HashMap<T::Key, Countdown>,
    now: DateTime<Utc>,
) -> bool {
    let mut any_live = false;
    for record in visible {
        let expiry = record.expiry_time();
        if expiry <= 0 {
            continue;
        }
        let Some(target) = DateTime::from_timestamp(expiry, 0) else {
            continue;
        };
        let label = format_relative_time(target, now);
        let row = rows.entry(record.key().clone()).or_default();
        if label == "expired" {
            row.expired = true;
            if T::LOCK_ON_EXPIRY {
                row.controls_locked = true;
            }
        } else {
            any_live = true;
        }
        row.label = label;
    }
    any_live
}

/// Self-re-arming one-second refresher.
///
/// Not persistent: whoever renders a view containing a timed record arms it,
/// and each consumed tick is only chained into the next one while a live
/// countdown is still visible. Delays are fixed 1000 ms relative to the
/// previous tick's completion, not aligned to wall-clock seconds; output
/// granularity is minutes and coarser, so drift does not show.
#[derive(Debug, Default)]
pub struct ExpiryScheduler {
    deadline: Option<Instant>,
}

impl ExpiryScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule the next tick one interval from `now`. Arming while a tick
    /// is already pending keeps the earlier deadline.
    pub fn arm(&mut self, now: Instant) {
        if self.deadline.is_none() {
            self.deadline = Some(now + TICK_INTERVAL);
        }
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Consume the pending tick once its delay has elapsed. The scheduler is
    /// disarmed afterwards; the caller re-arms it only if the tick's work
    /// found a live countdown.
    pub fn take_tick(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    #[derive(Debug, Clone)]
    struct Timed {
        id: i64,
        expiry: i64,
    }

    impl Record for Timed {
        type Key = i64;

        fn key(&self) -> &i64 {
            &self.id
        }

        fn expiry_time(&self) -> i64 {
            self.expiry
        }

        const LOCK_ON_EXPIRY: bool = true;
    }

    #[derive(Debug, Clone)]
    struct Unlocked {
        id: i64,
        expiry: i64,
    }

    impl Record for Unlocked {
        type Key = i64;

        fn key(&self) -> &i64 {
            &self.id
        }

        fn expiry_time(&self) -> i64 {
            self.expiry
        }

        const LOCK_ON_EXPIRY: bool = false;
    }

    fn at(now: DateTime<Utc>, offset_ms: i64) -> DateTime<Utc> {
        now + TimeDelta::milliseconds(offset_ms)
    }

    #[test]
    fn test_format_rounds_to_nearest_unit() {
        let now = Utc::now();
        assert_eq!(format_relative_time(at(now, 90_000), now), "in 2 minutes");
        assert_eq!(format_relative_time(at(now, 60_001), now), "in 1 minute");
        assert_eq!(
            format_relative_time(at(now, 2 * 3_600_000), now),
            "in 2 hours"
        );
        assert_eq!(
            format_relative_time(at(now, 3 * 86_400_000), now),
            "in 3 days"
        );
        assert_eq!(
            format_relative_time(at(now, 40_000_000_000), now),
            "in 1 year"
        );
    }

    #[test]
    fn test_format_falls_back_to_seconds() {
        let now = Utc::now();
        assert_eq!(format_relative_time(at(now, 30_000), now), "in 30 seconds");
        assert_eq!(format_relative_time(at(now, 1_000), now), "in 1 second");
    }

    #[test]
    fn test_format_expired_at_or_before_now() {
        let now = Utc::now();
        assert_eq!(format_relative_time(at(now, -1), now), "expired");
        assert_eq!(format_relative_time(now, now), "expired");
    }

    #[test]
    fn test_refresh_reports_live_countdowns() {
        // Whole-second clock: expiry timestamps carry no sub-second part.
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let visible = vec![
            Timed {
                id: 1,
                expiry: now.timestamp() + 3601,
            },
            Timed { id: 2, expiry: 0 },
        ];
        let mut rows = HashMap::new();

        assert!(refresh_countdowns(&visible, &mut rows, now));
        assert_eq!(rows[&1].label, "in 1 hour");
        assert!(!rows[&1].expired);
        // Untimed records get no countdown row.
        assert!(!rows.contains_key(&2));
    }

    #[test]
    fn test_refresh_locks_controls_once_expired() {
        let now = Utc::now();
        let visible = vec![Timed {
            id: 1,
            expiry: now.timestamp() - 10,
        }];
        let mut rows = HashMap::new();

        assert!(!refresh_countdowns(&visible, &mut rows, now));
        assert_eq!(rows[&1].label, "expired");
        assert!(rows[&1].expired);
        assert!(rows[&1].controls_locked);

        // Repeating the tick is idempotent.
        assert!(!refresh_countdowns(&visible, &mut rows, now));
        assert!(rows[&1].controls_locked);
    }

    #[test]
    fn test_refresh_respects_lock_policy() {
        let now = Utc::now();
        let visible = vec![Unlocked {
            id: 1,
            expiry: now.timestamp() - 10,
        }];
        let mut rows = HashMap::new();

        refresh_countdowns(&visible, &mut rows, now);
        assert!(rows[&1].expired);
        assert!(!rows[&1].controls_locked);
    }

    #[test]
    fn test_scheduler_chains_ticks_until_all_expired() {
        let start = Instant::now();
        let mut scheduler = ExpiryScheduler::new();

        scheduler.arm(start);
        assert!(scheduler.is_armed());
        // Arming again does not push the deadline out.
        scheduler.arm(start + Duration::from_millis(500));
        assert!(!scheduler.take_tick(start + Duration::from_millis(900)));
        assert!(scheduler.take_tick(start + Duration::from_millis(1000)));
        assert!(!scheduler.is_armed());

        // Once every visible countdown has passed, the tick's work reports
        // no live rows and the scheduler stays disarmed.
        let now = Utc::now();
        let visible = vec![Timed {
            id: 1,
            expiry: now.timestamp() - 1,
        }];
        let mut rows = HashMap::new();
        if refresh_countdowns(&visible, &mut rows, now) {
            scheduler.arm(start + Duration::from_millis(1000));
        }
        assert!(!scheduler.is_armed());
    }
}
