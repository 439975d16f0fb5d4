//! Interval algebra for narrative placement.
//!
//! # Responsibility
//! - Represent instants, ongoing intervals and stopped intervals.
//! - Resolve a partial user selection into one concrete `Time`.
//! - Provide duration and membership helpers used by the conflict resolver.
//!
//! # Invariants
//! - "Now" is always passed in by the caller; nothing here reads the clock
//!   except `now_ms`, which callers use at the boundary.
//! - Membership is exclusive of the interval start and inclusive of its stop,
//!   so back-to-back intervals never share an instant.

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Point in time as epoch milliseconds.
pub type Timestamp = i64;

/// Returns the current wall-clock time in epoch milliseconds.
///
/// Falls back to `0` when the system clock is before the unix epoch.
pub fn now_ms() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Closed interval with both ends fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoppedInterval {
    pub start: Timestamp,
    pub stop: Timestamp,
}

/// Resolved time of a narrative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Time {
    /// Zero-length point event.
    Instant { start: Timestamp },
    /// Started and still in progress.
    Ongoing { start: Timestamp },
    /// Started and finished.
    Stopped(StoppedInterval),
}

/// Partial time input: any two of start/duration/stop, or fewer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSelection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Timestamp>,
    /// Length in milliseconds.
    #[serde(
        default,
        rename = "duration",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<Timestamp>,
}

impl TimeSelection {
    pub fn starting_at(start: Timestamp) -> Self {
        Self {
            start: Some(start),
            ..Self::default()
        }
    }

    pub fn between(start: Timestamp, stop: Timestamp) -> Self {
        Self {
            start: Some(start),
            stop: Some(stop),
            ..Self::default()
        }
    }
}

impl Time {
    /// Resolves a selection into a concrete time.
    ///
    /// Exactly one rule fires, in this priority order:
    /// 1. start and stop
    /// 2. start and duration
    /// 3. stop and duration
    /// 4. start only (ongoing)
    /// 5. nothing usable (instant at `now`)
    pub fn from_selection(selection: &TimeSelection, now: Timestamp) -> Self {
        match (selection.start, selection.duration_ms, selection.stop) {
            (Some(start), _, Some(stop)) => Self::Stopped(StoppedInterval { start, stop }),
            (Some(start), Some(duration), None) => Self::Stopped(StoppedInterval {
                start,
                stop: start.saturating_add(millis_to_i64(duration)),
            }),
            (None, Some(duration), Some(stop)) => Self::Stopped(StoppedInterval {
                start: stop.saturating_sub(millis_to_i64(duration)),
                stop,
            }),
            (Some(start), None, None) => Self::Ongoing { start },
            _ => Self::Instant { start: now },
        }
    }

    pub fn start(&self) -> Timestamp {
        match self {
            Self::Instant { start } | Self::Ongoing { start } => *start,
            Self::Stopped(interval) => interval.start,
        }
    }

    /// Stop as it would be persisted: `None` only for ongoing time.
    pub fn stop(&self) -> Option<Timestamp> {
        match self {
            Self::Instant { start } => Some(*start),
            Self::Ongoing { .. } => None,
            Self::Stopped(interval) => Some(interval.stop),
        }
    }

    /// Coerces into a stopped interval.
    ///
    /// An explicit `stop` wins, then an existing stop, then `now`. An instant
    /// is a point, so its existing stop is its start.
    pub fn to_stopped_interval(&self, stop: Option<Timestamp>, now: Timestamp) -> StoppedInterval {
        let start = self.start();
        let stop = stop.unwrap_or_else(|| self.stop().unwrap_or(now));
        StoppedInterval { start, stop }
    }

    /// Absolute distance between start and stop (or `now` while ongoing).
    pub fn duration(&self, now: Timestamp) -> Duration {
        let interval = self.to_stopped_interval(None, now);
        Duration::from_millis(interval.stop.abs_diff(interval.start))
    }
}

/// Tests `interval.start < instant <= interval.stop`.
pub fn instant_is_in_interval(instant: Timestamp, interval: &StoppedInterval) -> bool {
    interval.start < instant && instant <= interval.stop
}

fn millis_to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::{instant_is_in_interval, StoppedInterval, Time, TimeSelection};
    use std::time::Duration;

    const NOW: i64 = 1_700_000_000_000;

    #[test]
    fn selection_with_start_and_stop_wins_over_duration() {
        let selection = TimeSelection {
            start: Some(10),
            duration_ms: Some(999),
            stop: Some(20),
        };
        assert_eq!(
            Time::from_selection(&selection, NOW),
            Time::Stopped(StoppedInterval { start: 10, stop: 20 })
        );
    }

    #[test]
    fn selection_with_duration_extends_from_either_end() {
        let forward = TimeSelection {
            start: Some(100),
            duration_ms: Some(50),
            stop: None,
        };
        assert_eq!(
            Time::from_selection(&forward, NOW),
            Time::Stopped(StoppedInterval {
                start: 100,
                stop: 150
            })
        );

        let backward = TimeSelection {
            start: None,
            duration_ms: Some(50),
            stop: Some(100),
        };
        assert_eq!(
            Time::from_selection(&backward, NOW),
            Time::Stopped(StoppedInterval { start: 50, stop: 100 })
        );
    }

    #[test]
    fn selection_falls_back_to_ongoing_then_instant() {
        assert_eq!(
            Time::from_selection(&TimeSelection::starting_at(5), NOW),
            Time::Ongoing { start: 5 }
        );
        assert_eq!(
            Time::from_selection(&TimeSelection::default(), NOW),
            Time::Instant { start: NOW }
        );
        let duration_only = TimeSelection {
            duration_ms: Some(10),
            ..TimeSelection::default()
        };
        assert_eq!(
            Time::from_selection(&duration_only, NOW),
            Time::Instant { start: NOW }
        );
    }

    #[test]
    fn to_stopped_interval_prefers_explicit_stop() {
        let ongoing = Time::Ongoing { start: 1 };
        assert_eq!(
            ongoing.to_stopped_interval(Some(7), NOW),
            StoppedInterval { start: 1, stop: 7 }
        );
        assert_eq!(
            ongoing.to_stopped_interval(None, NOW),
            StoppedInterval { start: 1, stop: NOW }
        );

        let stopped = Time::Stopped(StoppedInterval { start: 1, stop: 3 });
        assert_eq!(
            stopped.to_stopped_interval(None, NOW),
            StoppedInterval { start: 1, stop: 3 }
        );
    }

    #[test]
    fn duration_uses_now_for_ongoing_time() {
        let ongoing = Time::Ongoing { start: NOW - 60_000 };
        assert_eq!(ongoing.duration(NOW), Duration::from_secs(60));
        assert_eq!(Time::Instant { start: NOW }.duration(NOW), Duration::ZERO);
    }

    #[test]
    fn membership_excludes_start_and_includes_stop() {
        let interval = StoppedInterval { start: 10, stop: 20 };
        assert!(!instant_is_in_interval(10, &interval));
        assert!(instant_is_in_interval(11, &interval));
        assert!(instant_is_in_interval(20, &interval));
        assert!(!instant_is_in_interval(21, &interval));
    }

    #[test]
    fn selection_wire_shape_uses_duration_key() {
        let selection: TimeSelection =
            serde_json::from_str(r#"{"start": 1, "duration": 60000}"#).unwrap();
        assert_eq!(selection.duration_ms, Some(60_000));
        assert_eq!(selection.stop, None);
    }
}
