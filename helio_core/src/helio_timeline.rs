//! The "WHEN" Engine - Cyclic Keyframe Timeline
//!
//! Answers "what direction at cyclic time t" by bracketing a sorted,
//! implicitly cyclic sequence of keyframes:
//! - Built once from sparse hour-keyed angle pairs, immutable afterwards
//! - Closes the loop by duplicating the earliest direction at the cycle
//!   duration, so interpolation never runs past the last sample
//! - `bracket(t)` handles the wrap segment and degenerate zero-length
//!   spans without ever dividing by zero

use crate::vecmath::{angles_to_direction, Direction};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Length of the standard cycle in hours.
pub const HOURS_PER_CYCLE: f64 = 24.0;

/// A `[vertical, horizontal]` angle pair in radians, as found in the raw
/// keyframe data.
pub type AnglePair = [f64; 2];

/// Errors raised while constructing a timeline.
///
/// These are the only hard failures in the crate: a timeline that cannot
/// be built indicates a configuration error that must surface before
/// animation starts, never mid-tick.
#[derive(Debug, Error)]
pub enum TimelineError {
    /// A segment with zero keyframes is invalid
    #[error("timeline has no keyframes")]
    EmptyTimeline,

    /// The cyclic domain must have positive length
    #[error("cycle duration must be positive, got {0}")]
    NonPositiveCycle(f64),

    /// An hour key in the raw data could not be parsed as a number
    #[error("unparseable hour key: {0:?}")]
    BadHourKey(String),

    /// An hour fell outside the half-open cyclic domain
    #[error("hour {hour} outside cyclic domain [0, {cycle})")]
    HourOutOfRange { hour: f64, cycle: f64 },

    /// Two keyframes share the same time
    #[error("duplicate keyframe time {0}")]
    DuplicateTime(f64),
}

impl TimelineError {
    /// Creates a bad-hour-key error.
    pub fn bad_key(key: impl Into<String>) -> Self {
        Self::BadHourKey(key.into())
    }
}

/// A known (time, direction) sample defining the animated path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Keyframe {
    /// Cyclic time in hours, `[0, cycle_duration)` for real samples; the
    /// closing keyframe sits at exactly `cycle_duration`
    pub time: f64,

    /// Unit direction at that time
    pub direction: Direction,
}

/// Result of a cyclic bracketing lookup.
#[derive(Debug, Clone, Copy)]
pub struct Bracket {
    /// Keyframe at or before `t` under cyclic ordering
    pub prev: Keyframe,

    /// First keyframe strictly after `t`, wrapping to the start of the
    /// cycle when `t` exceeds the last real sample
    pub next: Keyframe,

    /// Normalized position in `[0, 1]` between `prev` and `next`,
    /// monotonic even across the wrap boundary
    pub local_t: f64,
}

/// An ordered, implicitly cyclic sequence of keyframes for one segment.
///
/// Bracketing convention: `next` is the first keyframe with `time`
/// strictly greater than `t`, so at an exact keyframe time the keyframe
/// itself is `prev` with `local_t = 0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
    /// Sorted ascending by time; the last entry is the cyclic closure at
    /// `cycle_duration`, duplicating the first entry's direction
    keyframes: Vec<Keyframe>,

    /// Length of the cyclic domain in hours
    cycle_duration: f64,
}

impl Timeline {
    /// Builds a timeline from `(hour, [vertical, horizontal])` samples.
    ///
    /// Samples may arrive in any order and be irregularly spaced; at
    /// least one is required. The loop is closed by appending the first
    /// sample's direction at `cycle_duration`.
    pub fn build(
        samples: impl IntoIterator<Item = (f64, AnglePair)>,
        cycle_duration: f64,
    ) -> Result<Self, TimelineError> {
        if cycle_duration <= 0.0 {
            return Err(TimelineError::NonPositiveCycle(cycle_duration));
        }

        let mut keyframes: Vec<Keyframe> = Vec::new();
        for (hour, [vertical, horizontal]) in samples {
            if !hour.is_finite() || hour < 0.0 || hour >= cycle_duration {
                return Err(TimelineError::HourOutOfRange {
                    hour,
                    cycle: cycle_duration,
                });
            }
            keyframes.push(Keyframe {
                time: hour,
                direction: angles_to_direction(vertical, horizontal),
            });
        }

        if keyframes.is_empty() {
            return Err(TimelineError::EmptyTimeline);
        }

        keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
        for pair in keyframes.windows(2) {
            if pair[0].time == pair[1].time {
                return Err(TimelineError::DuplicateTime(pair[0].time));
            }
        }

        // Cyclic closure: the point at the cycle duration equals the
        // point at the earliest sample.
        let closing = Keyframe {
            time: cycle_duration,
            direction: keyframes[0].direction,
        };
        keyframes.push(closing);

        Ok(Self {
            keyframes,
            cycle_duration,
        })
    }

    /// Builds a 24-hour timeline from stringified hour keys, the format
    /// of the external raw-angle JSON contract.
    pub fn from_raw(segment: &BTreeMap<String, AnglePair>) -> Result<Self, TimelineError> {
        let mut samples = Vec::with_capacity(segment.len());
        for (key, angles) in segment {
            let hour: f64 = key
                .parse()
                .map_err(|_| TimelineError::bad_key(key.clone()))?;
            samples.push((hour, *angles));
        }
        Self::build(samples, HOURS_PER_CYCLE)
    }

    /// Length of the cyclic domain in hours.
    #[inline]
    pub fn cycle_duration(&self) -> f64 {
        self.cycle_duration
    }

    /// All keyframes including the cyclic closure.
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Number of real samples, excluding the cyclic closure.
    pub fn sample_count(&self) -> usize {
        self.keyframes.len() - 1
    }

    /// Brackets a cyclic time between two keyframes.
    ///
    /// `t` is reduced modulo the cycle duration first, so any finite
    /// input is accepted. The span between `prev` and `next` is
    /// `next.time - prev.time` unless that is non-positive, in which case
    /// the wrap segment's span `cycle - prev.time + next.time` applies.
    /// A zero-length span yields `local_t = 0`.
    pub fn bracket(&self, t: f64) -> Bracket {
        let t = t.rem_euclid(self.cycle_duration);

        let (prev, next) = match self.keyframes.iter().position(|k| k.time > t) {
            Some(0) | None => (
                self.keyframes[self.keyframes.len() - 1],
                self.keyframes[0],
            ),
            Some(i) => (self.keyframes[i - 1], self.keyframes[i]),
        };

        let raw_span = next.time - prev.time;
        let local_t = if raw_span > 0.0 {
            (t - prev.time) / raw_span
        } else {
            let span = self.cycle_duration - prev.time + next.time;
            if span == 0.0 {
                // Degenerate: both keyframes coincide
                0.0
            } else if t >= prev.time {
                (t - prev.time) / span
            } else {
                (self.cycle_duration - prev.time + t) / span
            }
        };

        Bracket {
            prev,
            next,
            local_t,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn three_keyframe_timeline() -> Timeline {
        Timeline::build(
            vec![
                (0.0, [-0.2, -1.0]),
                (6.0, [-0.9, -0.3]),
                (18.0, [-0.4, 0.5]),
            ],
            HOURS_PER_CYCLE,
        )
        .unwrap()
    }

    #[test]
    fn test_build_rejects_empty() {
        let result = Timeline::build(Vec::new(), HOURS_PER_CYCLE);
        assert!(matches!(result, Err(TimelineError::EmptyTimeline)));
    }

    #[test]
    fn test_build_rejects_zero_cycle() {
        let result = Timeline::build(vec![(0.0, [-0.3, 0.1])], 0.0);
        assert!(matches!(result, Err(TimelineError::NonPositiveCycle(_))));
    }

    #[test]
    fn test_build_rejects_out_of_range_hour() {
        let result = Timeline::build(vec![(24.0, [-0.3, 0.1])], HOURS_PER_CYCLE);
        assert!(matches!(result, Err(TimelineError::HourOutOfRange { .. })));
    }

    #[test]
    fn test_build_rejects_duplicate_times() {
        let result = Timeline::build(
            vec![(6.0, [-0.3, 0.1]), (6.0, [-0.5, 0.2])],
            HOURS_PER_CYCLE,
        );
        assert!(matches!(result, Err(TimelineError::DuplicateTime(_))));
    }

    #[test]
    fn test_build_sorts_and_closes_loop() {
        let tl = Timeline::build(
            vec![(18.0, [-0.4, 0.5]), (0.0, [-0.2, -1.0]), (6.0, [-0.9, -0.3])],
            HOURS_PER_CYCLE,
        )
        .unwrap();

        let kfs = tl.keyframes();
        assert_eq!(kfs.len(), 4);
        assert_eq!(tl.sample_count(), 3);
        assert_relative_eq!(kfs[0].time, 0.0);
        assert_relative_eq!(kfs[1].time, 6.0);
        assert_relative_eq!(kfs[2].time, 18.0);
        assert_relative_eq!(kfs[3].time, 24.0);
        // Closure duplicates the earliest direction
        assert_relative_eq!((kfs[3].direction - kfs[0].direction).norm(), 0.0);
    }

    #[test]
    fn test_bracket_interior() {
        let tl = three_keyframe_timeline();
        let b = tl.bracket(9.0);
        assert_relative_eq!(b.prev.time, 6.0);
        assert_relative_eq!(b.next.time, 18.0);
        assert_relative_eq!(b.local_t, 0.25);
    }

    #[test]
    fn test_bracket_wraps_past_last_sample() {
        let tl = three_keyframe_timeline();
        let b = tl.bracket(23.9);
        assert_relative_eq!(b.prev.time, 18.0);
        // The closure at 24 stands in for the wrap to the first keyframe
        assert_relative_eq!(b.next.time, 24.0);
        assert_relative_eq!(
            (b.next.direction - tl.keyframes()[0].direction).norm(),
            0.0
        );
        assert_relative_eq!(b.local_t, (23.9 - 18.0) / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bracket_exact_keyframe_is_prev() {
        // Convention: next is strictly greater, so an exact keyframe time
        // lands on prev with local_t = 0.
        let tl = three_keyframe_timeline();

        let b = tl.bracket(0.0);
        assert_relative_eq!(b.prev.time, 0.0);
        assert_relative_eq!(b.next.time, 6.0);
        assert_relative_eq!(b.local_t, 0.0);

        let b = tl.bracket(6.0);
        assert_relative_eq!(b.prev.time, 6.0);
        assert_relative_eq!(b.next.time, 18.0);
        assert_relative_eq!(b.local_t, 0.0);
    }

    #[test]
    fn test_bracket_reduces_modulo_cycle() {
        let tl = three_keyframe_timeline();
        let a = tl.bracket(9.0);
        let b = tl.bracket(9.0 + HOURS_PER_CYCLE);
        assert_relative_eq!(a.prev.time, b.prev.time);
        assert_relative_eq!(a.local_t, b.local_t, epsilon = 1e-12);
    }

    #[test]
    fn test_bracket_single_keyframe() {
        let tl = Timeline::build(vec![(5.0, [-0.5, 0.2])], HOURS_PER_CYCLE).unwrap();
        // Before the only sample: prev is the closure, span wraps
        let b = tl.bracket(2.0);
        assert_relative_eq!(b.prev.time, 24.0);
        assert_relative_eq!(b.next.time, 5.0);
        assert_relative_eq!(b.local_t, 2.0 / 5.0, epsilon = 1e-12);
        // Direction is constant either way
        assert_relative_eq!((b.prev.direction - b.next.direction).norm(), 0.0);
    }

    #[test]
    fn test_from_raw_parses_hour_keys() {
        let mut raw = BTreeMap::new();
        raw.insert("6".to_string(), [-0.9, -0.3]);
        raw.insert("18.5".to_string(), [-0.4, 0.5]);
        let tl = Timeline::from_raw(&raw).unwrap();
        assert_eq!(tl.sample_count(), 2);
        assert_relative_eq!(tl.keyframes()[1].time, 18.5);
    }

    #[test]
    fn test_from_raw_rejects_bad_key() {
        let mut raw = BTreeMap::new();
        raw.insert("noon".to_string(), [-0.9, -0.3]);
        assert!(matches!(
            Timeline::from_raw(&raw),
            Err(TimelineError::BadHourKey(_))
        ));
    }
}
