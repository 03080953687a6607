//! The "MEMORY" Engine - Bounded Fading Trail History
//!
//! Maintains a rolling history of one segment's recent positions for
//! trail rendering:
//! - Points enter at the tail, leave only from the head (a true queue)
//! - Dual eviction: age-based (older than the fade window) and
//!   capacity-based (buffer beyond its point budget), both every tick
//! - Snapshots annotate each retained point with a clamped normalized
//!   age for fade-out intensity

use crate::vecmath::Direction;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A single visited position with its wall-clock timestamp.
///
/// The position is whatever the active render target produced: a raw
/// unit direction for the sphere, or a projected plane/torus/cylinder
/// coordinate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrailPoint {
    pub position: Direction,
    pub timestamp_ms: f64,
}

/// A retained point annotated with its normalized age.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrailSample {
    pub position: Direction,

    /// `clamp((now - timestamp) / fade_window, 0, 1)`; 0 is freshly
    /// visited, 1 is fully faded
    pub age: f64,
}

/// Time-ascending queue of recently visited positions.
///
/// Owned exclusively by its segment. The caller's tick ordering supplies
/// monotonically non-decreasing timestamps; the buffer does not verify
/// this.
#[derive(Debug, Clone, Default)]
pub struct TrailBuffer {
    points: VecDeque<TrailPoint>,
}

impl TrailBuffer {
    /// Creates an empty trail.
    pub fn new() -> Self {
        Self {
            points: VecDeque::new(),
        }
    }

    /// Appends a position at the tail.
    pub fn push(&mut self, position: Direction, now_ms: f64) {
        self.points.push_back(TrailPoint {
            position,
            timestamp_ms: now_ms,
        });
    }

    /// Removes expired points from the head, then trims to capacity.
    ///
    /// Age eviction drops points strictly older than the fade window;
    /// capacity eviction then drops the oldest points until the length
    /// is at most `max_points`. Head-removal only.
    pub fn evict(&mut self, now_ms: f64, fade_window_ms: f64, max_points: usize) {
        while let Some(head) = self.points.front() {
            if now_ms - head.timestamp_ms > fade_window_ms {
                self.points.pop_front();
            } else {
                break;
            }
        }
        while self.points.len() > max_points {
            self.points.pop_front();
        }
    }

    /// Reports every retained point with its clamped normalized age.
    ///
    /// The age is for fade-out intensity only; eviction compares raw
    /// ages against the window, never this ratio.
    pub fn snapshot(&self, now_ms: f64, fade_window_ms: f64) -> Vec<TrailSample> {
        self.points
            .iter()
            .map(|p| TrailSample {
                position: p.position,
                age: ((now_ms - p.timestamp_ms) / fade_window_ms).clamp(0.0, 1.0),
            })
            .collect()
    }

    /// Number of retained points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when no points are retained.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Discards all points.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Iterates over retained points, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &TrailPoint> {
        self.points.iter()
    }
}
