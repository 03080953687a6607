//! Segment Orchestrator - One Shared Clock, N Independent Segments
//!
//! Drives every segment from a single cycle clock, producing one
//! interpolated direction, one trail update, and one projected position
//! per segment per tick. Pause freezes the clock's elapsed offset;
//! resume shifts the start time so the cyclic position continues
//! seamlessly. Stop is terminal and discards all segment state.

use crate::helio_arc;
use crate::helio_project::{self, ProjectionGeometry, RenderTarget};
use crate::helio_timeline::{Timeline, TimelineError, HOURS_PER_CYCLE};
use crate::helio_trail::{TrailBuffer, TrailSample};
use crate::registry::CombinedDataset;
use crate::vecmath::Direction;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Segment colors cycled through in dataset order.
const PALETTE: [[f32; 3]; 6] = [
    [0.98, 0.80, 0.25],
    [0.95, 0.45, 0.22],
    [0.38, 0.68, 0.93],
    [0.55, 0.85, 0.45],
    [0.80, 0.45, 0.88],
    [0.90, 0.90, 0.90],
];

/// Overlay segments render dimmer than the main path.
const OVERLAY_DIM: f32 = 0.55;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Configuration for one visualization variant.
///
/// The near-duplicate sphere/plane/torus/cylinder variants share this
/// one core and differ only in these parameters plus the projection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VariantConfig {
    /// Trail fade window in milliseconds (default: 6400)
    pub fade_window_ms: f64,

    /// Trail capacity in points (default: 3600)
    pub max_trail_points: usize,

    /// Animation speed in cycle hours per wall-clock millisecond
    /// (default: 0.0004, one 24-hour cycle per minute)
    pub animation_speed: f64,

    /// Active render target
    pub target: RenderTarget,

    /// Static geometry for the ring-shaped targets
    pub geometry: ProjectionGeometry,
}

impl VariantConfig {
    fn manifold(target: RenderTarget) -> Self {
        Self {
            fade_window_ms: 6400.0,
            max_trail_points: 3600,
            animation_speed: HOURS_PER_CYCLE / 60_000.0,
            target,
            geometry: ProjectionGeometry::default(),
        }
    }

    /// Unit-sphere variant.
    pub fn sphere() -> Self {
        Self::manifold(RenderTarget::Sphere)
    }

    /// Stereographic plane variant.
    pub fn plane() -> Self {
        Self::manifold(RenderTarget::Plane)
    }

    /// Time-ring torus variant.
    pub fn torus() -> Self {
        Self::manifold(RenderTarget::Torus)
    }

    /// Shell cylinder variant.
    pub fn cylinder() -> Self {
        Self::manifold(RenderTarget::Cylinder)
    }

    /// The original card demo: shorter trail, one cycle every 20
    /// seconds.
    pub fn card_demo() -> Self {
        Self {
            fade_window_ms: 2400.0,
            max_trail_points: 900,
            animation_speed: HOURS_PER_CYCLE / 20_000.0,
            target: RenderTarget::Sphere,
            geometry: ProjectionGeometry::default(),
        }
    }
}

impl Default for VariantConfig {
    fn default() -> Self {
        Self::sphere()
    }
}

// ============================================================================
// CYCLE CLOCK
// ============================================================================

/// The single shared scalar driving all segments: elapsed wall-clock
/// time, scaled, reduced modulo the cycle duration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CycleClock {
    /// Wall-clock origin in milliseconds; shifted on resume
    start_time_ms: f64,

    /// Frozen elapsed milliseconds while paused
    pause_elapsed_ms: Option<f64>,

    /// Cycle hours per wall-clock millisecond
    speed: f64,

    /// Length of the cyclic domain in hours
    cycle_duration: f64,
}

impl CycleClock {
    /// Creates a clock starting at the given wall-clock origin.
    pub fn new(
        start_time_ms: f64,
        speed: f64,
        cycle_duration: f64,
    ) -> Result<Self, TimelineError> {
        if cycle_duration <= 0.0 {
            return Err(TimelineError::NonPositiveCycle(cycle_duration));
        }
        Ok(Self {
            start_time_ms,
            pause_elapsed_ms: None,
            speed,
            cycle_duration,
        })
    }

    /// Current cyclic time in `[0, cycle_duration)`.
    pub fn cycle_time(&self, now_ms: f64) -> f64 {
        let elapsed = match self.pause_elapsed_ms {
            Some(frozen) => frozen,
            None => now_ms - self.start_time_ms,
        };
        (elapsed * self.speed).rem_euclid(self.cycle_duration)
    }

    /// Freezes the elapsed time. No-op when already paused.
    pub fn pause(&mut self, now_ms: f64) {
        if self.pause_elapsed_ms.is_none() {
            self.pause_elapsed_ms = Some(now_ms - self.start_time_ms);
        }
    }

    /// Recomputes the start time so the cyclic position continues where
    /// it froze. No-op when not paused.
    pub fn resume(&mut self, now_ms: f64) {
        if let Some(frozen) = self.pause_elapsed_ms.take() {
            self.start_time_ms = now_ms - frozen;
        }
    }

    /// True while the elapsed time is frozen.
    pub fn is_paused(&self) -> bool {
        self.pause_elapsed_ms.is_some()
    }

    /// Rebases the clock's origin, e.g. on the first tick of a session.
    pub fn restart(&mut self, now_ms: f64) {
        self.start_time_ms = now_ms;
        self.pause_elapsed_ms = None;
    }
}

// ============================================================================
// SEGMENT
// ============================================================================

/// One independently animated direction path.
#[derive(Debug, Clone)]
pub struct Segment {
    /// Unique identifier for this segment instance
    pub id: Uuid,

    /// Display label (path/segment name from the dataset)
    pub label: String,

    /// RGB render color
    pub color: [f32; 3],

    /// Immutable keyframe timeline
    pub timeline: Timeline,

    /// Rolling trail history, owned exclusively by this segment
    pub trail: TrailBuffer,

    /// True when the segment came from an overlay path
    pub overlay: bool,
}

impl Segment {
    /// Creates a segment with a fresh id and empty trail.
    pub fn new(
        label: impl Into<String>,
        color: [f32; 3],
        timeline: Timeline,
        overlay: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            color,
            timeline,
            trail: TrailBuffer::new(),
            overlay,
        }
    }
}

// ============================================================================
// PER-TICK OUTPUT
// ============================================================================

/// What one segment produced in one tick, handed to the rendering
/// collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentFrame {
    pub segment_id: Uuid,
    pub label: String,
    pub color: [f32; 3],

    /// Cyclic time this frame was computed at
    pub cycle_time: f64,

    /// Interpolated unit direction
    pub direction: Direction,

    /// Direction projected onto the active render target
    pub position: Direction,

    /// Trail positions with normalized fade ages, oldest first
    pub trail: Vec<TrailSample>,
}

/// Orchestrator lifecycle: idle before the first tick, then running,
/// with pause/resume in between; stop is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Idle,
    Running,
    Paused,
    Stopped,
}

// ============================================================================
// ORCHESTRATOR
// ============================================================================

/// Drives N independent segments from one shared cycle clock.
///
/// Single-threaded and tick-synchronous: every mutation of timeline,
/// trail and clock state happens inside [`Orchestrator::tick`], which
/// completes fully (including trail eviction) before the host schedules
/// the next frame.
#[derive(Debug)]
pub struct Orchestrator {
    segments: Vec<Segment>,
    clock: CycleClock,
    config: VariantConfig,
    state: SessionState,
}

impl Orchestrator {
    /// Creates an orchestrator over prebuilt segments.
    ///
    /// The clock starts idle; the first tick rebases it to the tick's
    /// wall-clock timestamp.
    pub fn new(segments: Vec<Segment>, config: VariantConfig) -> Result<Self, TimelineError> {
        let clock = CycleClock::new(0.0, config.animation_speed, HOURS_PER_CYCLE)?;
        Ok(Self {
            segments,
            clock,
            config,
            state: SessionState::Idle,
        })
    }

    /// Builds segments from a combined dataset, assigning palette
    /// colors in order (overlay segments dimmed).
    pub fn from_dataset(
        dataset: &CombinedDataset,
        config: VariantConfig,
    ) -> Result<Self, TimelineError> {
        if dataset.is_empty() {
            return Err(TimelineError::EmptyTimeline);
        }

        let mut segments = Vec::with_capacity(dataset.len());
        for (i, entry) in dataset.entries.iter().enumerate() {
            let timeline = Timeline::from_raw(&entry.keyframes)?;
            let mut color = PALETTE[i % PALETTE.len()];
            if entry.overlay {
                for channel in &mut color {
                    *channel *= OVERLAY_DIM;
                }
            }
            segments.push(Segment::new(&entry.label, color, timeline, entry.overlay));
        }
        Self::new(segments, config)
    }

    /// Advances the session by one frame.
    ///
    /// Brackets the shared cyclic time in each segment's timeline,
    /// interpolates the current direction, projects it for the active
    /// target, then pushes and evicts the segment's trail. Returns one
    /// frame per segment; empty while paused or stopped.
    pub fn tick(&mut self, now_ms: f64) -> Vec<SegmentFrame> {
        match self.state {
            SessionState::Paused | SessionState::Stopped => return Vec::new(),
            SessionState::Idle => {
                self.clock.restart(now_ms);
                self.state = SessionState::Running;
            }
            SessionState::Running => {}
        }

        let cycle_time = self.clock.cycle_time(now_ms);
        let mut frames = Vec::with_capacity(self.segments.len());

        for segment in &mut self.segments {
            let direction = helio_arc::direction_at(&segment.timeline, cycle_time);
            let position = helio_project::project(
                self.config.target,
                cycle_time,
                segment.timeline.cycle_duration(),
                direction,
                &self.config.geometry,
            );

            segment.trail.push(position, now_ms);
            segment.trail.evict(
                now_ms,
                self.config.fade_window_ms,
                self.config.max_trail_points,
            );

            frames.push(SegmentFrame {
                segment_id: segment.id,
                label: segment.label.clone(),
                color: segment.color,
                cycle_time,
                direction,
                position,
                trail: segment
                    .trail
                    .snapshot(now_ms, self.config.fade_window_ms),
            });
        }

        frames
    }

    /// Freezes the clock and halts ticks. Only valid while running.
    pub fn pause(&mut self, now_ms: f64) {
        if self.state == SessionState::Running {
            self.clock.pause(now_ms);
            self.state = SessionState::Paused;
        }
    }

    /// Continues the cycle seamlessly from the frozen position.
    pub fn resume(&mut self, now_ms: f64) {
        if self.state == SessionState::Paused {
            self.clock.resume(now_ms);
            self.state = SessionState::Running;
        }
    }

    /// Terminal stop: no further ticks, all segment state discarded.
    /// A fresh orchestrator must be constructed to restart.
    pub fn stop(&mut self) {
        self.segments.clear();
        self.state = SessionState::Stopped;
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The segments being driven.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The active variant configuration.
    pub fn config(&self) -> &VariantConfig {
        &self.config
    }

    /// The cyclic time the clock would report at `now_ms`.
    pub fn cycle_time(&self, now_ms: f64) -> f64 {
        self.clock.cycle_time(now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{combine, RawPath};
    use approx::assert_relative_eq;
    use std::collections::BTreeMap;

    fn two_keyframe_dataset() -> CombinedDataset {
        let mut keyframes = BTreeMap::new();
        keyframes.insert("0".to_string(), [-0.5, 1.9]);
        keyframes.insert("12".to_string(), [-0.3, -1.9]);
        combine(&RawPath::single("arc", keyframes), &[])
    }

    /// Wall-clock milliseconds at which the default speed reaches cyclic
    /// hour `h` (one cycle per minute).
    fn ms_at_hour(h: f64) -> f64 {
        h / (HOURS_PER_CYCLE / 60_000.0)
    }

    #[test]
    fn test_first_tick_rebases_clock() {
        let mut orch =
            Orchestrator::from_dataset(&two_keyframe_dataset(), VariantConfig::sphere()).unwrap();
        assert_eq!(orch.state(), SessionState::Idle);

        // Large first timestamp must still start the cycle at hour 0
        let frames = orch.tick(5_000_000.0);
        assert_eq!(orch.state(), SessionState::Running);
        assert_relative_eq!(frames[0].cycle_time, 0.0);
    }

    #[test]
    fn test_end_to_end_two_keyframe_segment() {
        let mut orch =
            Orchestrator::from_dataset(&two_keyframe_dataset(), VariantConfig::sphere()).unwrap();

        let expected_at_0 = crate::vecmath::angles_to_direction(-0.5, 1.9);
        let expected_at_12 = crate::vecmath::angles_to_direction(-0.3, -1.9);

        let frames = orch.tick(0.0);
        assert_relative_eq!((frames[0].direction - expected_at_0).norm(), 0.0, epsilon = 1e-12);

        let frames = orch.tick(ms_at_hour(12.0));
        assert_relative_eq!(frames[0].cycle_time, 12.0, epsilon = 1e-9);
        assert_relative_eq!(
            (frames[0].direction - expected_at_12).norm(),
            0.0,
            epsilon = 1e-9
        );

        // Half-way through the wrap back: interpolated, unit length,
        // matching neither endpoint
        let frames = orch.tick(ms_at_hour(18.0));
        let d = frames[0].direction;
        assert_relative_eq!(d.norm(), 1.0, epsilon = 1e-12);
        assert!((d - expected_at_0).norm() > 1e-3);
        assert!((d - expected_at_12).norm() > 1e-3);
    }

    #[test]
    fn test_tick_grows_and_bounds_trail() {
        let mut config = VariantConfig::sphere();
        config.max_trail_points = 5;
        let mut orch = Orchestrator::from_dataset(&two_keyframe_dataset(), config).unwrap();

        for frame in 0..20 {
            let frames = orch.tick(frame as f64 * 33.0);
            assert!(frames[0].trail.len() <= 5);
        }
        assert_eq!(orch.segments()[0].trail.len(), 5);
    }

    #[test]
    fn test_pause_freezes_and_resume_continues() {
        let mut orch =
            Orchestrator::from_dataset(&two_keyframe_dataset(), VariantConfig::sphere()).unwrap();
        orch.tick(0.0);

        let frozen_at = ms_at_hour(6.0);
        let frozen_time = orch.cycle_time(frozen_at);
        orch.pause(frozen_at);

        assert_eq!(orch.state(), SessionState::Paused);
        assert!(orch.tick(frozen_at + 10_000.0).is_empty());
        assert_relative_eq!(orch.cycle_time(frozen_at + 10_000.0), frozen_time);

        // Resume much later: cyclic position picks up where it froze
        let resume_at = frozen_at + 60_000.0;
        orch.resume(resume_at);
        assert_relative_eq!(orch.cycle_time(resume_at), frozen_time, epsilon = 1e-9);

        let frames = orch.tick(resume_at);
        assert_relative_eq!(frames[0].cycle_time, frozen_time, epsilon = 1e-9);
    }

    #[test]
    fn test_stop_is_terminal() {
        let mut orch =
            Orchestrator::from_dataset(&two_keyframe_dataset(), VariantConfig::sphere()).unwrap();
        orch.tick(0.0);
        orch.stop();

        assert_eq!(orch.state(), SessionState::Stopped);
        assert!(orch.segments().is_empty());
        assert!(orch.tick(1_000.0).is_empty());

        // Resume cannot revive a stopped session
        orch.resume(2_000.0);
        assert_eq!(orch.state(), SessionState::Stopped);
    }

    #[test]
    fn test_projected_variant_uses_target() {
        let mut orch =
            Orchestrator::from_dataset(&two_keyframe_dataset(), VariantConfig::plane()).unwrap();
        let frames = orch.tick(0.0);

        // Plane frames live at y = 0, distinct from the raw direction
        assert_relative_eq!(frames[0].position.y, 0.0);
        assert!((frames[0].position - frames[0].direction).norm() > 1e-6);
    }

    #[test]
    fn test_from_dataset_rejects_empty() {
        let result = Orchestrator::from_dataset(&CombinedDataset::default(), VariantConfig::sphere());
        assert!(result.is_err());
    }

    #[test]
    fn test_overlay_segments_are_dimmed() {
        let mut keyframes = BTreeMap::new();
        keyframes.insert("0".to_string(), [-0.5, 0.4]);
        let main = RawPath::single("arc", keyframes.clone());
        let overlay = RawPath::single("arc", keyframes);
        let dataset = combine(&main, &[("winter", &overlay)]);

        let orch = Orchestrator::from_dataset(&dataset, VariantConfig::sphere()).unwrap();
        let segments = orch.segments();
        assert_eq!(segments.len(), 2);
        assert!(segments[1].overlay);
        assert!(segments[1].color[0] < segments[0].color[0]);
    }
}
