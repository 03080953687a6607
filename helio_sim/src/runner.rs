//! Session runner - plays scenarios against the core and checks its
//! invariants frame by frame.

use crate::exporter::{ExportFrame, SessionExport};
use crate::scenarios::ScenarioId;
use helio_core::helio_project::TUBE_FRACTION;
use helio_core::{Orchestrator, RenderTarget, SegmentFrame, SessionState};
use tracing::{debug, info};

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct SessionResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether all per-frame checks held
    pub passed: bool,

    /// Frames that produced output (paused frames excluded)
    pub frames_run: u64,

    /// Times the cyclic clock wrapped past the cycle boundary
    pub wrap_count: u64,

    /// Longest trail observed across all segments
    pub max_trail_len: usize,

    /// Largest deviation of an interpolated direction from unit norm
    pub max_unit_deviation: f64,

    /// Cyclic time at the end of the run
    pub final_cycle_time: f64,

    /// Failure message if any
    pub failure_reason: Option<String>,
}

impl SessionResult {
    /// Prints a formatted report to the console.
    pub fn print(&self) {
        println!();
        println!("╔══════════════════════════════════════════════════╗");
        println!("║           HELIOTRAIL SESSION REPORT              ║");
        println!("╠══════════════════════════════════════════════════╣");
        println!("║ Scenario:         {:>28}   ║", self.scenario.name());
        println!("║ Seed:             {:>28}   ║", self.seed);
        println!("║ Frames run:       {:>28}   ║", self.frames_run);
        println!("║ Cycle wraps:      {:>28}   ║", self.wrap_count);
        println!("║ Max trail length: {:>28}   ║", self.max_trail_len);
        println!("║ Max unit drift:   {:>28.2e}   ║", self.max_unit_deviation);
        println!("║ Final cycle time: {:>26.3} h   ║", self.final_cycle_time);
        println!("╠══════════════════════════════════════════════════╣");
        if self.passed {
            println!("║ RESULT: PASSED                                   ║");
        } else {
            println!("║ RESULT: FAILED                                   ║");
        }
        println!("╚══════════════════════════════════════════════════╝");
        if let Some(reason) = &self.failure_reason {
            println!("  reason: {reason}");
        }
    }
}

/// Plays scenarios at a fixed synthetic frame rate.
pub struct SessionRunner {
    /// Master seed for the randomized scenario
    seed: u64,

    /// Synthetic frames per second
    fps: u32,

    /// Playback length in synthetic seconds
    duration_secs: f64,

    /// Keep every Nth frame when exporting
    export_interval: u64,
}

impl SessionRunner {
    /// Creates a runner with the default 60fps clock.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            fps: 60,
            duration_secs: 5.0,
            export_interval: 10,
        }
    }

    /// Sets the synthetic frame rate.
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps.max(1);
        self
    }

    /// Sets the playback duration.
    pub fn with_duration(mut self, secs: f64) -> Self {
        self.duration_secs = secs;
        self
    }

    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> SessionResult {
        self.run_inner(scenario, None)
    }

    /// Runs a scenario, collecting an export alongside the result.
    pub fn run_with_export(&self, scenario: ScenarioId) -> (SessionResult, SessionExport) {
        let mut export = SessionExport::new(scenario.name(), self.seed, self.fps);
        let result = self.run_inner(scenario, Some(&mut export));
        export.finalize(result.passed, Some(result.final_cycle_time));
        (result, export)
    }

    fn run_inner(
        &self,
        scenario: ScenarioId,
        mut export: Option<&mut SessionExport>,
    ) -> SessionResult {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);

        let config = scenario.config();
        let dataset = scenario.dataset(self.seed);
        let mut orchestrator = match Orchestrator::from_dataset(&dataset, config) {
            Ok(orch) => orch,
            Err(e) => {
                return self.failed(scenario, format!("orchestrator construction: {e}"));
            }
        };

        let frame_ms = 1000.0 / f64::from(self.fps);
        let total_frames = (self.duration_secs * f64::from(self.fps)).ceil() as u64;
        let pausing = scenario == ScenarioId::PauseStorm;

        let mut frames_run = 0u64;
        let mut wrap_count = 0u64;
        let mut max_trail_len = 0usize;
        let mut max_unit_deviation = 0.0f64;
        let mut last_cycle_time: Option<f64> = None;
        let mut failure: Option<String> = None;

        for frame in 0..total_frames {
            let now_ms = frame as f64 * frame_ms;

            if pausing {
                // Pause for 20 frames out of every 60; the cyclic
                // position must hold through each gap.
                match frame % 60 {
                    30 => {
                        let held = orchestrator.cycle_time(now_ms);
                        orchestrator.pause(now_ms);
                        last_cycle_time = Some(held);
                    }
                    50 => {
                        let held = orchestrator.cycle_time(now_ms);
                        orchestrator.resume(now_ms);
                        let resumed = orchestrator.cycle_time(now_ms);
                        if (resumed - held).abs() > 1e-9 {
                            failure = Some(format!(
                                "cycle position jumped across resume: {held} -> {resumed}"
                            ));
                            break;
                        }
                    }
                    _ => {}
                }
            }

            let frames = orchestrator.tick(now_ms);
            if frames.is_empty() {
                if orchestrator.state() == SessionState::Paused {
                    continue;
                }
                failure = Some("running orchestrator produced no frames".to_string());
                break;
            }
            frames_run += 1;

            let cycle_time = frames[0].cycle_time;
            if let Some(previous) = last_cycle_time {
                if cycle_time < previous {
                    wrap_count += 1;
                }
            }
            last_cycle_time = Some(cycle_time);

            for segment_frame in &frames {
                max_trail_len = max_trail_len.max(segment_frame.trail.len());
                max_unit_deviation =
                    max_unit_deviation.max((segment_frame.direction.norm() - 1.0).abs());

                if let Err(reason) = check_frame(&config, segment_frame) {
                    failure = Some(reason);
                    break;
                }
            }
            if failure.is_some() {
                break;
            }

            if let Some(export) = export.as_mut() {
                if frame % self.export_interval == 0 {
                    export.add_frame(ExportFrame {
                        time_ms: now_ms,
                        cycle_time,
                        segments: frames.clone(),
                    });
                }
            }

            if frame % u64::from(self.fps) == 0 {
                debug!(
                    "  t={:.1}s | cycle={:.2}h | trail={}",
                    now_ms / 1000.0,
                    cycle_time,
                    max_trail_len
                );
            }
        }

        let final_cycle_time = last_cycle_time.unwrap_or(0.0);
        let passed = failure.is_none();

        SessionResult {
            scenario,
            seed: self.seed,
            passed,
            frames_run,
            wrap_count,
            max_trail_len,
            max_unit_deviation,
            final_cycle_time,
            failure_reason: failure,
        }
    }

    fn failed(&self, scenario: ScenarioId, reason: String) -> SessionResult {
        SessionResult {
            scenario,
            seed: self.seed,
            passed: false,
            frames_run: 0,
            wrap_count: 0,
            max_trail_len: 0,
            max_unit_deviation: 0.0,
            final_cycle_time: 0.0,
            failure_reason: Some(reason),
        }
    }
}

/// Per-frame invariant checks, specific to the active target.
fn check_frame(config: &helio_core::VariantConfig, frame: &SegmentFrame) -> Result<(), String> {
    if (frame.direction.norm() - 1.0).abs() > 1e-9 {
        return Err(format!(
            "direction denormalized on {}: norm {}",
            frame.label,
            frame.direction.norm()
        ));
    }

    if frame.trail.len() > config.max_trail_points {
        return Err(format!(
            "trail overflow on {}: {} > {}",
            frame.label,
            frame.trail.len(),
            config.max_trail_points
        ));
    }

    // Oldest first: ages must be non-increasing and clamped
    let mut previous_age = 1.0f64;
    for sample in &frame.trail {
        if !(0.0..=1.0).contains(&sample.age) || sample.age > previous_age + 1e-12 {
            return Err(format!("trail ages out of order on {}", frame.label));
        }
        previous_age = sample.age;
    }

    match config.target {
        RenderTarget::Sphere | RenderTarget::Plane => {
            if config.target == RenderTarget::Plane && frame.position.y.abs() > 1e-12 {
                return Err(format!("plane position off-plane on {}", frame.label));
            }
        }
        RenderTarget::Torus => {
            let torus = &config.geometry.torus;
            let ring_radial = frame.position.x.hypot(frame.position.z) - torus.major_radius;
            let tube_distance = ring_radial.hypot(frame.position.y);
            if tube_distance > TUBE_FRACTION * torus.minor_radius + 1e-9 {
                return Err(format!("torus position outside tube on {}", frame.label));
            }
        }
        RenderTarget::Cylinder => {
            let cylinder = &config.geometry.cylinder;
            let shell = frame.position.x.hypot(frame.position.z);
            if (shell - cylinder.radius).abs() > 1e-9 {
                return Err(format!("cylinder position off-shell on {}", frame.label));
            }
        }
    }

    Ok(())
}
