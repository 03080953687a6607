//! Heliotrail Deterministic Playback Harness
//!
//! Drives the animation core headlessly with a synthetic millisecond
//! clock - no renderer, no real time. All entropy in the randomized
//! scenario derives from a single 64-bit seed, so any failing run is
//! reproducible via its seed number.
//!
//! The harness plays the role the browser frame callback plays in
//! production: it supplies monotonically increasing wall-clock
//! timestamps, schedules ticks, and consumes the per-segment frames the
//! orchestrator emits, checking the core's invariants along the way.

pub mod exporter;
pub mod runner;
pub mod scenarios;

pub use exporter::{ExportFrame, SessionExport};
pub use runner::{SessionResult, SessionRunner};
pub use scenarios::ScenarioId;
