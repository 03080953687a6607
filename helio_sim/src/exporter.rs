//! JSON exporter for playback sessions.
//!
//! Writes the frames a session produced so an external viewer can replay
//! them without running the harness.

use helio_core::SegmentFrame;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;

/// A single exported frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportFrame {
    /// Synthetic wall-clock timestamp in milliseconds
    pub time_ms: f64,

    /// Cyclic time in hours
    pub cycle_time: f64,

    /// Per-segment output for this frame
    pub segments: Vec<SegmentFrame>,
}

/// Complete session export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionExport {
    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    /// Synthetic frame rate
    pub fps: u32,

    /// Exported frames (usually a subsample of the full run)
    pub frames: Vec<ExportFrame>,

    /// Whether the session passed its checks
    pub passed: bool,

    /// Cyclic time at the end of the run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_cycle_time: Option<f64>,
}

impl SessionExport {
    /// Creates a new export container.
    pub fn new(scenario: &str, seed: u64, fps: u32) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            fps,
            frames: Vec::new(),
            passed: false,
            final_cycle_time: None,
        }
    }

    /// Adds a frame.
    pub fn add_frame(&mut self, frame: ExportFrame) {
        self.frames.push(frame);
    }

    /// Finalizes the export.
    pub fn finalize(&mut self, passed: bool, final_cycle_time: Option<f64>) {
        self.passed = passed;
        self.final_cycle_time = final_cycle_time;
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
