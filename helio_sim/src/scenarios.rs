//! Playback scenarios for the harness.

use helio_core::registry::{combine, CombinedDataset, RawPath, RawSegment};
use helio_core::VariantConfig;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// HSIM-001: Two solstice paths overlaid on the sphere target
    SolsticeSweep,

    /// HSIM-002: Stereographic plane target, pole-centering checks
    FlatCrossing,

    /// HSIM-003: Torus target, time/ring coupling checks
    RingClock,

    /// HSIM-004: Cylinder shell target
    ShellWalk,

    /// HSIM-005: Repeated pause/resume, seamless-cycle checks
    PauseStorm,

    /// HSIM-006: Seeded random sparse keyframes on the card-demo variant
    RandomDrift,
}

impl ScenarioId {
    /// All scenarios in run order.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::SolsticeSweep,
            ScenarioId::FlatCrossing,
            ScenarioId::RingClock,
            ScenarioId::ShellWalk,
            ScenarioId::PauseStorm,
            ScenarioId::RandomDrift,
        ]
    }

    /// Short machine name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::SolsticeSweep => "solstice_sweep",
            ScenarioId::FlatCrossing => "flat_crossing",
            ScenarioId::RingClock => "ring_clock",
            ScenarioId::ShellWalk => "shell_walk",
            ScenarioId::PauseStorm => "pause_storm",
            ScenarioId::RandomDrift => "random_drift",
        }
    }

    /// One-line description for the CLI listing.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::SolsticeSweep => "Summer path + winter overlay, sphere target",
            ScenarioId::FlatCrossing => "Plane target, verifies pole-centering",
            ScenarioId::RingClock => "Torus target, verifies time/ring coupling",
            ScenarioId::ShellWalk => "Cylinder target, verifies shell placement",
            ScenarioId::PauseStorm => "Pause/resume storm, verifies seamless cycle position",
            ScenarioId::RandomDrift => "Seeded random sparse keyframes, card-demo variant",
        }
    }

    /// The variant configuration this scenario animates under.
    pub fn config(&self) -> VariantConfig {
        match self {
            ScenarioId::SolsticeSweep | ScenarioId::PauseStorm => VariantConfig::sphere(),
            ScenarioId::FlatCrossing => VariantConfig::plane(),
            ScenarioId::RingClock => VariantConfig::torus(),
            ScenarioId::ShellWalk => VariantConfig::cylinder(),
            ScenarioId::RandomDrift => VariantConfig::card_demo(),
        }
    }

    /// Builds the scenario's dataset. Only `RandomDrift` consumes the
    /// seed; the rest use the built-in solstice paths.
    pub fn dataset(&self, seed: u64) -> CombinedDataset {
        match self {
            ScenarioId::SolsticeSweep => {
                combine(&summer_path(), &[("winter", &winter_path())])
            }
            ScenarioId::RandomDrift => combine(&random_path(seed), &[]),
            _ => combine(&summer_path(), &[]),
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "solstice_sweep" | "solstice" | "hsim-001" => Ok(ScenarioId::SolsticeSweep),
            "flat_crossing" | "plane" | "hsim-002" => Ok(ScenarioId::FlatCrossing),
            "ring_clock" | "torus" | "hsim-003" => Ok(ScenarioId::RingClock),
            "shell_walk" | "cylinder" | "hsim-004" => Ok(ScenarioId::ShellWalk),
            "pause_storm" | "pause" | "hsim-005" => Ok(ScenarioId::PauseStorm),
            "random_drift" | "random" | "hsim-006" => Ok(ScenarioId::RandomDrift),
            _ => Err(format!("Unknown scenario: {s}")),
        }
    }
}

// ============================================================================
// BUILT-IN PATHS
// ============================================================================

fn segment_from(samples: &[(&str, [f64; 2])]) -> RawSegment {
    samples
        .iter()
        .map(|(hour, angles)| (hour.to_string(), *angles))
        .collect()
}

/// A high summer arc: early rise, steep noon, late set.
pub fn summer_path() -> RawPath {
    RawPath::single(
        "arc",
        segment_from(&[
            ("5", [-0.05, -2.2]),
            ("8", [-0.55, -1.5]),
            ("12", [-1.15, -0.4]),
            ("16", [-0.6, 0.35]),
            ("20", [-0.05, 0.75]),
        ]),
    )
}

/// A low winter arc: late rise, shallow noon, early set.
pub fn winter_path() -> RawPath {
    RawPath::single(
        "arc",
        segment_from(&[
            ("8.5", [-0.03, -1.8]),
            ("12", [-0.45, -0.7]),
            ("15.5", [-0.03, 0.1]),
        ]),
    )
}

/// Sparse random keyframes inside the documented angle domains:
/// `vertical ∈ [-π/2, 0)`, `horizontal ∈ (-3π/4, π/4)`, hours strictly
/// increasing.
pub fn random_path(seed: u64) -> RawPath {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let count = rng.gen_range(3..=8);

    let mut samples = RawSegment::new();
    let mut hour = rng.gen_range(0.0..4.0);
    for _ in 0..count {
        let vertical = rng.gen_range(-1.45..-0.05);
        let horizontal = rng.gen_range(-2.3..0.7);
        samples.insert(format!("{hour:.3}"), [vertical, horizontal]);
        hour += rng.gen_range(1.0..4.0);
        if hour >= 24.0 {
            break;
        }
    }

    RawPath::single("drift", samples)
}
