//! Heliotrail playback harness CLI
//!
//! Run headless animation sessions against the core engine.

use clap::Parser;
use helio_sim::scenarios::ScenarioId;
use helio_sim::{SessionResult, SessionRunner};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Heliotrail deterministic playback CLI
#[derive(Parser, Debug)]
#[command(name = "helio-sim")]
#[command(about = "Run headless playback sessions for the heliotrail core", long_about = None)]
struct Args {
    /// Master seed for the randomized scenario (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Scenario to run (solstice_sweep, flat_crossing, ring_clock,
    /// shell_walk, pause_storm, random_drift, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Playback duration in synthetic seconds
    #[arg(short, long, default_value = "5")]
    duration: f64,

    /// Synthetic frames per second
    #[arg(short, long, default_value = "60")]
    fps: u32,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,

    /// Export session frames to a JSON file
    #[arg(long)]
    export: Option<String>,
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    // Parse scenarios
    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        vec![args.scenario.parse().unwrap_or_else(|e| {
            eprintln!("Error: {e}");
            eprintln!("Available scenarios:");
            for scenario in ScenarioId::all() {
                eprintln!("  {:<16} {}", scenario.name(), scenario.description());
            }
            std::process::exit(1);
        })]
    };

    // Determine base seed
    let seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42)
    } else {
        args.seed
    };

    let runner = SessionRunner::new(seed)
        .with_fps(args.fps)
        .with_duration(args.duration);

    // Handle --export mode
    if let Some(export_path) = &args.export {
        if scenarios.len() > 1 {
            eprintln!("Error: --export only supports a single scenario, not 'all'");
            std::process::exit(1);
        }

        let (result, export) = runner.run_with_export(scenarios[0]);
        if let Err(e) = export.write_to_file(export_path) {
            error!("Failed to write export: {e:?}");
            std::process::exit(1);
        }
        info!("Exported {} frames to {}", export.frames.len(), export_path);

        result.print();
        if !result.passed {
            std::process::exit(1);
        }
        return;
    }

    // Run sessions
    let mut all_results: Vec<SessionResult> = Vec::new();
    let mut failed_count = 0;

    for scenario in &scenarios {
        let result = runner.run(*scenario);

        if !args.json {
            if result.passed {
                info!(
                    "✓ {} (seed={}) PASSED - {} frames, {} wraps",
                    scenario.name(),
                    seed,
                    result.frames_run,
                    result.wrap_count
                );
            } else {
                error!(
                    "✗ {} (seed={}) FAILED: {}",
                    scenario.name(),
                    seed,
                    result.failure_reason.as_deref().unwrap_or("unknown")
                );
            }
        }

        if !result.passed {
            failed_count += 1;
        }
        all_results.push(result);
    }

    // Summary
    let total = all_results.len();
    let passed = total - failed_count;

    if args.json {
        let summary = serde_json::json!({
            "total": total,
            "passed": passed,
            "failed": failed_count,
            "results": all_results.iter().map(|r| {
                serde_json::json!({
                    "scenario": r.scenario.name(),
                    "seed": r.seed,
                    "passed": r.passed,
                    "frames": r.frames_run,
                    "wraps": r.wrap_count,
                    "max_trail_len": r.max_trail_len,
                    "failure_reason": r.failure_reason,
                })
            }).collect::<Vec<_>>(),
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!("Failed to serialize summary: {e}");
                std::process::exit(1);
            }
        }
    } else {
        if failed_count == 0 {
            info!("✅ All {total} session runs passed!");
        } else {
            error!("❌ {failed_count}/{total} session runs failed!");
            for result in &all_results {
                if !result.passed {
                    error!(
                        "  - {} seed={}: {}",
                        result.scenario.name(),
                        result.seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }
        }
    }

    // Exit with proper code for CI
    if failed_count > 0 {
        std::process::exit(1);
    }
}
