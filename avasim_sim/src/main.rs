//! AvaSim CLI
//!
//! Fly and replay the drone headlessly against the backend's scene.

use avasim_core::{Collaborator, Path, ReclaimPolicy, SessionConfig};
use avasim_env::{AvasimContext, HttpBackend, SceneConfig, TokioContext, DEFAULT_BACKEND_URL};
use avasim_sim::scenarios::{reference_scene_config, ScenarioId};
use avasim_sim::{RerunLogger, RunResult, SessionRunner, SimContext};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Exit code for bad arguments and I/O failures.
const EXIT_USAGE: i32 = 1;

/// Exit code when the scene configuration cannot be obtained.
const EXIT_PENDING: i32 = 2;

/// AvaSim drone motion engine CLI
#[derive(Parser, Debug)]
#[command(name = "avasim")]
#[command(about = "Fly and replay the AvaSim drone headlessly", long_about = None)]
struct Args {
    /// Backend base URL
    #[arg(short, long, default_value = DEFAULT_BACKEND_URL)]
    backend: String,

    /// List recorded simulations and exit
    #[arg(long)]
    list: bool,

    /// Replay the recorded flight of this simulation id
    #[arg(long)]
    simulation: Option<i64>,

    /// Scenario to run (hover, climb, square, replay, reclaim, preempt, diagnostic, all)
    #[arg(short = 'S', long)]
    scenario: Option<String>,

    /// Run length in seconds
    #[arg(short, long, default_value = "10")]
    duration: f64,

    /// Frame rate override (Hz)
    #[arg(long)]
    refresh_hz: Option<u32>,

    /// Pace frames in real time instead of a virtual clock
    #[arg(long)]
    realtime: bool,

    /// Engine tuning file (JSON, any subset of fields)
    #[arg(short, long)]
    config: Option<String>,

    /// Run against the built-in reference scene without a backend
    #[arg(long)]
    offline: bool,

    /// Let a motion key press cancel a running replay
    #[arg(long)]
    reclaim_on_key: bool,

    /// Export frames to a JSON file
    #[arg(long)]
    export: Option<String>,

    /// Stream the flight to a Rerun viewer
    #[arg(long)]
    visualize: bool,

    /// JSON output for scripting
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Reads the tuning file (if any) and applies CLI overrides.
fn load_config(args: &Args) -> Result<SessionConfig, String> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {}", path, e))?;
            SessionConfig::from_json(&text).map_err(|e| format!("invalid {}: {}", path, e))?
        }
        None => SessionConfig::default(),
    };

    if let Some(hz) = args.refresh_hz {
        if hz == 0 {
            return Err("--refresh-hz must be positive".to_string());
        }
        config.refresh_hz = hz;
    }
    if args.reclaim_on_key {
        config.motion.reclaim_policy = ReclaimPolicy::ReclaimOnKeyPress;
    }

    Ok(config)
}

fn parse_scenarios(args: &Args) -> Result<Vec<ScenarioId>, String> {
    let default = if args.simulation.is_some() { "replay" } else { "hover" };
    let name = args.scenario.as_deref().unwrap_or(default);

    if name == "all" {
        Ok(ScenarioId::all())
    } else {
        Ok(vec![name.parse()?])
    }
}

async fn list_simulations(collaborator: &Collaborator<HttpBackend>, json: bool) -> i32 {
    let ids = collaborator.simulation_ids().await;

    if json {
        let listing = serde_json::json!(ids
            .iter()
            .map(|s| serde_json::json!({ "id": s.id, "description": s.description }))
            .collect::<Vec<_>>());
        println!("{}", serde_json::to_string_pretty(&listing).unwrap_or_default());
    } else if ids.is_empty() {
        info!("No recorded simulations available");
    } else {
        for summary in &ids {
            info!("  {:>4}  {}", summary.id, summary.description);
        }
    }
    0
}

fn report(results: &[RunResult], json: bool) {
    if json {
        let summary = serde_json::json!({
            "total": results.len(),
            "results": results.iter().map(|r| {
                let position = r.final_transform.map(|t| [t.position.x, t.position.y, t.position.z]);
                serde_json::json!({
                    "scenario": r.scenario.name(),
                    "frames": r.frames,
                    "time_secs": r.final_time_secs,
                    "final_mode": r.final_mode,
                    "final_position": position,
                    "replays_started": r.replays_started,
                    "replays_ignored": r.replays_ignored,
                    "diagnostic_presses": r.diagnostic_presses,
                    "pings_answered": r.pings_answered,
                    "scene_restored": r.scene_restored,
                })
            }).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&summary).unwrap_or_default());
        return;
    }

    info!("");
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for r in results {
        match r.final_transform {
            Some(t) => info!(
                "✓ {} | {} frames | {} | ({:.1}, {:.1}, {:.1})",
                r.scenario.name(),
                r.frames,
                r.final_mode,
                t.position.x,
                t.position.y,
                t.position.z
            ),
            None => info!("✓ {} | {} frames | no drone", r.scenario.name(), r.frames),
        }
    }
}

async fn execute<C: AvasimContext>(
    ctx: Arc<C>,
    args: &Args,
    config: SessionConfig,
    scene_config: SceneConfig,
    collaborator: Option<Collaborator<HttpBackend>>,
    replay: Option<Path>,
    scenarios: &[ScenarioId],
) -> i32 {
    let logger = if args.visualize {
        RerunLogger::new("avasim")
    } else {
        RerunLogger::disabled()
    };

    let mut runner = SessionRunner::new(ctx, config, scene_config)
        .with_duration(args.duration)
        .with_export(args.export.is_some())
        .with_logger(logger);
    if let Some(collaborator) = collaborator {
        runner = runner.with_collaborator(collaborator);
    }
    if let Some(path) = replay {
        runner = runner.with_replay(path);
    }

    let mut results = Vec::with_capacity(scenarios.len());
    for scenario in scenarios {
        match runner.run(*scenario).await {
            Ok(result) => results.push(result),
            Err(e) => {
                error!("✗ {} could not start: {}", scenario.name(), e);
                return EXIT_USAGE;
            }
        }
    }

    if let Some(export_path) = &args.export {
        if let Some(export) = results.first().and_then(|r| r.export.as_ref()) {
            if let Err(e) = export.write_to_file(export_path) {
                error!("Failed to write export: {:?}", e);
                return EXIT_USAGE;
            }
            info!("Exported {} frames to {}", export.frames.len(), export_path);
        }
    }

    report(&results, args.json);
    0
}

async fn run(args: Args) -> i32 {
    let collaborator = Collaborator::new(HttpBackend::new(args.backend.as_str()));

    if args.list {
        return list_simulations(&collaborator, args.json).await;
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            return EXIT_USAGE;
        }
    };

    let scenarios = match parse_scenarios(&args) {
        Ok(scenarios) => scenarios,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Available scenarios: hover, climb, square, replay, reclaim, preempt, diagnostic, all");
            return EXIT_USAGE;
        }
    };
    if args.export.is_some() && scenarios.len() > 1 {
        eprintln!("Error: --export only supports a single scenario, not 'all'");
        return EXIT_USAGE;
    }

    if args.offline {
        if args.simulation.is_some() {
            eprintln!("Error: --simulation needs a backend, drop --offline");
            return EXIT_USAGE;
        }
        info!("Offline: using the reference scene");
        return dispatch(&args, config, reference_scene_config(), None, None, &scenarios).await;
    }

    let Some(scene_config) = collaborator.scene_config().await else {
        error!(
            "Scene configuration unavailable from {} (pending); start the backend or pass --offline",
            args.backend
        );
        return EXIT_PENDING;
    };

    let replay = match args.simulation {
        Some(id) => {
            let path = collaborator.flight_path(id).await;
            if path.is_empty() {
                warn!("Simulation {} has no flight path to replay", id);
            } else {
                info!("Loaded simulation {} ({} waypoints)", id, path.len());
            }
            Some(path)
        }
        None => None,
    };

    dispatch(&args, config, scene_config, Some(collaborator), replay, &scenarios).await
}

async fn dispatch(
    args: &Args,
    config: SessionConfig,
    scene_config: SceneConfig,
    collaborator: Option<Collaborator<HttpBackend>>,
    replay: Option<Path>,
    scenarios: &[ScenarioId],
) -> i32 {
    if args.realtime {
        execute(TokioContext::shared(), args, config, scene_config, collaborator, replay, scenarios)
            .await
    } else {
        execute(SimContext::shared(), args, config, scene_config, collaborator, replay, scenarios)
            .await
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    if !args.json {
        info!("AvaSim drone engine v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    let code = run(args).await;
    std::process::exit(code);
}
